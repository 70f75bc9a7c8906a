use anyhow::Result;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use coverage_summary::{
    build_text_report, evaluate_gate, generate_json_summary, parse_lcov, CoverageSummary,
};

/// Exit status when the coverage gate fails
const EXIT_GATE_FAILED: u8 = 1;
/// Exit status when the report cannot be read, parsed, or summarized
const EXIT_FATAL: u8 = 3;

#[derive(Parser)]
#[command(name = "coverage-summary")]
#[command(about = "Summarize an LCOV report and fail below 100% line or function coverage")]
#[command(version)]
struct Cli {
    /// LCOV trace file to summarize
    lcov: PathBuf,

    /// When to color error output
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Also write a JSON summary to this path
    #[arg(long)]
    json_out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// Whether messages written to stderr get colored.
    ///
    /// `Auto` follows `CLICOLOR_FORCE`, then `NO_COLOR`, then `CLICOLOR`, and finally
    /// whether stderr itself is a terminal.
    fn colors_stderr(
        self,
        stderr_is_terminal: bool,
        env: impl Fn(&str) -> Option<String>,
    ) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                if env("CLICOLOR_FORCE").is_some_and(|v| !v.is_empty() && v != "0") {
                    true
                } else {
                    let disabled = env("NO_COLOR").is_some_and(|v| !v.is_empty())
                        || env("CLICOLOR").is_some_and(|v| v == "0");
                    stderr_is_terminal && !disabled
                }
            }
        }
    }
}

fn main() -> ExitCode {
    // Usage errors exit with status 2 before anything is read.
    let cli = Cli::parse();
    init_tracing();

    let color = cli
        .color
        .colors_stderr(std::io::stderr().is_terminal(), |key| std::env::var(key).ok());
    colored::control::set_override(color);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_GATE_FAILED),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Print the report and return whether the gate passed
fn run(cli: &Cli) -> Result<bool> {
    let data = parse_lcov(&cli.lcov)?;

    print!("{}", build_text_report(&data));

    let outcome = evaluate_gate(&data);

    if let Some(ref path) = cli.json_out {
        generate_json_summary(&CoverageSummary::new(&data, outcome), path)?;
    }

    outcome.print_failure();
    Ok(outcome.passed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_auto_color_follows_stderr_terminal() {
        assert!(ColorChoice::Auto.colors_stderr(true, env_of(&[])));
        assert!(!ColorChoice::Auto.colors_stderr(false, env_of(&[])));
    }

    #[test]
    fn test_auto_color_honours_environment() {
        assert!(!ColorChoice::Auto.colors_stderr(true, env_of(&[("NO_COLOR", "1")])));
        assert!(!ColorChoice::Auto.colors_stderr(true, env_of(&[("CLICOLOR", "0")])));
        assert!(ColorChoice::Auto.colors_stderr(true, env_of(&[("NO_COLOR", "")])));
        assert!(ColorChoice::Auto.colors_stderr(
            false,
            env_of(&[("CLICOLOR_FORCE", "1"), ("NO_COLOR", "1")])
        ));
    }

    #[test]
    fn test_explicit_color_ignores_terminal_and_environment() {
        let forced = env_of(&[("CLICOLOR_FORCE", "1")]);
        assert!(!ColorChoice::Never.colors_stderr(true, &forced));
        assert!(ColorChoice::Always.colors_stderr(false, env_of(&[("NO_COLOR", "1")])));
    }
}
