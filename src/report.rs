use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::coverage::{CoverageData, FunctionCounts, GateOutcome};

/// Render the raw and adjusted coverage blocks printed to stdout
pub fn build_text_report(data: &CoverageData) -> String {
    let totals = &data.totals;
    let adjusted = data.adjusted_functions();

    let mut report = String::from("Raw coverage:\n");
    report.push_str(&format_row("lines:", totals.lines_hit, totals.lines_found));
    report.push_str(&format_row(
        "branches:",
        totals.branches_hit,
        totals.branches_found,
    ));
    report.push_str(&format_row(
        "funcs:",
        totals.functions_hit,
        totals.functions_found,
    ));

    report.push_str("Adjusted coverage (excluding gjs top-level artifact):\n");
    report.push_str(&format_row("funcs:", adjusted.hit, adjusted.found));

    report
}

fn format_row(label: &str, hit: u64, found: u64) -> String {
    format!(
        "  {:<10}{}/{} ({:.2}%)\n",
        label,
        hit,
        found,
        crate::coverage::percent(hit, found)
    )
}

/// Machine-readable form of the report
#[derive(Debug, Serialize)]
pub struct CoverageSummary {
    pub raw: RawSummary,
    pub adjusted: AdjustedSummary,
    pub gate: GateOutcome,
}

#[derive(Debug, Serialize)]
pub struct RawSummary {
    pub lines: Ratio,
    pub branches: Ratio,
    pub functions: Ratio,
}

#[derive(Debug, Serialize)]
pub struct AdjustedSummary {
    pub functions: Ratio,
}

#[derive(Debug, Serialize)]
pub struct Ratio {
    pub hit: u64,
    pub found: u64,
    pub percent: f64,
}

impl Ratio {
    fn new(hit: u64, found: u64) -> Self {
        Self {
            hit,
            found,
            percent: crate::coverage::percent(hit, found),
        }
    }
}

impl From<FunctionCounts> for Ratio {
    fn from(counts: FunctionCounts) -> Self {
        Ratio::new(counts.hit, counts.found)
    }
}

impl CoverageSummary {
    pub fn new(data: &CoverageData, gate: GateOutcome) -> Self {
        let totals = &data.totals;
        Self {
            raw: RawSummary {
                lines: Ratio::new(totals.lines_hit, totals.lines_found),
                branches: Ratio::new(totals.branches_hit, totals.branches_found),
                functions: Ratio::new(totals.functions_hit, totals.functions_found),
            },
            adjusted: AdjustedSummary {
                functions: data.adjusted_functions().into(),
            },
            gate,
        }
    }
}

/// Write the summary as pretty-printed JSON
pub fn generate_json_summary(summary: &CoverageSummary, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(output_path, json)
        .with_context(|| format!("Failed to write summary: {}", output_path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::{evaluate_gate, parse_lcov_string};
    use tempfile::tempdir;

    #[test]
    fn test_text_report_full_coverage() {
        let data = parse_lcov_string("LF:10\nLH:10\nBRF:4\nBRH:4\nFNF:2\nFNH:2\n").unwrap();

        let expected = "\
Raw coverage:
  lines:    10/10 (100.00%)
  branches: 4/4 (100.00%)
  funcs:    2/2 (100.00%)
Adjusted coverage (excluding gjs top-level artifact):
  funcs:    0/0 (100.00%)
";
        assert_eq!(build_text_report(&data), expected);
    }

    #[test]
    fn test_text_report_rounds_to_two_places() {
        let data = parse_lcov_string(
            "SF:a.js\nLF:3\nLH:1\nFN:1,a\nFN:2,b\nFN:3,c\nFNDA:1,a\nFNDA:1,b\n",
        )
        .unwrap();
        let report = build_text_report(&data);

        assert!(report.contains("  lines:    1/3 (33.33%)\n"));
        assert!(report.contains("  branches: 0/0 (100.00%)\n"));
        assert!(report.ends_with("  funcs:    2/3 (66.67%)\n"));
    }

    #[test]
    fn test_json_summary() {
        let data = parse_lcov_string(
            "SF:a.js\nFN:1,top-level\nFN:5,helper\nFNDA:1,top-level\nFNDA:0,helper\nLF:2\nLH:2\n",
        )
        .unwrap();
        let summary = CoverageSummary::new(&data, evaluate_gate(&data));

        let dir = tempdir().unwrap();
        let path = dir.path().join("summary.json");
        generate_json_summary(&summary, &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["raw"]["lines"]["hit"], 2);
        assert_eq!(value["raw"]["lines"]["percent"], 100.0);
        assert_eq!(value["adjusted"]["functions"]["found"], 1);
        assert_eq!(value["adjusted"]["functions"]["hit"], 0);
        assert_eq!(value["gate"], "functions_below_threshold");
    }

    #[test]
    fn test_json_summary_unwritable_path() {
        let dir = tempdir().unwrap();
        let summary = CoverageSummary::new(&CoverageData::default(), GateOutcome::Passed);
        let err = generate_json_summary(&summary, &dir.path().join("missing/summary.json"))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to write summary"));
    }
}
