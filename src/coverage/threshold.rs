//! Coverage threshold validation

use colored::Colorize;
use serde::Serialize;
use tracing::debug;

use super::CoverageData;

/// Minimum raw line coverage, in percent
pub const LINE_THRESHOLD: f64 = 100.0;

/// Minimum adjusted function coverage, in percent
pub const FUNCTION_THRESHOLD: f64 = 100.0;

/// Result of the coverage gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateOutcome {
    Passed,
    LinesBelowThreshold,
    FunctionsBelowThreshold,
}

impl GateOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, GateOutcome::Passed)
    }

    /// Message explaining a failure, `None` when the gate passed
    pub fn failure_message(&self) -> Option<&'static str> {
        match self {
            GateOutcome::Passed => None,
            GateOutcome::LinesBelowThreshold => Some("lines are below 100%"),
            GateOutcome::FunctionsBelowThreshold => {
                Some("adjusted function coverage is below 100%")
            }
        }
    }

    /// Print the failure message, if any, to stderr
    pub fn print_failure(&self) {
        if let Some(message) = self.failure_message() {
            eprintln!("{} {}", "Coverage gate failed:".red().bold(), message);
        }
    }
}

/// Validate coverage against the fixed thresholds.
///
/// Only raw line coverage and adjusted function coverage gate; line coverage is checked first.
pub fn evaluate_gate(data: &CoverageData) -> GateOutcome {
    let line_coverage = data.totals.line_percentage();
    let function_coverage = data.adjusted_functions().percentage();

    let outcome = if line_coverage < LINE_THRESHOLD {
        GateOutcome::LinesBelowThreshold
    } else if function_coverage < FUNCTION_THRESHOLD {
        GateOutcome::FunctionsBelowThreshold
    } else {
        GateOutcome::Passed
    };

    debug!(line_coverage, function_coverage, ?outcome, "evaluated coverage gate");
    outcome
}
