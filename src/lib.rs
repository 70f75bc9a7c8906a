//! coverage-summary - LCOV coverage gate
//!
//! A library for summarizing LCOV coverage reports with:
//! - Raw line, branch and function totals
//! - Function coverage adjusted for the gjs `top-level` artifact
//! - A fixed 100% gate on line and adjusted function coverage

pub mod coverage;
pub mod report;

pub use coverage::{
    evaluate_gate, parse_lcov, parse_lcov_string, percent, CoverageData, CoverageTotals,
    FunctionCounts, FunctionKey, GateOutcome, LcovError, TOP_LEVEL_FUNCTION,
};
pub use report::{build_text_report, generate_json_summary, CoverageSummary};
