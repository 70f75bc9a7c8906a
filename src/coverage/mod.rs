//! Coverage module
//!
//! Provides:
//! - LCOV parsing
//! - Adjusted function coverage (without the synthetic top-level entries)
//! - Threshold validation

mod lcov;
mod threshold;

pub use lcov::*;
pub use threshold::*;

use std::collections::BTreeMap;

/// Function name gjs emits for a file's implicit top-level scope.
///
/// It is always present and always hit, so it is left out of adjusted function coverage.
pub const TOP_LEVEL_FUNCTION: &str = "top-level";

/// Coverage percentage for `hit` out of `total`.
///
/// Nothing to cover counts as fully covered.
pub fn percent(hit: u64, total: u64) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (hit as f64 / total as f64) * 100.0
}

/// Summary counters accumulated over every record in the report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoverageTotals {
    pub lines_found: u64,
    pub lines_hit: u64,
    pub branches_found: u64,
    pub branches_hit: u64,
    pub functions_found: u64,
    pub functions_hit: u64,
}

impl CoverageTotals {
    pub fn line_percentage(&self) -> f64 {
        percent(self.lines_hit, self.lines_found)
    }

    pub fn branch_percentage(&self) -> f64 {
        percent(self.branches_hit, self.branches_found)
    }

    pub fn function_percentage(&self) -> f64 {
        percent(self.functions_hit, self.functions_found)
    }
}

/// A function, identified by the source file it was declared under
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FunctionKey {
    pub file: String,
    pub name: String,
}

impl FunctionKey {
    pub fn new(file: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            name: name.into(),
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.name == TOP_LEVEL_FUNCTION
    }
}

/// Found/hit counts for a set of functions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FunctionCounts {
    pub found: u64,
    pub hit: u64,
}

impl FunctionCounts {
    pub fn percentage(&self) -> f64 {
        percent(self.hit, self.found)
    }
}

/// Everything read from one LCOV report
#[derive(Debug, Clone, Default)]
pub struct CoverageData {
    pub totals: CoverageTotals,
    /// Hit count per declared or reported function; the last record for a key wins.
    pub functions: BTreeMap<FunctionKey, u64>,
}

impl CoverageData {
    /// Function coverage recomputed from the per-function records, skipping
    /// [`TOP_LEVEL_FUNCTION`] entries.
    pub fn adjusted_functions(&self) -> FunctionCounts {
        self.functions
            .iter()
            .filter(|(key, _)| !key.is_top_level())
            .fold(FunctionCounts::default(), |mut counts, (_, &hits)| {
                counts.found += 1;
                if hits > 0 {
                    counts.hit += 1;
                }
                counts
            })
    }
}
