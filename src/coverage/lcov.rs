//! LCOV format parser

use anyhow::{Context, Result};
use std::fs;
use std::num::ParseIntError;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, trace};

use super::{CoverageData, FunctionKey};

/// A record in the report that cannot be read
#[derive(Debug, Error)]
pub enum LcovError {
    #[error("line {line}: invalid {record} count {value:?}")]
    InvalidCount {
        line: usize,
        record: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("line {line}: malformed {record} record {payload:?}, expected `<number>,<name>`")]
    MissingComma {
        line: usize,
        record: &'static str,
        payload: String,
    },

    #[error("line {line}: {record} total overflows")]
    CountOverflow { line: usize, record: &'static str },
}

/// Parse an LCOV file
pub fn parse_lcov(path: &Path) -> Result<CoverageData> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read coverage report: {}", path.display()))?;
    let data = parse_lcov_string(&content)
        .with_context(|| format!("Failed to parse coverage report: {}", path.display()))?;
    Ok(data)
}

/// Parse LCOV content from a string
pub fn parse_lcov_string(content: &str) -> Result<CoverageData, LcovError> {
    let mut data = CoverageData::default();
    // Records before any SF: line are filed under the empty path.
    let mut current_file = String::new();

    for (index, line) in split_lines(content).enumerate() {
        let line_no = index + 1;
        let totals = &mut data.totals;

        if let Some(path) = line.strip_prefix("SF:") {
            current_file = path.to_string();
        } else if let Some(value) = line.strip_prefix("LF:") {
            add_count(&mut totals.lines_found, value, "LF", line_no)?;
        } else if let Some(value) = line.strip_prefix("LH:") {
            add_count(&mut totals.lines_hit, value, "LH", line_no)?;
        } else if let Some(value) = line.strip_prefix("BRF:") {
            add_count(&mut totals.branches_found, value, "BRF", line_no)?;
        } else if let Some(value) = line.strip_prefix("BRH:") {
            add_count(&mut totals.branches_hit, value, "BRH", line_no)?;
        } else if let Some(value) = line.strip_prefix("FNF:") {
            add_count(&mut totals.functions_found, value, "FNF", line_no)?;
        } else if let Some(value) = line.strip_prefix("FNH:") {
            add_count(&mut totals.functions_hit, value, "FNH", line_no)?;
        } else if let Some(payload) = line.strip_prefix("FN:") {
            let (_, name) = split_record(payload, "FN", line_no)?;
            trace!(file = %current_file, function = name, "declared function");
            data.functions.insert(FunctionKey::new(current_file.as_str(), name), 0);
        } else if let Some(payload) = line.strip_prefix("FNDA:") {
            let (hits, name) = split_record(payload, "FNDA", line_no)?;
            let hits = parse_count(hits, "FNDA", line_no)?;
            trace!(file = %current_file, function = name, hits, "function hits");
            data.functions.insert(FunctionKey::new(current_file.as_str(), name), hits);
        }
    }

    debug!(
        lines_found = data.totals.lines_found,
        lines_hit = data.totals.lines_hit,
        functions = data.functions.len(),
        "parsed lcov report"
    );

    Ok(data)
}

/// Split on every line boundary Unicode recognises, with `\r\n` counted as one.
///
/// A trailing terminator does not start an extra empty line.
fn split_lines(content: &str) -> impl Iterator<Item = &str> {
    let mut rest = content;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match rest.char_indices().find(|&(_, c)| is_line_break(c)) {
            Some((at, c)) => {
                let line = &rest[..at];
                let mut next = at + c.len_utf8();
                if c == '\r' && rest[next..].starts_with('\n') {
                    next += 1;
                }
                rest = &rest[next..];
                Some(line)
            }
            None => Some(std::mem::take(&mut rest)),
        }
    })
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r'
            | '\x0b'
            | '\x0c'
            | '\x1c'
            | '\x1d'
            | '\x1e'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

fn add_count(
    total: &mut u64,
    value: &str,
    record: &'static str,
    line: usize,
) -> Result<(), LcovError> {
    let count = parse_count(value, record, line)?;
    *total = total
        .checked_add(count)
        .ok_or(LcovError::CountOverflow { line, record })?;
    Ok(())
}

fn parse_count(value: &str, record: &'static str, line: usize) -> Result<u64, LcovError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|source| LcovError::InvalidCount {
            line,
            record,
            value: value.to_string(),
            source,
        })
}

/// Split `<number>,<name>` at the first comma; the name may contain further commas.
fn split_record<'a>(
    payload: &'a str,
    record: &'static str,
    line: usize,
) -> Result<(&'a str, &'a str), LcovError> {
    payload.split_once(',').ok_or_else(|| LcovError::MissingComma {
        line,
        record,
        payload: payload.to_string(),
    })
}
