//! Scanning of native-memory detail-diff reports
//!
//! The diagnostic tool prints a line-oriented, human-readable report.
//! The only part of it this crate depends on is one marker line for the
//! monitored call site followed by a `malloc=<N>KB ` entry. The scanner
//! here is a pure function over ordered lines so it can be tested
//! without spawning anything.

use thiserror::Error;

/// Call-site label the diagnostic report attributes the monitored
/// allocations to.
pub const JMETHOD_ID_MARKER: &str = "Method::ensure_jmethod_ids";

/// Error for a marker/value pair that is present but unreadable
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A `malloc=` entry was found after the marker but the value
    /// between `=` and the `KB ` token is not a decimal integer
    #[error("malformed malloc entry: {0:?}")]
    MalformedEntry(String),
}

/// Result of scanning one report for the monitored metric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Marker found and a well-formed `malloc=` entry followed it
    Found(u64),

    /// Marker found but no `malloc=` entry followed it
    MarkerWithoutValue,

    /// Marker never appeared in the report
    MarkerAbsent,
}

impl ScanOutcome {
    /// The extracted sample, if the scan found one
    pub fn sample_kb(&self) -> Option<u64> {
        match self {
            ScanOutcome::Found(kb) => Some(*kb),
            _ => None,
        }
    }
}

/// Scan report lines for the first `malloc=` entry after the first
/// occurrence of `marker`, and extract its kilobyte value.
///
/// A miss is reported structurally, never as a default value; mapping
/// a miss to zero is probe policy, not parser behavior.
pub fn scan_malloc_kb<'a, I>(lines: I, marker: &str) -> Result<ScanOutcome, ParseError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut after_marker = false;

    for line in lines {
        if !after_marker {
            if line.contains(marker) {
                after_marker = true;
            }
            continue;
        }

        if line.contains("malloc=") {
            return parse_malloc_entry(line).map(ScanOutcome::Found);
        }
    }

    if after_marker {
        Ok(ScanOutcome::MarkerWithoutValue)
    } else {
        Ok(ScanOutcome::MarkerAbsent)
    }
}

/// Extract the decimal integer between `malloc=` and the `KB ` token
fn parse_malloc_entry(line: &str) -> Result<u64, ParseError> {
    let start = line
        .find("malloc=")
        .map(|idx| idx + "malloc=".len())
        .ok_or_else(|| ParseError::MalformedEntry(line.to_string()))?;

    let rest = &line[start..];
    let end = rest
        .find("KB ")
        .ok_or_else(|| ParseError::MalformedEntry(line.to_string()))?;

    rest[..end]
        .parse::<u64>()
        .map_err(|_| ParseError::MalformedEntry(line.to_string()))
}
