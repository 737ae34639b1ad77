//! Error types for the leak probe
//!
//! This module provides structured error definitions using thiserror,
//! with anyhow interop for error propagation at the binary boundary.

use thiserror::Error;

/// Main error type for probe operations
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Diagnostic sampler could not be launched
    #[error("Sampler launch failed: {0}")]
    SamplerLaunch(String),

    /// Diagnostic sampler ran but exited unsuccessfully
    #[error("Sampler command exited with status {status}: {stderr}")]
    SamplerCommand { status: i32, stderr: String },

    /// Baseline token presented to the wrong sampler target
    #[error("Baseline mismatch: token is for target {token_target}, sampler targets {sampler_target}")]
    BaselineMismatch {
        token_target: u32,
        sampler_target: u32,
    },

    /// Workload cycle failed
    #[error("Workload error: {0}")]
    Workload(String),

    /// Report contained the marker/value pair but it was malformed
    #[error("Report parse error: {0}")]
    Parse(#[from] crate::report::ParseError),

    /// Report did not contain the expected marker/value pair
    /// (only raised under the strict parse-miss policy)
    #[error("Report scan miss: {0}")]
    ScanMiss(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for probe operations
pub type Result<T> = std::result::Result<T, ProbeError>;

/// Convert anyhow::Error to ProbeError
impl From<anyhow::Error> for ProbeError {
    fn from(err: anyhow::Error) -> Self {
        ProbeError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProbeError::Workload("driver exited with signal".to_string());
        assert_eq!(err.to_string(), "Workload error: driver exited with signal");
    }

    #[test]
    fn test_baseline_mismatch_display() {
        let err = ProbeError::BaselineMismatch {
            token_target: 100,
            sampler_target: 200,
        };
        let msg = err.to_string();
        assert!(msg.contains("100"));
        assert!(msg.contains("200"));
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: ProbeError = anyhow::anyhow!("opaque failure").into();
        assert!(matches!(err, ProbeError::Other(_)));
        assert_eq!(err.to_string(), "opaque failure");
    }
}
