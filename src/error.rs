//! Error types for the simulation engines and the script driver.

use std::process::ExitCode;

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors returned by the engines. Every failing call leaves the engine untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// Non-positive size, bad geometry, empty or duplicate identifier
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Replacement policy or fit strategy outside the supported set
    #[error("unknown policy: {0}")]
    UnknownPolicy(String),

    /// Deallocation or access naming an unknown process or segment
    #[error("not found: {0}")]
    NotFound(String),

    /// No room even after eviction (paging/VM) or no fitting block (segmentation)
    #[error("out of memory: requested {requested} bytes but only {available} available")]
    OutOfMemory { requested: usize, available: usize },

    /// Address outside the range the process owns
    #[error("invalid address {address} for process {process_id} (limit {limit})")]
    InvalidAddress {
        process_id: String,
        address: usize,
        limit: usize,
    },
}

/// Errors raised while loading configuration, replaying a script or writing a report.
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("invalid configuration: {0}")]
    Config(#[from] SimError),
}

impl ScriptError {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        ScriptError::Parse {
            line,
            message: message.into(),
        }
    }

    /// Get exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Io(_) => ExitCode::from(2),
            Self::Json(_) => ExitCode::from(3),
            Self::Parse { .. } => ExitCode::from(4),
            Self::Config(_) => ExitCode::from(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_memory_message() {
        let err = SimError::OutOfMemory {
            requested: 40,
            available: 32,
        };
        assert_eq!(
            err.to_string(),
            "out of memory: requested 40 bytes but only 32 available"
        );
    }

    #[test]
    fn test_invalid_address_message() {
        let err = SimError::InvalidAddress {
            process_id: "A".to_string(),
            address: 9000,
            limit: 8192,
        };
        assert!(err.to_string().contains("9000"));
        assert!(err.to_string().contains("process A"));
    }

    #[test]
    fn test_script_error_from_sim_error() {
        let err: ScriptError = SimError::InvalidArgument("page size is zero".into()).into();
        assert!(matches!(err, ScriptError::Config(_)));
        assert!(err.to_string().starts_with("invalid configuration"));
    }

    #[test]
    fn test_parse_error_message() {
        let err = ScriptError::parse(7, "expected a size");
        assert_eq!(err.to_string(), "line 7: expected a size");
    }
}
