//! Error handling module for EasyVideo

use thiserror::Error;

/// Main error type for EasyVideo operations
#[derive(Error, Debug)]
pub enum EasyVideoError {
    /// A required parameter is missing or malformed
    #[error("Invalid parameters for '{operation}': {reason}")]
    InvalidOperationParameters { operation: String, reason: String },

    /// An enumerated choice was not found in its lookup table
    #[error("Unsupported {option} '{value}' for '{operation}'. Expected one of: {allowed}")]
    UnsupportedOption {
        operation: String,
        option: String,
        value: String,
        allowed: String,
    },

    /// Operation name not present in the registry
    #[error("Unknown operation: {name}. Run with --list to see the catalogue")]
    UnknownOperation { name: String },

    /// The external tool exited non-zero
    #[error("'{operation}' failed running `{command}` ({})", describe_exit(.code, .stderr))]
    ExternalToolFailure {
        operation: String,
        command: String,
        code: Option<i32>,
        stderr: Option<String>,
    },

    /// Inspection output carried no recognisable duration
    #[error("Could not determine the duration of {input}")]
    DurationUnavailable { input: String },

    /// Catalogue search pattern is not a valid regular expression
    #[error("Invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Configuration file or environment error
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_exit(code: &Option<i32>, stderr: &Option<String>) -> String {
    let status = match code {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    };
    match stderr.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => format!("{}: {}", status, text),
        _ => status,
    }
}

impl EasyVideoError {
    /// Shorthand for `InvalidOperationParameters`
    pub fn invalid_params(operation: &str, reason: impl Into<String>) -> Self {
        EasyVideoError::InvalidOperationParameters {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }

    /// Process exit code the binary should report for this error.
    ///
    /// Tool failures mirror the tool's own status; everything else is a usage error.
    pub fn exit_code(&self) -> i32 {
        match self {
            EasyVideoError::ExternalToolFailure { code, .. } => code.unwrap_or(1),
            EasyVideoError::DurationUnavailable { .. } | EasyVideoError::Io(_) => 1,
            _ => 2,
        }
    }
}

/// Result type alias for EasyVideo operations
pub type EasyVideoResult<T> = std::result::Result<T, EasyVideoError>;
