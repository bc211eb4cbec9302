//! Error types for opsboard
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, invalid config, rejected form input)
//! - 4: Operation failed (fetch error, io error, malformed snapshot)

use thiserror::Error;

use crate::form::FieldErrors;

/// Exit codes for the opsboard CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for opsboard operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    // Operation failures (exit code 4)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::InvalidConfig(_) | Error::InvalidArgument(_) | Error::Validation(_) => {
                exit_codes::USER_ERROR
            }

            // Operation failures
            Error::Http(_)
            | Error::Api { .. }
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured detail payload for JSON error envelopes
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::Validation(fields) => serde_json::to_value(fields).ok(),
            Error::Api { status, .. } => Some(serde_json::json!({ "status": status })),
            _ => None,
        }
    }
}

/// Result type alias for opsboard operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_errors_exit_with_2() {
        assert_eq!(
            Error::InvalidArgument("bad status".to_string()).exit_code(),
            exit_codes::USER_ERROR
        );
        assert_eq!(
            Error::InvalidConfig("empty base_url".to_string()).exit_code(),
            exit_codes::USER_ERROR
        );
    }

    #[test]
    fn operation_failures_exit_with_4() {
        let err = Error::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILED);
    }

    #[test]
    fn api_details_include_status() {
        let err = Error::Api {
            status: 404,
            message: "missing".to_string(),
        };
        let details = err.details().expect("details");
        assert_eq!(details["status"], 404);
    }
}
