//! CLI-specific error types

use std::fmt;
use std::io;

use crate::api::Response;
use crate::config::ConfigError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Runtime or server startup failed
    BootFailed,
    /// The invocation completed with a non-success response
    RequestFailed,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "OBJIDX_CLI_CONFIG_ERROR",
            Self::IoError => "OBJIDX_CLI_IO_ERROR",
            Self::BootFailed => "OBJIDX_CLI_BOOT_FAILED",
            Self::RequestFailed => "OBJIDX_CLI_REQUEST_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn boot_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BootFailed, msg)
    }

    /// The response was already written; this only sets the exit status
    pub fn request_failed(response: &Response) -> Self {
        let detail = match response {
            Response::Success => "ok".to_string(),
            Response::Conflict { message } => format!("conflict: {}", message),
            Response::InternalError { code, message, .. } => format!("{}: {}", code, message),
        };
        Self::new(CliErrorCode::RequestFailed, detail)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_code() {
        let err = CliError::from(ConfigError::Invalid("http.port must be > 0".into()));
        assert_eq!(
            err.to_string(),
            "OBJIDX_CLI_CONFIG_ERROR: Invalid config: http.port must be > 0"
        );
    }

    #[test]
    fn test_request_failed_from_conflict() {
        let err = CliError::request_failed(&Response::Conflict {
            message: "Transaction is ongoing for the item".into(),
        });
        assert_eq!(err.code(), &CliErrorCode::RequestFailed);
        assert!(err.message().starts_with("conflict: "));
    }
}
