//! Index error types
//!
//! Error codes:
//! - OBJIDX_CONFIG_MISSING (FATAL)
//! - OBJIDX_ENCODING_FAILED (ERROR)
//! - OBJIDX_STORE_TRANSPORT (ERROR)
//!
//! Transaction conflicts and tombstone no-ops are outcomes, not errors.

use std::fmt;

/// Severity levels for index errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The invocation failed; the service keeps serving
    Error,
    /// Misconfiguration; retrying cannot help
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Index-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexErrorCode {
    /// Required store identity binding is missing
    ConfigMissing,
    /// A request or record could not be marshaled into a store item
    EncodingFailed,
    /// Any other failure talking to the store
    StoreTransport,
}

impl IndexErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            IndexErrorCode::ConfigMissing => "OBJIDX_CONFIG_MISSING",
            IndexErrorCode::EncodingFailed => "OBJIDX_ENCODING_FAILED",
            IndexErrorCode::StoreTransport => "OBJIDX_STORE_TRANSPORT",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            IndexErrorCode::ConfigMissing => Severity::Fatal,
            IndexErrorCode::EncodingFailed => Severity::Error,
            IndexErrorCode::StoreTransport => Severity::Error,
        }
    }
}

impl fmt::Display for IndexErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Index error with code and message
#[derive(Debug, Clone)]
pub struct IndexError {
    code: IndexErrorCode,
    message: String,
}

impl IndexError {
    /// Required configuration binding `binding` is absent
    pub fn config_missing(binding: &str) -> Self {
        Self {
            code: IndexErrorCode::ConfigMissing,
            message: format!("{} is not set", binding),
        }
    }

    pub fn encoding(reason: impl Into<String>) -> Self {
        Self {
            code: IndexErrorCode::EncodingFailed,
            message: reason.into(),
        }
    }

    pub fn transport(reason: impl Into<String>) -> Self {
        Self {
            code: IndexErrorCode::StoreTransport,
            message: reason.into(),
        }
    }

    pub fn code(&self) -> IndexErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for IndexError {}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;
