//! # Index Store Errors

use std::fmt;

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Why one sub-operation of a cancelled transaction failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancellationCode {
    /// The sub-operation did not fail
    None,
    /// Its condition evaluated to false
    ConditionalCheckFailed,
    /// Another transaction was in flight on the same item
    TransactionConflict,
    /// Any other store-reported code
    Other(String),
}

impl CancellationCode {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "None" => CancellationCode::None,
            "ConditionalCheckFailed" => CancellationCode::ConditionalCheckFailed,
            "TransactionConflict" => CancellationCode::TransactionConflict,
            other => CancellationCode::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CancellationCode::None => "None",
            CancellationCode::ConditionalCheckFailed => "ConditionalCheckFailed",
            CancellationCode::TransactionConflict => "TransactionConflict",
            CancellationCode::Other(code) => code,
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, CancellationCode::None)
    }
}

impl fmt::Display for CancellationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-operation detail of a cancelled transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancellationReason {
    pub code: CancellationCode,
    pub message: Option<String>,
}

impl CancellationReason {
    pub fn new(code: CancellationCode, message: Option<String>) -> Self {
        Self { code, message }
    }

    pub fn none() -> Self {
        Self::new(CancellationCode::None, None)
    }

    pub fn condition_failed() -> Self {
        Self::new(
            CancellationCode::ConditionalCheckFailed,
            Some("The conditional request failed".to_string()),
        )
    }

    pub fn conflict() -> Self {
        Self::new(
            CancellationCode::TransactionConflict,
            Some("Transaction is ongoing for the item".to_string()),
        )
    }

    /// The message, if the store reported a non-empty one
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.is_empty())
    }
}

/// Index store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Transaction cancelled [{}]", summarize(.reasons))]
    Cancelled { reasons: Vec<CancellationReason> },

    #[error("Transaction conflict: {0}")]
    Conflict(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

fn summarize(reasons: &[CancellationReason]) -> String {
    reasons
        .iter()
        .map(|r| r.code.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
