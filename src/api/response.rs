//! API response types
//!
//! JSON envelope shared by the HTTP server and the CLI:
//! - `{"status":"ok"}`
//! - `{"status":"conflict","message":...}`
//! - `{"status":"error","code":...,"message":...,"fatal":...}`

use serde::{Deserialize, Serialize};

use crate::index::{IndexError, IndexResult, Outcome};

/// Unified response type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Response {
    /// Committed, or a no-op against a tombstone
    #[serde(rename = "ok")]
    Success,
    /// Cancelled transaction; carries the joined store reasons
    Conflict { message: String },
    /// Configuration, encoding or transport failure
    #[serde(rename = "error")]
    InternalError {
        code: String,
        message: String,
        fatal: bool,
    },
}

impl Response {
    pub fn from_outcome(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Committed | Outcome::SuppressedByTombstone => Response::Success,
            Outcome::Conflict(message) => Response::Conflict { message },
        }
    }

    pub fn from_error(err: &IndexError) -> Self {
        Response::InternalError {
            code: err.code().code().to_string(),
            message: err.message().to_string(),
            fatal: err.is_fatal(),
        }
    }

    pub fn from_result(result: IndexResult<Outcome>) -> Self {
        match result {
            Ok(outcome) => Self::from_outcome(outcome),
            Err(err) => Self::from_error(&err),
        }
    }

    /// HTTP status for this response
    pub fn status_code(&self) -> u16 {
        match self {
            Response::Success => 200,
            Response::Conflict { .. } => 409,
            Response::InternalError { .. } => 500,
        }
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!(self)
    }

    /// Convert to a single-line JSON string
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success)
    }
}
