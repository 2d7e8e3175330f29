//! Observable events for objindex
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    BootStart,
    BootComplete,
    ShutdownComplete,
    ConfigLoaded,
    /// HTTP server bound its listener
    ServerListening,

    // Indexer
    IndexCommitted,
    /// Late creation notification for a tombstoned key
    IndexSuppressed,
    IndexConflict,
    IndexFailed,

    // Remover
    RemoveCommitted,
    /// A guarded removal found its condition already settled
    RemoveSuppressed,
    RemoveConflict,
    RemoveFailed,

    /// Table binding absent (FATAL)
    ConfigMissing,
    /// Conflicted transaction resubmitted
    TransactionRetry,
    /// Request body could not be decoded
    RequestRejected,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "BOOT_START",
            Event::BootComplete => "BOOT_COMPLETE",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ServerListening => "SERVER_LISTENING",
            Event::IndexCommitted => "INDEX_COMMITTED",
            Event::IndexSuppressed => "INDEX_SUPPRESSED_BY_TOMBSTONE",
            Event::IndexConflict => "INDEX_CONFLICT",
            Event::IndexFailed => "INDEX_FAILED",
            Event::RemoveCommitted => "REMOVE_COMMITTED",
            Event::RemoveSuppressed => "REMOVE_SUPPRESSED",
            Event::RemoveConflict => "REMOVE_CONFLICT",
            Event::RemoveFailed => "REMOVE_FAILED",
            Event::ConfigMissing => "CONFIG_MISSING",
            Event::TransactionRetry => "TRANSACTION_RETRY",
            Event::RequestRejected => "REQUEST_REJECTED",
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::ConfigMissing)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(Event::IndexSuppressed.as_str(), "INDEX_SUPPRESSED_BY_TOMBSTONE");
        assert_eq!(Event::TransactionRetry.to_string(), "TRANSACTION_RETRY");
    }

    #[test]
    fn test_only_config_missing_is_fatal() {
        assert!(Event::ConfigMissing.is_fatal());
        assert!(!Event::IndexFailed.is_fatal());
        assert!(!Event::RemoveConflict.is_fatal());
    }
}
