//! Transaction outcomes
//!
//! A store response is mapped to exactly one of:
//! - `Committed`
//! - `SuppressedByTombstone`: only the tombstone guard failed; a late
//!   creation notification for a deleted key. Success, no state change.
//! - `Conflict(reasons)`: any other cancellation; safe to redeliver
//!
//! Everything else is an `IndexError`.

use std::fmt;

use super::errors::{IndexError, IndexResult};
use crate::store::{CancellationCode, CancellationReason, StoreError, StoreResult};

/// Result of one Indexer or Remover invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The transaction committed
    Committed,
    /// Aborted solely by the tombstone precondition; nothing was written
    SuppressedByTombstone,
    /// Aborted for any other reason; carries the comma-joined store reasons
    Conflict(String),
}

impl Outcome {
    /// Whether the caller should treat the invocation as done
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Committed | Outcome::SuppressedByTombstone)
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Outcome::Conflict(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Committed => "committed",
            Outcome::SuppressedByTombstone => "suppressed_by_tombstone",
            Outcome::Conflict(_) => "conflict",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Conflict(reasons) => write!(f, "conflict: {}", reasons),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Map a store response to an outcome.
///
/// `tombstone_guard` is the position of the tombstone-absence check in the
/// transaction, if the transaction has one.
pub(crate) fn classify(
    tombstone_guard: Option<usize>,
    result: StoreResult<()>,
) -> IndexResult<Outcome> {
    match result {
        Ok(()) => Ok(Outcome::Committed),
        Err(StoreError::Cancelled { reasons }) => {
            if suppressed_by_tombstone(tombstone_guard, &reasons) {
                return Ok(Outcome::SuppressedByTombstone);
            }
            let joined = join_reasons(&reasons);
            if joined.is_empty() {
                Ok(Outcome::Conflict(
                    StoreError::Cancelled { reasons }.to_string(),
                ))
            } else {
                Ok(Outcome::Conflict(joined))
            }
        }
        Err(StoreError::Conflict(message)) if !message.is_empty() => Ok(Outcome::Conflict(message)),
        Err(err @ StoreError::Conflict(_)) => Ok(Outcome::Conflict(err.to_string())),
        Err(err @ (StoreError::InvalidRequest(_) | StoreError::Transport(_))) => {
            Err(IndexError::transport(err.to_string()))
        }
    }
}

/// True when the guard alone failed its condition
fn suppressed_by_tombstone(guard: Option<usize>, reasons: &[CancellationReason]) -> bool {
    let Some(guard) = guard else {
        return false;
    };
    let guard_failed = reasons
        .get(guard)
        .is_some_and(|r| r.code == CancellationCode::ConditionalCheckFailed);

    guard_failed
        && reasons
            .iter()
            .enumerate()
            .all(|(i, r)| i == guard || !r.code.is_failure())
}

/// Comma-join every non-empty reason message
fn join_reasons(reasons: &[CancellationReason]) -> String {
    reasons
        .iter()
        .filter_map(CancellationReason::message)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cancelled(reasons: Vec<CancellationReason>) -> StoreResult<()> {
        Err(StoreError::Cancelled { reasons })
    }

    #[test]
    fn test_commit() {
        assert_eq!(classify(Some(0), Ok(())).unwrap(), Outcome::Committed);
    }

    #[test]
    fn test_guard_failure_alone_is_suppression() {
        let result = cancelled(vec![
            CancellationReason::condition_failed(),
            CancellationReason::none(),
        ]);
        assert_eq!(
            classify(Some(0), result).unwrap(),
            Outcome::SuppressedByTombstone
        );
    }

    #[test]
    fn test_guard_failure_with_conflict_is_conflict() {
        let result = cancelled(vec![
            CancellationReason::condition_failed(),
            CancellationReason::conflict(),
        ]);
        let outcome = classify(Some(0), result).unwrap();
        assert_eq!(
            outcome,
            Outcome::Conflict(
                "The conditional request failed, Transaction is ongoing for the item".into()
            )
        );
    }

    #[test]
    fn test_condition_failure_without_guard_is_conflict() {
        let result = cancelled(vec![
            CancellationReason::none(),
            CancellationReason::condition_failed(),
        ]);
        assert!(classify(None, result).unwrap().is_conflict());
    }

    #[test]
    fn test_non_guard_condition_failure_is_conflict() {
        let result = cancelled(vec![
            CancellationReason::none(),
            CancellationReason::condition_failed(),
        ]);
        assert!(classify(Some(0), result).unwrap().is_conflict());
    }

    #[test]
    fn test_conflict_without_messages_falls_back_to_codes() {
        let result = cancelled(vec![CancellationReason::new(
            CancellationCode::TransactionConflict,
            None,
        )]);
        match classify(None, result).unwrap() {
            Outcome::Conflict(reasons) => assert!(reasons.contains("TransactionConflict")),
            other => panic!("unexpected outcome: {other}"),
        }
    }

    #[test]
    fn test_store_conflict_is_conflict() {
        let outcome = classify(None, Err(StoreError::Conflict("in progress".into()))).unwrap();
        assert_eq!(outcome, Outcome::Conflict("in progress".into()));
    }

    #[test]
    fn test_transport_is_error() {
        let err = classify(Some(0), Err(StoreError::Transport("timeout".into()))).unwrap_err();
        assert!(!err.is_fatal());
        assert!(err.message().contains("timeout"));
    }
}
