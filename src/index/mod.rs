//! Index consistency core
//!
//! Keeps a secondary index of stored objects consistent with the objects'
//! lifecycle under duplicated, reordered and concurrent events.
//!
//! # Design Principles
//!
//! - Tombstones are a one-way latch: once written, no creation
//!   notification can re-index the key
//! - Every mutation is a single atomic multi-item transaction whose
//!   preconditions encode the latch
//! - Planning is pure; only `Indexer` / `Remover` talk to the store
//!
//! # Invariants
//!
//! - Never both an index entry and a tombstone for one key after a commit
//! - Identical notifications produce identical entries
//! - A missing table configuration fails before any store interaction

mod errors;
mod indexer;
mod outcome;
mod plan;
mod remover;
mod retry;

pub use errors::{IndexError, IndexErrorCode, IndexResult, Severity};
pub use indexer::Indexer;
pub use outcome::Outcome;
pub use plan::{plan_index, plan_remove, TransactionPlan};
pub use remover::Remover;
pub use retry::{Backoff, RetryPolicy};
