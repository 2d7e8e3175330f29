//! Index Store boundary
//!
//! The consistency core depends only on the store's atomic multi-item
//! transaction: every sub-operation commits or none does, and a failed
//! precondition anywhere aborts the whole transaction.
//!
//! Implementations:
//! - `MemoryIndexStore`: in-process, full transactional contract (tests, dev)
//! - `DynamoDbIndexStore`: Amazon DynamoDB `TransactWriteItems` (feature `dynamodb`)

use std::fmt;

use async_trait::async_trait;

#[cfg(feature = "dynamodb")]
pub mod dynamodb;
mod errors;
mod memory;
#[cfg(test)]
pub(crate) mod scripted;
mod transaction;

pub use errors::{CancellationCode, CancellationReason, StoreError, StoreResult};
pub use memory::MemoryIndexStore;
pub use transaction::{item_key, Condition, TransactWriteRequest, WriteOp, MAX_TRANSACT_ITEMS};

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbIndexStore;

/// Transactional key-value store holding index entries and tombstones
#[async_trait]
pub trait IndexStore: Send + Sync + fmt::Debug {
    /// Execute all operations of `request` atomically.
    ///
    /// Returns `StoreError::Cancelled` with one reason per operation when any
    /// condition fails or an operation collides with another in-flight
    /// transaction.
    async fn transact_write(&self, request: &TransactWriteRequest) -> StoreResult<()>;
}
