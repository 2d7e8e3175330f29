//! Transaction planning
//!
//! Pure mapping from an incoming event to the transaction shape to issue.
//! The store's current state is never read here: it is observed only
//! through the preconditions evaluated at commit time.

use serde::Serialize;
use serde_json::Value;

use super::errors::{IndexError, IndexResult};
use super::outcome::{classify, Outcome};
use crate::model::{
    CreationNotification, DeletionRequest, IndexEntry, Item, ItemKey, ObjectKey, Tombstone,
};
use crate::store::{Condition, StoreResult, TransactWriteRequest, WriteOp};

/// A transaction to issue plus what is needed to interpret its result
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionPlan {
    key: ObjectKey,
    request: TransactWriteRequest,
    tombstone_guard: Option<usize>,
}

impl TransactionPlan {
    pub fn object_key(&self) -> &ObjectKey {
        &self.key
    }

    pub fn request(&self) -> &TransactWriteRequest {
        &self.request
    }

    /// Position of the tombstone-absence precondition, if any
    pub fn tombstone_guard(&self) -> Option<usize> {
        self.tombstone_guard
    }

    /// Interpret the store's response to this plan's transaction
    pub fn classify(&self, result: StoreResult<()>) -> IndexResult<Outcome> {
        classify(self.tombstone_guard, result)
    }
}

/// Index a created object unless it has been tombstoned:
///
/// ```text
/// [0] ConditionCheck  Tombstone(k) must not exist
/// [1] Put             IndexEntry(k)
/// ```
pub fn plan_index(table: &str, notification: &CreationNotification) -> IndexResult<TransactionPlan> {
    let key = object_key(&notification.object_key)?;
    let entry = marshal(&IndexEntry::from_notification(&key, notification))?;

    let request = TransactWriteRequest::new(
        table,
        vec![
            WriteOp::ConditionCheck {
                key: ItemKey::tombstone(&key),
                condition: Condition::ItemNotExists,
            },
            WriteOp::Put {
                item: entry,
                condition: None,
            },
        ],
    );

    Ok(TransactionPlan {
        key,
        request,
        tombstone_guard: Some(0),
    })
}

/// Replace any index entry with a tombstone:
///
/// ```text
/// [0] Delete  IndexEntry(k)   (absent is fine)
/// [1] Put     Tombstone(k)
/// ```
pub fn plan_remove(table: &str, request: &DeletionRequest) -> IndexResult<TransactionPlan> {
    let key = object_key(&request.object_key)?;
    let tombstone = marshal(&Tombstone::for_key(&key))?;

    let request = TransactWriteRequest::new(
        table,
        vec![
            WriteOp::Delete {
                key: ItemKey::index_entry(&key),
                condition: None,
            },
            WriteOp::Put {
                item: tombstone,
                condition: None,
            },
        ],
    );

    Ok(TransactionPlan {
        key,
        request,
        tombstone_guard: None,
    })
}

fn object_key(raw: &str) -> IndexResult<ObjectKey> {
    ObjectKey::new(raw).ok_or_else(|| IndexError::encoding("Object key must not be empty"))
}

/// Marshal a record into the store's item representation
fn marshal<T: Serialize>(record: &T) -> IndexResult<Item> {
    match serde_json::to_value(record) {
        Ok(Value::Object(item)) => Ok(item),
        Ok(other) => Err(IndexError::encoding(format!(
            "Record marshaled to {} instead of an item",
            json_kind(&other)
        ))),
        Err(e) => Err(IndexError::encoding(format!("Failed to marshal record: {}", e))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
