//! Transaction shapes understood by every index store

use std::collections::HashSet;

use serde_json::Value;

use super::errors::{StoreError, StoreResult};
use crate::model::schema::{ATTR_PK, ATTR_SK};
use crate::model::{Item, ItemKey};

/// Upper bound on operations in one transaction
pub const MAX_TRANSACT_ITEMS: usize = 100;

/// Existence precondition on a single item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    ItemNotExists,
    ItemExists,
}

impl Condition {
    /// Evaluate against the item's current presence
    pub fn holds(&self, present: bool) -> bool {
        match self {
            Condition::ItemNotExists => !present,
            Condition::ItemExists => present,
        }
    }

    /// Condition expression over the sort-key placeholder `#sk`
    pub fn expression(&self) -> &'static str {
        match self {
            Condition::ItemNotExists => "attribute_not_exists(#sk)",
            Condition::ItemExists => "attribute_exists(#sk)",
        }
    }
}

/// One sub-operation of an atomic transaction
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Precondition only, never mutates
    ConditionCheck { key: ItemKey, condition: Condition },
    /// Insert or overwrite the whole item
    Put {
        item: Item,
        condition: Option<Condition>,
    },
    /// Remove the item; removing an absent item succeeds
    Delete {
        key: ItemKey,
        condition: Option<Condition>,
    },
}

impl WriteOp {
    pub fn kind(&self) -> &'static str {
        match self {
            WriteOp::ConditionCheck { .. } => "ConditionCheck",
            WriteOp::Put { .. } => "Put",
            WriteOp::Delete { .. } => "Delete",
        }
    }

    /// Key of the item this operation touches
    pub fn key(&self) -> StoreResult<ItemKey> {
        match self {
            WriteOp::ConditionCheck { key, .. } | WriteOp::Delete { key, .. } => Ok(key.clone()),
            WriteOp::Put { item, .. } => item_key(item).ok_or_else(|| {
                StoreError::InvalidRequest(format!(
                    "Put item is missing string attributes {} and {}",
                    ATTR_PK, ATTR_SK
                ))
            }),
        }
    }

    pub fn condition(&self) -> Option<Condition> {
        match self {
            WriteOp::ConditionCheck { condition, .. } => Some(*condition),
            WriteOp::Put { condition, .. } | WriteOp::Delete { condition, .. } => *condition,
        }
    }
}

/// Extract the composite key from an item's `PK` / `SK` attributes
pub fn item_key(item: &Item) -> Option<ItemKey> {
    match (item.get(ATTR_PK), item.get(ATTR_SK)) {
        (Some(Value::String(pk)), Some(Value::String(sk))) => Some(ItemKey::new(pk, sk)),
        _ => None,
    }
}

/// An all-or-nothing batch of operations against one table
#[derive(Debug, Clone, PartialEq)]
pub struct TransactWriteRequest {
    pub table_name: String,
    pub items: Vec<WriteOp>,
}

impl TransactWriteRequest {
    pub fn new(table_name: impl Into<String>, items: Vec<WriteOp>) -> Self {
        Self {
            table_name: table_name.into(),
            items,
        }
    }

    /// Check the request shape and return the touched keys in operation order.
    ///
    /// Rejects empty and oversized transactions and any transaction that
    /// touches the same item twice.
    pub fn validate(&self) -> StoreResult<Vec<ItemKey>> {
        if self.table_name.is_empty() {
            return Err(StoreError::InvalidRequest("Table name is empty".into()));
        }
        if self.items.is_empty() {
            return Err(StoreError::InvalidRequest("Transaction has no operations".into()));
        }
        if self.items.len() > MAX_TRANSACT_ITEMS {
            return Err(StoreError::InvalidRequest(format!(
                "Transaction has {} operations (max: {})",
                self.items.len(),
                MAX_TRANSACT_ITEMS
            )));
        }

        let mut seen = HashSet::with_capacity(self.items.len());
        let mut keys = Vec::with_capacity(self.items.len());
        for op in &self.items {
            let key = op.key()?;
            if !seen.insert(key.clone()) {
                return Err(StoreError::InvalidRequest(format!(
                    "Transaction touches item {} more than once",
                    key
                )));
            }
            keys.push(key);
        }
        Ok(keys)
    }
}
