//! # In-Memory Index Store
//!
//! Honors the full transactional contract in-process:
//! - all-or-nothing commit under a single table lock
//! - positional cancellation reasons
//! - item-level optimistic concurrency: a transaction that touches an item
//!   claimed by another in-flight transaction is cancelled with
//!   `TransactionConflict`

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use super::errors::{CancellationReason, StoreError, StoreResult};
use super::transaction::{TransactWriteRequest, WriteOp};
use super::IndexStore;
use crate::model::{Item, ItemKey};

type Table = BTreeMap<ItemKey, Item>;
type Claim = (String, ItemKey);

/// In-process index store
#[derive(Debug, Default)]
pub struct MemoryIndexStore {
    tables: Mutex<HashMap<String, Table>>,
    in_flight: Mutex<HashSet<Claim>>,
    /// Time a transaction holds its claims before committing
    commit_delay: Option<Duration>,
    transactions: AtomicU64,
}

impl MemoryIndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold item claims for `delay` before each commit, widening the window
    /// in which concurrent transactions on the same items conflict.
    pub fn with_commit_delay(delay: Duration) -> Self {
        Self {
            commit_delay: Some(delay),
            ..Self::default()
        }
    }

    /// Number of transactions received, including rejected ones
    pub fn transaction_count(&self) -> u64 {
        self.transactions.load(Ordering::Relaxed)
    }

    /// Current content of one item
    pub fn get(&self, table: &str, key: &ItemKey) -> Option<Item> {
        self.tables_read().get(table)?.get(key).cloned()
    }

    pub fn contains(&self, table: &str, key: &ItemKey) -> bool {
        self.get(table, key).is_some()
    }

    /// All items of a table in key order
    pub fn items(&self, table: &str) -> Vec<(ItemKey, Item)> {
        self.tables_read()
            .get(table)
            .map(|t| t.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    pub fn len(&self, table: &str) -> usize {
        self.tables_read().get(table).map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self, table: &str) -> bool {
        self.len(table) == 0
    }

    fn tables_read(&self) -> MutexGuard<'_, HashMap<String, Table>> {
        // Inspection only; a poisoned lock still holds consistent committed state
        self.tables.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Claim every touched item or cancel with per-item conflict reasons
    fn claim(&self, table: &str, keys: &[ItemKey]) -> StoreResult<ClaimGuard<'_>> {
        let mut in_flight = self
            .in_flight
            .lock()
            .map_err(|_| StoreError::Transport("Lock poisoned".into()))?;

        let claims: Vec<Claim> = keys
            .iter()
            .map(|key| (table.to_string(), key.clone()))
            .collect();

        if claims.iter().any(|c| in_flight.contains(c)) {
            let reasons = claims
                .iter()
                .map(|c| {
                    if in_flight.contains(c) {
                        CancellationReason::conflict()
                    } else {
                        CancellationReason::none()
                    }
                })
                .collect();
            return Err(StoreError::Cancelled { reasons });
        }

        in_flight.extend(claims.iter().cloned());
        Ok(ClaimGuard {
            in_flight: &self.in_flight,
            claims,
        })
    }

    fn commit(&self, request: &TransactWriteRequest, keys: &[ItemKey]) -> StoreResult<()> {
        let mut tables = self
            .tables
            .lock()
            .map_err(|_| StoreError::Transport("Lock poisoned".into()))?;
        let table = tables.entry(request.table_name.clone()).or_default();

        let reasons: Vec<CancellationReason> = request
            .items
            .iter()
            .zip(keys)
            .map(|(op, key)| match op.condition() {
                Some(condition) if !condition.holds(table.contains_key(key)) => {
                    CancellationReason::condition_failed()
                }
                _ => CancellationReason::none(),
            })
            .collect();

        if reasons.iter().any(|r| r.code.is_failure()) {
            return Err(StoreError::Cancelled { reasons });
        }

        for (op, key) in request.items.iter().zip(keys) {
            match op {
                WriteOp::ConditionCheck { .. } => {}
                WriteOp::Put { item, .. } => {
                    table.insert(key.clone(), item.clone());
                }
                WriteOp::Delete { .. } => {
                    table.remove(key);
                }
            }
        }

        Ok(())
    }
}

/// Releases item claims when the transaction finishes or is abandoned
struct ClaimGuard<'a> {
    in_flight: &'a Mutex<HashSet<Claim>>,
    claims: Vec<Claim>,
}

impl Drop for ClaimGuard<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
        for claim in &self.claims {
            in_flight.remove(claim);
        }
    }
}

#[async_trait]
impl IndexStore for MemoryIndexStore {
    async fn transact_write(&self, request: &TransactWriteRequest) -> StoreResult<()> {
        self.transactions.fetch_add(1, Ordering::Relaxed);

        let keys = request.validate()?;
        let _claims = self.claim(&request.table_name, &keys)?;

        if let Some(delay) = self.commit_delay {
            tokio::time::sleep(delay).await;
        }

        self.commit(request, &keys)
    }
}
