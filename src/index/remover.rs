//! Remover
//!
//! Deletes an object's index entry and lays down its tombstone in one
//! atomic transaction. Removing an unindexed or already-removed key
//! succeeds and leaves the same end state.

use std::sync::Arc;

use super::errors::IndexResult;
use super::outcome::Outcome;
use super::plan::plan_remove;
use super::retry::{execute, RetryPolicy};
use crate::config::IndexConfig;
use crate::model::DeletionRequest;
use crate::observability::{Event, Logger, MetricsRegistry};
use crate::store::IndexStore;

/// Turns deletion requests into tombstones
#[derive(Debug, Clone)]
pub struct Remover {
    store: Arc<dyn IndexStore>,
    config: IndexConfig,
    retry: RetryPolicy,
    metrics: Arc<MetricsRegistry>,
}

impl Remover {
    pub fn new(store: Arc<dyn IndexStore>, config: IndexConfig) -> Self {
        Self {
            store,
            config,
            retry: RetryPolicy::default(),
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Remove one object from the index. Never yields `SuppressedByTombstone`.
    pub async fn remove(&self, request: &DeletionRequest) -> IndexResult<Outcome> {
        self.metrics.increment_removals_received();

        let result = self.try_remove(request).await;
        self.observe(&request.object_key, &result);
        result
    }

    async fn try_remove(&self, request: &DeletionRequest) -> IndexResult<Outcome> {
        let table = self.config.require_table()?;
        let plan = plan_remove(table, request)?;
        execute(self.store.as_ref(), &plan, &self.retry, &self.metrics).await
    }

    fn observe(&self, key: &str, result: &IndexResult<Outcome>) {
        match result {
            Ok(Outcome::Conflict(reasons)) => {
                self.metrics.increment_conflicts();
                Logger::warn(
                    Event::RemoveConflict.as_str(),
                    &[("object_key", key), ("reasons", reasons.as_str())],
                );
            }
            Ok(Outcome::Committed) => {
                self.metrics.increment_tombstones_written();
                Logger::info(Event::RemoveCommitted.as_str(), &[("object_key", key)]);
            }
            Ok(Outcome::SuppressedByTombstone) => {
                self.metrics.increment_suppressed();
                Logger::info(Event::RemoveSuppressed.as_str(), &[("object_key", key)]);
            }
            Err(err) if err.is_fatal() => {
                self.metrics.increment_config_errors();
                Logger::fatal(
                    Event::ConfigMissing.as_str(),
                    &[("error_code", err.code().code()), ("message", err.message())],
                );
            }
            Err(err) => {
                self.metrics.increment_internal_errors();
                Logger::error(
                    Event::RemoveFailed.as_str(),
                    &[
                        ("error_code", err.code().code()),
                        ("message", err.message()),
                        ("object_key", key),
                    ],
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::errors::IndexErrorCode;
    use crate::model::{ItemKey, ObjectKey};
    use crate::store::scripted::ScriptedStore;
    use crate::store::{CancellationReason, MemoryIndexStore, StoreError};

    fn remover(store: Arc<dyn IndexStore>) -> Remover {
        Remover::new(store, IndexConfig::with_table("files"))
    }

    #[tokio::test]
    async fn test_remove_unindexed_key_writes_tombstone() {
        let store = Arc::new(MemoryIndexStore::new());
        let remover = remover(store.clone());

        let outcome = remover.remove(&DeletionRequest::new("never-seen")).await.unwrap();
        assert_eq!(outcome, Outcome::Committed);

        let key = ObjectKey::new("never-seen").unwrap();
        assert!(store.contains("files", &ItemKey::tombstone(&key)));
        assert!(!store.contains("files", &ItemKey::index_entry(&key)));
        assert_eq!(remover.metrics().tombstones_written(), 1);
    }

    #[tokio::test]
    async fn test_remove_twice_is_stable() {
        let store = Arc::new(MemoryIndexStore::new());
        let remover = remover(store.clone());
        let request = DeletionRequest::new("x");

        remover.remove(&request).await.unwrap();
        let first = store.items("files");
        assert_eq!(remover.remove(&request).await.unwrap(), Outcome::Committed);

        assert_eq!(store.items("files"), first);
    }

    #[tokio::test]
    async fn test_missing_table_is_fatal_without_store_call() {
        let store = Arc::new(ScriptedStore::default());
        let remover = Remover::new(store.clone(), IndexConfig::unconfigured());

        let err = remover.remove(&DeletionRequest::new("a")).await.unwrap_err();

        assert_eq!(err.code(), IndexErrorCode::ConfigMissing);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_remove_is_conflict() {
        let store = Arc::new(ScriptedStore::new(vec![Err(StoreError::Cancelled {
            reasons: vec![CancellationReason::conflict(), CancellationReason::none()],
        })]));
        let remover = remover(store.clone());

        let outcome = remover.remove(&DeletionRequest::new("a")).await.unwrap();
        assert!(outcome.is_conflict());
        assert_eq!(remover.metrics().conflicts(), 1);
    }

    #[test]
    fn test_only_committed_removal_counts_as_tombstone() {
        let remover = remover(Arc::new(ScriptedStore::default()));

        remover.observe("a", &Ok(Outcome::SuppressedByTombstone));
        assert_eq!(remover.metrics().tombstones_written(), 0);
        assert_eq!(remover.metrics().suppressed(), 1);

        remover.observe("a", &Ok(Outcome::Committed));
        assert_eq!(remover.metrics().tombstones_written(), 1);
    }

    #[tokio::test]
    async fn test_transport_error() {
        let store = Arc::new(ScriptedStore::new(vec![Err(StoreError::Transport(
            "throttled".into(),
        ))]));

        let err = remover(store).remove(&DeletionRequest::new("a")).await.unwrap_err();
        assert_eq!(err.code(), IndexErrorCode::StoreTransport);
        assert!(!err.is_fatal());
    }
}
