//! Indexer
//!
//! Records a created object in the index unless the object has already
//! been tombstoned. The tombstone check and the write are one atomic
//! transaction, so a deletion can never be undone by a late or replayed
//! creation notification.

use std::sync::Arc;

use super::errors::IndexResult;
use super::outcome::Outcome;
use super::plan::plan_index;
use super::retry::{execute, RetryPolicy};
use crate::config::IndexConfig;
use crate::model::CreationNotification;
use crate::observability::{Event, Logger, MetricsRegistry};
use crate::store::IndexStore;

/// Turns creation notifications into index entries
#[derive(Debug, Clone)]
pub struct Indexer {
    store: Arc<dyn IndexStore>,
    config: IndexConfig,
    retry: RetryPolicy,
    metrics: Arc<MetricsRegistry>,
}

impl Indexer {
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

    /// Share a metrics registry (e.g. with the HTTP server)
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Index one creation notification.
    ///
    /// - `Committed`: the entry was written (or overwritten by an identical one)
    /// - `SuppressedByTombstone`: the key is deleted; nothing was written
    /// - `Conflict`: the transaction was cancelled; redelivery is safe
    ///
    /// A missing table configuration fails before the store is touched.
    pub async fn index(&self, notification: &CreationNotification) -> IndexResult<Outcome> {
        self.metrics.increment_notifications_received();

        let result = self.try_index(notification).await;
        self.observe(&notification.object_key, &result);
        result
    }

    async fn try_index(&self, notification: &CreationNotification) -> IndexResult<Outcome> {
        let table = self.config.require_table()?;
        let plan = plan_index(table, notification)?;
        execute(self.store.as_ref(), &plan, &self.retry, &self.metrics).await
    }

    fn observe(&self, key: &str, result: &IndexResult<Outcome>) {
        match result {
            Ok(Outcome::Committed) => {
                self.metrics.increment_entries_indexed();
                Logger::info(Event::IndexCommitted.as_str(), &[("object_key", key)]);
            }
            Ok(Outcome::SuppressedByTombstone) => {
                self.metrics.increment_suppressed();
                Logger::info(Event::IndexSuppressed.as_str(), &[("object_key", key)]);
            }
            Ok(Outcome::Conflict(reasons)) => {
                self.metrics.increment_conflicts();
                Logger::warn(
                    Event::IndexConflict.as_str(),
                    &[("object_key", key), ("reasons", reasons.as_str())],
                );
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
                    Event::IndexFailed.as_str(),
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

    fn indexer(store: Arc<dyn IndexStore>) -> Indexer {
        Indexer::new(store, IndexConfig::with_table("files"))
    }

    #[tokio::test]
    async fn test_index_writes_entry() {
        let store = Arc::new(MemoryIndexStore::new());
        let indexer = indexer(store.clone());

        let mut notification = CreationNotification::for_key("docs/a.pdf");
        notification.size = 2048;
        notification.content_hash = "d41d8cd9".into();

        let outcome = indexer.index(&notification).await.unwrap();
        assert_eq!(outcome, Outcome::Committed);

        let key = ObjectKey::new("docs/a.pdf").unwrap();
        let entry = store.get("files", &ItemKey::index_entry(&key)).unwrap();
        assert_eq!(entry["size"], 2048);
        assert_eq!(entry["content_hash"], "d41d8cd9");
        assert_eq!(indexer.metrics().entries_indexed(), 1);
    }

    #[tokio::test]
    async fn test_missing_table_is_fatal_without_store_call() {
        let store = Arc::new(ScriptedStore::default());
        let indexer = Indexer::new(store.clone(), IndexConfig::unconfigured());

        let err = indexer
            .index(&CreationNotification::for_key("a"))
            .await
            .unwrap_err();

        assert!(err.is_fatal());
        assert_eq!(err.code(), IndexErrorCode::ConfigMissing);
        assert_eq!(store.calls(), 0);
        assert_eq!(indexer.metrics().config_errors(), 1);
    }

    #[tokio::test]
    async fn test_empty_key_never_reaches_store() {
        let store = Arc::new(ScriptedStore::default());
        let err = indexer(store.clone())
            .index(&CreationNotification::for_key(""))
            .await
            .unwrap_err();

        assert_eq!(err.code(), IndexErrorCode::EncodingFailed);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_transport_error_is_not_retried() {
        let store = Arc::new(ScriptedStore::new(vec![Err(StoreError::Transport(
            "connection reset".into(),
        ))]));
        let indexer = indexer(store.clone()).with_retry(RetryPolicy::attempts(3));

        let err = indexer
            .index(&CreationNotification::for_key("a"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), IndexErrorCode::StoreTransport);
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn test_conflict_surfaces_without_retry_policy() {
        let store = Arc::new(ScriptedStore::new(vec![Err(StoreError::Cancelled {
            reasons: vec![CancellationReason::none(), CancellationReason::conflict()],
        })]));
        let indexer = indexer(store.clone());

        let outcome = indexer.index(&CreationNotification::for_key("a")).await.unwrap();

        assert_eq!(
            outcome,
            Outcome::Conflict("Transaction is ongoing for the item".into())
        );
        assert_eq!(store.calls(), 1);
        assert_eq!(indexer.metrics().conflicts(), 1);
    }

    #[tokio::test]
    async fn test_conflict_retried_until_commit() {
        let conflict = || {
            Err(StoreError::Cancelled {
                reasons: vec![CancellationReason::conflict(), CancellationReason::none()],
            })
        };
        let store = Arc::new(ScriptedStore::new(vec![conflict(), conflict()]));
        let indexer = indexer(store.clone())
            .with_retry(RetryPolicy::attempts(3).with_delays(1, 5));

        let outcome = indexer.index(&CreationNotification::for_key("a")).await.unwrap();

        assert_eq!(outcome, Outcome::Committed);
        assert_eq!(store.calls(), 3);
        assert_eq!(indexer.metrics().retries(), 2);

        // Every attempt resubmits the same transaction
        let requests = store.requests();
        assert!(requests.windows(2).all(|w| w[0] == w[1]));
    }

    #[tokio::test]
    async fn test_suppression_is_not_retried() {
        let store = Arc::new(ScriptedStore::new(vec![Err(StoreError::Cancelled {
            reasons: vec![CancellationReason::condition_failed(), CancellationReason::none()],
        })]));
        let indexer = indexer(store.clone()).with_retry(RetryPolicy::attempts(5));

        let outcome = indexer.index(&CreationNotification::for_key("a")).await.unwrap();

        assert_eq!(outcome, Outcome::SuppressedByTombstone);
        assert_eq!(store.calls(), 1);
        assert_eq!(indexer.metrics().suppressed(), 1);
    }
}
