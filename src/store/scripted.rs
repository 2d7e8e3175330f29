//! Store double replaying canned responses

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::errors::StoreResult;
use super::transaction::TransactWriteRequest;
use super::IndexStore;

/// Returns queued responses in order, then `Ok(())` once drained
#[derive(Debug, Default)]
pub(crate) struct ScriptedStore {
    responses: Mutex<VecDeque<StoreResult<()>>>,
    requests: Mutex<Vec<TransactWriteRequest>>,
    calls: AtomicUsize,
}

impl ScriptedStore {
    pub(crate) fn new(responses: Vec<StoreResult<()>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<TransactWriteRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl IndexStore for ScriptedStore {
    async fn transact_write(&self, request: &TransactWriteRequest) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.responses.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}
