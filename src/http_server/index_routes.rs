//! Index HTTP Routes
//!
//! - `POST /objects/created`: flat notification or event-bus envelope
//! - `POST /objects/delete`: deletion request

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::Value;

use crate::api::{decode_deletion, decode_notification, Response};
use crate::config::IndexConfig;
use crate::index::{IndexError, Indexer, Remover, RetryPolicy};
use crate::observability::{Event, Logger, MetricsRegistry};
use crate::store::IndexStore;

// ==================
// Shared State
// ==================

/// Index components shared across handlers
#[derive(Debug)]
pub struct IndexState {
    pub indexer: Indexer,
    pub remover: Remover,
    pub metrics: Arc<MetricsRegistry>,
}

impl IndexState {
    /// Build both components over one store, one config and one registry
    pub fn new(store: Arc<dyn IndexStore>, config: IndexConfig, retry: RetryPolicy) -> Self {
        let metrics = Arc::new(MetricsRegistry::new());
        Self {
            indexer: Indexer::new(store.clone(), config.clone())
                .with_retry(retry)
                .with_metrics(metrics.clone()),
            remover: Remover::new(store, config)
                .with_retry(retry)
                .with_metrics(metrics.clone()),
            metrics,
        }
    }
}

// ==================
// Router
// ==================

pub fn index_routes(state: Arc<IndexState>) -> Router {
    Router::new()
        .route("/created", post(created_handler))
        .route("/delete", post(delete_handler))
        .with_state(state)
}

// ==================
// Handlers
// ==================

async fn created_handler(
    State(state): State<Arc<IndexState>>,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let response = match decode_notification(&body) {
        Ok(notification) => Response::from_result(state.indexer.index(&notification).await),
        Err(err) => rejected(&state, "/objects/created", &err),
    };
    render(response)
}

async fn delete_handler(
    State(state): State<Arc<IndexState>>,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let response = match decode_deletion(&body) {
        Ok(request) => Response::from_result(state.remover.remove(&request).await),
        Err(err) => rejected(&state, "/objects/delete", &err),
    };
    render(response)
}

fn rejected(state: &IndexState, route: &str, err: &IndexError) -> Response {
    state.metrics.increment_internal_errors();
    Logger::error(
        Event::RequestRejected.as_str(),
        &[
            ("error_code", err.code().code()),
            ("message", err.message()),
            ("route", route),
        ],
    );
    Response::from_error(err)
}

fn render(response: Response) -> (StatusCode, Json<Value>) {
    let status =
        StatusCode::from_u16(response.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response.to_value()))
}
