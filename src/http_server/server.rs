//! # HTTP Server
//!
//! Combines the index and observability routers into one Axum server.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::config::HttpServerConfig;
use super::index_routes::{index_routes, IndexState};
use super::observability_routes::{health_routes, observability_routes};
use crate::observability::{log_event, log_event_with_fields, Event};

/// HTTP front end for the Indexer and Remover
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, state: Arc<IndexState>) -> Self {
        let router = Self::build_router(&config, state);
        Self { config, router }
    }

    fn build_router(config: &HttpServerConfig, state: Arc<IndexState>) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        let metrics = state.metrics.clone();

        Router::new()
            .merge(health_routes())
            .merge(observability_routes(metrics))
            .nest("/objects", index_routes(state))
            .layer(cors)
    }

    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until Ctrl-C
    pub async fn start(self) -> Result<(), io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid socket address {}: {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        let bound = addr.to_string();
        log_event_with_fields(Event::ServerListening, &[("addr", bound.as_str())]);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await?;

        log_event(Event::ShutdownComplete);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexConfig;
    use crate::index::RetryPolicy;
    use crate::model::{ItemKey, ObjectKey};
    use crate::store::MemoryIndexStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn server(store: Arc<MemoryIndexStore>, config: IndexConfig) -> HttpServer {
        let state = Arc::new(IndexState::new(store, config, RetryPolicy::default()));
        HttpServer::new(HttpServerConfig::default(), state)
    }

    async fn post(router: Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_server_with_custom_port() {
        let state = Arc::new(IndexState::new(
            Arc::new(MemoryIndexStore::new()),
            IndexConfig::with_table("files"),
            RetryPolicy::default(),
        ));
        let server = HttpServer::new(HttpServerConfig::with_port(8080), state);
        assert_eq!(server.socket_addr(), "0.0.0.0:8080");
    }

    #[tokio::test]
    async fn test_health() {
        let router = server(Arc::new(MemoryIndexStore::new()), IndexConfig::unconfigured()).router();
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_created_then_delete() {
        let store = Arc::new(MemoryIndexStore::new());
        let router = server(store.clone(), IndexConfig::with_table("files")).router();
        let key = ObjectKey::new("a/b.txt").unwrap();

        let (status, body) = post(
            router.clone(),
            "/objects/created",
            r#"{ "objectKey": "a/b.txt", "size": 3 }"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(store.contains("files", &ItemKey::index_entry(&key)));

        let (status, _) = post(router.clone(), "/objects/delete", r#"{ "objectKey": "a/b.txt" }"#).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!store.contains("files", &ItemKey::index_entry(&key)));
        assert!(store.contains("files", &ItemKey::tombstone(&key)));

        // Late redelivery is acknowledged without re-indexing
        let (status, _) = post(router, "/objects/created", r#"{ "objectKey": "a/b.txt" }"#).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!store.contains("files", &ItemKey::index_entry(&key)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_500() {
        let router = server(Arc::new(MemoryIndexStore::new()), IndexConfig::with_table("files")).router();

        let (status, body) = post(router, "/objects/created", "not json").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "OBJIDX_ENCODING_FAILED");
        assert_eq!(body["fatal"], false);
    }

    #[tokio::test]
    async fn test_missing_table_is_fatal_500() {
        let store = Arc::new(MemoryIndexStore::new());
        let router = server(store.clone(), IndexConfig::unconfigured()).router();

        let (status, body) = post(router, "/objects/delete", r#"{ "objectKey": "a" }"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["fatal"], true);
        assert_eq!(body["message"], "FILES_TABLE_NAME is not set");
        assert_eq!(store.transaction_count(), 0);
    }

    #[tokio::test]
    async fn test_metrics_reflect_requests() {
        let router = server(Arc::new(MemoryIndexStore::new()), IndexConfig::with_table("files")).router();

        post(router.clone(), "/objects/delete", r#"{ "objectKey": "k" }"#).await;
        post(router.clone(), "/objects/created", r#"{ "objectKey": "k" }"#).await;

        let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let metrics: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(metrics["tombstones_written"], 1);
        assert_eq!(metrics["suppressed"], 1);
        assert_eq!(metrics["entries_indexed"], 0);
    }
}
