//! # objindex HTTP Server Module
//!
//! Request adapter in front of the Indexer and Remover.
//!
//! # Endpoints
//!
//! - `POST /objects/created` - Index a created object
//! - `POST /objects/delete` - Remove an object and tombstone its key
//! - `GET /health` - Health check
//! - `GET /metrics` - Counter snapshot

pub mod config;
pub mod index_routes;
pub mod observability_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use index_routes::IndexState;
pub use server::HttpServer;
