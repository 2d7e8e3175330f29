//! objindex - tombstone-guarded object index
//!
//! Keeps a key-value index of stored objects consistent with their
//! lifecycle. Deletions lay down permanent tombstones that late or replayed
//! creation notifications can never overturn.

pub mod api;
pub mod cli;
pub mod config;
pub mod http_server;
pub mod index;
pub mod model;
pub mod observability;
pub mod store;
