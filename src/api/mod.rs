//! Request and response contract for objindex entry points
//!
//! Both the HTTP server and the CLI decode bodies through `request` and
//! render `IndexResult<Outcome>` through `Response`, so the two surfaces
//! agree on accepted shapes, status and payload.

mod request;
mod response;

pub use request::{decode_deletion, decode_notification};
pub use response::Response;
