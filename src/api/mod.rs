//! HTTP API.
//!
//! Exposes the directory and scheduling workflows as JSON endpoints.
//! Mutation routes are protected by a middleware stack:
//! Auth → Audit → Handler.
//!
//! The router is composable: `api_router()` returns a `Router` that can be
//! mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_api_server, ApiServer, ApiSession};
pub use types::ApiContext;
