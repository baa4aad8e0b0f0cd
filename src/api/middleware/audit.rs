//! Audit logging middleware.
//!
//! Logs every API request with caller identity, method, path, and
//! response status. Runs outside auth, so rejected requests are recorded
//! too; the identity is read from the response extensions where auth
//! leaves it. A full buffer is flushed on the blocking pool.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::{ApiContext, CallerContext};

/// Log API access for audit trail.
/// Accesses `ApiContext` from request extensions.
pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let ctx = req.extensions().get::<ApiContext>().cloned();

    let response = next.run(req).await;

    let source = response
        .extensions()
        .get::<CallerContext>()
        .map(|c| c.identity.to_string())
        .unwrap_or_else(|| "anonymous".to_string());
    let status = response.status().as_u16();
    tracing::debug!(%source, %method, %path, status, "Request handled");

    if let Some(ctx) = ctx {
        let due = ctx
            .core
            .log_access(&source, &format!("{method} {path}"), &format!("status:{status}"));
        if due {
            let core = ctx.core.clone();
            tokio::task::spawn_blocking(move || {
                if let Err(e) = core.flush_and_prune_audit() {
                    tracing::warn!("Auto-flush audit failed: {e}");
                }
            });
        }
    }

    response
}
