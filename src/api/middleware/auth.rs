//! Bearer token authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, resolves it through the
//! credential store, and injects `CallerContext` into request extensions
//! for downstream handlers and into response extensions for the audit
//! layer wrapped around it.

use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CallerContext};
use crate::credentials::CredentialStore;

/// Require a bearer token that resolves to an identity.
///
/// Accesses `ApiContext` from request extensions (injected by Extension layer).
pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_auth_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_auth_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let token = bearer_token(&req).ok_or(ApiError::Unauthorized)?;

    let identity = match ctx.core.credentials.resolve(token) {
        Some(identity) => identity,
        None => {
            tracing::warn!(path = %req.uri().path(), "Rejected unknown or expired token");
            return Err(ApiError::Unauthorized);
        }
    };

    req.extensions_mut().insert(CallerContext { identity });

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert("Cache-Control", HeaderValue::from_static("no-store"));
    // Outer layers (audit) only see the response.
    response.extensions_mut().insert(CallerContext { identity });

    Ok(response)
}

fn bearer_token<B>(req: &Request<B>) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
