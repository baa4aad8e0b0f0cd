//! Shared types for the HTTP API layer.

use std::fmt::Display;
use std::sync::Arc;

use axum::http::header::{HeaderName, LOCATION};
use axum::http::StatusCode;
use axum::Json;

use crate::core_state::CoreState;
use crate::credentials::Identity;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

// ═══════════════════════════════════════════════════════════
// Caller context: injected by auth middleware
// ═══════════════════════════════════════════════════════════

/// Authenticated caller, injected into request extensions by the auth
/// middleware after the bearer token resolves.
#[derive(Debug, Clone, Copy)]
pub struct CallerContext {
    pub identity: Identity,
}

// ═══════════════════════════════════════════════════════════
// Response shapes
// ═══════════════════════════════════════════════════════════

/// `201 Created` with a `Location` header and the stored record.
pub type Created<T> = (StatusCode, [(HeaderName, String); 1], Json<T>);

/// `204 No Content` with an `Entity` header naming the deleted id.
pub type Deleted = (StatusCode, [(HeaderName, String); 1]);

pub fn created<T>(collection: &str, id: impl Display, body: T) -> Created<T> {
    (
        StatusCode::CREATED,
        [(LOCATION, location(collection, id))],
        Json(body),
    )
}

pub fn deleted(id: impl Display) -> Deleted {
    (
        StatusCode::NO_CONTENT,
        [(HeaderName::from_static("entity"), id.to_string())],
    )
}

/// Value for a `Location` header: the collection path plus the new id.
pub fn location(collection: &str, id: impl Display) -> String {
    format!("{}/{id}", collection.trim_end_matches('/'))
}
