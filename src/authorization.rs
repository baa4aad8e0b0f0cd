//! Access gate for mutation routes.
//!
//! Rules, checked in order:
//! 1. Caller identity equals the path subject → ALLOW
//! 2. Delete by the admin identity (`0`) → ALLOW
//! 3. Default → DENY
//!
//! Runs before any persistence call, so a denied request mutates nothing.

use crate::credentials::Identity;

/// The kind of mutation being authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessAction {
    Update,
    Delete,
}

impl AccessAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Identity {identity} may not {} records of {subject}", .action.as_str())]
pub struct AccessDenied {
    pub identity: i64,
    pub subject: i64,
    pub action: AccessAction,
}

/// Check whether `identity` may perform `action` on records owned by `subject`.
pub fn authorize(
    identity: Identity,
    subject: i64,
    action: AccessAction,
) -> Result<(), AccessDenied> {
    if identity.0 == subject {
        return Ok(());
    }
    if action == AccessAction::Delete && identity.is_admin() {
        return Ok(());
    }

    tracing::warn!(
        identity = identity.0,
        subject,
        action = action.as_str(),
        "Access denied"
    );
    Err(AccessDenied {
        identity: identity.0,
        subject,
        action,
    })
}
