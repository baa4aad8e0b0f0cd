//! Slot status synchronization between schedules, appointments and examinations.
//!
//! `ledger` owns the slot lifecycle. `appointments` and `examinations`
//! mutate their own rows and then push their status into the linked slot.
//! Every multi-step operation takes a `&Transaction` supplied by the
//! caller, who decides when to commit (see `db::with_write_transaction`);
//! an error from any step leaves the transaction uncommitted.

pub mod appointments;
pub mod examinations;
pub mod ledger;

use crate::db::DatabaseError;
use crate::models::ValidationError;

/// Errors from the scheduling workflows.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl WorkflowError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Database(DatabaseError::NotFound { .. }))
    }
}
