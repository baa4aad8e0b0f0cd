//! Schedule ledger: slot CRUD and guarded status transitions.

use rusqlite::{Connection, Transaction};

use super::WorkflowError;
use crate::config::LIST_LIMIT;
use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::{Schedule, ScheduleInput, SlotStatus};

/// Validate and persist a new slot.
pub fn create_schedule(conn: &Connection, input: &ScheduleInput) -> Result<Schedule, WorkflowError> {
    input.validate()?;
    let schedule = repository::insert_schedule(conn, input)?;
    tracing::info!(code = %schedule.schedule_code, "Schedule created");
    Ok(schedule)
}

pub fn find_schedule(conn: &Connection, code: &str) -> Result<Schedule, WorkflowError> {
    repository::get_schedule(conn, code)?
        .ok_or_else(|| DatabaseError::not_found("Schedule", code).into())
}

pub fn list_schedules(conn: &Connection) -> Result<Vec<Schedule>, WorkflowError> {
    Ok(repository::list_schedules(conn, LIST_LIMIT)?)
}

/// Full replace of the slot keyed by `code`. Not subject to the transition
/// guard: this is the administrative edit path.
///
/// Renaming carries every appointment and examination on the slot over to
/// the new code, and is refused while an appointment holds the slot booked.
pub fn update_schedule(
    tx: &Transaction<'_>,
    code: &str,
    input: &ScheduleInput,
) -> Result<Schedule, WorkflowError> {
    input.validate()?;
    find_schedule(tx, code)?;

    let renamed = input.schedule_code != code;
    if renamed {
        if let Some(holder) = repository::find_booked_holder(tx, code)? {
            return Err(DatabaseError::Conflict(format!(
                "Schedule {code} is booked by appointment {holder} and cannot be renamed"
            ))
            .into());
        }
    }

    if repository::update_schedule(tx, code, input)? == 0 {
        return Err(DatabaseError::not_found("Schedule", code).into());
    }
    if renamed {
        let moved = repository::rename_schedule_references(tx, code, &input.schedule_code)?;
        tracing::info!(from = code, to = %input.schedule_code, moved, "Schedule renamed");
    }
    find_schedule(tx, &input.schedule_code)
}

/// Delete a slot. Refused while a booked appointment still holds it.
pub fn delete_schedule(tx: &Transaction<'_>, code: &str) -> Result<(), WorkflowError> {
    if let Some(holder) = repository::find_booked_holder(tx, code)? {
        return Err(DatabaseError::Conflict(format!(
            "Schedule {code} is booked by appointment {holder}"
        ))
        .into());
    }
    if repository::delete_schedule(tx, code)? == 0 {
        return Err(DatabaseError::not_found("Schedule", code).into());
    }
    tracing::info!(code, "Schedule deleted");
    Ok(())
}

/// Move the slot `code` to `target` on behalf of appointment `claimant`,
/// returning the updated slot.
///
/// Fails with `NotFound` when the slot does not exist. Fails with
/// `Conflict` when another appointment holds the slot booked, or when its
/// current status cannot move to `target`. The write itself is conditional
/// on the prior status, so a concurrent writer that changed the slot
/// between the read and the write also yields `Conflict`.
pub fn transition_slot(
    tx: &Transaction<'_>,
    code: &str,
    target: SlotStatus,
    claimant: i64,
) -> Result<Schedule, WorkflowError> {
    let current = find_schedule(tx, code)?;

    if let Some(holder) = repository::find_booked_holder(tx, code)? {
        if holder != claimant {
            tracing::warn!(code, holder, claimant, to = %target, "Slot held by another appointment");
            return Err(DatabaseError::Conflict(format!(
                "Schedule {code} is booked by appointment {holder}"
            ))
            .into());
        }
    }

    if !target.can_transition_from(current.status) {
        tracing::warn!(code, from = %current.status, to = %target, "Slot transition refused");
        return Err(DatabaseError::Conflict(format!(
            "Schedule {code} cannot move from {} to {target}",
            current.status
        ))
        .into());
    }

    if repository::transition_schedule_status(tx, code, target)? == 0 {
        return Err(DatabaseError::Conflict(format!(
            "Schedule {code} changed while moving to {target}"
        ))
        .into());
    }

    tracing::debug!(code, from = %current.status, to = %target, "Slot transitioned");
    find_schedule(tx, code)
}

/// Return a booked slot to `available` once no appointment holds it.
/// Slots in any other state, slots still held, and missing slots are left
/// alone. Returns whether the slot was released.
pub fn release_slot(tx: &Transaction<'_>, code: &str) -> Result<bool, WorkflowError> {
    let Some(current) = repository::get_schedule(tx, code)? else {
        return Ok(false);
    };
    if current.status != SlotStatus::Booked || repository::find_booked_holder(tx, code)?.is_some() {
        return Ok(false);
    }
    let released = repository::transition_schedule_status(tx, code, SlotStatus::Available)? > 0;
    if released {
        tracing::debug!(code, "Slot released");
    }
    Ok(released)
}
