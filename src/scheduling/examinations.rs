//! Examination workflow: the clinical outcome of an appointment.
//!
//! An examination belongs to one appointment and sits on that
//! appointment's slot. Updating it cascades its status into the slot and
//! into the appointment, within the caller's transaction, so all three
//! agree afterwards.

use rusqlite::{Connection, Transaction};

use super::{ledger, WorkflowError};
use crate::config::LIST_LIMIT;
use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::{Appointment, Examination, ExaminationInput, ValidationError};

pub fn create_examination(
    conn: &Connection,
    input: &ExaminationInput,
) -> Result<Examination, WorkflowError> {
    input.validate()?;
    linked_appointment(conn, input)?;
    let examination = repository::insert_examination(conn, input)?;
    tracing::info!(
        examination_id = examination.examination_id,
        appointment_id = examination.appointment_id,
        "Examination recorded"
    );
    Ok(examination)
}

pub fn find_examination(conn: &Connection, id: i64) -> Result<Examination, WorkflowError> {
    repository::get_examination(conn, id)?
        .ok_or_else(|| DatabaseError::not_found("Examination", id).into())
}

pub fn list_examinations(conn: &Connection) -> Result<Vec<Examination>, WorkflowError> {
    Ok(repository::list_examinations(conn, LIST_LIMIT)?)
}

/// Update an examination and cascade its status into the linked slot and
/// appointment. An omitted status keeps the examination's current one.
///
/// The slot moves on behalf of the examination's appointment, so a slot
/// booked by any other appointment is refused with `Conflict`.
/// The caller commits; any error leaves `tx` to roll back.
pub fn update_examination(
    tx: &Transaction<'_>,
    id: i64,
    input: &ExaminationInput,
) -> Result<Examination, WorkflowError> {
    input.validate()?;
    let appointment = linked_appointment(tx, input)?;
    let previous = find_examination(tx, id)?;
    let status = input.status.unwrap_or(previous.status);

    if repository::update_examination_row(tx, id, input, status)? == 0 {
        return Err(DatabaseError::not_found("Examination", id).into());
    }
    let examination = find_examination(tx, id)?;

    let schedule = ledger::transition_slot(
        tx,
        &examination.schedule_code,
        examination.status,
        appointment.appointment_id,
    )?;
    if appointment.status != examination.status {
        repository::set_appointment_status(tx, appointment.appointment_id, examination.status)?;
    }
    tracing::debug!(
        examination_id = id,
        appointment_id = appointment.appointment_id,
        code = %schedule.schedule_code,
        status = %schedule.status,
        "Examination status cascaded to slot and appointment"
    );

    Ok(examination)
}

/// Delete an examination by its own id. The slot keeps whatever status
/// the examination left it in.
pub fn delete_examination(conn: &Connection, id: i64) -> Result<(), WorkflowError> {
    if repository::delete_examination_row(conn, id)? == 0 {
        return Err(DatabaseError::not_found("Examination", id).into());
    }
    tracing::info!(examination_id = id, "Examination deleted");
    Ok(())
}

/// The appointment an examination refers to. It must exist and sit on the
/// same slot as the examination.
fn linked_appointment(
    conn: &Connection,
    input: &ExaminationInput,
) -> Result<Appointment, WorkflowError> {
    let appointment = repository::get_appointment(conn, input.appointment_id)?
        .ok_or_else(|| ValidationError(format!("Unknown Appointment ID {}", input.appointment_id)))?;
    if appointment.schedule_code != input.schedule_code {
        return Err(ValidationError(format!(
            "Schedule {} does not match appointment {}",
            input.schedule_code, appointment.appointment_id
        ))
        .into());
    }
    Ok(appointment)
}
