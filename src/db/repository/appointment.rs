use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::*;

const APPOINTMENT_COLUMNS: &str = "appointment_id, schedule_code, ssn, employee_id, start_time, end_time, status, created_at, updated_at";

fn appointment_from_row(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        appointment_id: row.get(0)?,
        schedule_code: row.get(1)?,
        ssn: row.get(2)?,
        employee_id: row.get(3)?,
        start_time: row.get(4)?,
        end_time: row.get(5)?,
        status: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// Insert an appointment. With `assigned_id = None` SQLite picks the id.
pub fn insert_appointment(
    conn: &Connection,
    input: &AppointmentInput,
    assigned_id: Option<i64>,
) -> Result<Appointment, DatabaseError> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO appointments
         (appointment_id, schedule_code, ssn, employee_id, start_time, end_time, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![
            assigned_id,
            input.schedule_code,
            input.ssn,
            input.employee_id,
            input.start_time,
            input.end_time,
            input.status,
            now,
        ],
    )?;
    let id = conn.last_insert_rowid();
    get_appointment(conn, id)?.ok_or_else(|| DatabaseError::not_found("Appointment", id))
}

pub fn get_appointment(conn: &Connection, id: i64) -> Result<Option<Appointment>, DatabaseError> {
    let appointment = conn
        .query_row(
            &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE appointment_id = ?1"),
            params![id],
            appointment_from_row,
        )
        .optional()?;
    Ok(appointment)
}

pub fn list_appointments(conn: &Connection, limit: usize) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments ORDER BY appointment_id LIMIT ?1"
    ))?;
    let rows = stmt.query_map(params![limit as i64], appointment_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Update the mutable columns of an appointment. Returns rows changed.
pub fn update_appointment_row(
    conn: &Connection,
    id: i64,
    input: &AppointmentInput,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments
         SET schedule_code = ?1, ssn = ?2, employee_id = ?3, start_time = ?4, end_time = ?5,
             status = ?6, updated_at = ?7
         WHERE appointment_id = ?8",
        params![
            input.schedule_code,
            input.ssn,
            input.employee_id,
            input.start_time,
            input.end_time,
            input.status,
            Utc::now(),
            id,
        ],
    )?;
    Ok(changed)
}

pub fn delete_appointment_row(conn: &Connection, id: i64) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM appointments WHERE appointment_id = ?1",
        params![id],
    )?;
    Ok(deleted)
}

/// Set only the status of an appointment. Returns rows changed.
pub fn set_appointment_status(
    conn: &Connection,
    id: i64,
    status: SlotStatus,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments SET status = ?1, updated_at = ?2 WHERE appointment_id = ?3",
        params![status, Utc::now(), id],
    )?;
    Ok(changed)
}

/// The appointment holding `schedule_code` as `booked`, if any. The
/// partial unique index guarantees there is at most one.
pub fn find_booked_holder(
    conn: &Connection,
    schedule_code: &str,
) -> Result<Option<i64>, DatabaseError> {
    let holder = conn
        .query_row(
            "SELECT appointment_id FROM appointments WHERE schedule_code = ?1 AND status = ?2",
            params![schedule_code, SlotStatus::Booked],
            |row| row.get(0),
        )
        .optional()?;
    Ok(holder)
}
