use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::*;

const EXAMINATION_COLUMNS: &str = "examination_id, appointment_id, schedule_code, ssn, employee_id, anamnesis, diagnosis, prescription, status, created_at, updated_at";

fn examination_from_row(row: &Row<'_>) -> rusqlite::Result<Examination> {
    Ok(Examination {
        examination_id: row.get(0)?,
        appointment_id: row.get(1)?,
        schedule_code: row.get(2)?,
        ssn: row.get(3)?,
        employee_id: row.get(4)?,
        anamnesis: row.get(5)?,
        diagnosis: row.get(6)?,
        prescription: row.get(7)?,
        status: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

pub fn insert_examination(
    conn: &Connection,
    input: &ExaminationInput,
) -> Result<Examination, DatabaseError> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO examinations
         (appointment_id, schedule_code, ssn, employee_id, anamnesis, diagnosis, prescription,
          status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
        params![
            input.appointment_id,
            input.schedule_code,
            input.ssn,
            input.employee_id,
            input.anamnesis,
            input.diagnosis,
            input.prescription,
            input.status.unwrap_or_default(),
            now,
        ],
    )?;
    let id = conn.last_insert_rowid();
    get_examination(conn, id)?.ok_or_else(|| DatabaseError::not_found("Examination", id))
}

pub fn get_examination(conn: &Connection, id: i64) -> Result<Option<Examination>, DatabaseError> {
    let examination = conn
        .query_row(
            &format!("SELECT {EXAMINATION_COLUMNS} FROM examinations WHERE examination_id = ?1"),
            params![id],
            examination_from_row,
        )
        .optional()?;
    Ok(examination)
}

pub fn list_examinations(conn: &Connection, limit: usize) -> Result<Vec<Examination>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {EXAMINATION_COLUMNS} FROM examinations ORDER BY examination_id LIMIT ?1"
    ))?;
    let rows = stmt.query_map(params![limit as i64], examination_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Update linkage, clinical fields and status. Returns rows changed.
pub fn update_examination_row(
    conn: &Connection,
    id: i64,
    input: &ExaminationInput,
    status: SlotStatus,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE examinations
         SET appointment_id = ?1, schedule_code = ?2, ssn = ?3, employee_id = ?4,
             anamnesis = ?5, diagnosis = ?6, prescription = ?7, status = ?8, updated_at = ?9
         WHERE examination_id = ?10",
        params![
            input.appointment_id,
            input.schedule_code,
            input.ssn,
            input.employee_id,
            input.anamnesis,
            input.diagnosis,
            input.prescription,
            status,
            Utc::now(),
            id,
        ],
    )?;
    Ok(changed)
}

pub fn delete_examination_row(conn: &Connection, id: i64) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM examinations WHERE examination_id = ?1",
        params![id],
    )?;
    Ok(deleted)
}
