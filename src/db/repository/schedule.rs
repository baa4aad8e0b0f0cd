use chrono::Utc;
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::*;

const SCHEDULE_COLUMNS: &str =
    "schedule_code, day, start_time, end_time, status, created_at, updated_at";

fn schedule_from_row(row: &Row<'_>) -> rusqlite::Result<Schedule> {
    Ok(Schedule {
        schedule_code: row.get(0)?,
        day: row.get(1)?,
        start_time: row.get(2)?,
        end_time: row.get(3)?,
        status: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

pub fn insert_schedule(conn: &Connection, input: &ScheduleInput) -> Result<Schedule, DatabaseError> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO schedules (schedule_code, day, start_time, end_time, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![
            input.schedule_code,
            input.day,
            input.start_time,
            input.end_time,
            input.status,
            now,
        ],
    )?;
    get_schedule(conn, &input.schedule_code)?
        .ok_or_else(|| DatabaseError::not_found("Schedule", &input.schedule_code))
}

pub fn get_schedule(conn: &Connection, code: &str) -> Result<Option<Schedule>, DatabaseError> {
    let schedule = conn
        .query_row(
            &format!("SELECT {SCHEDULE_COLUMNS} FROM schedules WHERE schedule_code = ?1"),
            params![code],
            schedule_from_row,
        )
        .optional()?;
    Ok(schedule)
}

pub fn list_schedules(conn: &Connection, limit: usize) -> Result<Vec<Schedule>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SCHEDULE_COLUMNS} FROM schedules ORDER BY schedule_code LIMIT ?1"
    ))?;
    let rows = stmt.query_map(params![limit as i64], schedule_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Overwrite every mutable column of the slot keyed by `code`.
/// Returns the number of rows changed (0 when the code is unknown).
pub fn update_schedule(
    conn: &Connection,
    code: &str,
    input: &ScheduleInput,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE schedules
         SET schedule_code = ?1, day = ?2, start_time = ?3, end_time = ?4, status = ?5, updated_at = ?6
         WHERE schedule_code = ?7",
        params![
            input.schedule_code,
            input.day,
            input.start_time,
            input.end_time,
            input.status,
            Utc::now(),
            code,
        ],
    )?;
    Ok(changed)
}

/// Move a slot to `target` only if its current status is one of
/// `target.allowed_priors()`. Check and write happen in one statement.
/// Returns the number of rows changed.
pub fn transition_schedule_status(
    conn: &Connection,
    code: &str,
    target: SlotStatus,
) -> Result<usize, DatabaseError> {
    let priors = target.allowed_priors();
    let placeholders = (0..priors.len())
        .map(|i| format!("?{}", i + 4))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE schedules SET status = ?1, updated_at = ?2
         WHERE schedule_code = ?3 AND status IN ({placeholders})"
    );

    let now = Utc::now();
    let mut values: Vec<&dyn ToSql> = Vec::with_capacity(3 + priors.len());
    values.push(&target);
    values.push(&now);
    values.push(&code);
    values.extend(priors.iter().map(|s| s as &dyn ToSql));

    let changed = conn.execute(&sql, values.as_slice())?;
    Ok(changed)
}

pub fn delete_schedule(conn: &Connection, code: &str) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM schedules WHERE schedule_code = ?1",
        params![code],
    )?;
    Ok(deleted)
}

/// Point every appointment and examination on slot `from` at slot `to`.
/// Returns the number of rows rewritten.
pub fn rename_schedule_references(
    conn: &Connection,
    from: &str,
    to: &str,
) -> Result<usize, DatabaseError> {
    let now = Utc::now();
    let appointments = conn.execute(
        "UPDATE appointments SET schedule_code = ?1, updated_at = ?2 WHERE schedule_code = ?3",
        params![to, now, from],
    )?;
    let examinations = conn.execute(
        "UPDATE examinations SET schedule_code = ?1, updated_at = ?2 WHERE schedule_code = ?3",
        params![to, now, from],
    )?;
    Ok(appointments + examinations)
}
