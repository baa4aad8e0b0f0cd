use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::*;

const PATIENT_COLUMNS: &str = "ssn, name, email, created_at, updated_at";

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        ssn: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

pub fn insert_patient(
    conn: &Connection,
    input: &PatientInput,
    password_hash: &str,
) -> Result<Patient, DatabaseError> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO patients (ssn, name, email, password_hash, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![input.ssn, input.name, input.email, password_hash, now],
    )?;
    get_patient(conn, input.ssn)?.ok_or_else(|| DatabaseError::not_found("Patient", input.ssn))
}

pub fn get_patient(conn: &Connection, ssn: i64) -> Result<Option<Patient>, DatabaseError> {
    let patient = conn
        .query_row(
            &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE ssn = ?1"),
            params![ssn],
            patient_from_row,
        )
        .optional()?;
    Ok(patient)
}

pub fn list_patients(conn: &Connection, limit: usize) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients ORDER BY ssn LIMIT ?1"
    ))?;
    let rows = stmt.query_map(params![limit as i64], patient_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Replace name, SSN, email and password of the patient keyed by `ssn`.
pub fn update_patient(
    conn: &Connection,
    ssn: i64,
    input: &PatientInput,
    password_hash: &str,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE patients SET ssn = ?1, name = ?2, email = ?3, password_hash = ?4, updated_at = ?5
         WHERE ssn = ?6",
        params![input.ssn, input.name, input.email, password_hash, Utc::now(), ssn],
    )?;
    Ok(changed)
}

pub fn delete_patient(conn: &Connection, ssn: i64) -> Result<usize, DatabaseError> {
    let deleted = conn.execute("DELETE FROM patients WHERE ssn = ?1", params![ssn])?;
    Ok(deleted)
}

/// Look up `(ssn, password_hash)` for a login email.
pub fn get_patient_credentials(
    conn: &Connection,
    email: &str,
) -> Result<Option<(i64, String)>, DatabaseError> {
    let found = conn
        .query_row(
            "SELECT ssn, password_hash FROM patients WHERE email = ?1",
            params![email],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    Ok(found)
}
