use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::*;

const EMPLOYEE_COLUMNS: &str = "employee_id, name, email, department, created_at, updated_at";

fn employee_from_row(row: &Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        employee_id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        department: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

pub fn insert_employee(
    conn: &Connection,
    input: &EmployeeInput,
    password_hash: &str,
) -> Result<Employee, DatabaseError> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO employees (employee_id, name, email, password_hash, department, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![
            input.employee_id,
            input.name,
            input.email,
            password_hash,
            input.department,
            now,
        ],
    )?;
    get_employee(conn, input.employee_id)?
        .ok_or_else(|| DatabaseError::not_found("Employee", input.employee_id))
}

pub fn get_employee(conn: &Connection, employee_id: i64) -> Result<Option<Employee>, DatabaseError> {
    let employee = conn
        .query_row(
            &format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE employee_id = ?1"),
            params![employee_id],
            employee_from_row,
        )
        .optional()?;
    Ok(employee)
}

pub fn list_employees(conn: &Connection, limit: usize) -> Result<Vec<Employee>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY employee_id LIMIT ?1"
    ))?;
    let rows = stmt.query_map(params![limit as i64], employee_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_employee(
    conn: &Connection,
    employee_id: i64,
    input: &EmployeeInput,
    password_hash: &str,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE employees
         SET employee_id = ?1, name = ?2, email = ?3, password_hash = ?4, department = ?5, updated_at = ?6
         WHERE employee_id = ?7",
        params![
            input.employee_id,
            input.name,
            input.email,
            password_hash,
            input.department,
            Utc::now(),
            employee_id,
        ],
    )?;
    Ok(changed)
}

pub fn delete_employee(conn: &Connection, employee_id: i64) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM employees WHERE employee_id = ?1",
        params![employee_id],
    )?;
    Ok(deleted)
}

/// Look up `(employee_id, password_hash)` for a login email.
pub fn get_employee_credentials(
    conn: &Connection,
    email: &str,
) -> Result<Option<(i64, String)>, DatabaseError> {
    let found = conn
        .query_row(
            "SELECT employee_id, password_hash FROM employees WHERE email = ?1",
            params![email],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    Ok(found)
}
