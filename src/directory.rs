//! Patient and employee directory, plus login.
//!
//! Passwords are hashed here, before they reach the repository layer,
//! and login trades a verified email/password pair for an identity token.

use rusqlite::Connection;
use serde::Serialize;

use crate::config::LIST_LIMIT;
use crate::credentials::{self, CredentialError, CredentialStore};
use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::{
    Employee, EmployeeInput, LoginRequest, Patient, PatientInput, UserKind, ValidationError,
};

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error("Incorrect email or password")]
    InvalidCredentials,
}

impl DirectoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Database(DatabaseError::NotFound { .. }))
    }
}

/// Body returned by a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserKind,
    pub subject: i64,
}

// ═══════════════════════════════════════════════════════════
// Patients
// ═══════════════════════════════════════════════════════════

pub fn create_patient(
    conn: &Connection,
    input: &PatientInput,
    password_iterations: u32,
) -> Result<Patient, DirectoryError> {
    input.validate()?;
    let hash = credentials::hash_password(&input.password, password_iterations);
    let patient = repository::insert_patient(conn, input, &hash)?;
    tracing::info!(ssn = patient.ssn, "Patient registered");
    Ok(patient)
}

pub fn find_patient(conn: &Connection, ssn: i64) -> Result<Patient, DirectoryError> {
    repository::get_patient(conn, ssn)?
        .ok_or_else(|| DatabaseError::not_found("Patient", ssn).into())
}

pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, DirectoryError> {
    Ok(repository::list_patients(conn, LIST_LIMIT)?)
}

/// Full replace of the patient keyed by `ssn`; the body may carry a new SSN.
pub fn update_patient(
    conn: &Connection,
    ssn: i64,
    input: &PatientInput,
    password_iterations: u32,
) -> Result<Patient, DirectoryError> {
    input.validate()?;
    let hash = credentials::hash_password(&input.password, password_iterations);
    if repository::update_patient(conn, ssn, input, &hash)? == 0 {
        return Err(DatabaseError::not_found("Patient", ssn).into());
    }
    find_patient(conn, input.ssn)
}

pub fn delete_patient(conn: &Connection, ssn: i64) -> Result<(), DirectoryError> {
    if repository::delete_patient(conn, ssn)? == 0 {
        return Err(DatabaseError::not_found("Patient", ssn).into());
    }
    tracing::info!(ssn, "Patient deleted");
    Ok(())
}

// ═══════════════════════════════════════════════════════════
// Employees
// ═══════════════════════════════════════════════════════════

pub fn create_employee(
    conn: &Connection,
    input: &EmployeeInput,
    password_iterations: u32,
) -> Result<Employee, DirectoryError> {
    input.validate()?;
    let hash = credentials::hash_password(&input.password, password_iterations);
    let employee = repository::insert_employee(conn, input, &hash)?;
    tracing::info!(
        employee_id = employee.employee_id,
        department = %employee.department,
        "Employee registered"
    );
    Ok(employee)
}

pub fn find_employee(conn: &Connection, employee_id: i64) -> Result<Employee, DirectoryError> {
    repository::get_employee(conn, employee_id)?
        .ok_or_else(|| DatabaseError::not_found("Employee", employee_id).into())
}

pub fn list_employees(conn: &Connection) -> Result<Vec<Employee>, DirectoryError> {
    Ok(repository::list_employees(conn, LIST_LIMIT)?)
}

pub fn update_employee(
    conn: &Connection,
    employee_id: i64,
    input: &EmployeeInput,
    password_iterations: u32,
) -> Result<Employee, DirectoryError> {
    input.validate()?;
    let hash = credentials::hash_password(&input.password, password_iterations);
    if repository::update_employee(conn, employee_id, input, &hash)? == 0 {
        return Err(DatabaseError::not_found("Employee", employee_id).into());
    }
    find_employee(conn, input.employee_id)
}

pub fn delete_employee(conn: &Connection, employee_id: i64) -> Result<(), DirectoryError> {
    if repository::delete_employee(conn, employee_id)? == 0 {
        return Err(DatabaseError::not_found("Employee", employee_id).into());
    }
    tracing::info!(employee_id, "Employee deleted");
    Ok(())
}

// ═══════════════════════════════════════════════════════════
// Login
// ═══════════════════════════════════════════════════════════

/// Verify an email/password pair and issue a token for the matching subject.
///
/// An unknown email and a wrong password produce the same error.
pub fn login(
    conn: &Connection,
    kind: UserKind,
    request: &LoginRequest,
    store: &dyn CredentialStore,
) -> Result<LoginResponse, DirectoryError> {
    request.validate()?;
    let email = request.email.trim();

    let found = match kind {
        UserKind::Patient => repository::get_patient_credentials(conn, email)?,
        UserKind::Employee => repository::get_employee_credentials(conn, email)?,
    };
    let Some((subject, stored_hash)) = found else {
        tracing::warn!(user = %kind, "Login for unknown email");
        return Err(DirectoryError::InvalidCredentials);
    };

    if !credentials::verify_password(&request.password, &stored_hash)? {
        tracing::warn!(user = %kind, subject, "Login with wrong password");
        return Err(DirectoryError::InvalidCredentials);
    }

    let token = store.issue_token(subject)?;
    tracing::info!(user = %kind, subject, "Login succeeded");
    Ok(LoginResponse {
        token,
        user: kind,
        subject,
    })
}
