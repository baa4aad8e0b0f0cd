//! Patient endpoints, keyed by SSN.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{created, deleted, ApiContext, CallerContext, Created, Deleted};
use crate::authorization::{authorize, AccessAction};
use crate::directory;
use crate::models::{Patient, PatientInput};

/// `POST /patients`: open registration.
pub async fn create(
    State(ctx): State<ApiContext>,
    body: Result<Json<PatientInput>, JsonRejection>,
) -> Result<Created<Patient>, ApiError> {
    let Json(input) = body?;
    let conn = ctx.core.open_db()?;
    let patient = directory::create_patient(&conn, &input, ctx.core.password_iterations())?;
    Ok(created("/patients", patient.ssn, patient))
}

pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<Patient>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(directory::list_patients(&conn)?))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Patient>, ApiError> {
    let Path(ssn) = path?;
    let conn = ctx.core.open_db()?;
    Ok(Json(directory::find_patient(&conn, ssn)?))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<PatientInput>, JsonRejection>,
) -> Result<Json<Patient>, ApiError> {
    let Path(ssn) = path?;
    authorize(caller.identity, ssn, AccessAction::Update)?;
    let Json(input) = body?;

    let conn = ctx.core.open_db()?;
    let patient = directory::update_patient(&conn, ssn, &input, ctx.core.password_iterations())?;
    Ok(Json(patient))
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Deleted, ApiError> {
    let Path(ssn) = path?;
    authorize(caller.identity, ssn, AccessAction::Delete)?;

    let conn = ctx.core.open_db()?;
    directory::delete_patient(&conn, ssn)?;
    Ok(deleted(ssn))
}
