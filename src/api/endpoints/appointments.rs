//! Appointment endpoints.
//!
//! Updates and deletes run inside one write transaction so the linked
//! slot moves with the appointment or not at all.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{created, deleted, ApiContext, CallerContext, Created, Deleted};
use crate::authorization::{authorize, AccessAction};
use crate::db::with_write_transaction;
use crate::models::{Appointment, AppointmentInput};
use crate::scheduling::appointments;

/// `POST /appointments`: open route; does not touch the slot.
pub async fn create(
    State(ctx): State<ApiContext>,
    body: Result<Json<AppointmentInput>, JsonRejection>,
) -> Result<Created<Appointment>, ApiError> {
    let Json(input) = body?;
    let conn = ctx.core.open_db()?;
    let appointment =
        appointments::create_appointment(&conn, &input, ctx.core.booking_policy())?;
    Ok(created("/appointments", appointment.appointment_id, appointment))
}

pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<Appointment>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(appointments::list_appointments(&conn)?))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<Json<Appointment>, ApiError> {
    let Path((_user_id, appointment_id)) = path?;
    let conn = ctx.core.open_db()?;
    Ok(Json(appointments::find_appointment(&conn, appointment_id)?))
}

/// `PUT /appointments/:user_id/:appointment_id`: update and cascade to the slot.
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    path: Result<Path<(i64, i64)>, PathRejection>,
    body: Result<Json<AppointmentInput>, JsonRejection>,
) -> Result<Json<Appointment>, ApiError> {
    let Path((user_id, appointment_id)) = path?;
    authorize(caller.identity, user_id, AccessAction::Update)?;
    let Json(input) = body?;

    let mut conn = ctx.core.open_db()?;
    let appointment = with_write_transaction(&mut conn, |tx| {
        appointments::update_appointment(tx, appointment_id, &input)
    })
    .inspect_err(|e| tracing::warn!(appointment_id, "Appointment update rolled back: {e}"))?;
    Ok(Json(appointment))
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<Deleted, ApiError> {
    let Path((user_id, appointment_id)) = path?;
    authorize(caller.identity, user_id, AccessAction::Delete)?;

    let mut conn = ctx.core.open_db()?;
    with_write_transaction(&mut conn, |tx| {
        appointments::delete_appointment(tx, appointment_id)
    })?;
    Ok(deleted(appointment_id))
}
