//! Schedule endpoints. All routes require a token.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{created, deleted, ApiContext, CallerContext, Created, Deleted};
use crate::authorization::{authorize, AccessAction};
use crate::db::with_write_transaction;
use crate::models::{Schedule, ScheduleInput};
use crate::scheduling::ledger;

pub async fn create(
    State(ctx): State<ApiContext>,
    body: Result<Json<ScheduleInput>, JsonRejection>,
) -> Result<Created<Schedule>, ApiError> {
    let Json(input) = body?;
    let conn = ctx.core.open_db()?;
    let schedule = ledger::create_schedule(&conn, &input)?;
    Ok(created("/schedules", schedule.schedule_code.clone(), schedule))
}

pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<Schedule>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(ledger::list_schedules(&conn)?))
}

/// `PUT /schedules/:user_id/:schedule_code`: administrative full replace.
/// A rename moves the slot's appointments and examinations along with it.
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    path: Result<Path<(i64, String)>, PathRejection>,
    body: Result<Json<ScheduleInput>, JsonRejection>,
) -> Result<Json<Schedule>, ApiError> {
    let Path((user_id, code)) = path?;
    authorize(caller.identity, user_id, AccessAction::Update)?;
    let Json(input) = body?;

    let mut conn = ctx.core.open_db()?;
    let schedule =
        with_write_transaction(&mut conn, |tx| ledger::update_schedule(tx, &code, &input))?;
    Ok(Json(schedule))
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    path: Result<Path<(i64, String)>, PathRejection>,
) -> Result<Deleted, ApiError> {
    let Path((user_id, code)) = path?;
    authorize(caller.identity, user_id, AccessAction::Delete)?;

    let mut conn = ctx.core.open_db()?;
    with_write_transaction(&mut conn, |tx| ledger::delete_schedule(tx, &code))?;
    Ok(deleted(code))
}
