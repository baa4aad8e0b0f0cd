//! Examination endpoints.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{created, deleted, ApiContext, CallerContext, Created, Deleted};
use crate::authorization::{authorize, AccessAction};
use crate::db::with_write_transaction;
use crate::models::{Examination, ExaminationInput};
use crate::scheduling::examinations;

pub async fn create(
    State(ctx): State<ApiContext>,
    body: Result<Json<ExaminationInput>, JsonRejection>,
) -> Result<Created<Examination>, ApiError> {
    let Json(input) = body?;
    let conn = ctx.core.open_db()?;
    let examination = examinations::create_examination(&conn, &input)?;
    Ok(created("/examinations", examination.examination_id, examination))
}

pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<Examination>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(examinations::list_examinations(&conn)?))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<Json<Examination>, ApiError> {
    let Path((_user_id, examination_id)) = path?;
    let conn = ctx.core.open_db()?;
    Ok(Json(examinations::find_examination(&conn, examination_id)?))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    path: Result<Path<(i64, i64)>, PathRejection>,
    body: Result<Json<ExaminationInput>, JsonRejection>,
) -> Result<Json<Examination>, ApiError> {
    let Path((user_id, examination_id)) = path?;
    authorize(caller.identity, user_id, AccessAction::Update)?;
    let Json(input) = body?;

    let mut conn = ctx.core.open_db()?;
    let examination = with_write_transaction(&mut conn, |tx| {
        examinations::update_examination(tx, examination_id, &input)
    })
    .inspect_err(|e| tracing::warn!(examination_id, "Examination update rolled back: {e}"))?;
    Ok(Json(examination))
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<Deleted, ApiError> {
    let Path((user_id, examination_id)) = path?;
    authorize(caller.identity, user_id, AccessAction::Delete)?;

    let conn = ctx.core.open_db()?;
    examinations::delete_examination(&conn, examination_id)?;
    Ok(deleted(examination_id))
}
