//! Employee endpoints, keyed by employee id.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{created, deleted, ApiContext, CallerContext, Created, Deleted};
use crate::authorization::{authorize, AccessAction};
use crate::directory;
use crate::models::{Employee, EmployeeInput};

/// `POST /employees`: open registration.
pub async fn create(
    State(ctx): State<ApiContext>,
    body: Result<Json<EmployeeInput>, JsonRejection>,
) -> Result<Created<Employee>, ApiError> {
    let Json(input) = body?;
    let conn = ctx.core.open_db()?;
    let employee = directory::create_employee(&conn, &input, ctx.core.password_iterations())?;
    Ok(created("/employees", employee.employee_id, employee))
}

pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<Employee>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(directory::list_employees(&conn)?))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Employee>, ApiError> {
    let Path(employee_id) = path?;
    let conn = ctx.core.open_db()?;
    Ok(Json(directory::find_employee(&conn, employee_id)?))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<EmployeeInput>, JsonRejection>,
) -> Result<Json<Employee>, ApiError> {
    let Path(employee_id) = path?;
    authorize(caller.identity, employee_id, AccessAction::Update)?;
    let Json(input) = body?;

    let conn = ctx.core.open_db()?;
    let employee =
        directory::update_employee(&conn, employee_id, &input, ctx.core.password_iterations())?;
    Ok(Json(employee))
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Deleted, ApiError> {
    let Path(employee_id) = path?;
    authorize(caller.identity, employee_id, AccessAction::Delete)?;

    let conn = ctx.core.open_db()?;
    directory::delete_employee(&conn, employee_id)?;
    Ok(deleted(employee_id))
}
