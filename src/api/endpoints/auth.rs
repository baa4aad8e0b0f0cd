//! `POST /login/:user`: trade an email/password pair for a bearer token.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::directory::{self, LoginResponse};
use crate::models::{LoginRequest, UserKind};

pub async fn login(
    State(ctx): State<ApiContext>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Path(user) = path?;
    let kind: UserKind = user
        .to_ascii_lowercase()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Unknown user kind: {user}")))?;
    let Json(request) = body?;

    let conn = ctx.core.open_db()?;
    let session = directory::login(&conn, kind, &request, &ctx.core.credentials)?;
    Ok(Json(session))
}
