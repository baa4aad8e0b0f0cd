//! Liveness endpoint.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HomeResponse {
    pub message: &'static str,
    pub version: &'static str,
}

/// `GET /`: server liveness message.
pub async fn index() -> Json<HomeResponse> {
    Json(HomeResponse {
        message: "HMS APP API - Server Live",
        version: crate::config::APP_VERSION,
    })
}
