//! HTTP API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//!
//! Two route groups share paths but not methods: registration, login and
//! record creation are open; everything else goes through the auth layer.
//! Middleware stack (outermost → innermost):
//! Response headers → Extension → Audit → Auth (protected only) → Handler

use std::sync::Arc;

use axum::http::header::{HeaderName, HeaderValue};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/patients", get(endpoints::patients::list))
        .route(
            "/patients/:ssn",
            get(endpoints::patients::detail)
                .put(endpoints::patients::update)
                .delete(endpoints::patients::delete),
        )
        .route("/employees", get(endpoints::employees::list))
        .route(
            "/employees/:employee_id",
            get(endpoints::employees::detail)
                .put(endpoints::employees::update)
                .delete(endpoints::employees::delete),
        )
        .route(
            "/schedules",
            get(endpoints::schedules::list).post(endpoints::schedules::create),
        )
        .route(
            "/schedules/:user_id/:schedule_code",
            put(endpoints::schedules::update).delete(endpoints::schedules::delete),
        )
        .route("/appointments", get(endpoints::appointments::list))
        .route(
            "/appointments/:user_id/:appointment_id",
            get(endpoints::appointments::detail)
                .put(endpoints::appointments::update)
                .delete(endpoints::appointments::delete),
        )
        .route("/examinations", get(endpoints::examinations::list))
        .route(
            "/examinations/:user_id/:examination_id",
            get(endpoints::examinations::detail)
                .put(endpoints::examinations::update)
                .delete(endpoints::examinations::delete),
        )
        .with_state(ctx.clone())
        // Middleware stack (innermost first, outermost last):
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::Extension(ctx.clone()));

    let open = Router::new()
        .route("/", get(endpoints::home::index))
        .route("/login/:user", post(endpoints::auth::login))
        .route("/patients", post(endpoints::patients::create))
        .route("/employees", post(endpoints::employees::create))
        .route("/appointments", post(endpoints::appointments::create))
        .route("/examinations", post(endpoints::examinations::create))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::Extension(ctx));

    Router::new()
        .merge(protected)
        .merge(open)
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
}
