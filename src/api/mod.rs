use axum::http::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use snafu::ResultExt;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{AllowedOriginSnafu, ApplicationError};

mod auth;
mod error;
mod progress;
mod state;

pub use auth::*;
pub use error::*;
pub use progress::ReportProgress;
pub use state::*;

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

pub fn create_router(app: App, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .route(
            "/api/progress/:video_id",
            get(progress::show).post(progress::report),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(app)
}

/// Builds the CORS policy. With no configured origins any origin is allowed, but without
/// credentials.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, ApplicationError> {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static(USER_HEADER),
        ])
        .expose_headers([
            HeaderName::from_static("content-range"),
            HeaderName::from_static("x-content-range"),
        ]);

    if origins.is_empty() {
        return Ok(cors.allow_origin(Any));
    }

    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).context(AllowedOriginSnafu {
                origin: origin.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(cors
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true))
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Video Progress Tracking API is running" }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "API is healthy" }))
}
