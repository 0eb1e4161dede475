/// Health check endpoint
///
/// `GET /health` is public, no identity required. Reports service version
/// and database reachability.
use axum::{extract::State, Json};
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiResult;
use taskgrid_core::db::pool;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status ("ok" or "degraded")
    pub status: &'static str,

    /// Service version
    pub version: &'static str,

    /// Whether the database answered the check query
    pub database: bool,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let database = pool::health_check(&state.db).await.is_ok();

    Ok(Json(HealthResponse {
        status: if database { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database,
    }))
}
