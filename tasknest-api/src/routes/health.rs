/// Health check endpoint
///
/// ```text
/// GET /health
/// ```
///
/// ```json
/// { "status": "healthy", "version": "0.1.0", "database": "connected", "cache": "disabled" }
/// ```
///
/// Always answers 200; a failing dependency shows up as `"degraded"`.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tasknest_shared::cache::{self, CacheStatus};
use utoipa::ToSchema;

use crate::{app::AppState, error::ApiResult};

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    #[schema(example = "healthy")]
    pub status: String,

    /// Application version
    pub version: String,

    /// `connected` or `disconnected`
    pub database: String,

    /// `connected`, `disconnected` or `disabled`
    pub cache: String,
}

/// Reports service health and dependency connectivity
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service status", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let database_ok = match state.tasks.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            false
        }
    };
    let cache = cache::status_of(state.cache.as_ref()).await;

    let healthy = database_ok && cache != CacheStatus::Disconnected;

    Ok(Json(HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if database_ok { "connected" } else { "disconnected" }.to_string(),
        cache: match cache {
            CacheStatus::Connected => "connected",
            CacheStatus::Disconnected => "disconnected",
            CacheStatus::Disabled => "disabled",
        }
        .to_string(),
    }))
}
