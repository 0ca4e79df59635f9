use crate::services::content_store;
use crate::services::resolution_service::{
    self, ResolveError, ResolvedCreative, ResolvedPlaylist,
};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct ResolveQuery {
    /// Instant to resolve for, RFC 3339. Defaults to now; the engine itself
    /// never reads a clock.
    pub at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[derive(Serialize)]
pub struct AdPoolResponse {
    pub creatives: Vec<ResolvedCreative>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn error_response(err: ResolveError) -> ApiError {
    let status = match &err {
        ResolveError::UnknownKiosk(_) => StatusCode::NOT_FOUND,
        ResolveError::NotFound => StatusCode::NOT_FOUND,
        ResolveError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        ResolveError::ConfigurationAmbiguous(..) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!("resolution failed: {}", err);
    }
    (
        status,
        Json(ErrorBody {
            detail: err.to_string(),
        }),
    )
}

fn pool_error() -> ApiError {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorBody {
            detail: "content store unavailable".to_string(),
        }),
    )
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn get_current_playlist(
    State(state): State<AppState>,
    Path(kiosk_id): Path<i32>,
    Query(params): Query<ResolveQuery>,
) -> Result<Json<ResolvedPlaylist>, ApiError> {
    let mut conn = state.db.get().map_err(|e| {
        tracing::error!("db pool: {}", e);
        pool_error()
    })?;
    let at = params.at.unwrap_or_else(Utc::now);

    resolution_service::resolve_playlist(&mut conn, kiosk_id, at)
        .map(Json)
        .map_err(error_response)
}

pub async fn get_active_ads(
    State(state): State<AppState>,
    Path(kiosk_id): Path<i32>,
    Query(params): Query<ResolveQuery>,
) -> Result<Json<AdPoolResponse>, ApiError> {
    let mut conn = state.db.get().map_err(|e| {
        tracing::error!("db pool: {}", e);
        pool_error()
    })?;
    let at = params.at.unwrap_or_else(Utc::now);

    resolution_service::resolve_ad_pool(&mut conn, kiosk_id, at)
        .map(|creatives| Json(AdPoolResponse { creatives }))
        .map_err(error_response)
}

#[derive(Deserialize)]
pub struct ImpressionBody {
    pub kiosk_id: i32,
    pub duration_viewed: i32,
}

/// The player reports what it actually displayed. Write-only collaborator;
/// resolution never reads this table.
pub async fn log_impression(
    State(state): State<AppState>,
    Path(creative_id): Path<i32>,
    Json(body): Json<ImpressionBody>,
) -> Result<(StatusCode, Json<crate::models::Impression>), ApiError> {
    let mut conn = state.db.get().map_err(|e| {
        tracing::error!("db pool: {}", e);
        pool_error()
    })?;

    let logged =
        content_store::record_impression(&mut conn, creative_id, body.kiosk_id, body.duration_viewed)
            .map_err(|e| error_response(ResolveError::Unavailable(e)))?;

    match logged {
        Some(impression) => Ok((StatusCode::CREATED, Json(impression))),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                detail: format!("unknown creative {}", creative_id),
            }),
        )),
    }
}
