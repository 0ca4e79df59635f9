pub mod resolution_api;

use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(resolution_api::health))
        // Kiosk player endpoints: the player polls these and switches
        // content when the resolution changes.
        .route(
            "/kiosks/:id/playlist",
            get(resolution_api::get_current_playlist),
        )
        .route("/kiosks/:id/ads", get(resolution_api::get_active_ads))
        .route(
            "/creatives/:id/impressions",
            post(resolution_api::log_impression),
        )
}
