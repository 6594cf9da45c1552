//! HTTP server setup and configuration.
//!
//! This module provides the router and application state used by both
//! the production server and integration tests.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::assets::AssetLoader;
use crate::models::AppConfig;
use crate::services::{InMemorySubjectStore, RecolorService, SessionRegistry};
use factory_tint::{PixelBuffer, Watermark};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub subjects: Arc<InMemorySubjectStore>,
    pub recolor: RecolorService,
    pub sessions: Arc<SessionRegistry>,
}

/// Create application state from an asset loader.
///
/// A watermark that is configured but unreadable is logged and skipped.
pub fn create_app_state(asset_loader: Arc<AssetLoader>) -> anyhow::Result<AppState> {
    let config = AppConfig::load_from_assets(&asset_loader);
    let watermark = load_watermark(&asset_loader);
    Ok(create_app_state_with_config(config, watermark))
}

/// Create application state from an already loaded configuration.
pub fn create_app_state_with_config(config: AppConfig, watermark: Option<Watermark>) -> AppState {
    let recolor = RecolorService::from_config(&config, watermark);
    let sessions = Arc::new(SessionRegistry::new(config.transition_delay()));

    AppState {
        config: Arc::new(config),
        subjects: Arc::new(InMemorySubjectStore::new()),
        recolor,
        sessions,
    }
}

/// Decode the watermark image named by WATERMARK_FILE, if any.
pub fn load_watermark(asset_loader: &AssetLoader) -> Option<Watermark> {
    let bytes = match asset_loader.read_watermark() {
        Ok(bytes) => bytes?,
        Err(e) => {
            tracing::warn!(%e, "Failed to read watermark, exporting without it");
            return None;
        }
    };
    match PixelBuffer::decode(&bytes) {
        Ok(image) => {
            tracing::info!(
                width = image.width(),
                height = image.height(),
                "Loaded watermark"
            );
            Some(Watermark::new(image))
        }
        Err(e) => {
            tracing::warn!(%e, "Failed to decode watermark, exporting without it");
            None
        }
    }
}

/// Build the API router with all endpoints and middleware.
///
/// This is the core router used by both production and tests.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.engine.max_upload_bytes;

    Router::new()
        .route("/api/palette", get(api::handle_palette))
        .route("/api/subjects", post(api::handle_upload))
        .route("/api/subjects/:id", delete(api::handle_delete))
        .route("/api/subjects/:id/image", get(api::handle_image))
        .route("/api/subjects/:id/share", get(api::handle_share))
        .route("/api/subjects/:id/color", put(api::handle_set_color))
        .route("/api/subjects/:id/transition", get(api::handle_transition))
        .route("/api/subjects/:id/preview", get(api::handle_preview))
        // Health check
        .route("/health", get(|| async { "OK" }))
        // Add state, upload limit and tracing
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
}
