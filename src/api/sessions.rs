use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::subjects::find_subject;
use crate::error::ApiError;
use crate::models::{AppConfig, SubjectId};
use crate::server::AppState;
use crate::services::{painting_session, PaintingSession, SubjectStore};
use factory_tint::{TargetColor, TransitionState};

/// Body of a color request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ColorRequest {
    /// Swatch name, hex color or "transparent"
    pub color: String,
}

/// Snapshot of a subject's painting transition
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransitionResponse {
    /// Color the subject is rendered in
    pub displayed_color: String,
    /// Swatch name of the displayed color
    pub displayed_name: String,
    /// Most recently requested color
    pub requested_color: String,
    /// True until the painting delay after the last request has passed
    pub is_transitioning: bool,
    /// Fraction of the painting delay elapsed (1.0 when idle)
    pub progress: f32,
}

/// The subject's painting session, started on first use
///
/// Sessions only exist for stored subjects. A delete that lands between
/// the subject lookup and the session insert finds no session to close, so
/// the store is checked again once the session is registered.
pub async fn attach_session(
    state: &AppState,
    id: &SubjectId,
) -> Result<Arc<PaintingSession>, ApiError> {
    let session = state.sessions.get_or_create(id).await;
    if state.subjects.get(id).await?.is_none() {
        state.sessions.remove(id).await;
        tracing::debug!(subject = %id, "Subject deleted while opening its session");
        return Err(ApiError::SubjectNotFound);
    }
    Ok(session)
}

impl TransitionResponse {
    pub fn new(state: &TransitionState, config: &AppConfig) -> Self {
        Self {
            displayed_color: state.displayed.to_string(),
            displayed_name: config.palette.name_for(state.displayed),
            requested_color: state.requested.to_string(),
            is_transitioning: state.is_transitioning(),
            progress: state.progress(painting_session::now()),
        }
    }
}

/// Request a new paint color for a subject
///
/// The color is painted once no further request has arrived for the
/// configured delay; earlier pending requests are replaced.
#[utoipa::path(
    put,
    path = "/api/subjects/{id}/color",
    request_body = ColorRequest,
    responses(
        (status = 202, description = "Request accepted", body = TransitionResponse),
        (status = 400, description = "Malformed color"),
        (status = 404, description = "Unknown subject"),
    ),
    params(("id" = String, Path, description = "Subject id")),
    tag = "Painting"
)]
pub async fn handle_set_color(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ColorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let color: TargetColor = state.config.palette.resolve(&request.color)?;
    let subject = find_subject(&state, &id).await?;
    let session = attach_session(&state, &subject.id).await?;

    let snapshot = match session.request(color).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            // Closed by a concurrent delete
            if state.subjects.get(&subject.id).await?.is_none() {
                return Err(ApiError::SubjectNotFound);
            }
            return Err(e);
        }
    };

    tracing::info!(
        subject = %subject.id,
        color = %color,
        is_transitioning = snapshot.is_transitioning(),
        "Color requested"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(TransitionResponse::new(&snapshot, &state.config)),
    ))
}

/// Current painting transition of a subject
#[utoipa::path(
    get,
    path = "/api/subjects/{id}/transition",
    responses(
        (status = 200, description = "Transition snapshot", body = TransitionResponse),
        (status = 404, description = "Unknown subject"),
    ),
    params(("id" = String, Path, description = "Subject id")),
    tag = "Painting"
)]
pub async fn handle_transition(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TransitionResponse>, ApiError> {
    let subject = find_subject(&state, &id).await?;
    let session = attach_session(&state, &subject.id).await?;
    Ok(Json(TransitionResponse::new(&session.state(), &state.config)))
}

/// Preview of the subject in its displayed color
///
/// Renders the color currently displayed, never a pending one. When a newer
/// preview of the same subject starts before this one finishes, this one
/// answers 409 instead of returning a stale image.
#[utoipa::path(
    get,
    path = "/api/subjects/{id}/preview",
    responses(
        (status = 200, description = "Preview PNG", content_type = "image/png"),
        (status = 404, description = "Unknown subject"),
        (status = 409, description = "Superseded by a newer preview"),
    ),
    params(("id" = String, Path, description = "Subject id")),
    tag = "Painting"
)]
pub async fn handle_preview(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let subject = find_subject(&state, &id).await?;
    let session = attach_session(&state, &subject.id).await?;
    let color = session.displayed();

    tracing::debug!(subject = %subject.id, color = %color, "Preview requested");

    let png_bytes = state
        .recolor
        .render_latest(session.gate(), subject.prepared.clone(), color)
        .await?
        .ok_or(ApiError::Superseded)?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("image/png")),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ],
        png_bytes,
    )
        .into_response())
}
