use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::models::{slugify, AppConfig, Subject, SubjectId};
use crate::rendering::PngQuality;
use crate::server::AppState;
use crate::services::SubjectStore;
use factory_tint::TargetColor;

/// Response from a successful upload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubjectResponse {
    /// Content-derived subject id
    pub id: String,
    /// Width after normalization
    pub width: u32,
    /// Height after normalization
    pub height: u32,
    /// Whether the upload carried its own transparency
    pub has_transparency: bool,
    /// When the subject was uploaded (RFC 3339, UTC)
    pub uploaded_at: String,
}

impl From<&Subject> for SubjectResponse {
    fn from(subject: &Subject) -> Self {
        let (width, height) = subject.dimensions();
        Self {
            id: subject.id.to_string(),
            width,
            height,
            has_transparency: subject.had_transparency,
            uploaded_at: subject.uploaded_at.to_rfc3339(),
        }
    }
}

/// Query parameters for image export
#[derive(Debug, Deserialize, IntoParams)]
pub struct ImageQuery {
    /// Swatch name, hex color or "transparent" (default: no tint)
    pub color: Option<String>,
    /// Draw the configured watermark behind the subject (default: true)
    pub watermark: Option<bool>,
}

/// Query parameters for share metadata
#[derive(Debug, Deserialize, IntoParams)]
pub struct ShareQuery {
    /// Swatch name, hex color or "transparent" (default: no tint)
    pub color: Option<String>,
}

/// Share sheet payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShareResponse {
    /// Suggested file name
    pub filename: String,
    /// Share sheet title
    pub title: String,
    /// Share text naming the color
    pub text: String,
    /// Where the painted image can be downloaded
    pub image_url: String,
}

/// Resolve an optional color parameter against the palette
pub fn resolve_color(config: &AppConfig, color: Option<&str>) -> Result<TargetColor, ApiError> {
    match color.map(str::trim).filter(|c| !c.is_empty()) {
        Some(input) => Ok(config.palette.resolve(input)?),
        None => Ok(TargetColor::NoTint),
    }
}

/// Look up a stored subject
pub async fn find_subject(state: &AppState, id: &str) -> Result<Subject, ApiError> {
    state
        .subjects
        .get(&SubjectId::new(id))
        .await?
        .ok_or(ApiError::SubjectNotFound)
}

/// Download file name: `<prefix>-<color name>.png`
pub fn export_filename(config: &AppConfig, color: TargetColor) -> String {
    format!(
        "{}-{}.png",
        slugify(&config.share.filename_prefix),
        config.palette.slug_for(color)
    )
}

/// Upload a subject photo
///
/// The body is the raw image (PNG, JPEG or WebP). Photos without
/// transparency are passed through subject isolation first. The subject is
/// bounded to the configured maximum dimension and kept in memory under a
/// content-derived id.
#[utoipa::path(
    post,
    path = "/api/subjects",
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "Subject stored", body = SubjectResponse),
        (status = 400, description = "Body is not a decodable image"),
        (status = 413, description = "Upload too large"),
    ),
    tag = "Subjects"
)]
pub async fn handle_upload(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    if body.is_empty() {
        return Err(ApiError::InvalidImage("empty body".to_string()));
    }

    tracing::info!(bytes = body.len(), "Upload received");

    let subject = state.recolor.load_subject(body.to_vec()).await?;
    let response = SubjectResponse::from(&subject);

    tracing::info!(
        subject = %subject.id,
        width = response.width,
        height = response.height,
        has_transparency = response.has_transparency,
        "Subject stored"
    );

    state.subjects.insert(subject).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Download the subject painted in a color
///
/// Returns a lossless PNG named after the color's swatch.
#[utoipa::path(
    get,
    path = "/api/subjects/{id}/image",
    responses(
        (status = 200, description = "Painted PNG", content_type = "image/png"),
        (status = 400, description = "Malformed color"),
        (status = 404, description = "Unknown subject"),
    ),
    params(
        ("id" = String, Path, description = "Subject id"),
        ImageQuery,
    ),
    tag = "Subjects"
)]
pub async fn handle_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, ApiError> {
    let color = resolve_color(&state.config, query.color.as_deref())?;
    let subject = find_subject(&state, &id).await?;
    let watermark = query.watermark.unwrap_or(true);

    tracing::info!(subject = %subject.id, color = %color, watermark, "Image export requested");

    let png_bytes = state
        .recolor
        .render_png(subject.prepared.clone(), color, watermark, PngQuality::Export)
        .await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_filename(&state.config, color)
    );
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|e| ApiError::Internal(format!("bad file name: {e}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("image/png")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        png_bytes,
    )
        .into_response())
}

/// Share sheet metadata for the subject in a color
#[utoipa::path(
    get,
    path = "/api/subjects/{id}/share",
    responses(
        (status = 200, description = "Share payload", body = ShareResponse),
        (status = 400, description = "Malformed color"),
        (status = 404, description = "Unknown subject"),
    ),
    params(
        ("id" = String, Path, description = "Subject id"),
        ShareQuery,
    ),
    tag = "Subjects"
)]
pub async fn handle_share(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ShareQuery>,
) -> Result<Json<ShareResponse>, ApiError> {
    let color = resolve_color(&state.config, query.color.as_deref())?;
    let subject = find_subject(&state, &id).await?;
    let config = &state.config;

    let name = config.palette.name_for(color);
    let text = format!("{} Color: {name}", config.share.message)
        .trim()
        .to_string();
    let encoded_color = utf8_percent_encode(&color.to_string(), NON_ALPHANUMERIC).to_string();
    let image_url = format!("/api/subjects/{}/image?color={encoded_color}", subject.id);

    Ok(Json(ShareResponse {
        filename: export_filename(config, color),
        title: config.share.title.clone(),
        text,
        image_url,
    }))
}

/// Forget a subject and stop its painting session
#[utoipa::path(
    delete,
    path = "/api/subjects/{id}",
    responses(
        (status = 204, description = "Subject removed"),
        (status = 404, description = "Unknown subject"),
    ),
    params(("id" = String, Path, description = "Subject id")),
    tag = "Subjects"
)]
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = SubjectId::new(id);
    state
        .subjects
        .remove(&id)
        .await?
        .ok_or(ApiError::SubjectNotFound)?;
    let had_session = state.sessions.remove(&id).await;

    tracing::info!(subject = %id, had_session, "Subject removed");
    Ok(StatusCode::NO_CONTENT)
}
