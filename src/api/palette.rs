use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::models::Swatch;
use crate::server::AppState;

/// One configured swatch
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SwatchResponse {
    /// Display name
    pub name: String,
    /// Color value as configured
    pub value: String,
    /// True for swatches that leave the photo as-is
    pub no_tint: bool,
}

impl TryFrom<&Swatch> for SwatchResponse {
    type Error = ApiError;

    fn try_from(swatch: &Swatch) -> Result<Self, Self::Error> {
        Ok(Self {
            name: swatch.name.clone(),
            value: swatch.value.clone(),
            no_tint: swatch.color()?.is_no_tint(),
        })
    }
}

/// List the configured paint swatches
#[utoipa::path(
    get,
    path = "/api/palette",
    responses(
        (status = 200, description = "Configured swatches", body = [SwatchResponse]),
    ),
    tag = "Palette"
)]
pub async fn handle_palette(
    State(state): State<AppState>,
) -> Result<Json<Vec<SwatchResponse>>, ApiError> {
    let swatches = state
        .config
        .palette
        .swatches()
        .iter()
        .filter_map(|swatch| match SwatchResponse::try_from(swatch) {
            Ok(response) => Some(response),
            Err(e) => {
                tracing::warn!(swatch = %swatch.name, %e, "Skipping unparseable swatch");
                None
            }
        })
        .collect();
    Ok(Json(swatches))
}
