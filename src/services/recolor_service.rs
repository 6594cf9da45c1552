use crate::error::RenderError;
use crate::models::{AppConfig, Subject, SubjectId};
use crate::rendering::{encode_png, PngQuality};
use factory_tint::{
    isolate_subject, AlphaPassthrough, PixelBuffer, PreparedSubject, Recolorer, ResultGate,
    SubjectIsolator, TargetColor, Watermark,
};
use std::sync::Arc;

/// High-level recolor service: upload preparation and PNG rendering
///
/// All pixel work runs under `spawn_blocking` so the async runtime is never
/// blocked by resampling, blending or PNG compression. Cloning is cheap.
#[derive(Clone)]
pub struct RecolorService {
    recolorer: Arc<Recolorer>,
    isolator: Arc<dyn SubjectIsolator>,
    isolation_max_dimension: u32,
    watermark: Option<Arc<Watermark>>,
}

impl RecolorService {
    pub fn new(recolorer: Recolorer, isolation_max_dimension: u32) -> Self {
        Self {
            recolorer: Arc::new(recolorer),
            isolator: Arc::new(AlphaPassthrough),
            isolation_max_dimension,
            watermark: None,
        }
    }

    /// Build from the engine and watermark sections of the config
    pub fn from_config(config: &AppConfig, watermark: Option<Watermark>) -> Self {
        let watermark = if config.watermark.enabled {
            watermark.map(|w| {
                w.opacity(config.watermark.opacity)
                    .scale(config.watermark.scale)
            })
        } else {
            None
        };
        Self::new(config.recolorer(), config.engine.isolation_max_dimension)
            .with_watermark(watermark)
    }

    /// Replace the background remover used for opaque uploads
    pub fn with_isolator(mut self, isolator: Arc<dyn SubjectIsolator>) -> Self {
        self.isolator = isolator;
        self
    }

    pub fn with_watermark(mut self, watermark: Option<Watermark>) -> Self {
        self.watermark = watermark.map(Arc::new);
        self
    }

    pub fn has_watermark(&self) -> bool {
        self.watermark.is_some()
    }

    pub fn recolorer(&self) -> &Recolorer {
        &self.recolorer
    }

    /// Decode an upload, cut it out if needed and prepare it for painting
    pub async fn load_subject(&self, bytes: Vec<u8>) -> Result<Subject, RenderError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.load_subject_blocking(&bytes))
            .await
            .map_err(|e| RenderError::Task(e.to_string()))?
    }

    /// Blocking body of [`load_subject`](Self::load_subject)
    pub fn load_subject_blocking(&self, bytes: &[u8]) -> Result<Subject, RenderError> {
        let id = SubjectId::from_bytes(bytes);
        let photo = PixelBuffer::decode(bytes)?;
        let had_transparency = photo.has_transparency();

        tracing::debug!(
            subject = %id,
            width = photo.width(),
            height = photo.height(),
            had_transparency,
            "Decoded upload"
        );

        // Uploads with their own alpha are already cut out
        let cutout = if had_transparency {
            photo
        } else {
            isolate_subject(
                self.isolator.as_ref(),
                &photo,
                self.isolation_max_dimension,
                &mut |progress| tracing::debug!(subject = %id, %progress, "Isolating subject"),
            )?
        };

        let prepared = self.recolorer.prepare(&cutout)?;
        Ok(Subject::new(id, prepared, had_transparency))
    }

    /// Paint `prepared` in `color` and encode it as PNG
    pub async fn render_png(
        &self,
        prepared: Arc<PreparedSubject>,
        color: TargetColor,
        watermark: bool,
        quality: PngQuality,
    ) -> Result<Vec<u8>, RenderError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || {
            service.render_png_blocking(&prepared, color, watermark, quality)
        })
        .await
        .map_err(|e| RenderError::Task(e.to_string()))?
    }

    /// Like [`render_png`](Self::render_png), but only returns the result if
    /// no newer render was started through `gate` in the meantime
    pub async fn render_latest(
        &self,
        gate: &ResultGate,
        prepared: Arc<PreparedSubject>,
        color: TargetColor,
    ) -> Result<Option<Vec<u8>>, RenderError> {
        let ticket = gate.issue();
        let png = self
            .render_png(prepared, color, false, PngQuality::Preview)
            .await?;
        let accepted = gate.accept(ticket, png);
        if accepted.is_none() {
            tracing::debug!(generation = ticket.generation(), "Discarded superseded render");
        }
        Ok(accepted)
    }

    /// Blocking body of [`render_png`](Self::render_png)
    pub fn render_png_blocking(
        &self,
        prepared: &PreparedSubject,
        color: TargetColor,
        watermark: bool,
        quality: PngQuality,
    ) -> Result<Vec<u8>, RenderError> {
        let painted = self.recolorer.paint(prepared, color)?;
        let finished = match (&self.watermark, watermark) {
            (Some(mark), true) => mark.composite_behind(&painted)?,
            _ => painted,
        };
        encode_png(&finished, quality)
    }
}
