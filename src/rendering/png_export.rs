//! Lossless PNG export of painted subjects.

use crate::error::RenderError;
use factory_tint::PixelBuffer;
use std::io::Cursor;

/// How much effort to spend on the encoded size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PngQuality {
    /// Fast encode only (previews)
    Preview,
    /// Fast encode, then re-compressed with oxipng (downloads)
    Export,
}

/// Encode an RGBA buffer as an 8-bit RGBA PNG.
pub fn encode_png(buffer: &PixelBuffer, quality: PngQuality) -> Result<Vec<u8>, RenderError> {
    // Fast settings; oxipng re-compresses exports
    let png_bytes = encode_rgba(buffer)?;

    if quality == PngQuality::Preview {
        return Ok(png_bytes);
    }

    let started = std::time::Instant::now();
    let before = png_bytes.len();
    let optimized = oxipng::optimize_from_memory(
        &png_bytes,
        &oxipng::Options {
            strip: oxipng::StripChunks::Safe,
            optimize_alpha: false,
            ..Default::default()
        },
    )
    .unwrap_or(png_bytes);
    tracing::debug!(
        before,
        after = optimized.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Optimized PNG"
    );
    Ok(optimized)
}

fn encode_rgba(buffer: &PixelBuffer) -> Result<Vec<u8>, RenderError> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, buffer.width(), buffer.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Fast);
        encoder.set_filter(png::FilterType::NoFilter);
        let mut writer = encoder
            .write_header()
            .map_err(|e| RenderError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(buffer.as_raw())
            .map_err(|e| RenderError::PngEncode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}
