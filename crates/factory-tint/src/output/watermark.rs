//! Faint brand mark composited behind a finished subject.

use crate::api::TintError;
use crate::buffer::{PixelBuffer, CHANNELS};
use crate::color::to_u8;
use crate::preprocess::resample;

/// Default opacity of the mark.
pub const DEFAULT_WATERMARK_OPACITY: f32 = 0.15;

/// Default size of the mark relative to the canvas's shorter side.
pub const DEFAULT_WATERMARK_SCALE: f32 = 0.5;

/// A watermark image plus how to place it.
///
/// The mark is fitted into a centered square whose side is `scale` times the
/// canvas's shorter dimension, drawn at `opacity`, and placed *behind* the
/// subject: opaque subject pixels are never changed.
///
/// # Example
///
/// ```
/// use factory_tint::{PixelBuffer, Watermark};
///
/// let mark = PixelBuffer::filled(8, 8, [0, 0, 0, 255]).unwrap();
/// let watermark = Watermark::new(mark).opacity(0.2).scale(0.5);
///
/// let canvas = PixelBuffer::new(20, 10).unwrap();
/// let out = watermark.composite_behind(&canvas).unwrap();
/// assert_eq!(out.pixel(10, 5)[3], 51); // 0.2 * 255
/// assert_eq!(out.pixel(0, 0)[3], 0);
/// ```
#[derive(Debug, Clone)]
pub struct Watermark {
    image: PixelBuffer,
    opacity: f32,
    scale: f32,
}

impl Watermark {
    pub fn new(image: PixelBuffer) -> Self {
        Self {
            image,
            opacity: DEFAULT_WATERMARK_OPACITY,
            scale: DEFAULT_WATERMARK_SCALE,
        }
    }

    /// Set the mark's opacity (clamped to 0..=1).
    #[inline]
    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Set the mark's box size relative to the shorter side (clamped to 0..=1).
    #[inline]
    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale.clamp(0.0, 1.0);
        self
    }

    /// Where the mark lands on a `width`x`height` canvas: `(x, y, w, h)`.
    pub fn placement(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let side = (width.min(height) as f32 * self.scale).round() as u32;
        let (mw, mh) = self.image.dimensions();
        if side == 0 || mw == 0 || mh == 0 {
            return (0, 0, 0, 0);
        }
        let fit = side as f32 / mw.max(mh) as f32;
        let w = ((mw as f32 * fit).round() as u32).clamp(1, width);
        let h = ((mh as f32 * fit).round() as u32).clamp(1, height);
        ((width - w) / 2, (height - h) / 2, w, h)
    }

    /// Composite the mark under `subject` (source-over, subject on top).
    pub fn composite_behind(&self, subject: &PixelBuffer) -> Result<PixelBuffer, TintError> {
        let (ox, oy, w, h) = self.placement(subject.width(), subject.height());
        if w == 0 || h == 0 || self.opacity <= 0.0 {
            return Ok(subject.clone());
        }
        let mark = resample(&self.image, w, h)?;
        let (ox, oy) = (ox as usize, oy as usize);
        let (w, h) = (w as usize, h as usize);
        let opacity = self.opacity;

        subject.par_map_rows(|y, out| {
            let subject_row = subject.row(y);
            let mark_row = (oy..oy + h).contains(&y).then(|| mark.row(y - oy));
            for (x, (o, s)) in out
                .chunks_exact_mut(CHANNELS)
                .zip(subject_row.chunks_exact(CHANNELS))
                .enumerate()
            {
                let under = match mark_row {
                    Some(row) if (ox..ox + w).contains(&x) => {
                        let i = (x - ox) * CHANNELS;
                        Some(&row[i..i + CHANNELS])
                    }
                    _ => None,
                };
                match under {
                    None => o.copy_from_slice(s),
                    Some(m) => source_over(o, s, m, opacity),
                }
            }
        })
    }
}

/// `top` over `bottom` (with `bottom` alpha scaled by `opacity`), straight alpha.
fn source_over(out: &mut [u8], top: &[u8], bottom: &[u8], opacity: f32) {
    let ta = top[3] as f32 / 255.0;
    let ba = bottom[3] as f32 / 255.0 * opacity;
    let oa = ta + ba * (1.0 - ta);
    if oa <= 0.0 {
        out.copy_from_slice(&[0, 0, 0, 0]);
        return;
    }
    if ta >= 1.0 {
        out.copy_from_slice(top);
        return;
    }
    for c in 0..3 {
        let v = (top[c] as f32 * ta + bottom[c] as f32 * ba * (1.0 - ta)) / oa;
        out[c] = to_u8(v);
    }
    out[3] = to_u8(oa * 255.0);
}
