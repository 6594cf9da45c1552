//! Per-pixel brightness and colorfulness measures used by the primer and the
//! protection mask.

/// Perceptual brightness, `0.299R + 0.587G + 0.114B`, in 0..=255.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> f32 {
    0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
}

/// Colorfulness, `(max - min) / max`, in 0..=1.
///
/// Black (`max == 0`) has saturation 0.
#[inline]
pub fn saturation(r: u8, g: u8, b: u8) -> f32 {
    let max = r.max(g).max(b);
    if max == 0 {
        return 0.0;
    }
    let min = r.min(g).min(b);
    (max - min) as f32 / max as f32
}

/// Absolute channel spread, `max - min`, in 0..=255.
#[inline]
pub fn chroma(r: u8, g: u8, b: u8) -> u8 {
    r.max(g).max(b) - r.min(g).min(b)
}

/// Round and clamp a float channel to a byte.
#[inline]
pub(crate) fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
