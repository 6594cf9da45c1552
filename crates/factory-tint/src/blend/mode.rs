//! Per-pixel blend-mode math.
//!
//! Channel values are floats in 0..=255. Separable modes follow the usual
//! 8-bit formulas; soft-light and color follow the W3C compositing rules,
//! evaluated on normalized channels.

use serde::{Deserialize, Serialize};

/// How a source layer combines with the accumulator underneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    /// Source replaces destination.
    Normal,
    /// `src * dst / 255`. Darkens; defines shadows.
    Multiply,
    /// `255 - (255 - src) * (255 - dst) / 255`. Lightens; carries highlights.
    Screen,
    /// Multiply or screen depending on the destination. Restores texture.
    Overlay,
    /// Gentle contrast-preserving tint.
    SoftLight,
    /// Hue and saturation of the source with the luminance of the destination.
    Color,
}

impl BlendMode {
    /// Combine `src` onto `dst`, before any alpha interpolation.
    ///
    /// # Example
    ///
    /// ```
    /// use factory_tint::blend::BlendMode;
    ///
    /// let out = BlendMode::Multiply.blend([255.0, 128.0, 0.0], [128.0, 128.0, 128.0]);
    /// assert_eq!(out[0], 128.0);
    /// assert!((out[1] - 64.25).abs() < 0.01);
    /// assert_eq!(out[2], 0.0);
    /// ```
    pub fn blend(self, src: [f32; 3], dst: [f32; 3]) -> [f32; 3] {
        match self {
            BlendMode::Normal => src,
            BlendMode::Multiply => separable(src, dst, multiply),
            BlendMode::Screen => separable(src, dst, screen),
            BlendMode::Overlay => separable(src, dst, overlay),
            BlendMode::SoftLight => separable(src, dst, soft_light),
            BlendMode::Color => color(src, dst),
        }
    }
}

#[inline]
fn separable(src: [f32; 3], dst: [f32; 3], f: fn(f32, f32) -> f32) -> [f32; 3] {
    [f(src[0], dst[0]), f(src[1], dst[1]), f(src[2], dst[2])]
}

#[inline]
fn multiply(src: f32, dst: f32) -> f32 {
    src * dst / 255.0
}

#[inline]
fn screen(src: f32, dst: f32) -> f32 {
    255.0 - (255.0 - src) * (255.0 - dst) / 255.0
}

#[inline]
fn overlay(src: f32, dst: f32) -> f32 {
    if dst < 128.0 {
        2.0 * src * dst / 255.0
    } else {
        255.0 - 2.0 * (255.0 - src) * (255.0 - dst) / 255.0
    }
}

fn soft_light(src: f32, dst: f32) -> f32 {
    let cs = src / 255.0;
    let cb = dst / 255.0;
    let out = if cs <= 0.5 {
        cb - (1.0 - 2.0 * cs) * cb * (1.0 - cb)
    } else {
        let d = if cb <= 0.25 {
            ((16.0 * cb - 12.0) * cb + 4.0) * cb
        } else {
            cb.sqrt()
        };
        cb + (2.0 * cs - 1.0) * (d - cb)
    };
    out * 255.0
}

/// Luminance as defined for non-separable blend modes.
#[inline]
fn lum(c: [f32; 3]) -> f32 {
    0.3 * c[0] + 0.59 * c[1] + 0.11 * c[2]
}

fn clip_color(c: [f32; 3]) -> [f32; 3] {
    let l = lum(c);
    let n = c[0].min(c[1]).min(c[2]);
    let x = c[0].max(c[1]).max(c[2]);
    let mut out = c;
    if n < 0.0 {
        for ch in &mut out {
            *ch = l + (*ch - l) * l / (l - n);
        }
    }
    if x > 1.0 {
        for ch in &mut out {
            *ch = l + (*ch - l) * (1.0 - l) / (x - l);
        }
    }
    out
}

fn set_lum(c: [f32; 3], l: f32) -> [f32; 3] {
    let d = l - lum(c);
    clip_color([c[0] + d, c[1] + d, c[2] + d])
}

fn color(src: [f32; 3], dst: [f32; 3]) -> [f32; 3] {
    let cs = src.map(|v| v / 255.0);
    let cb = dst.map(|v| v / 255.0);
    set_lum(cs, lum(cb)).map(|v| v * 255.0)
}
