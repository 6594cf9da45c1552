//! Dense RGBA8 pixel buffers.
//!
//! [`PixelBuffer`] is the only image representation the pipeline works on:
//! row-major, origin top-left, four bytes per pixel. Every stage takes
//! buffers by reference and returns a freshly allocated one.

use crate::api::TintError;
use image::{ImageBuffer, Rgba, RgbaImage};
use rayon::prelude::*;

/// Bytes per RGBA8 pixel.
pub const CHANNELS: usize = 4;

/// An owned RGBA8 image.
///
/// # Example
///
/// ```
/// use factory_tint::PixelBuffer;
///
/// let buffer = PixelBuffer::filled(3, 2, [10, 20, 30, 255]).unwrap();
/// assert_eq!(buffer.dimensions(), (3, 2));
/// assert_eq!(buffer.pixel(2, 1), [10, 20, 30, 255]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a fully transparent buffer.
    ///
    /// Allocation goes through `try_reserve_exact`, so an oversized request
    /// surfaces as [`TintError::Allocation`] instead of aborting.
    pub fn new(width: u32, height: u32) -> Result<Self, TintError> {
        let data = alloc_pixels(width, height)?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Allocate a buffer where every pixel is `rgba`.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, TintError> {
        let mut buffer = Self::new(width, height)?;
        for px in buffer.data.chunks_exact_mut(CHANNELS) {
            px.copy_from_slice(&rgba);
        }
        Ok(buffer)
    }

    /// Wrap raw RGBA bytes, checking the length against the dimensions.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, TintError> {
        let expected = byte_len(width, height)?;
        if data.len() != expected {
            return Err(TintError::BufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Decode PNG/JPEG/WebP bytes into an RGBA buffer.
    pub fn decode(bytes: &[u8]) -> Result<Self, TintError> {
        let decoded =
            image::load_from_memory(bytes).map_err(|e| TintError::Decode(e.to_string()))?;
        Ok(Self::from(decoded.to_rgba8()))
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() / CHANNELS
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    #[inline]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Iterate over pixels as 4-byte slices.
    pub fn pixels(&self) -> std::slice::ChunksExact<'_, u8> {
        self.data.chunks_exact(CHANNELS)
    }

    /// Read one pixel.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// True when any pixel is not fully opaque.
    pub fn has_transparency(&self) -> bool {
        self.pixels().any(|px| px[3] < 255)
    }

    /// True when both buffers carry the same alpha plane.
    pub fn alpha_matches(&self, other: &PixelBuffer) -> bool {
        self.dimensions() == other.dimensions()
            && self
                .pixels()
                .zip(other.pixels())
                .all(|(a, b)| a[3] == b[3])
    }

    /// Fail unless `other` has the same dimensions.
    pub(crate) fn ensure_same_shape(&self, other: &PixelBuffer) -> Result<(), TintError> {
        if self.dimensions() != other.dimensions() {
            return Err(TintError::DimensionMismatch {
                left: self.dimensions(),
                right: other.dimensions(),
            });
        }
        Ok(())
    }

    /// Build a same-shaped buffer by filling each output row with `fill`.
    ///
    /// Rows are handed out on the rayon pool; `fill` receives the row index
    /// and the row's output bytes, and reads any source buffers it captured.
    pub(crate) fn par_map_rows<F>(&self, fill: F) -> Result<PixelBuffer, TintError>
    where
        F: Fn(usize, &mut [u8]) + Send + Sync,
    {
        let mut out = PixelBuffer::new(self.width, self.height)?;
        let stride = self.stride();
        if stride == 0 {
            return Ok(out);
        }
        out.data
            .par_chunks_mut(stride)
            .enumerate()
            .for_each(|(y, row)| fill(y, row));
        Ok(out)
    }

    /// Row `y` as bytes.
    #[inline]
    pub(crate) fn row(&self, y: usize) -> &[u8] {
        let stride = self.stride();
        &self.data[y * stride..(y + 1) * stride]
    }

    /// Copy into an `image` buffer (for resampling and encoding).
    pub fn to_rgba_image(&self) -> Result<RgbaImage, TintError> {
        let expected = self.data.len();
        ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(self.width, self.height, self.data.clone())
            .ok_or(TintError::BufferSize {
                width: self.width,
                height: self.height,
                expected,
                actual: self.data.len(),
            })
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.into_raw(),
        }
    }
}

/// Byte length of a `width`x`height` RGBA buffer, or an allocation error on
/// overflow.
fn byte_len(width: u32, height: u32) -> Result<usize, TintError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(CHANNELS))
        .ok_or(TintError::Allocation { width, height })
}

/// Zeroed pixel storage, failing instead of aborting when memory is short.
pub(crate) fn alloc_pixels(width: u32, height: u32) -> Result<Vec<u8>, TintError> {
    let len = byte_len(width, height)?;
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| TintError::Allocation { width, height })?;
    data.resize(len, 0);
    Ok(data)
}
