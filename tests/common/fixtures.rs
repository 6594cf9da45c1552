//! Test fixtures: small product-like images encoded as PNG.

use factory_tint::PixelBuffer;
use refinish::rendering::{encode_png, PngQuality};

/// Body color of the fixture subject
pub const BODY: [u8; 4] = [150, 40, 40, 255];

/// Highlight stripe color (luma above the protection threshold)
pub const HIGHLIGHT: [u8; 4] = [250, 250, 250, 255];

/// Width of the transparent margin on the left
pub const MARGIN: u32 = 4;

/// A cut-out subject: transparent left margin, saturated body, white top row
pub fn subject(width: u32, height: u32) -> PixelBuffer {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let px = if x < MARGIN {
                [0, 0, 0, 0]
            } else if y == 0 {
                HIGHLIGHT
            } else {
                BODY
            };
            data.extend_from_slice(&px);
        }
    }
    PixelBuffer::from_raw(width, height, data).unwrap()
}

/// [`subject`] encoded as PNG
pub fn subject_png(width: u32, height: u32) -> Vec<u8> {
    png(&subject(width, height))
}

/// A fully opaque photo of one color, encoded as PNG
pub fn opaque_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    png(&PixelBuffer::filled(width, height, rgba).unwrap())
}

/// Encode any buffer as PNG
pub fn png(buffer: &PixelBuffer) -> Vec<u8> {
    encode_png(buffer, PngQuality::Preview).unwrap()
}
