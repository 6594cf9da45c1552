pub mod png_export;

pub use png_export::{encode_png, PngQuality};
