pub mod config;
pub mod subject;
pub mod swatch;

pub use config::{AppConfig, EngineConfig, ShareConfig, WatermarkConfig};
pub use subject::{Subject, SubjectId};
pub use swatch::{slugify, Palette, Swatch, CUSTOM_COLOR_NAME, ORIGINAL_COLOR_NAME};
