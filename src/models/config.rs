use crate::assets::AssetLoader;
use crate::models::swatch::{Palette, Swatch};
use factory_tint::{Recolorer, StagePolicy, DEFAULT_PRESET};
use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from config.yaml
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Pipeline limits and paint recipe
    #[serde(default)]
    pub engine: EngineConfig,

    /// Swatches offered to clients
    #[serde(default = "default_palette")]
    pub palette: Palette,

    /// Watermark placement (image comes from WATERMARK_FILE)
    #[serde(default)]
    pub watermark: WatermarkConfig,

    /// Download and share naming
    #[serde(default)]
    pub share: ShareConfig,
}

/// Pipeline limits and paint recipe
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    /// Long-edge cap for uploaded subjects
    pub max_dimension: u32,
    /// Long-edge cap before subject isolation
    pub isolation_max_dimension: u32,
    /// Debounce delay before a requested color is painted
    pub transition_delay_ms: u64,
    /// Largest accepted upload body
    pub max_upload_bytes: usize,
    /// Working-set budget per recolor call
    pub max_working_bytes: Option<u64>,
    /// Named preset (factory-finish, lean, re-lighting)
    pub preset: String,
    /// Full recipe, overriding `preset`
    pub policy: Option<StagePolicy>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_dimension: factory_tint::preprocess::DISPLAY_MAX_DIMENSION,
            isolation_max_dimension: factory_tint::preprocess::ISOLATION_MAX_DIMENSION,
            transition_delay_ms: factory_tint::DEFAULT_TRANSITION_DELAY.as_millis() as u64,
            max_upload_bytes: 25 * 1024 * 1024,
            max_working_bytes: None,
            preset: DEFAULT_PRESET.to_string(),
            policy: None,
        }
    }
}

/// Watermark placement
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WatermarkConfig {
    pub enabled: bool,
    pub opacity: f32,
    pub scale: f32,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            opacity: factory_tint::output::DEFAULT_WATERMARK_OPACITY,
            scale: factory_tint::output::DEFAULT_WATERMARK_SCALE,
        }
    }
}

/// Download and share naming
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ShareConfig {
    /// Download file names are `<prefix>-<color>.png`
    pub filename_prefix: String,
    /// Share sheet title
    pub title: String,
    /// Text placed before "Color: <name>"
    pub message: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            filename_prefix: "filter".to_string(),
            title: "Factory Paint".to_string(),
            message: String::new(),
        }
    }
}

fn default_palette() -> Palette {
    Palette::new(vec![Swatch::new("Original", "transparent")])
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            palette: default_palette(),
            watermark: WatermarkConfig::default(),
            share: ShareConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from AssetLoader (embedded or external)
    pub fn load_from_assets(loader: &AssetLoader) -> Self {
        match loader.read_config_string() {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    let config: Self = config;
                    tracing::info!(
                        swatches = config.palette.len(),
                        preset = %config.engine.preset,
                        max_dimension = config.engine.max_dimension,
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// The paint recipe: inline policy, else named preset, else the default
    pub fn stage_policy(&self) -> StagePolicy {
        if let Some(ref policy) = self.engine.policy {
            match policy.validate() {
                Ok(()) => return policy.clone(),
                Err(e) => tracing::warn!(%e, "Invalid inline policy, falling back to preset"),
            }
        }
        StagePolicy::preset(&self.engine.preset).unwrap_or_else(|| {
            tracing::warn!(preset = %self.engine.preset, "Unknown preset, using {DEFAULT_PRESET}");
            StagePolicy::default()
        })
    }

    /// A recolorer configured from the engine section
    pub fn recolorer(&self) -> Recolorer {
        Recolorer::new()
            .policy(self.stage_policy())
            .max_dimension(self.engine.max_dimension)
            .max_working_bytes(self.engine.max_working_bytes)
    }

    pub fn transition_delay(&self) -> Duration {
        Duration::from_millis(self.engine.transition_delay_ms)
    }
}
