use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::Wallpaper;

/// Application configuration loaded from config.yaml
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Pipeline tuning
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// Wallpaper catalog
    #[serde(default)]
    pub wallpapers: Vec<Wallpaper>,
}

/// Settings consumed by the commit pipeline
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PipelineSettings {
    /// Total time allowed per fetch attempt, in seconds
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// Connect timeout per fetch attempt, in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Redirects followed before giving up
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Longest allowed side of the committed image, in pixels
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,

    /// JPEG quality for temporary files handed to the surface (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    /// UI offset units per full image width/height
    #[serde(default = "default_offset_normalization")]
    pub offset_normalization: f32,

    /// Directory for temporary files (defaults to the system temp dir)
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    15
}

fn default_max_redirects() -> usize {
    10
}

fn default_max_dimension() -> u32 {
    4096
}

fn default_jpeg_quality() -> u8 {
    95
}

fn default_offset_normalization() -> f32 {
    1000.0
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: default_fetch_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            max_redirects: default_max_redirects(),
            max_dimension: default_max_dimension(),
            jpeg_quality: default_jpeg_quality(),
            offset_normalization: default_offset_normalization(),
            cache_dir: None,
        }
    }
}

impl PipelineSettings {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Quality clamped to the range JPEG encoders accept.
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality.clamp(1, 100)
    }

    /// Normalization constant, falling back to the default when unusable.
    pub fn offset_normalization(&self) -> f32 {
        if self.offset_normalization.is_finite() && self.offset_normalization > 0.0 {
            self.offset_normalization
        } else {
            default_offset_normalization()
        }
    }

    /// Resolved directory for temporary files.
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("walltone"))
    }
}

impl AppConfig {
    /// Load configuration from a YAML file, falling back to defaults
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::debug!("No config file given, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    let config: Self = config;
                    tracing::info!(
                        path = %path.display(),
                        wallpapers = config.wallpapers.len(),
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
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Look up a wallpaper by id
    pub fn get_wallpaper(&self, id: &str) -> Option<&Wallpaper> {
        self.wallpapers.iter().find(|w| w.id == id)
    }
}
