pub mod config;
pub mod target;
pub mod wallpaper;

pub use config::{AppConfig, PipelineSettings};
pub use target::{GeometricTransform, Surface, Vector2, WallpaperTarget};
pub use wallpaper::{FilterSpec, Wallpaper};

/// Owned 8-bit raster with alpha, stored in RGBA channel order.
pub type RasterImage = image::RgbaImage;
