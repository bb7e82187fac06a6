//! Test fixtures: generated images and pipeline settings.

use image::{ImageFormat, Rgba};
use std::io::Cursor;
use std::path::{Path, PathBuf};

use walltone::models::{PipelineSettings, RasterImage};

/// Paths served by the mock image server
pub mod paths {
    pub const PORTRAIT_PNG: &str = "/walls/portrait.png";
    pub const LANDSCAPE_JPG: &str = "/walls/landscape.jpg";
    pub const MOVED: &str = "/walls/moved.png";
    pub const MISSING: &str = "/walls/missing.png";
    pub const HTML: &str = "/walls/not-an-image.png";
    pub const SLOW: &str = "/walls/slow.png";
}

/// Deterministic RGB gradient with opaque alpha
pub fn gradient(width: u32, height: u32) -> RasterImage {
    RasterImage::from_fn(width, height, |x, y| {
        Rgba([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x + y) % 256) as u8,
            255,
        ])
    })
}

/// Single-color image
pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RasterImage {
    RasterImage::from_pixel(width, height, Rgba(rgba))
}

pub fn png_bytes(image: &RasterImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

pub fn jpeg_bytes(image: &RasterImage) -> Vec<u8> {
    let rgb = image::DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let mut buf = Cursor::new(Vec::new());
    rgb.write_to(&mut buf, ImageFormat::Jpeg).unwrap();
    buf.into_inner()
}

/// Settings with short timeouts and temp files under `cache_dir`
pub fn settings(cache_dir: &Path) -> PipelineSettings {
    PipelineSettings {
        fetch_timeout_secs: 5,
        connect_timeout_secs: 2,
        cache_dir: Some(cache_dir.to_path_buf()),
        ..Default::default()
    }
}

/// Temporary wallpaper files currently present in `dir`
pub fn temp_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("wallpaper_"))
        })
        .collect()
}
