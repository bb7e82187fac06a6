//! Decoding fetched bodies and encoding temporary JPEG files.

use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::{FetchError, SubmitError};
use crate::models::RasterImage;

/// Decode a JPEG or PNG body into an RGBA raster.
pub fn decode_image(bytes: &[u8]) -> Result<RasterImage, FetchError> {
    let format = image::guess_format(bytes)
        .map_err(|e| FetchError::Undecodable(format!("unrecognized format: {e}")))?;

    if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png) {
        return Err(FetchError::Undecodable(format!(
            "unsupported format: {format:?}"
        )));
    }

    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| FetchError::Undecodable(e.to_string()))?;

    Ok(decoded.into_rgba8())
}

/// Encode `image` as JPEG into a fresh `wallpaper_*.jpg` file under `dir`.
///
/// The file is deleted when the returned handle is dropped. Alpha is
/// discarded.
pub fn write_temp_jpeg(
    image: &RasterImage,
    dir: &Path,
    quality: u8,
) -> Result<NamedTempFile, SubmitError> {
    std::fs::create_dir_all(dir)?;

    let mut file = tempfile::Builder::new()
        .prefix("wallpaper_")
        .suffix(".jpg")
        .tempfile_in(dir)?;

    let rgb: RgbImage = image.convert();
    {
        let mut writer = BufWriter::new(file.as_file_mut());
        let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));
        encoder.encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )?;
        writer.flush()?;
    }

    tracing::debug!(
        path = %file.path().display(),
        width = rgb.width(),
        height = rgb.height(),
        quality,
        "Wrote temporary JPEG"
    );

    Ok(file)
}
