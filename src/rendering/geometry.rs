//! Pan/zoom and the output size guard.

use image::imageops::{self, FilterType};
use image::Rgba;
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};

use crate::error::TransformError;
use crate::models::{GeometricTransform, RasterImage};

/// Fill for output pixels that map outside the source.
const FILL: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Zoom about the image center, then pan.
///
/// The output has the same dimensions as the input. `offset` is in UI units:
/// one `normalization` unit spans the full width (or height), so an offset of
/// `normalization / 2` shifts the image by half its size.
///
/// The identity transform hands back the input buffer unchanged.
pub fn apply_geometric_transform(
    image: RasterImage,
    transform: &GeometricTransform,
    normalization: f32,
) -> Result<RasterImage, TransformError> {
    if transform.is_identity() {
        return Ok(image);
    }
    validate_transform(transform)?;

    let GeometricTransform { scale, offset } = *transform;
    let (width, height) = image.dimensions();
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let pan_x = offset.x / normalization * width as f32;
    let pan_y = offset.y / normalization * height as f32;

    let projection = Projection::translate(-cx, -cy)
        .and_then(Projection::scale(scale, scale))
        .and_then(Projection::translate(cx + pan_x, cy + pan_y));

    let mut out = allocate(width, height)?;
    warp_into(&image, &projection, Interpolation::Bilinear, FILL, &mut out);
    Ok(out)
}

/// Scale must be positive and finite, offsets finite.
pub fn validate_transform(transform: &GeometricTransform) -> Result<(), TransformError> {
    let GeometricTransform { scale, offset } = *transform;
    if !scale.is_finite() || scale <= 0.0 || !offset.x.is_finite() || !offset.y.is_finite() {
        return Err(TransformError::InvalidGeometry {
            scale,
            dx: offset.x,
            dy: offset.y,
        });
    }
    Ok(())
}

/// Allocate an RGBA buffer, reporting failure instead of aborting.
fn allocate(width: u32, height: u32) -> Result<RasterImage, TransformError> {
    let oom = || TransformError::OutOfMemory { width, height };

    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(oom)?;

    let mut data: Vec<u8> = Vec::new();
    data.try_reserve_exact(len).map_err(|_| oom())?;
    data.resize(len, 0);

    RasterImage::from_raw(width, height, data).ok_or_else(oom)
}

/// Downscale so neither side exceeds `max_dimension`, keeping aspect ratio.
///
/// Images already within bounds are returned as-is.
pub fn fit_within(image: RasterImage, max_dimension: u32) -> RasterImage {
    let (width, height) = image.dimensions();
    if max_dimension == 0 || (width <= max_dimension && height <= max_dimension) {
        return image;
    }

    let factor = f64::min(
        max_dimension as f64 / width as f64,
        max_dimension as f64 / height as f64,
    );
    let new_width = ((width as f64 * factor).floor() as u32).max(1);
    let new_height = ((height as f64 * factor).floor() as u32).max(1);

    tracing::debug!(
        from = %format!("{width}x{height}"),
        to = %format!("{new_width}x{new_height}"),
        "Downscaling to fit size limit"
    );

    imageops::resize(&image, new_width, new_height, FilterType::Triangle)
}
