//! Raster application of color matrices and the vignette overlay.

use rayon::prelude::*;
use tone_matrix::{darken_rgba, vignette_alpha, ColorMatrix};

use crate::models::RasterImage;

/// Apply `matrix` to every pixel.
///
/// The identity matrix returns the input buffer untouched. Otherwise pixels
/// are transformed in place across the rayon pool; each pixel depends only on
/// itself, so the result is independent of scheduling.
pub fn apply_color_matrix(mut image: RasterImage, matrix: &ColorMatrix) -> RasterImage {
    if matrix.is_identity() {
        return image;
    }

    image.par_chunks_exact_mut(4).for_each(|px| {
        let out = matrix.apply_rgba([px[0], px[1], px[2], px[3]]);
        px.copy_from_slice(&out);
    });

    image
}

/// Darken toward the corners with a radial black overlay.
///
/// `intensity` is the overlay alpha at the corners; 0.0 is a no-op.
pub fn apply_vignette(mut image: RasterImage, intensity: f32) -> RasterImage {
    if intensity <= 0.0 || !intensity.is_finite() {
        return image;
    }

    let (width, height) = image.dimensions();
    let row_len = width as usize * 4;
    if row_len == 0 {
        return image;
    }

    image
        .par_chunks_exact_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let alpha = vignette_alpha(x as u32, y as u32, width, height, intensity);
                let out = darken_rgba([px[0], px[1], px[2], px[3]], alpha);
                px.copy_from_slice(&out);
            }
        });

    image
}
