//! Filter parameters → composed color matrix.
//!
//! Stage order is fixed: saturation, brightness, contrast, then the special
//! effects. Contrast pivots around mid-grey (128) and expects brightness to
//! have been applied already, so the order is not interchangeable.

use crate::matrix::ColorMatrix;
use crate::params::{FilterKind, FilterParameters};

/// Red luminance weight used by every desaturating transform.
pub const LUMA_R: f32 = 0.3086;
/// Green luminance weight used by every desaturating transform.
pub const LUMA_G: f32 = 0.6094;
/// Blue luminance weight used by every desaturating transform.
pub const LUMA_B: f32 = 0.0820;

/// Contrast pivot in 0–255 space.
pub const CONTRAST_PIVOT: f32 = 128.0;

/// Classic sepia tone.
pub const SEPIA: ColorMatrix = ColorMatrix::from_rows([
    [0.393, 0.769, 0.189, 0.0, 0.0],
    [0.349, 0.686, 0.168, 0.0, 0.0],
    [0.272, 0.534, 0.131, 0.0, 0.0],
    [0.0, 0.0, 0.0, 1.0, 0.0],
]);

/// Warm faded print: red lifted, blue pulled down.
pub const VINTAGE: ColorMatrix = ColorMatrix::scale_offset([1.1, 1.0, 0.8], [0.0; 3]);

/// Blue channel boost.
pub const COOL_TONE: ColorMatrix = ColorMatrix::scale_offset([1.0, 1.0, 1.2], [0.0; 3]);

/// Red channel boost.
pub const WARM_TONE: ColorMatrix = ColorMatrix::scale_offset([1.2, 1.0, 1.0], [0.0; 3]);

/// Luminance-preserving saturation. `s = 1` is identity, `s = 0` is grey.
pub fn saturation_matrix(s: f32) -> ColorMatrix {
    let r = LUMA_R * (1.0 - s);
    let g = LUMA_G * (1.0 - s);
    let b = LUMA_B * (1.0 - s);
    ColorMatrix::from_rows([
        [r + s, g, b, 0.0, 0.0],
        [r, g + s, b, 0.0, 0.0],
        [r, g, b + s, 0.0, 0.0],
        [0.0, 0.0, 0.0, 1.0, 0.0],
    ])
}

/// Additive brightness: `(brightness − 1) · 255` added to each color channel.
pub fn brightness_matrix(brightness: f32) -> ColorMatrix {
    let offset = (brightness - 1.0) * 255.0;
    ColorMatrix::scale_offset([1.0; 3], [offset; 3])
}

/// Contrast around mid-grey.
pub fn contrast_matrix(contrast: f32) -> ColorMatrix {
    let offset = CONTRAST_PIVOT * (1.0 - contrast);
    ColorMatrix::scale_offset([contrast; 3], [offset; 3])
}

/// Full-intensity target for a special effect.
///
/// Returns `None` for kinds that are not blended effects.
pub fn effect_target(kind: FilterKind) -> Option<ColorMatrix> {
    match kind {
        FilterKind::Sepia => Some(SEPIA),
        FilterKind::Vintage => Some(VINTAGE),
        FilterKind::CoolTone => Some(COOL_TONE),
        FilterKind::WarmTone => Some(WARM_TONE),
        FilterKind::BlackAndWhite => Some(saturation_matrix(0.0)),
        FilterKind::Brightness
        | FilterKind::Contrast
        | FilterKind::Saturation
        | FilterKind::Vignette => None,
    }
}

/// Compose every active special effect, each blended from identity by its
/// intensity. Zero-intensity effects do not participate.
pub fn effects_matrix(params: &FilterParameters) -> ColorMatrix {
    params
        .active_effects()
        .filter_map(|(kind, intensity)| {
            effect_target(kind).map(|target| ColorMatrix::IDENTITY.lerp(&target, intensity))
        })
        .fold(ColorMatrix::IDENTITY, |acc, m| {
            if acc.is_identity() {
                m
            } else {
                acc.then(&m)
            }
        })
}

/// Map filter parameters to a single color matrix.
///
/// Pure and deterministic. Stages sitting at their neutral value are
/// skipped, so neutral parameters return [`ColorMatrix::IDENTITY`] exactly.
///
/// # Example
///
/// ```
/// use tone_matrix::{compute_color_matrix, ColorMatrix, FilterParameters};
///
/// let m = compute_color_matrix(&FilterParameters::neutral());
/// assert_eq!(m, ColorMatrix::IDENTITY);
/// ```
pub fn compute_color_matrix(params: &FilterParameters) -> ColorMatrix {
    let stages = [
        (params.saturation() != 1.0).then(|| saturation_matrix(params.saturation())),
        (params.brightness() != 1.0).then(|| brightness_matrix(params.brightness())),
        (params.contrast() != 1.0).then(|| contrast_matrix(params.contrast())),
        Some(effects_matrix(params)).filter(|m| !m.is_identity()),
    ];

    stages
        .into_iter()
        .flatten()
        .fold(ColorMatrix::IDENTITY, |acc, m| {
            if acc.is_identity() {
                m
            } else {
                acc.then(&m)
            }
        })
}
