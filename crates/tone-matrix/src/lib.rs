//! tone-matrix: filter parameters to affine color matrices
//!
//! This library turns a set of user-tunable adjustments into one 4×5 color
//! matrix that can be handed to a renderer for previews or applied to a
//! raster at commit time.
//!
//! # Quick Start
//!
//! ```
//! use tone_matrix::{compute_color_matrix, FilterKind, FilterParameters};
//!
//! let params = FilterParameters::neutral()
//!     .with(FilterKind::Saturation, 1.4)
//!     .with(FilterKind::WarmTone, 0.3);
//!
//! let matrix = compute_color_matrix(&params);
//! let px = matrix.apply_rgba([120, 80, 60, 255]);
//! assert_eq!(px[3], 255);
//! ```
//!
//! # Channel Space
//!
//! All matrices operate on channel values in **0–255** space. Offsets
//! (column 5) are therefore expressed in byte units: a brightness of 1.2
//! adds 51 to each color channel.
//!
//! # Stage Order
//!
//! ```text
//! FilterParameters
//!     |
//!     v
//! saturation      (luma weights 0.3086 / 0.6094 / 0.0820)
//!     |
//! brightness      (additive offset, (b - 1) * 255)
//!     |
//! contrast        (scale around 128)
//!     |
//! effects         (sepia -> vintage -> cool -> warm -> black & white,
//!     |            each lerped from identity by its intensity)
//!     v
//! ColorMatrix
//! ```
//!
//! Vignette is deliberately absent from the matrix. It is a radial alpha
//! overlay; see [`vignette_alpha`].

mod compute;
mod matrix;
mod params;
mod vignette;


pub use compute::{
    brightness_matrix, compute_color_matrix, contrast_matrix, effect_target, effects_matrix,
    saturation_matrix, CONTRAST_PIVOT, COOL_TONE, LUMA_B, LUMA_G, LUMA_R, SEPIA, VINTAGE,
    WARM_TONE,
};
pub use matrix::ColorMatrix;
pub use params::{FilterKind, FilterParameters, UnknownFilter};
pub use vignette::{darken_rgba, vignette_alpha};
