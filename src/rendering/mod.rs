pub mod codec;
pub mod color;
pub mod geometry;

pub use codec::{decode_image, write_temp_jpeg};
pub use color::{apply_color_matrix, apply_vignette};
pub use geometry::{apply_geometric_transform, fit_within, validate_transform};
