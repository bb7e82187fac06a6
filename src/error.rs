use thiserror::Error;

use crate::models::Surface;
use crate::services::commit_pipeline::SurfaceReport;

/// Failure to obtain a decodable source image.
///
/// Never terminal on its own: the pipeline moves to the next fetch strategy
/// and finally to the interactive picker.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Request timed out")]
    Timeout,

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Undecodable image body: {0}")]
    Undecodable(String),

    #[error("Fetch task failed: {0}")]
    Join(String),

    #[error("All {0} fetch strategies failed")]
    AllStrategiesFailed(usize),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = e.status() {
            FetchError::Status {
                status: status.as_u16(),
                url: e.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

/// Failure while transforming the raster.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Invalid geometry: scale={scale}, offset=({dx}, {dy})")]
    InvalidGeometry { scale: f32, dx: f32, dy: f32 },

    #[error("Out of memory allocating {width}x{height} buffer")]
    OutOfMemory { width: u32, height: u32 },

    #[error("Transform task failed: {0}")]
    Join(String),
}

impl TransformError {
    /// Whether the request has to be abandoned instead of continuing with
    /// the untransformed buffer.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TransformError::OutOfMemory { .. } | TransformError::Join(_))
    }
}

/// Rejection from the OS wallpaper surface or failure preparing its input.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Surface rejected wallpaper: {0}")]
    Rejected(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(std::io::Error),

    #[error("Interactive picker unavailable: {0}")]
    PickerUnavailable(String),
}

impl From<std::io::Error> for SubmitError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            SubmitError::PermissionDenied(e.to_string())
        } else {
            SubmitError::Io(e)
        }
    }
}

impl From<image::ImageError> for SubmitError {
    fn from(e: image::ImageError) -> Self {
        SubmitError::Encode(e.to_string())
    }
}

/// Terminal outcome of a commit request that did not set the wallpaper.
#[derive(Debug, Error)]
pub enum CommitError {
    #[error("Commit cancelled")]
    Cancelled,

    #[error("Transform failed: {0}")]
    Transform(#[from] TransformError),

    #[error("Could not set wallpaper on {}", failed_surfaces(.surfaces))]
    NotSet { surfaces: Vec<SurfaceReport> },
}

fn failed_surfaces(surfaces: &[SurfaceReport]) -> String {
    let failed: Vec<&str> = surfaces
        .iter()
        .filter(|s| s.status.is_failed())
        .map(|s| s.surface.name())
        .collect();
    if failed.is_empty() {
        "any surface".to_string()
    } else {
        failed.join(", ")
    }
}

impl CommitError {
    /// Surfaces that were attempted, for diagnostics.
    pub fn surfaces(&self) -> &[SurfaceReport] {
        match self {
            CommitError::NotSet { surfaces } => surfaces,
            _ => &[],
        }
    }

    /// Whether `surface` ended committed despite the overall failure.
    pub fn committed_on(&self, surface: Surface) -> bool {
        self.surfaces()
            .iter()
            .any(|s| s.surface == surface && s.status.is_committed())
    }
}
