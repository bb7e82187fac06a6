//! Fetch → decode → color → geometry → submit, with fallbacks at every
//! step that can fail outside our control.
//!
//! ```text
//! Idle
//!  └─ Fetching ──(FetchFailed, next strategy)──┐
//!      │                                       │ all failed
//!      v                                       v
//!   Decoded                         picker(source URL)
//!      │                                       │
//!   Transforming ─ Transformed                 │
//!      │                                       │
//!   per surface:                               │
//!   Submitting(static) ─(SubmitFailed)─┐       │
//!   Submitting(stream) ─(SubmitFailed)─┤       │
//!   Submitting(picker) ────────────────┘       │
//!      │                                       │
//!      v                                       v
//!  Committed | PendingUserAction | Failed     (Cancelled from any
//!                                              pre-submit state)
//! ```

use chrono::{DateTime, Utc};
use reqwest::Url;
use std::io::BufReader;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::{Mutex, MutexGuard};
use tone_matrix::{compute_color_matrix, ColorMatrix, FilterParameters};

use super::cancel::CancelToken;
use super::fetcher::{default_strategies, fetch_decoded, FetchStrategy};
use super::surface::WallpaperSurface;
use crate::error::{CommitError, FetchError, SubmitError, TransformError};
use crate::models::{GeometricTransform, PipelineSettings, RasterImage, Surface, WallpaperTarget};
use crate::rendering::{
    apply_color_matrix, apply_geometric_transform, apply_vignette, fit_within,
    validate_transform, write_temp_jpeg,
};

/// Everything needed to put one wallpaper on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitRequest {
    pub image_url: String,
    pub filters: FilterParameters,
    pub target: WallpaperTarget,
    pub home_transform: GeometricTransform,
    pub lock_transform: GeometricTransform,
}

impl CommitRequest {
    /// Unfiltered, untransformed request.
    pub fn new(image_url: impl Into<String>, target: WallpaperTarget) -> Self {
        Self {
            image_url: image_url.into(),
            filters: FilterParameters::neutral(),
            target,
            home_transform: GeometricTransform::IDENTITY,
            lock_transform: GeometricTransform::IDENTITY,
        }
    }

    pub fn with_filters(mut self, filters: FilterParameters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_transform(mut self, surface: Surface, transform: GeometricTransform) -> Self {
        match surface {
            Surface::Home => self.home_transform = transform,
            Surface::Lock => self.lock_transform = transform,
        }
        self
    }

    pub fn transform_for(&self, surface: Surface) -> GeometricTransform {
        match surface {
            Surface::Home => self.home_transform,
            Surface::Lock => self.lock_transform,
        }
    }
}

/// Surface method that handled (or was attempted for) a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitPath {
    StaticImage,
    Stream,
    InteractivePicker,
}

impl SubmitPath {
    pub fn name(self) -> &'static str {
        match self {
            SubmitPath::StaticImage => "static-image",
            SubmitPath::Stream => "stream",
            SubmitPath::InteractivePicker => "interactive-picker",
        }
    }
}

/// Where one surface ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceStatus {
    Committed(SubmitPath),
    /// Handed to the picker; the user has to confirm
    PendingUserAction,
    /// Every tier failed
    Failed,
}

impl SurfaceStatus {
    pub fn is_committed(self) -> bool {
        matches!(self, SurfaceStatus::Committed(_))
    }

    pub fn is_failed(self) -> bool {
        matches!(self, SurfaceStatus::Failed)
    }
}

/// Per-surface result with the errors collected along the ladder.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceReport {
    pub surface: Surface,
    pub status: SurfaceStatus,
    pub errors: Vec<String>,
}

/// Commit state machine positions, recorded in order.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitState {
    Idle,
    Fetching { strategy: &'static str },
    FetchFailed { strategy: &'static str },
    Decoded { width: u32, height: u32 },
    Transforming,
    Transformed,
    Submitting { target: WallpaperTarget, path: SubmitPath },
    SubmitFailed { target: WallpaperTarget, path: SubmitPath },
    Committed,
    PendingUserAction,
    Failed,
    Cancelled,
}

/// Non-failing end states of a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStatus {
    /// Every targeted surface was set
    Committed,
    /// The interactive picker was launched; not a confirmed success
    PendingUserAction,
}

/// Result of a commit that did not fail.
#[derive(Debug, Clone)]
pub struct CommitReport {
    pub status: CommitStatus,
    pub surfaces: Vec<SurfaceReport>,
    /// Strategy that produced the decoded image, if any did
    pub fetch_strategy: Option<&'static str>,
    pub states: Vec<CommitState>,
    pub completed_at: DateTime<Utc>,
}

impl CommitReport {
    pub fn surface(&self, surface: Surface) -> Option<&SurfaceReport> {
        self.surfaces.iter().find(|s| s.surface == surface)
    }
}

/// What the UI should show for a finished commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    PendingUserAction,
    Failed,
    Cancelled,
}

impl CommitOutcome {
    pub fn of(result: &Result<CommitReport, CommitError>) -> Self {
        match result {
            Ok(report) => match report.status {
                CommitStatus::Committed => CommitOutcome::Committed,
                CommitStatus::PendingUserAction => CommitOutcome::PendingUserAction,
            },
            Err(CommitError::Cancelled) => CommitOutcome::Cancelled,
            Err(_) => CommitOutcome::Failed,
        }
    }
}

#[derive(Default)]
struct StateTrace(Vec<CommitState>);

impl StateTrace {
    fn enter(&mut self, state: CommitState) {
        tracing::debug!(state = ?state, "Commit state");
        self.0.push(state);
    }
}

/// Raster work done on the blocking pool.
struct RenderPlan {
    matrix: ColorMatrix,
    vignette: f32,
    normalization: f32,
    max_dimension: u32,
    surfaces: Vec<(Surface, GeometricTransform)>,
}

impl RenderPlan {
    /// Render every surface, or `None` if `cancel` fired between steps.
    fn run(
        self,
        source: RasterImage,
        cancel: &CancelToken,
    ) -> Result<Option<Vec<(Surface, RasterImage)>>, TransformError> {
        let colored = apply_color_matrix(source, &self.matrix);
        if cancel.is_cancelled() {
            return Ok(None);
        }

        let mut bases = vec![colored];
        while bases.len() < self.surfaces.len() {
            let copy = bases[0].clone();
            bases.push(copy);
        }

        let mut rendered = Vec::with_capacity(self.surfaces.len());
        for ((surface, transform), base) in self.surfaces.into_iter().zip(bases) {
            let placed = match validate_transform(&transform) {
                Ok(()) => apply_geometric_transform(base, &transform, self.normalization)?,
                Err(e) => {
                    tracing::warn!(surface = ?surface, error = %e, "Ignoring invalid geometry");
                    base
                }
            };
            if cancel.is_cancelled() {
                return Ok(None);
            }

            let shaded = apply_vignette(placed, self.vignette);
            if cancel.is_cancelled() {
                return Ok(None);
            }

            rendered.push((surface, fit_within(shaded, self.max_dimension)));
        }

        Ok(Some(rendered))
    }
}

/// Applies wallpapers through the fallback ladder.
///
/// Commits touching the same surface run one at a time, in arrival order.
pub struct CommitPipeline {
    settings: PipelineSettings,
    strategies: Vec<Arc<dyn FetchStrategy>>,
    surface: Arc<dyn WallpaperSurface>,
    home_lock: Mutex<()>,
    lock_lock: Mutex<()>,
}

impl CommitPipeline {
    pub fn new(
        settings: PipelineSettings,
        strategies: Vec<Arc<dyn FetchStrategy>>,
        surface: Arc<dyn WallpaperSurface>,
    ) -> Self {
        Self {
            settings,
            strategies,
            surface,
            home_lock: Mutex::new(()),
            lock_lock: Mutex::new(()),
        }
    }

    /// Pipeline using the pooled and basic HTTP strategies.
    pub fn with_http(
        settings: PipelineSettings,
        surface: Arc<dyn WallpaperSurface>,
    ) -> Result<Self, FetchError> {
        let strategies = default_strategies(&settings)?;
        Ok(Self::new(settings, strategies, surface))
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run one commit to completion, cancellation, or failure.
    pub async fn commit(
        &self,
        request: &CommitRequest,
        cancel: &CancelToken,
    ) -> Result<CommitReport, CommitError> {
        let mut trace = StateTrace::default();
        trace.enter(CommitState::Idle);
        let surfaces = request.target.surfaces();

        let guards = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            guards = self.lock_surfaces(surfaces) => Some(guards),
        };
        let Some(_guards) = guards else {
            return Err(cancelled(&request.image_url, &mut trace));
        };

        let url = match Url::parse(&request.image_url) {
            Ok(url) => url,
            Err(e) => {
                let reports = surfaces
                    .iter()
                    .map(|&surface| SurfaceReport {
                        surface,
                        status: SurfaceStatus::Failed,
                        errors: vec![format!("invalid image url: {e}")],
                    })
                    .collect();
                trace.enter(CommitState::Failed);
                tracing::error!(url = %request.image_url, error = %e, "Invalid image URL");
                return Err(CommitError::NotSet { surfaces: reports });
            }
        };

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            fetched = self.fetch_source(&url, &mut trace) => Some(fetched),
        };
        let source = match fetched {
            None => return Err(cancelled(&request.image_url, &mut trace)),
            Some(Ok(source)) => source,
            Some(Err(_)) if cancel.is_cancelled() => {
                return Err(cancelled(&request.image_url, &mut trace));
            }
            Some(Err(e)) => {
                tracing::warn!(url = %url, error = %e, "Falling back to picker with source URL");
                return self.pick_source(&url, request.target, e, trace).await;
            }
        };
        let (image, strategy) = source;
        trace.enter(CommitState::Decoded {
            width: image.width(),
            height: image.height(),
        });

        trace.enter(CommitState::Transforming);
        let plan = RenderPlan {
            matrix: compute_color_matrix(&request.filters),
            vignette: request.filters.vignette(),
            normalization: self.settings.offset_normalization(),
            max_dimension: self.settings.max_dimension,
            surfaces: surfaces
                .iter()
                .map(|&s| (s, request.transform_for(s)))
                .collect(),
        };
        let worker_cancel = cancel.clone();
        let worker = tokio::task::spawn_blocking(move || plan.run(image, &worker_cancel));
        let rendered = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            joined = worker => Some(joined),
        };
        let rendered = match rendered {
            None => return Err(cancelled(&request.image_url, &mut trace)),
            Some(joined) => {
                match joined.map_err(|e| TransformError::Join(e.to_string())) {
                    Ok(Ok(Some(rendered))) => rendered,
                    Ok(Ok(None)) => return Err(cancelled(&request.image_url, &mut trace)),
                    Ok(Err(e)) | Err(e) => {
                        trace.enter(CommitState::Failed);
                        tracing::error!(url = %url, error = %e, "Transform failed");
                        return Err(CommitError::Transform(e));
                    }
                }
            }
        };
        trace.enter(CommitState::Transformed);

        if cancel.is_cancelled() {
            return Err(cancelled(&request.image_url, &mut trace));
        }

        let mut reports = Vec::with_capacity(rendered.len());
        for (surface, image) in rendered {
            reports.push(self.submit(surface, image, &mut trace).await);
        }

        self.finish(&url, reports, Some(strategy), trace)
    }

    async fn lock_surfaces(&self, surfaces: &[Surface]) -> Vec<MutexGuard<'_, ()>> {
        let mut guards = Vec::with_capacity(surfaces.len());
        for surface in surfaces {
            let lock = match surface {
                Surface::Home => &self.home_lock,
                Surface::Lock => &self.lock_lock,
            };
            guards.push(lock.lock().await);
        }
        guards
    }

    /// Try each strategy in order until one yields a decodable image.
    async fn fetch_source(
        &self,
        url: &Url,
        trace: &mut StateTrace,
    ) -> Result<(RasterImage, &'static str), FetchError> {
        for strategy in &self.strategies {
            let name = strategy.name();
            trace.enter(CommitState::Fetching { strategy: name });

            match fetch_decoded(strategy.as_ref(), url).await {
                Ok(image) => {
                    tracing::debug!(
                        strategy = name,
                        url = %url,
                        width = image.width(),
                        height = image.height(),
                        "Decoded source image"
                    );
                    return Ok((image, name));
                }
                Err(e) => {
                    tracing::warn!(
                        strategy = name,
                        url = %url,
                        error = %e,
                        "Fetch strategy failed"
                    );
                    trace.enter(CommitState::FetchFailed { strategy: name });
                }
            }
        }

        Err(FetchError::AllStrategiesFailed(self.strategies.len()))
    }

    /// Nothing could be downloaded: let the user pick from the source URL.
    async fn pick_source(
        &self,
        url: &Url,
        target: WallpaperTarget,
        fetch_error: FetchError,
        mut trace: StateTrace,
    ) -> Result<CommitReport, CommitError> {
        trace.enter(CommitState::Submitting {
            target,
            path: SubmitPath::InteractivePicker,
        });

        let (status, picker_error) = match self.surface.launch_interactive_picker(url).await {
            Ok(()) => (SurfaceStatus::PendingUserAction, None),
            Err(e) => {
                trace.enter(CommitState::SubmitFailed {
                    target,
                    path: SubmitPath::InteractivePicker,
                });
                (SurfaceStatus::Failed, Some(e.to_string()))
            }
        };

        let reports = target
            .surfaces()
            .iter()
            .map(|&surface| SurfaceReport {
                surface,
                status,
                errors: std::iter::once(fetch_error.to_string())
                    .chain(picker_error.clone())
                    .collect(),
            })
            .collect();

        self.finish(url, reports, None, trace)
    }

    /// Walk the ladder for one surface. Only the first two tiers commit.
    async fn submit(
        &self,
        surface: Surface,
        image: RasterImage,
        trace: &mut StateTrace,
    ) -> SurfaceReport {
        let target = surface.target();
        let mut errors = Vec::new();

        trace.enter(CommitState::Submitting {
            target,
            path: SubmitPath::StaticImage,
        });
        match self.surface.set_static_image(&image, target).await {
            Ok(()) => return committed(surface, SubmitPath::StaticImage, errors),
            Err(e) => submit_failed(surface, SubmitPath::StaticImage, e, &mut errors, trace),
        }

        let image = Arc::new(image);

        trace.enter(CommitState::Submitting {
            target,
            path: SubmitPath::Stream,
        });
        match self.submit_stream(&image, target).await {
            Ok(()) => return committed(surface, SubmitPath::Stream, errors),
            Err(e) => submit_failed(surface, SubmitPath::Stream, e, &mut errors, trace),
        }

        trace.enter(CommitState::Submitting {
            target,
            path: SubmitPath::InteractivePicker,
        });
        let status = match self.submit_picker(&image).await {
            Ok(()) => {
                tracing::info!(surface = ?surface, "Handed wallpaper to interactive picker");
                SurfaceStatus::PendingUserAction
            }
            Err(e) => {
                submit_failed(surface, SubmitPath::InteractivePicker, e, &mut errors, trace);
                tracing::error!(
                    surface = ?surface,
                    errors = ?errors,
                    "All submission paths failed"
                );
                SurfaceStatus::Failed
            }
        };

        SurfaceReport {
            surface,
            status,
            errors,
        }
    }

    async fn submit_stream(
        &self,
        image: &Arc<RasterImage>,
        target: WallpaperTarget,
    ) -> Result<(), SubmitError> {
        let temp = self.encode_temp(image).await?;
        let reader = BufReader::new(temp.reopen()?);
        let result = self.surface.set_from_stream(Box::new(reader), target).await;
        drop(temp);
        result
    }

    async fn submit_picker(&self, image: &Arc<RasterImage>) -> Result<(), SubmitError> {
        let temp = self.encode_temp(image).await?;
        let path = tokio::fs::canonicalize(temp.path()).await?;
        let uri = Url::from_file_path(&path).map_err(|()| {
            SubmitError::PickerUnavailable(format!("no file URL for {}", path.display()))
        })?;
        let result = self.surface.launch_interactive_picker(&uri).await;
        drop(temp);
        result
    }

    async fn encode_temp(&self, image: &Arc<RasterImage>) -> Result<NamedTempFile, SubmitError> {
        let image = Arc::clone(image);
        let dir = self.settings.cache_dir();
        let quality = self.settings.jpeg_quality();

        tokio::task::spawn_blocking(move || write_temp_jpeg(&image, &dir, quality))
            .await
            .map_err(|e| SubmitError::Encode(format!("encode task failed: {e}")))?
    }

    fn finish(
        &self,
        url: &Url,
        surfaces: Vec<SurfaceReport>,
        fetch_strategy: Option<&'static str>,
        mut trace: StateTrace,
    ) -> Result<CommitReport, CommitError> {
        if surfaces.iter().any(|s| s.status.is_failed()) {
            trace.enter(CommitState::Failed);
            let error = CommitError::NotSet { surfaces };
            tracing::error!(url = %url, error = %error, "Commit failed");
            return Err(error);
        }

        let status = if surfaces.iter().all(|s| s.status.is_committed()) {
            trace.enter(CommitState::Committed);
            tracing::info!(url = %url, strategy = ?fetch_strategy, "Wallpaper committed");
            CommitStatus::Committed
        } else {
            trace.enter(CommitState::PendingUserAction);
            tracing::info!(url = %url, "Wallpaper awaiting user confirmation");
            CommitStatus::PendingUserAction
        };

        Ok(CommitReport {
            status,
            surfaces,
            fetch_strategy,
            states: trace.0,
            completed_at: Utc::now(),
        })
    }
}

fn cancelled(url: &str, trace: &mut StateTrace) -> CommitError {
    trace.enter(CommitState::Cancelled);
    tracing::debug!(url = %url, "Commit cancelled");
    CommitError::Cancelled
}

fn committed(surface: Surface, path: SubmitPath, errors: Vec<String>) -> SurfaceReport {
    tracing::debug!(surface = ?surface, path = path.name(), "Surface committed");
    SurfaceReport {
        surface,
        status: SurfaceStatus::Committed(path),
        errors,
    }
}

fn submit_failed(
    surface: Surface,
    path: SubmitPath,
    error: SubmitError,
    errors: &mut Vec<String>,
    trace: &mut StateTrace,
) {
    tracing::warn!(surface = ?surface, path = path.name(), error = %error, "Submission failed");
    trace.enter(CommitState::SubmitFailed {
        target: surface.target(),
        path,
    });
    errors.push(format!("{}: {error}", path.name()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Vector2;

    fn report(status: CommitStatus) -> CommitReport {
        CommitReport {
            status,
            surfaces: Vec::new(),
            fetch_strategy: None,
            states: Vec::new(),
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_outcome_mapping() {
        assert_eq!(
            CommitOutcome::of(&Ok(report(CommitStatus::Committed))),
            CommitOutcome::Committed
        );
        assert_eq!(
            CommitOutcome::of(&Ok(report(CommitStatus::PendingUserAction))),
            CommitOutcome::PendingUserAction
        );
        assert_eq!(
            CommitOutcome::of(&Err(CommitError::Cancelled)),
            CommitOutcome::Cancelled
        );
        assert_eq!(
            CommitOutcome::of(&Err(CommitError::NotSet {
                surfaces: Vec::new()
            })),
            CommitOutcome::Failed
        );
        assert_eq!(
            CommitOutcome::of(&Err(CommitError::Transform(TransformError::OutOfMemory {
                width: 1,
                height: 1
            }))),
            CommitOutcome::Failed
        );
    }

    #[test]
    fn test_request_transforms_per_surface() {
        let zoom = GeometricTransform::new(1.5, Vector2::new(10.0, 0.0));
        let request = CommitRequest::new("https://example.com/a.jpg", WallpaperTarget::Both)
            .with_transform(Surface::Lock, zoom);

        assert_eq!(request.transform_for(Surface::Home), GeometricTransform::IDENTITY);
        assert_eq!(request.transform_for(Surface::Lock), zoom);
    }

    #[test]
    fn test_surface_status_predicates() {
        assert!(SurfaceStatus::Committed(SubmitPath::Stream).is_committed());
        assert!(!SurfaceStatus::PendingUserAction.is_committed());
        assert!(!SurfaceStatus::PendingUserAction.is_failed());
        assert!(SurfaceStatus::Failed.is_failed());
    }

    #[test]
    fn test_render_plan_falls_back_on_invalid_geometry() {
        let source = RasterImage::from_pixel(8, 8, image::Rgba([50, 60, 70, 255]));
        let plan = RenderPlan {
            matrix: ColorMatrix::IDENTITY,
            vignette: 0.0,
            normalization: 1000.0,
            max_dimension: 4096,
            surfaces: vec![(Surface::Home, GeometricTransform::new(0.0, Vector2::ZERO))],
        };

        let rendered = plan.run(source.clone(), &CancelToken::never()).unwrap().unwrap();

        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].1.as_raw(), source.as_raw());
    }

    #[test]
    fn test_render_plan_both_surfaces_independent() {
        let source = RasterImage::from_fn(64, 64, |x, _| image::Rgba([x as u8 * 4, 0, 0, 255]));
        let plan = RenderPlan {
            matrix: ColorMatrix::IDENTITY,
            vignette: 0.0,
            normalization: 1000.0,
            max_dimension: 4096,
            surfaces: vec![
                (Surface::Home, GeometricTransform::IDENTITY),
                (Surface::Lock, GeometricTransform::new(2.0, Vector2::ZERO)),
            ],
        };

        let rendered = plan.run(source.clone(), &CancelToken::never()).unwrap().unwrap();

        assert_eq!(rendered[0].0, Surface::Home);
        assert_eq!(rendered[0].1.as_raw(), source.as_raw());
        assert_eq!(rendered[1].0, Surface::Lock);
        assert_ne!(rendered[1].1.as_raw(), source.as_raw());
    }

    #[test]
    fn test_render_plan_stops_when_cancelled() {
        let source = RasterImage::from_pixel(256, 256, image::Rgba([10, 20, 30, 255]));
        let plan = RenderPlan {
            matrix: tone_matrix::SEPIA,
            vignette: 0.5,
            normalization: 1000.0,
            max_dimension: 4096,
            surfaces: vec![
                (Surface::Home, GeometricTransform::new(2.0, Vector2::ZERO)),
                (Surface::Lock, GeometricTransform::new(1.5, Vector2::ZERO)),
            ],
        };
        let (canceller, token) = crate::services::cancel_pair();
        canceller.cancel();

        assert!(plan.run(source, &token).unwrap().is_none());
    }
}
