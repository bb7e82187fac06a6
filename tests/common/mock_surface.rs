//! Recording wallpaper surface with scripted failures.

use async_trait::async_trait;
use reqwest::Url;
use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use walltone::error::SubmitError;
use walltone::models::{RasterImage, WallpaperTarget};
use walltone::services::WallpaperSurface;

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    StaticImage {
        target: WallpaperTarget,
        width: u32,
        height: u32,
    },
    Stream {
        target: WallpaperTarget,
        bytes: usize,
    },
    Picker {
        uri: String,
        /// Whether a `file://` URI pointed at an existing file during the call
        file_existed: bool,
    },
}

#[derive(Default)]
pub struct RecordingSurface {
    calls: Mutex<Vec<SurfaceCall>>,
    /// Raw pixels of every successful static image, in call order
    images: Mutex<Vec<RasterImage>>,
    fail_static: Mutex<Vec<WallpaperTarget>>,
    fail_stream: Mutex<Vec<WallpaperTarget>>,
    fail_picker: Mutex<bool>,
    delay: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject `set_static_image` for this target
    pub fn fail_static(self, target: WallpaperTarget) -> Self {
        self.fail_static.lock().unwrap().push(target);
        self
    }

    /// Reject `set_from_stream` for this target
    pub fn fail_stream(self, target: WallpaperTarget) -> Self {
        self.fail_stream.lock().unwrap().push(target);
        self
    }

    /// Make the interactive picker unavailable
    pub fn fail_picker(self) -> Self {
        *self.fail_picker.lock().unwrap() = true;
        self
    }

    /// Fail every tier for this target
    pub fn fail_all(self, target: WallpaperTarget) -> Self {
        self.fail_static(target).fail_stream(target).fail_picker()
    }

    /// Sleep inside each static image call
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn images(&self) -> Vec<RasterImage> {
        self.images.lock().unwrap().clone()
    }

    /// Highest number of overlapping static image calls observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: SurfaceCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl WallpaperSurface for RecordingSurface {
    async fn set_static_image(
        &self,
        image: &RasterImage,
        target: WallpaperTarget,
    ) -> Result<(), SubmitError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.record(SurfaceCall::StaticImage {
            target,
            width: image.width(),
            height: image.height(),
        });
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_static.lock().unwrap().contains(&target) {
            return Err(SubmitError::Rejected("bitmap too large".to_string()));
        }
        self.images.lock().unwrap().push(image.clone());
        Ok(())
    }

    async fn set_from_stream(
        &self,
        mut stream: Box<dyn Read + Send>,
        target: WallpaperTarget,
    ) -> Result<(), SubmitError> {
        let mut bytes = Vec::new();
        stream.read_to_end(&mut bytes)?;
        self.record(SurfaceCall::Stream {
            target,
            bytes: bytes.len(),
        });

        if self.fail_stream.lock().unwrap().contains(&target) {
            return Err(SubmitError::PermissionDenied("SET_WALLPAPER".to_string()));
        }
        Ok(())
    }

    async fn launch_interactive_picker(&self, uri: &Url) -> Result<(), SubmitError> {
        let file_existed = uri
            .to_file_path()
            .map(|p| p.exists())
            .unwrap_or(false);
        self.record(SurfaceCall::Picker {
            uri: uri.to_string(),
            file_existed,
        });

        if *self.fail_picker.lock().unwrap() {
            return Err(SubmitError::PickerUnavailable("no activity".to_string()));
        }
        Ok(())
    }
}
