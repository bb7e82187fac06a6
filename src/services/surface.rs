use async_trait::async_trait;
use image::ImageFormat;
use reqwest::Url;
use std::io::Read;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::error::SubmitError;
use crate::models::{RasterImage, WallpaperTarget};

/// The platform's wallpaper-setting capability.
///
/// Calls may fail independently; the commit pipeline decides which method
/// to try next.
#[async_trait]
pub trait WallpaperSurface: Send + Sync {
    /// Set an in-memory bitmap on the surfaces named by `target`
    async fn set_static_image(
        &self,
        image: &RasterImage,
        target: WallpaperTarget,
    ) -> Result<(), SubmitError>;

    /// Set from an encoded JPEG/PNG stream
    async fn set_from_stream(
        &self,
        stream: Box<dyn Read + Send>,
        target: WallpaperTarget,
    ) -> Result<(), SubmitError>;

    /// Hand the image to an interactive picker; the user finishes the job
    async fn launch_interactive_picker(&self, uri: &Url) -> Result<(), SubmitError>;
}

/// Surface backed by a directory on disk.
///
/// Static images land in `home.png`/`lock.png`, streams in
/// `home.jpg`/`lock.jpg`, and picker launches are appended to `picker.log`.
pub struct DirectorySurface {
    dir: PathBuf,
}

impl DirectorySurface {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn paths(&self, target: WallpaperTarget, extension: &str) -> Vec<PathBuf> {
        target
            .surfaces()
            .iter()
            .map(|s| self.dir.join(format!("{}.{extension}", s.name())))
            .collect()
    }
}

#[async_trait]
impl WallpaperSurface for DirectorySurface {
    async fn set_static_image(
        &self,
        image: &RasterImage,
        target: WallpaperTarget,
    ) -> Result<(), SubmitError> {
        let image = image.clone();
        let paths = self.paths(target, "png");
        let dir = self.dir.clone();

        tokio::task::spawn_blocking(move || -> Result<(), SubmitError> {
            std::fs::create_dir_all(&dir)?;
            for path in &paths {
                image.save_with_format(path, ImageFormat::Png)?;
                tracing::debug!(path = %path.display(), "Wrote wallpaper image");
            }
            Ok(())
        })
        .await
        .map_err(|e| SubmitError::Rejected(format!("write task failed: {e}")))?
    }

    async fn set_from_stream(
        &self,
        mut stream: Box<dyn Read + Send>,
        target: WallpaperTarget,
    ) -> Result<(), SubmitError> {
        let paths = self.paths(target, "jpg");
        let dir = self.dir.clone();

        tokio::task::spawn_blocking(move || -> Result<(), SubmitError> {
            let mut bytes = Vec::new();
            stream.read_to_end(&mut bytes)?;

            match image::guess_format(&bytes) {
                Ok(ImageFormat::Jpeg) | Ok(ImageFormat::Png) => {}
                _ => return Err(SubmitError::Rejected("stream is not a JPEG or PNG".into())),
            }

            std::fs::create_dir_all(&dir)?;
            for path in &paths {
                std::fs::write(path, &bytes)?;
                tracing::debug!(
                    path = %path.display(),
                    bytes = bytes.len(),
                    "Wrote wallpaper stream"
                );
            }
            Ok(())
        })
        .await
        .map_err(|e| SubmitError::Rejected(format!("write task failed: {e}")))?
    }

    async fn launch_interactive_picker(&self, uri: &Url) -> Result<(), SubmitError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let line = format!("{} {uri}\n", chrono::Utc::now().to_rfc3339());
        let path = self.dir.join("picker.log");

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        // tokio files write on a background thread until flushed
        file.flush().await?;

        tracing::info!(uri = %uri, "Interactive picker requested");
        Ok(())
    }
}
