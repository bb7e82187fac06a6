use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;

use crate::error::FetchError;
use crate::models::{PipelineSettings, RasterImage};
use crate::rendering::decode_image;

/// One way of downloading the source image bytes.
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    /// Short name used in logs and commit reports
    fn name(&self) -> &'static str;

    /// Download the body at `url`. Non-2xx responses are errors.
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError>;
}

/// Primary strategy: a shared async client with connection pooling.
pub struct PooledHttpStrategy {
    client: reqwest::Client,
}

impl PooledHttpStrategy {
    pub fn new(settings: &PipelineSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout())
            .timeout(settings.fetch_timeout())
            .redirect(Policy::limited(settings.max_redirects))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FetchStrategy for PooledHttpStrategy {
    fn name(&self) -> &'static str {
        "pooled-http"
    }

    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?;

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

/// Fallback strategy: a fresh single-use client per call with pooling
/// disabled, so it shares no connections with the primary client.
///
/// Dropping the returned future closes the connection.
pub struct BasicHttpStrategy {
    connect_timeout: Duration,
    timeout: Duration,
    max_redirects: usize,
}

impl BasicHttpStrategy {
    pub fn new(settings: &PipelineSettings) -> Self {
        Self {
            connect_timeout: settings.connect_timeout(),
            timeout: settings.fetch_timeout(),
            max_redirects: settings.max_redirects,
        }
    }

    fn client(&self) -> Result<reqwest::Client, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.timeout)
            .redirect(Policy::limited(self.max_redirects))
            .pool_max_idle_per_host(0)
            .build()?;
        Ok(client)
    }
}

#[async_trait]
impl FetchStrategy for BasicHttpStrategy {
    fn name(&self) -> &'static str {
        "basic-http"
    }

    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client()?
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?;

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

/// The strategies a pipeline tries by default, in order.
pub fn default_strategies(
    settings: &PipelineSettings,
) -> Result<Vec<Arc<dyn FetchStrategy>>, FetchError> {
    Ok(vec![
        Arc::new(PooledHttpStrategy::new(settings)?),
        Arc::new(BasicHttpStrategy::new(settings)),
    ])
}

/// Fetch with one strategy and decode the body on the blocking pool.
///
/// A body that does not decode counts as this strategy failing.
pub async fn fetch_decoded(
    strategy: &dyn FetchStrategy,
    url: &Url,
) -> Result<RasterImage, FetchError> {
    let bytes = strategy.fetch(url).await?;

    tracing::debug!(
        strategy = strategy.name(),
        url = %url,
        bytes = bytes.len(),
        "Fetched image body"
    );

    tokio::task::spawn_blocking(move || decode_image(&bytes))
        .await
        .map_err(|e| FetchError::Join(e.to_string()))?
}
