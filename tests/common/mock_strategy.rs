//! In-process fetch strategies for pipeline tests that don't need HTTP.

use async_trait::async_trait;
use reqwest::Url;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use walltone::error::FetchError;
use walltone::services::FetchStrategy;

/// Returns the same body on every call
pub struct StaticStrategy {
    name: &'static str,
    body: Vec<u8>,
    calls: AtomicUsize,
}

impl StaticStrategy {
    pub fn new(name: &'static str, body: Vec<u8>) -> Self {
        Self {
            name,
            body,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FetchStrategy for StaticStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, _url: &Url) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.body.clone())
    }
}

/// Always fails with a request error
pub struct FailingStrategy {
    name: &'static str,
    calls: AtomicUsize,
}

impl FailingStrategy {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FetchStrategy for FailingStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(FetchError::Request(format!("connection refused: {url}")))
    }
}

/// Sleeps before returning its body
pub struct SlowStrategy {
    delay: Duration,
    body: Vec<u8>,
}

impl SlowStrategy {
    pub fn new(delay: Duration, body: Vec<u8>) -> Self {
        Self { delay, body }
    }
}

#[async_trait]
impl FetchStrategy for SlowStrategy {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn fetch(&self, _url: &Url) -> Result<Vec<u8>, FetchError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.body.clone())
    }
}
