//! Image-loading collaborators.
//!
//! A loader turns the scheme-stripped locator of a request into decoded RGBA
//! pixels. Fetch and decode failures surface as
//! [`TileError::SourceUnreadable`].

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use overlay_common::{RgbaRaster, TileError, TileResult};
use renderer::transform::decode_source;
use reqwest::Client;
use tracing::{debug, instrument};

/// Resolves a locator to source pixels.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    /// Load and decode the raster identified by `locator`.
    async fn load(&self, locator: &str) -> TileResult<RgbaRaster>;
}

/// Configuration for [`HttpImageLoader`].
#[derive(Debug, Clone)]
pub struct HttpLoaderConfig {
    /// Whole-request timeout
    pub request_timeout: Duration,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpLoaderConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("flood-overlay/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Loads source tiles over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpImageLoader {
    client: Client,
}

impl HttpImageLoader {
    pub fn new(config: HttpLoaderConfig) -> TileResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent)
            .pool_max_idle_per_host(8)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| TileError::config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn fetch(&self, url: &str) -> TileResult<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TileError::source_unreadable(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TileError::source_unreadable(format!(
                "{} returned HTTP {}",
                url, status
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| TileError::source_unreadable(format!("reading body of {} failed: {}", url, e)))
    }
}

#[async_trait]
impl ImageLoader for HttpImageLoader {
    #[instrument(skip(self))]
    async fn load(&self, locator: &str) -> TileResult<RgbaRaster> {
        let body = self.fetch(locator).await?;
        debug!(bytes = body.len(), "Fetched source tile");
        decode_source(&body)
    }
}

/// Loads source tiles from a local directory tree.
///
/// Locators are paths relative to `root`; a locator carrying a leading
/// `file://` is accepted too. Paths that climb out of `root` are rejected.
#[derive(Debug, Clone)]
pub struct FileImageLoader {
    root: PathBuf,
}

impl FileImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a locator to a path under the root.
    pub fn resolve(&self, locator: &str) -> TileResult<PathBuf> {
        let relative = locator.strip_prefix("file://").unwrap_or(locator);
        let relative = relative.trim_start_matches('/');
        if relative.is_empty() {
            return Err(TileError::source_unreadable("empty tile path"));
        }

        let mut path = self.root.clone();
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                _ => {
                    return Err(TileError::source_unreadable(format!(
                        "tile path escapes root: {}",
                        locator
                    )))
                }
            }
        }
        Ok(path)
    }
}

#[async_trait]
impl ImageLoader for FileImageLoader {
    #[instrument(skip(self))]
    async fn load(&self, locator: &str) -> TileResult<RgbaRaster> {
        let path = self.resolve(locator)?;
        let body = tokio::fs::read(&path).await.map_err(|e| {
            TileError::source_unreadable(format!("failed to read {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), bytes = body.len(), "Read source tile");
        decode_source(&body)
    }
}
