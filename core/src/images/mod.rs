//! Image acquisition: remote fetchers, an on-disk cache keyed by request,
//! and a locally rendered placeholder when anything goes wrong.

mod cache;
mod placeholder;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use cache::{cache_key, images_dir, AcquiredImage, ImageCache, ImageOrigin, IMAGES_SUBDIR};
pub use placeholder::{placeholder_jpeg, render_placeholder, wrap_words};

/// Size every slide image is requested at.
pub const IMAGE_WIDTH: u32 = 800;
pub const IMAGE_HEIGHT: u32 = 600;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("image source returned HTTP {0}")]
    Status(u16),

    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Keyword search against a stock-photo service.
    Stock,
    /// Text-to-image generation from the query as a prompt.
    Generated,
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Stock => write!(f, "stock"),
            ImageSource::Generated => write!(f, "generated"),
        }
    }
}

/// Something that can turn a query into raw image bytes.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    fn source(&self) -> ImageSource;

    async fn fetch(&self, query: &str, width: u32, height: u32) -> Result<Vec<u8>, ImageError>;
}

pub struct HttpImageFetcher {
    http: reqwest::Client,
    source: ImageSource,
    base_url: String,
}

impl HttpImageFetcher {
    pub fn new(
        source: ImageSource,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ImageError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            source,
            base_url: base_url.into(),
        })
    }

    pub fn url_for(&self, query: &str, width: u32, height: u32) -> String {
        let base = self.base_url.trim_end_matches('/');
        let encoded = urlencoding::encode(query);
        match self.source {
            ImageSource::Stock => format!("{base}/{width}x{height}/?{encoded}"),
            ImageSource::Generated => {
                format!("{base}/{encoded}?width={width}&height={height}")
            }
        }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    fn source(&self) -> ImageSource {
        self.source
    }

    async fn fetch(&self, query: &str, width: u32, height: u32) -> Result<Vec<u8>, ImageError> {
        let url = self.url_for(query, width, height);
        tracing::debug!(%url, "Requesting image");
        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ImageError::Status(status.as_u16()));
        }
        Ok(resp.bytes().await?.to_vec())
    }
}
