use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use super::placeholder::placeholder_jpeg;
use super::{ImageError, ImageFetcher, ImageSource};

/// Subdirectory of the cache directory that holds image files.
pub const IMAGES_SUBDIR: &str = "images";
const JPEG_QUALITY: u8 = 90;

/// Hex SHA-256 of `"{query}_{width}_{height}"`.
pub fn cache_key(query: &str, width: u32, height: u32) -> String {
    let digest = Sha256::digest(format!("{query}_{width}_{height}").as_bytes());
    format!("{digest:x}")
}

/// Where images from `source` are stored under the cache root.
pub fn images_dir(cache_dir: &Path, source: ImageSource) -> PathBuf {
    cache_dir.join(IMAGES_SUBDIR).join(source.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOrigin {
    Cached,
    Fetched,
    Placeholder,
}

#[derive(Debug, Clone)]
pub struct AcquiredImage {
    /// JPEG bytes. Empty only when even the placeholder could not be encoded.
    pub data: Vec<u8>,
    /// Where the bytes live on disk, when they could be persisted.
    pub path: Option<PathBuf>,
    pub origin: ImageOrigin,
}

/// Content-addressed image store in front of one fetcher.
pub struct ImageCache {
    dir: PathBuf,
    fetcher: Arc<dyn ImageFetcher>,
}

impl ImageCache {
    /// `cache_dir` is the shared cache root. Images go in
    /// `images/<source>/` so stock and generated results never collide.
    pub fn new(cache_dir: impl AsRef<Path>, fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self {
            dir: images_dir(cache_dir.as_ref(), fetcher.source()),
            fetcher,
        }
    }

    pub fn path_for(&self, query: &str, width: u32, height: u32) -> PathBuf {
        self.dir
            .join(format!("{}.jpg", cache_key(query, width, height)))
    }

    /// Cached bytes if present, otherwise fetched and stored, otherwise a
    /// placeholder. Never fails.
    pub async fn acquire(&self, query: &str, width: u32, height: u32) -> AcquiredImage {
        let path = self.path_for(query, width, height);
        match tokio::fs::read(&path).await {
            Ok(data) if !data.is_empty() => {
                info!("Using cached image for: {query}");
                return AcquiredImage {
                    data,
                    path: Some(path),
                    origin: ImageOrigin::Cached,
                };
            }
            Ok(_) => warn!("Ignoring empty cached image {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Could not read cached image {}: {e}", path.display()),
        }

        info!("Fetching {} image for: {query}", self.fetcher.source());
        let (data, origin) = match self.fetch_jpeg(query, width, height).await {
            Ok(data) => (data, ImageOrigin::Fetched),
            Err(e) => {
                warn!("Image fetch failed for '{query}': {e}; using placeholder");
                (
                    placeholder_jpeg(query, width, height),
                    ImageOrigin::Placeholder,
                )
            }
        };
        if data.is_empty() {
            return AcquiredImage {
                data,
                path: None,
                origin,
            };
        }

        let path = match self.persist(&path, &data).await {
            Ok(()) => Some(path),
            Err(e) => {
                warn!("Could not cache image {}: {e}", path.display());
                None
            }
        };
        AcquiredImage { data, path, origin }
    }

    async fn fetch_jpeg(&self, query: &str, width: u32, height: u32) -> Result<Vec<u8>, ImageError> {
        let raw = self.fetcher.fetch(query, width, height).await?;
        let rgb = image::load_from_memory(&raw)?.to_rgb8();
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY).encode_image(&rgb)?;
        Ok(out)
    }

    async fn persist(&self, path: &Path, data: &[u8]) -> Result<(), ImageError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(path, data).await?;
        Ok(())
    }
}
