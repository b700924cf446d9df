use crate::texture::TextureData;
use anyhow::{Context, Result};
use bytes::Bytes;
use futures::FutureExt;
use futures::future::{self, BoxFuture};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

/// Network collaborator used by the URL loaders
pub trait Fetcher: Send + Sync + 'static {
    fn fetch_bytes(&self, url: &str) -> BoxFuture<'static, Result<Bytes>>;

    fn decode_image(&self, bytes: &[u8]) -> Result<TextureData> {
        TextureData::decode(bytes)
    }

    /// Forgets any local copy of `url`, called when its bytes turned out to be unusable
    fn discard_cached(&self, _url: &str) -> BoxFuture<'static, ()> {
        future::ready(()).boxed()
    }
}

impl dyn Fetcher {
    pub async fn fetch_image(&self, url: &str) -> Result<TextureData> {
        let bytes = self.fetch_bytes(url).await?;
        match self.decode_image(&bytes) {
            Ok(texture) => Ok(texture),
            Err(e) => {
                self.discard_cached(url).await;
                Err(e.context(format!("Failed to decode image from {url}")))
            }
        }
    }

    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let bytes = self.fetch_bytes(url).await?;
        serde_json::from_slice(&bytes).with_context(|| format!("Unexpected JSON from {url}"))
    }
}

/// [`Fetcher`] backed by `reqwest`
///
/// When an image cache folder is set, `.png` downloads are written there and served from disk
/// on later requests.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    image_cache: Option<PathBuf>,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("skinbridge/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            image_cache: None,
        })
    }

    pub fn with_image_cache(mut self, folder: impl Into<PathBuf>) -> Self {
        self.image_cache = Some(folder.into());
        self
    }

    fn cache_path(&self, url: &str) -> Option<PathBuf> {
        self.image_cache
            .as_ref()
            .filter(|_| url.contains("textures.minecraft.net") || url.ends_with(".png"))
            .map(|folder| folder.join(cache_file_name(url)))
    }
}

/// Writes `bytes` next to `path` and renames it into place, so readers never see a partial file
async fn write_cache_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let partial = path.with_extension(format!("png.{}.part", Uuid::new_v4().simple()));
    tokio::fs::write(&partial, bytes).await?;
    if let Err(e) = tokio::fs::rename(&partial, path).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e.into());
    }
    Ok(())
}

/// File name an image URL is cached under
pub fn cache_file_name(url: &str) -> String {
    let stripped = url
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    let mut name: String = stripped
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    if !name.ends_with(".png") {
        name.push_str(".png");
    }
    name
}

impl Fetcher for HttpFetcher {
    fn fetch_bytes(&self, url: &str) -> BoxFuture<'static, Result<Bytes>> {
        let client = self.client.clone();
        let url = url.to_string();
        let cache_path = self.cache_path(&url);
        async move {
            if let Some(path) = &cache_path {
                if let Ok(data) = tokio::fs::read(path).await {
                    tracing::trace!("Serving {url} from {}", path.display());
                    return Ok(Bytes::from(data));
                }
            }
            let response = client
                .get(&url)
                .send()
                .await
                .with_context(|| format!("Request to {url} failed"))?
                .error_for_status()?;
            let bytes = response.bytes().await?;
            if let Some(path) = &cache_path {
                if let Err(e) = write_cache_file(path, &bytes).await {
                    tracing::warn!("Failed to cache image {}: {e}", path.display());
                }
            }
            Ok(bytes)
        }
        .boxed()
    }

    fn discard_cached(&self, url: &str) -> BoxFuture<'static, ()> {
        let Some(path) = self.cache_path(url) else {
            return future::ready(()).boxed();
        };
        async move {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => tracing::debug!("Removed undecodable cached image {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!("Failed to remove cached image {}: {e}", path.display()),
            }
        }
        .boxed()
    }
}
