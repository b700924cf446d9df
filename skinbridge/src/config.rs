use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Flags consumed by the appearance resolution layer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SkinConfig {
    /// Probe third-party cape services when the Java profile has no cape
    pub allow_third_party_capes: bool,
    /// Probe third-party ear services for Java players
    pub allow_third_party_ears: bool,
    /// Accept persona and larger than 128x128 Bedrock skins
    pub allow_bedrock_character_creator_skins: bool,
    /// Idle time after which a cached resource is dropped
    pub cache_idle_expiry_secs: u64,
    /// Days cached image files are kept for. 0 disables the janitor
    pub cache_images: u32,
    pub image_cache_folder: PathBuf,
    pub fetch_timeout_secs: u64,
    pub session_server: String,
    pub profile_api: String,
}

impl Default for SkinConfig {
    fn default() -> Self {
        Self {
            allow_third_party_capes: true,
            allow_third_party_ears: false,
            allow_bedrock_character_creator_skins: false,
            cache_idle_expiry_secs: 60 * 60,
            cache_images: 0,
            image_cache_folder: PathBuf::from("cache/images"),
            fetch_timeout_secs: 10,
            session_server: "https://sessionserver.mojang.com".to_string(),
            profile_api: "https://api.mojang.com".to_string(),
        }
    }
}

impl SkinConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn cache_idle_expiry(&self) -> Duration {
        Duration::from_secs(self.cache_idle_expiry_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Image files older than this are removed by the janitor
    pub fn image_retention(&self) -> Option<Duration> {
        (self.cache_images > 0).then(|| Duration::from_secs(u64::from(self.cache_images) * 60 * 60 * 24))
    }
}
