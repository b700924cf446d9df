use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by the resource manager
///
/// Cloneable so a single outcome can be shared by every waiter on the same descriptor.
#[derive(Debug, Clone, Error)]
pub enum ResourceError {
    #[error("Unable to find loader for {kind} resource {uri}")]
    NoLoaderFound { kind: &'static str, uri: String },
    #[error("Failed to load {uri}: {cause:#}")]
    LoadFailure {
        uri: String,
        cause: Arc<anyhow::Error>,
    },
    #[error("Expected a loaded resource for {uri}, got nothing")]
    NotLoaded { uri: String },
}

impl ResourceError {
    /// Wraps a loader error, unless it already is a [`ResourceError`]
    pub fn wrap(uri: &str, error: anyhow::Error) -> Self {
        match error.downcast::<ResourceError>() {
            Ok(resource_error) => resource_error,
            Err(cause) => ResourceError::LoadFailure {
                uri: uri.to_string(),
                cause: Arc::new(cause),
            },
        }
    }

    pub fn failure(uri: &str, message: impl std::fmt::Display) -> Self {
        ResourceError::LoadFailure {
            uri: uri.to_string(),
            cause: Arc::new(anyhow::anyhow!("{message}")),
        }
    }

    pub fn uri(&self) -> &str {
        match self {
            ResourceError::NoLoaderFound { uri, .. }
            | ResourceError::LoadFailure { uri, .. }
            | ResourceError::NotLoaded { uri } => uri,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
