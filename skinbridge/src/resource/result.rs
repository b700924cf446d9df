use super::Resource;
use crate::error::ResourceError;
use derivative::Derivative;
use std::sync::Arc;

/// Outcome of one load attempt, shared by everyone waiting on it
#[derive(Derivative)]
#[derivative(Debug(bound = ""), Clone(bound = ""))]
pub struct LoadResult<T: Resource> {
    uri: String,
    outcome: Result<Arc<T>, ResourceError>,
}

impl<T: Resource> LoadResult<T> {
    pub fn new(uri: impl Into<String>, outcome: Result<Arc<T>, ResourceError>) -> Self {
        Self {
            uri: uri.into(),
            outcome,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn is_failed(&self) -> bool {
        self.outcome.is_err()
    }

    pub fn resource(&self) -> Option<&Arc<T>> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&ResourceError> {
        self.outcome.as_ref().err()
    }

    pub fn into_result(self) -> Result<Arc<T>, ResourceError> {
        self.outcome
    }
}
