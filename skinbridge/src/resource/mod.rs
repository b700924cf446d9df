//! Typed, asynchronous resource cache
//!
//! Resources are addressed by a [`ResourceDescriptor`], a URI tied to the resource type it
//! resolves to. The [`ResourceManager`] dispatches each URI to the first registered loader whose
//! pattern matches it, deduplicates concurrent requests and caches both successes and failures.

pub mod batch;
pub mod descriptor;
pub mod manager;
pub mod pattern;
pub mod result;
pub mod types;

pub use batch::{LoadBatch, LoadResults};
pub use descriptor::{DescriptorKey, EarsSkinParams, LoadParams, ResourceDescriptor};
pub use manager::{ResourceLoader, ResourceManager};
pub use pattern::UriPattern;
pub use result::LoadResult;
pub use types::*;

/// Anything the [`ResourceManager`] can cache
pub trait Resource: std::fmt::Debug + Send + Sync + 'static {
    /// Human readable name used in logs and errors
    const KIND: &'static str;

    fn resource_uri(&self) -> &str;
}
