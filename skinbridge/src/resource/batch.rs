use super::{DescriptorKey, LoadResult, Resource, ResourceDescriptor, ResourceManager};
use futures::FutureExt;
use futures::future::{self, BoxFuture};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

type ErasedResult = Arc<dyn Any + Send + Sync>;

/// Fan-out of loads over descriptors of different resource types
///
/// Every load is dispatched as soon as it is added; [`LoadBatch::join`] waits for all of them.
pub struct LoadBatch<'a> {
    manager: &'a ResourceManager,
    force: bool,
    pending: Vec<BoxFuture<'static, (DescriptorKey, ErasedResult)>>,
}

impl<'a> LoadBatch<'a> {
    pub(super) fn new(manager: &'a ResourceManager, force: bool) -> Self {
        Self {
            manager,
            force,
            pending: Vec::new(),
        }
    }

    pub fn with<T: Resource>(mut self, descriptor: &ResourceDescriptor<T>) -> Self {
        let key = descriptor.key();
        let load = self
            .manager
            .load_async(descriptor, self.force)
            .map(move |result| (key, Arc::new(result) as ErasedResult))
            .boxed();
        self.pending.push(load);
        self
    }

    pub async fn join(self) -> LoadResults {
        LoadResults {
            results: future::join_all(self.pending).await.into_iter().collect(),
        }
    }
}

/// Outcomes of a [`LoadBatch`], looked up by descriptor
#[derive(Default)]
pub struct LoadResults {
    results: HashMap<DescriptorKey, ErasedResult>,
}

impl LoadResults {
    pub fn get<T: Resource>(&self, descriptor: &ResourceDescriptor<T>) -> Option<LoadResult<T>> {
        self.results
            .get(&descriptor.key())
            .and_then(|result| result.downcast_ref::<LoadResult<T>>())
            .cloned()
    }

    /// True when the load failed or the descriptor was never part of the batch
    pub fn failed<T: Resource>(&self, descriptor: &ResourceDescriptor<T>) -> bool {
        self.get(descriptor).is_none_or(|result| result.is_failed())
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
