use super::{LoadBatch, LoadResult, Resource, ResourceDescriptor, UriPattern};
use crate::error::ResourceError;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{self, BoxFuture, Shared};
use skinbridge_containers::prelude::*;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Produces a resource for a URI
///
/// Loaders run on the manager's runtime. Any error they return is cached as a load failure for
/// the descriptor.
pub trait ResourceLoader<T: Resource>: Send + Sync + 'static {
    fn load(
        &self,
        manager: &ResourceManager,
        descriptor: ResourceDescriptor<T>,
    ) -> BoxFuture<'static, anyhow::Result<T>>;
}

type Cached<T> = Result<Arc<T>, ResourceError>;
type SharedLoad<T> = Shared<BoxFuture<'static, LoadResult<T>>>;

struct InFlight<T: Resource> {
    generation: u64,
    future: SharedLoad<T>,
}

/// Everything the manager keeps for a single resource type
struct ResourceStore<T: Resource> {
    loaders: RwLock<Vec<(UriPattern, Arc<dyn ResourceLoader<T>>)>>,
    cache: IdleExpiryMap<String, Cached<T>>,
    requested: DashMap<String, InFlight<T>>,
}

impl<T: Resource> ResourceStore<T> {
    fn new(idle_expiry: Duration) -> Self {
        Self {
            loaders: RwLock::new(Vec::new()),
            cache: IdleExpiryMap::new(idle_expiry),
            requested: DashMap::new(),
        }
    }

    fn loader_for(&self, uri: &str) -> Option<Arc<dyn ResourceLoader<T>>> {
        self.loaders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|(pattern, _)| pattern.matches(uri))
            .map(|(_, loader)| loader.clone())
    }
}

trait PurgeExpired: Send + Sync {
    fn purge_expired(&self) -> usize;
}

impl<T: Resource> PurgeExpired for ResourceStore<T> {
    fn purge_expired(&self) -> usize {
        self.cache.purge_expired()
    }
}

struct ManagerInner {
    runtime: tokio::runtime::Handle,
    idle_expiry: Duration,
    generation: AtomicU64,
    purgers: RwLock<Vec<Arc<dyn PurgeExpired>>>,
}

/// Asynchronous get-or-load cache over every [`Resource`] type
///
/// Cheap to clone; clones share the same cache.
#[derive(Clone)]
pub struct ResourceManager {
    stores: Arc<ErasedStorageDashMap>,
    inner: Arc<ManagerInner>,
}

impl std::fmt::Debug for ResourceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceManager")
            .field("resource_types", &self.stores.len())
            .field("idle_expiry", &self.inner.idle_expiry)
            .finish()
    }
}

impl ResourceManager {
    pub fn new(runtime: tokio::runtime::Handle, idle_expiry: Duration) -> Self {
        Self {
            stores: Arc::new(ErasedStorageDashMap::new()),
            inner: Arc::new(ManagerInner {
                runtime,
                idle_expiry,
                generation: AtomicU64::new(0),
                purgers: RwLock::new(Vec::new()),
            }),
        }
    }

    pub fn runtime(&self) -> &tokio::runtime::Handle {
        &self.inner.runtime
    }

    fn store<T: Resource>(&self) -> Arc<ResourceStore<T>> {
        if let Some(store) = self.stores.with::<Arc<ResourceStore<T>>, _, _>(Arc::clone) {
            return store;
        }
        self.stores.with_or_insert_with(
            || {
                let store = Arc::new(ResourceStore::<T>::new(self.inner.idle_expiry));
                self.inner
                    .purgers
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(store.clone());
                store
            },
            Arc::clone,
        )
    }

    /// Registers `loader` for URIs matching `pattern`
    ///
    /// Earlier registrations take precedence. Registering an already known pattern replaces its
    /// loader in place, keeping its position.
    pub fn register_loader<T: Resource>(
        &self,
        pattern: UriPattern,
        loader: Arc<dyn ResourceLoader<T>>,
    ) {
        let store = self.store::<T>();
        let mut loaders = store.loaders.write().unwrap_or_else(PoisonError::into_inner);
        match loaders.iter_mut().find(|(existing, _)| *existing == pattern) {
            Some(slot) => slot.1 = loader,
            None => loaders.push((pattern, loader)),
        }
    }

    /// Number of loaders registered for `T`
    pub fn loader_count<T: Resource>(&self) -> usize {
        self.store::<T>()
            .loaders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Cached outcome for the descriptor. Never triggers a load.
    pub fn get<T: Resource>(&self, descriptor: &ResourceDescriptor<T>) -> Result<Arc<T>, ResourceError> {
        self.store::<T>()
            .cache
            .get(descriptor.uri())
            .unwrap_or_else(|| {
                Err(ResourceError::NotLoaded {
                    uri: descriptor.uri().to_string(),
                })
            })
    }

    /// Cached outcome, or the outcome of a forced load
    pub async fn get_or_load<T: Resource>(
        &self,
        descriptor: &ResourceDescriptor<T>,
    ) -> Result<Arc<T>, ResourceError> {
        let cached = self.store::<T>().cache.get(descriptor.uri());
        match cached {
            Some(cached) => cached,
            None => self.load_async(descriptor, true).await.into_result(),
        }
    }

    /// Whether a successfully loaded resource is cached
    pub fn is_available<T: Resource>(&self, descriptor: &ResourceDescriptor<T>) -> bool {
        matches!(self.store::<T>().cache.get(descriptor.uri()), Some(Ok(_)))
    }

    /// Caches an outcome directly, bypassing loaders
    pub fn add<T: Resource>(&self, descriptor: &ResourceDescriptor<T>, resource: anyhow::Result<T>) {
        let uri = descriptor.uri().to_string();
        let outcome = resource
            .map(Arc::new)
            .map_err(|error| ResourceError::wrap(&uri, error));
        self.store::<T>().cache.insert(uri, outcome);
    }

    /// Caches a resource which is never expired
    pub fn add_pinned<T: Resource>(&self, descriptor: &ResourceDescriptor<T>, resource: T) {
        self.store::<T>()
            .cache
            .insert_pinned(descriptor.uri().to_string(), Ok(Arc::new(resource)));
    }

    /// Loads the descriptor on the runtime
    ///
    /// Unless `force` is set, a load already in flight is joined and a cached outcome, success or
    /// failure, is returned as is. The returned future may be dropped without cancelling the load.
    pub fn load_async<T: Resource>(
        &self,
        descriptor: &ResourceDescriptor<T>,
        force: bool,
    ) -> BoxFuture<'static, LoadResult<T>> {
        let store = self.store::<T>();
        let uri = descriptor.uri().to_string();
        // decision and dispatch happen under the entry guard, the loader itself runs outside it
        let shared = match store.requested.entry(uri.clone()) {
            Entry::Occupied(in_flight) if !force => in_flight.get().future.clone(),
            entry => {
                if !force {
                    if let Some(cached) = store.cache.get(&uri) {
                        return future::ready(LoadResult::new(uri, cached)).boxed();
                    }
                }
                let Some(loader) = store.loader_for(&uri) else {
                    let error = ResourceError::NoLoaderFound { kind: T::KIND, uri: uri.clone() };
                    tracing::warn!("{error}");
                    return future::ready(LoadResult::new(uri, Err(error))).boxed();
                };
                let generation = self.inner.generation.fetch_add(1, Ordering::Relaxed);
                let handle = self.inner.runtime.spawn(run_loader(
                    self.clone(),
                    store.clone(),
                    loader,
                    descriptor.clone(),
                    generation,
                ));
                let join_uri = uri.clone();
                let shared = async move {
                    match handle.await {
                        Ok(result) => result,
                        Err(e) => LoadResult::new(join_uri.clone(), Err(ResourceError::failure(&join_uri, e))),
                    }
                }
                .boxed()
                .shared();
                entry.insert(InFlight {
                    generation,
                    future: shared.clone(),
                });
                shared
            }
        };
        shared.boxed()
    }

    /// Blocks the calling thread until the load completes
    ///
    /// # Panics
    /// If called from within the manager's runtime.
    pub fn load_blocking<T: Resource>(&self, descriptor: &ResourceDescriptor<T>, force: bool) -> LoadResult<T> {
        self.inner.runtime.block_on(self.load_async(descriptor, force))
    }

    /// Starts a group of loads across resource types, see [`LoadBatch`]
    pub fn batch(&self, force: bool) -> LoadBatch<'_> {
        LoadBatch::new(self, force)
    }

    /// Drops idle entries of every resource type, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        self.inner
            .purgers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|store| store.purge_expired())
            .sum()
    }

    /// Periodically purges idle entries which are never looked up again
    pub fn spawn_expiry_sweeper(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let manager = self.clone();
        self.inner.runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let purged = manager.purge_expired();
                if purged > 0 {
                    tracing::debug!("Purged {purged} idle resources");
                }
            }
        })
    }
}

async fn run_loader<T: Resource>(
    manager: ResourceManager,
    store: Arc<ResourceStore<T>>,
    loader: Arc<dyn ResourceLoader<T>>,
    descriptor: ResourceDescriptor<T>,
    generation: u64,
) -> LoadResult<T> {
    let uri = descriptor.uri().to_string();
    let load = AssertUnwindSafe(async { loader.load(&manager, descriptor).await }).catch_unwind();
    let outcome = match load.await {
        Ok(Ok(resource)) => Ok(Arc::new(resource)),
        Ok(Err(error)) => Err(ResourceError::wrap(&uri, error)),
        Err(_) => Err(ResourceError::failure(&uri, "loader panicked")),
    };
    if let Err(error) = &outcome {
        tracing::debug!("{error}");
    }
    store.cache.insert(uri.clone(), outcome.clone());
    store
        .requested
        .remove_if(&uri, |_, in_flight| in_flight.generation == generation);
    LoadResult::new(uri, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::types::{Cape, Ears};
    use std::sync::atomic::AtomicUsize;

    struct CountingLoader {
        calls: Arc<AtomicUsize>,
        delay: Duration,
        fail: bool,
    }

    impl CountingLoader {
        fn new(delay: Duration, fail: bool) -> (Arc<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let loader = Arc::new(Self {
                calls: calls.clone(),
                delay,
                fail,
            });
            (loader, calls)
        }
    }

    impl ResourceLoader<Cape> for CountingLoader {
        fn load(&self, _: &ResourceManager, descriptor: ResourceDescriptor<Cape>) -> BoxFuture<'static, anyhow::Result<Cape>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let (delay, fail) = (self.delay, self.fail);
            async move {
                tokio::time::sleep(delay).await;
                if fail {
                    anyhow::bail!("cape server unreachable");
                }
                Ok(Cape {
                    resource_uri: descriptor.uri().to_string(),
                    cape_id: format!("call-{call}"),
                    ..Default::default()
                })
            }
            .boxed()
        }
    }

    struct PanickingLoader;

    impl ResourceLoader<Cape> for PanickingLoader {
        fn load(&self, _: &ResourceManager, _: ResourceDescriptor<Cape>) -> BoxFuture<'static, anyhow::Result<Cape>> {
            async { panic!("loader exploded") }.boxed()
        }
    }

    const TEST_PATTERN: UriPattern = UriPattern::Prefix("test:");

    fn manager() -> ResourceManager {
        ResourceManager::new(tokio::runtime::Handle::current(), Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_store_is_created_once_per_type() {
        let manager = manager();
        let first = manager.store::<Cape>();
        let second = manager.store::<Cape>();
        assert!(Arc::ptr_eq(&first, &second));
        manager.store::<Ears>();
        assert_eq!(manager.inner.purgers.read().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_loads_are_deduplicated() {
        let manager = manager();
        let (loader, calls) = CountingLoader::new(Duration::from_millis(20), false);
        manager.register_loader::<Cape>(TEST_PATTERN, loader);

        let descriptor = ResourceDescriptor::<Cape>::new("test:dedup");
        let pending: Vec<_> = (0..8).map(|_| manager.load_async(&descriptor, false)).collect();
        let results = future::join_all(pending).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let first = results[0].resource().unwrap();
        for result in &results {
            assert!(Arc::ptr_eq(first, result.resource().unwrap()));
        }
        // in-flight entry is gone once the load settles
        assert!(manager.store::<Cape>().requested.is_empty());
    }

    #[tokio::test]
    async fn test_cached_until_forced() {
        let manager = manager();
        let (loader, calls) = CountingLoader::new(Duration::ZERO, false);
        manager.register_loader::<Cape>(TEST_PATTERN, loader);
        let descriptor = ResourceDescriptor::<Cape>::new("test:cached");

        assert!(matches!(manager.get(&descriptor), Err(ResourceError::NotLoaded { .. })));
        let loaded = manager.load_async(&descriptor, false).await.into_result().unwrap();
        let again = manager.load_async(&descriptor, false).await.into_result().unwrap();
        assert!(Arc::ptr_eq(&loaded, &again));
        assert!(Arc::ptr_eq(&loaded, &manager.get(&descriptor).unwrap()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let forced = manager.load_async(&descriptor, true).await.into_result().unwrap();
        assert_eq!(forced.cape_id, "call-1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failures_are_cached() {
        let manager = manager();
        let (loader, calls) = CountingLoader::new(Duration::ZERO, true);
        manager.register_loader::<Cape>(TEST_PATTERN, loader);
        let descriptor = ResourceDescriptor::<Cape>::new("test:broken");

        let result = manager.load_async(&descriptor, false).await;
        assert!(result.is_failed());
        assert!(result.error().unwrap().to_string().contains("cape server unreachable"));
        // no automatic retry
        assert!(manager.load_async(&descriptor, false).await.is_failed());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(manager.get(&descriptor), Err(ResourceError::LoadFailure { .. })));
        assert!(!manager.is_available(&descriptor));
    }

    #[tokio::test]
    async fn test_no_loader_found() {
        let manager = manager();
        let result = manager.load_async(&ResourceDescriptor::<Ears>::new("nowhere:1"), false).await;
        assert!(matches!(
            result.error(),
            Some(ResourceError::NoLoaderFound { kind: "ears", .. })
        ));
    }

    #[tokio::test]
    async fn test_panicking_loader_becomes_failure() {
        let manager = manager();
        manager.register_loader::<Cape>(TEST_PATTERN, Arc::new(PanickingLoader));
        let descriptor = ResourceDescriptor::<Cape>::new("test:panic");
        let result = manager.load_async(&descriptor, false).await;
        assert!(matches!(result.error(), Some(ResourceError::LoadFailure { .. })));
        assert!(manager.store::<Cape>().requested.is_empty());
    }

    #[tokio::test]
    async fn test_register_loader_replaces_in_place() {
        let manager = manager();
        let (first, first_calls) = CountingLoader::new(Duration::ZERO, false);
        let (second, second_calls) = CountingLoader::new(Duration::ZERO, false);
        let (fallback, fallback_calls) = CountingLoader::new(Duration::ZERO, false);
        manager.register_loader::<Cape>(TEST_PATTERN, first);
        manager.register_loader::<Cape>(UriPattern::Prefix("test"), fallback);
        manager.register_loader::<Cape>(TEST_PATTERN, second);
        assert_eq!(manager.loader_count::<Cape>(), 2);

        manager.load_async(&ResourceDescriptor::<Cape>::new("test:a"), false).await;
        // replaced loader keeps its precedence over later registrations
        assert_eq!(first_calls.load(Ordering::SeqCst), 0);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_batch_across_types() {
        let manager = manager();
        let (loader, _) = CountingLoader::new(Duration::ZERO, false);
        manager.register_loader::<Cape>(TEST_PATTERN, loader);
        let cape = ResourceDescriptor::<Cape>::new("test:batch");
        let ears = ResourceDescriptor::<Ears>::new("test:batch");

        let results = manager.batch(false).with(&cape).with(&ears).join().await;
        assert!(!results.failed(&cape));
        assert!(results.failed(&ears));
        assert_eq!(results.get(&cape).unwrap().resource().unwrap().resource_uri, "test:batch");
    }

    #[tokio::test]
    async fn test_idle_entries_expire() {
        let manager = ResourceManager::new(tokio::runtime::Handle::current(), Duration::from_millis(20));
        let pinned = ResourceDescriptor::<Cape>::new("cape:none");
        let plain = ResourceDescriptor::<Cape>::new("test:idle");
        manager.add_pinned(&pinned, Cape::none("cape:none"));
        manager.add(&plain, Ok(Cape::none("test:idle")));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(manager.purge_expired(), 1);
        assert!(manager.is_available(&pinned));
        assert!(!manager.is_available(&plain));
    }

    #[test]
    fn test_load_blocking_outside_runtime() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let manager = ResourceManager::new(runtime.handle().clone(), Duration::from_secs(60));
        let (loader, _) = CountingLoader::new(Duration::from_millis(5), false);
        manager.register_loader::<Cape>(TEST_PATTERN, loader);

        let result = manager.load_blocking(&ResourceDescriptor::<Cape>::new("test:blocking"), false);
        assert_eq!(result.resource().unwrap().cape_id, "call-0");
    }
}
