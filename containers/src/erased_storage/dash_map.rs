use dashmap::DashMap;
use std::any::{Any, TypeId};

/// A dashmap which has type erasure
///
/// # References
/// We do not hand out any references in the erased storage dash map. Instead, to access the interior,
/// you must go through [`ErasedStorageDashMap::with`] or [`ErasedStorageDashMap::with_or_insert_with`].
#[derive(Debug, Default)]
pub struct ErasedStorageDashMap {
    dash_map: DashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl ErasedStorageDashMap {
    pub fn new() -> Self {
        Self {
            dash_map: DashMap::new(),
        }
    }

    /// Check if there exists a key for the type
    pub fn contains_key<T: 'static>(&self) -> bool {
        self.dash_map.contains_key(&TypeId::of::<T>())
    }

    /// Insert an item, replacing any previous item of the same type
    pub fn insert<T: Send + Sync + 'static>(&self, element: T) {
        self.dash_map.insert(TypeId::of::<T>(), Box::new(element));
    }

    pub fn with<T: 'static, R, F: FnOnce(&T) -> R>(&self, f: F) -> Option<R> {
        self.dash_map
            .get(&TypeId::of::<T>())
            .and_then(|data| data.downcast_ref::<T>().map(f))
    }

    /// Runs `f` against the stored `T`, inserting `init()` first if the type is absent.
    ///
    /// Insertion happens under the shard lock, so concurrent callers observe a single `T`.
    pub fn with_or_insert_with<T, R, I, F>(&self, init: I, f: F) -> R
    where
        T: Send + Sync + 'static,
        I: FnOnce() -> T,
        F: FnOnce(&T) -> R,
    {
        let entry = self
            .dash_map
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(init()));
        match entry.downcast_ref::<T>() {
            Some(data) => f(data),
            None => unreachable!("erased storage slot is keyed by its own TypeId"),
        }
    }

    /// Number of distinct types stored
    pub fn len(&self) -> usize {
        self.dash_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dash_map.is_empty()
    }

    /// Remove from erased storage
    pub fn remove<T: 'static>(&self) -> Option<Box<T>> {
        self.dash_map
            .remove(&TypeId::of::<T>())
            .and_then(|(_type_id, data)| data.downcast::<T>().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_types_do_not_collide() {
        let storage = ErasedStorageDashMap::new();
        storage.insert::<u32>(7);
        storage.insert::<String>("seven".to_string());

        assert_eq!(storage.with::<u32, _, _>(|v| *v), Some(7));
        assert_eq!(storage.with::<String, _, _>(|v| v.clone()).as_deref(), Some("seven"));
        assert_eq!(storage.with::<u64, _, _>(|v| *v), None);
        assert_eq!(storage.len(), 2);
    }

    #[test]
    fn test_with_or_insert_with_initializes_once() {
        let storage = ErasedStorageDashMap::new();
        let first = storage.with_or_insert_with(|| Arc::new(1u8), Arc::clone);
        // second init must never run
        let second = storage.with_or_insert_with(|| -> Arc<u8> { panic!("initialized twice") }, Arc::clone);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_remove() {
        let storage = ErasedStorageDashMap::new();
        storage.insert::<i64>(-3);
        assert_eq!(storage.remove::<i64>().map(|v| *v), Some(-3));
        assert!(!storage.contains_key::<i64>());
        assert!(storage.is_empty());
    }
}
