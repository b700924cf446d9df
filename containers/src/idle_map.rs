//! A concurrent map whose entries expire after a period without access.

use dashmap::DashMap;
use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Slot holding a value alongside the last time it was touched
///
/// Access time is stored as milliseconds since the owning map's epoch so it can be refreshed
/// through a shared reference.
#[derive(Debug)]
struct IdleSlot<V> {
    value: V,
    last_access: AtomicU64,
    pinned: bool,
}

impl<V> IdleSlot<V> {
    fn new(value: V, now: u64, pinned: bool) -> Self {
        Self {
            value,
            last_access: AtomicU64::new(now),
            pinned,
        }
    }

    fn touch(&self, now: u64) {
        self.last_access.fetch_max(now, Ordering::AcqRel);
    }

    fn is_expired(&self, now: u64, idle: u64) -> bool {
        !self.pinned && now.saturating_sub(self.last_access.load(Ordering::Acquire)) >= idle
    }
}

/// Concurrent map with access-based expiry
///
/// Expiry is lazy: an idle entry is dropped the next time it is looked up, or by
/// [`IdleExpiryMap::purge_expired`]. Pinned entries never expire.
#[derive(Debug)]
pub struct IdleExpiryMap<K: Eq + Hash, V> {
    entries: DashMap<K, IdleSlot<V>>,
    idle: Duration,
    epoch: Instant,
}

impl<K: Eq + Hash, V: Clone> IdleExpiryMap<K, V> {
    pub fn new(idle: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            idle,
            epoch: Instant::now(),
        }
    }

    pub fn idle(&self) -> Duration {
        self.idle
    }

    fn now(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn idle_millis(&self) -> u64 {
        self.idle.as_millis() as u64
    }

    /// Clones the value out and refreshes its access time
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.now();
        let idle = self.idle_millis();
        {
            let slot = self.entries.get(key)?;
            if !slot.is_expired(now, idle) {
                slot.touch(now);
                return Some(slot.value.clone());
            }
        }
        // read guard must be released before taking the shard write lock
        self.entries.remove_if(key, |_, slot| slot.is_expired(now, idle));
        None
    }

    /// Whether a live entry exists. Does not refresh the access time.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.now();
        self.entries
            .get(key)
            .is_some_and(|slot| !slot.is_expired(now, self.idle_millis()))
    }

    pub fn insert(&self, key: K, value: V) {
        self.entries.insert(key, IdleSlot::new(value, self.now(), false));
    }

    /// Inserts an entry which is exempt from expiry
    pub fn insert_pinned(&self, key: K, value: V) {
        self.entries.insert(key, IdleSlot::new(value, self.now(), true));
    }

    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.remove(key).map(|(_, slot)| slot.value)
    }

    /// Drops every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.now();
        let idle = self.idle_millis();
        let before = self.entries.len();
        self.entries.retain(|_, slot| !slot.is_expired(now, idle));
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
