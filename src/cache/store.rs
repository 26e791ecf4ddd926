//! Versioned cache storage.
//!
//! Two shapes: a single slot and an LRU-bounded keyed map. Both carry an
//! invalidation epoch. A reader that misses receives the epoch current at the
//! time of the miss and may only store its computed value if no invalidation
//! of that slot or key happened since. The check and the store run under the
//! same write lock, and every invalidation bumps the epoch under that lock.

use std::collections::HashMap;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::RwLock;

use lru::LruCache;
use metrics::counter;
use tracing::debug;

use super::keys::{
    CacheName, METRIC_CACHE_HIT, METRIC_CACHE_INVALIDATE, METRIC_CACHE_MISS,
    METRIC_CACHE_STALE_DISCARD,
};
use super::lock::{rw_read, rw_write};

/// Monotonic invalidation counter of one cache.
pub type Epoch = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<V> {
    pub value: V,
    pub version: i64,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V, version: i64) -> Self {
        Self { value, version }
    }
}

/// Outcome of a cache read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    Hit(CacheEntry<V>),
    /// Nothing cached; carries the epoch to hand back to `put_if_current`.
    Miss(Epoch),
}

impl<V> Lookup<V> {
    pub fn miss_epoch(&self) -> Option<Epoch> {
        match self {
            Lookup::Miss(epoch) => Some(*epoch),
            Lookup::Hit(_) => None,
        }
    }
}

fn record_lookup<V>(name: CacheName, lookup: &Lookup<V>) {
    let metric = match lookup {
        Lookup::Hit(_) => METRIC_CACHE_HIT,
        Lookup::Miss(_) => METRIC_CACHE_MISS,
    };
    counter!(metric, "cache" => name.as_str()).increment(1);
}

fn record_stale(name: CacheName, started: Epoch, current: Epoch) {
    counter!(METRIC_CACHE_STALE_DISCARD, "cache" => name.as_str()).increment(1);
    debug!(
        cache = name.as_str(),
        started,
        current,
        "Discarded populate that raced an invalidation"
    );
}

fn record_invalidate(name: CacheName) {
    counter!(METRIC_CACHE_INVALIDATE, "cache" => name.as_str()).increment(1);
}

// ============================================================================
// Single slot
// ============================================================================

struct SlotState<V> {
    entry: Option<CacheEntry<V>>,
    epoch: Epoch,
}

pub struct SlotStore<V> {
    name: CacheName,
    state: RwLock<SlotState<V>>,
}

impl<V: Clone> SlotStore<V> {
    pub fn new(name: CacheName) -> Self {
        Self {
            name,
            state: RwLock::new(SlotState {
                entry: None,
                epoch: 0,
            }),
        }
    }

    pub fn lookup(&self) -> Lookup<V> {
        let state = rw_read(&self.state, self.name, "slot.lookup");
        let lookup = match &state.entry {
            Some(entry) => Lookup::Hit(entry.clone()),
            None => Lookup::Miss(state.epoch),
        };
        record_lookup(self.name, &lookup);
        lookup
    }

    /// Store `entry` unless the slot was invalidated after `epoch` was observed.
    pub fn put_if_current(&self, epoch: Epoch, entry: CacheEntry<V>) -> bool {
        let mut state = rw_write(&self.state, self.name, "slot.put_if_current");
        if state.epoch != epoch {
            record_stale(self.name, epoch, state.epoch);
            return false;
        }
        state.entry = Some(entry);
        true
    }

    pub fn invalidate(&self) {
        let mut state = rw_write(&self.state, self.name, "slot.invalidate");
        state.entry = None;
        state.epoch += 1;
        record_invalidate(self.name);
    }

    pub fn epoch(&self) -> Epoch {
        rw_read(&self.state, self.name, "slot.epoch").epoch
    }

    pub fn is_empty(&self) -> bool {
        rw_read(&self.state, self.name, "slot.is_empty")
            .entry
            .is_none()
    }
}

// ============================================================================
// Keyed map
// ============================================================================

struct KeyedState<K: Hash + Eq, V> {
    entries: LruCache<K, CacheEntry<V>>,
    /// Bumped by every invalidation; misses hand out its current value.
    epoch: Epoch,
    /// Epoch of the latest invalidation of each key since `floor` was raised.
    marks: HashMap<K, Epoch>,
    /// Populates started before this epoch are discarded for every key.
    floor: Epoch,
}

impl<K: Hash + Eq, V> KeyedState<K, V> {
    fn is_stale(&self, epoch: Epoch, key: &K) -> bool {
        epoch < self.floor || self.marks.get(key).is_some_and(|mark| *mark > epoch)
    }
}

/// LRU map whose invalidations only discard in-flight populates of the same key.
///
/// Per-key marks are bounded by the map capacity; when they overflow they fold
/// into `floor`, which discards every populate in flight at that moment.
pub struct KeyedStore<K: Hash + Eq, V> {
    name: CacheName,
    state: RwLock<KeyedState<K, V>>,
}

impl<K: Hash + Eq + Clone, V: Clone> KeyedStore<K, V> {
    pub fn new(name: CacheName, capacity: NonZeroUsize) -> Self {
        Self {
            name,
            state: RwLock::new(KeyedState {
                entries: LruCache::new(capacity),
                epoch: 0,
                marks: HashMap::new(),
                floor: 0,
            }),
        }
    }

    pub fn lookup(&self, key: &K) -> Lookup<V> {
        // LRU reads update recency, so they need the write half.
        let mut state = rw_write(&self.state, self.name, "keyed.lookup");
        let epoch = state.epoch;
        let lookup = match state.entries.get(key) {
            Some(entry) => Lookup::Hit(entry.clone()),
            None => Lookup::Miss(epoch),
        };
        record_lookup(self.name, &lookup);
        lookup
    }

    /// Store `entry` under `key` unless `key` was invalidated after `epoch`.
    pub fn put_if_current(&self, epoch: Epoch, key: K, entry: CacheEntry<V>) -> bool {
        let mut state = rw_write(&self.state, self.name, "keyed.put_if_current");
        if state.is_stale(epoch, &key) {
            record_stale(self.name, epoch, state.epoch);
            return false;
        }
        state.entries.put(key, entry);
        true
    }

    /// Evict one key. Returns whether an entry was present.
    pub fn invalidate(&self, key: &K) -> bool {
        let mut state = rw_write(&self.state, self.name, "keyed.invalidate");
        state.epoch += 1;
        let epoch = state.epoch;
        if state.marks.len() >= state.entries.cap().get() && !state.marks.contains_key(key) {
            state.marks.clear();
            state.floor = epoch;
        } else {
            state.marks.insert(key.clone(), epoch);
        }
        record_invalidate(self.name);
        state.entries.pop(key).is_some()
    }

    pub fn clear(&self) {
        let mut state = rw_write(&self.state, self.name, "keyed.clear");
        state.epoch += 1;
        state.floor = state.epoch;
        state.marks.clear();
        state.entries.clear();
        record_invalidate(self.name);
    }

    pub fn contains(&self, key: &K) -> bool {
        rw_read(&self.state, self.name, "keyed.contains")
            .entries
            .contains(key)
    }

    pub fn len(&self) -> usize {
        rw_read(&self.state, self.name, "keyed.len").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
