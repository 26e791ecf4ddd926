use std::sync::atomic::{AtomicI64, Ordering};

use tracing::debug;

use crate::domain::voices::CategoryGroup;
use crate::util::timezone::now_millis;

use super::config::CacheConfig;
use super::keys::CacheName;
use super::store::KeyedStore;

/// Category groups per performer.
pub struct VoiceGroupCache {
    groups: KeyedStore<String, Vec<CategoryGroup>>,
    last_version: AtomicI64,
}

impl VoiceGroupCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            groups: KeyedStore::new(CacheName::VoiceGroups, config.voice_owner_limit_non_zero()),
            last_version: AtomicI64::new(0),
        }
    }

    pub fn groups(&self) -> &KeyedStore<String, Vec<CategoryGroup>> {
        &self.groups
    }

    /// Version for a fresh refresh: the wall clock in milliseconds, bumped past
    /// any version already handed out so two refreshes never share a tag.
    pub fn next_version(&self) -> i64 {
        let now = now_millis();
        let previous = self.last_version.fetch_max(now, Ordering::SeqCst);
        if previous < now {
            return now;
        }
        self.last_version.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn invalidate(&self, liver: &str) {
        let evicted = self.groups.invalidate(&liver.to_string());
        debug!(
            cache = CacheName::VoiceGroups.as_str(),
            liver, evicted, "Invalidated voice groups"
        );
    }
}
