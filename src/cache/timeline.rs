//! Day index and day detail caches for the merged timeline.

use time::UtcOffset;
use tracing::{debug, error};

use crate::domain::day_key::DayKey;
use crate::domain::timeline::{DayCount, TimelineItem};

use super::config::CacheConfig;
use super::keys::CacheName;
use super::store::{KeyedStore, SlotStore};

pub struct TimelineCache {
    offset: UtcOffset,
    day_index: SlotStore<Vec<DayCount>>,
    days: KeyedStore<DayKey, Vec<TimelineItem>>,
}

impl TimelineCache {
    pub fn new(config: &CacheConfig, offset: UtcOffset) -> Self {
        Self {
            offset,
            day_index: SlotStore::new(CacheName::DayIndex),
            days: KeyedStore::new(CacheName::DayDetail, config.day_detail_limit_non_zero()),
        }
    }

    /// Offset used to bucket timestamps into day keys.
    pub fn offset(&self) -> UtcOffset {
        self.offset
    }

    pub fn day_index(&self) -> &SlotStore<Vec<DayCount>> {
        &self.day_index
    }

    pub fn days(&self) -> &KeyedStore<DayKey, Vec<TimelineItem>> {
        &self.days
    }

    pub fn invalidate_day_index(&self) {
        self.day_index.invalidate();
        debug!(cache = CacheName::DayIndex.as_str(), "Invalidated day index");
    }

    /// Evict the day that contains `timestamp`.
    ///
    /// A timestamp without a calendar day clears the whole day-detail cache.
    pub fn invalidate_day(&self, timestamp: i64) {
        match DayKey::from_timestamp(timestamp, self.offset) {
            Ok(key) => {
                let evicted = self.days.invalidate(&key);
                debug!(
                    cache = CacheName::DayDetail.as_str(),
                    day = %key,
                    evicted,
                    "Invalidated day"
                );
            }
            Err(err) => {
                error!(
                    cache = CacheName::DayDetail.as_str(),
                    timestamp,
                    error = %err,
                    "Cannot derive day key for invalidation; clearing all days"
                );
                self.days.clear();
            }
        }
    }

    /// Invalidate after a successful write touching `timestamps`.
    pub fn invalidate_write(&self, timestamps: &[i64]) {
        self.invalidate_day_index();
        for &timestamp in timestamps {
            self.invalidate_day(timestamp);
        }
    }
}
