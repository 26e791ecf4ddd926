//! Cache identities.
//!
//! Each cache exposes a stable label used in log fields and metric labels.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheName {
    /// Merged per-day counts across both timeline sources.
    DayIndex,
    /// Merged items of one calendar day.
    DayDetail,
    /// Category groups of one performer's voices.
    VoiceGroups,
}

impl CacheName {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheName::DayIndex => "day_index",
            CacheName::DayDetail => "day_detail",
            CacheName::VoiceGroups => "voice_groups",
        }
    }
}

impl fmt::Display for CacheName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) const METRIC_CACHE_HIT: &str = "memoria_cache_hit_total";
pub(crate) const METRIC_CACHE_MISS: &str = "memoria_cache_miss_total";
pub(crate) const METRIC_CACHE_INVALIDATE: &str = "memoria_cache_invalidate_total";
pub(crate) const METRIC_CACHE_STALE_DISCARD: &str = "memoria_cache_stale_discard_total";
pub(crate) const METRIC_CACHE_POPULATE_MS: &str = "memoria_cache_populate_ms";
