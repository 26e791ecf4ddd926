//! Cache configuration.
//!
//! Bounds the keyed caches via the `[cache]` section of `memoria.toml`.

use std::num::NonZeroUsize;

use serde::Deserialize;

const DEFAULT_DAY_DETAIL_LIMIT: usize = 4096;
const DEFAULT_VOICE_OWNER_LIMIT: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of day keys held by the day-detail cache.
    pub day_detail_limit: usize,
    /// Maximum number of performers held by the voice-group cache.
    pub voice_owner_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            day_detail_limit: DEFAULT_DAY_DETAIL_LIMIT,
            voice_owner_limit: DEFAULT_VOICE_OWNER_LIMIT,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            day_detail_limit: settings.day_detail_limit,
            voice_owner_limit: settings.voice_owner_limit,
        }
    }
}

impl CacheConfig {
    /// Returns the day-detail limit, clamping to 1 if zero.
    pub fn day_detail_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.day_detail_limit).unwrap_or(NonZeroUsize::MIN)
    }

    /// Returns the voice owner limit, clamping to 1 if zero.
    pub fn voice_owner_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.voice_owner_limit).unwrap_or(NonZeroUsize::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert_eq!(config.day_detail_limit, 4096);
        assert_eq!(config.voice_owner_limit, 1024);
    }

    #[test]
    fn non_zero_clamps_to_min() {
        let config = CacheConfig {
            day_detail_limit: 0,
            voice_owner_limit: 0,
        };
        assert_eq!(config.day_detail_limit_non_zero().get(), 1);
        assert_eq!(config.voice_owner_limit_non_zero().get(), 1);
    }
}
