//! Memoria cache system
//!
//! In-process, versioned caches for the read paths:
//!
//! - **Day index**: merged per-day counts, cleared by any timeline write
//! - **Day detail**: merged items per day key, cleared per affected day
//! - **Voice groups**: category groups per performer, cleared per performer
//!
//! Entries never expire by time. Keyed caches are LRU bounded:
//!
//! ```toml
//! [cache]
//! day_detail_limit = 4096
//! voice_owner_limit = 1024
//! ```

mod config;
mod keys;
mod lock;
mod store;
mod timeline;
mod voices;

pub use config::CacheConfig;
pub use keys::CacheName;
pub(crate) use keys::METRIC_CACHE_POPULATE_MS;
pub use store::{CacheEntry, Epoch, KeyedStore, Lookup, SlotStore};
pub use timeline::TimelineCache;
pub use voices::VoiceGroupCache;
