//! Domain layer types and invariants.

pub mod day_key;
pub mod entities;
pub mod error;
pub mod merge;
pub mod timeline;
pub mod types;
pub mod voices;
