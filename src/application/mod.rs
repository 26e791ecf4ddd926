//! Application services: cached reads and invalidating writes.

pub mod error;
pub mod repos;
pub mod timeline;
pub mod voices;
