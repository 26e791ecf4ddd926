use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

use super::keys::CacheName;

pub(crate) fn rw_read<'a, T>(
    lock: &'a RwLock<T>,
    cache: CacheName,
    op: &'static str,
) -> RwLockReadGuard<'a, T> {
    lock.read().unwrap_or_else(|poisoned| {
        recovered(cache, op, "rwlock.read");
        poisoned.into_inner()
    })
}

pub(crate) fn rw_write<'a, T>(
    lock: &'a RwLock<T>,
    cache: CacheName,
    op: &'static str,
) -> RwLockWriteGuard<'a, T> {
    lock.write().unwrap_or_else(|poisoned| {
        recovered(cache, op, "rwlock.write");
        poisoned.into_inner()
    })
}

fn recovered(cache: CacheName, op: &'static str, lock_kind: &'static str) {
    warn!(
        op,
        cache = cache.as_str(),
        lock_kind,
        result = "poisoned_recovered",
        hint = "entries may be stale after a panic in another thread",
        "Recovered from poisoned cache lock"
    );
}
