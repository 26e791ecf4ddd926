//! Merged timeline reads and cache-invalidating timeline writes.

use std::sync::Arc;
use std::time::Instant;

use metrics::histogram;
use thiserror::Error;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::application::repos::{
    CreateEntryParams, RepoError, TimelineSource, TimelineWriteRepo, UpdateEntryParams,
};
use crate::cache::{CacheEntry, CacheName, Lookup, METRIC_CACHE_POPULATE_MS, TimelineCache};
use crate::domain::day_key::DayKey;
use crate::domain::entities::{DynamicContent, DynamicRecord, LiveContent, LiveRecord};
use crate::domain::error::DomainError;
use crate::domain::merge::{merge_day_counts, merge_items};
use crate::domain::timeline::{DayCount, TimelineItem, TimelineRecord};
use crate::domain::types::{TimelineKind, Versioned};
use crate::util::timezone::now_millis;

pub type DynamicSource = Arc<dyn TimelineSource<Record = DynamicRecord>>;
pub type LiveSource = Arc<dyn TimelineSource<Record = LiveRecord>>;
pub type DynamicWriter =
    Arc<dyn TimelineWriteRepo<Record = DynamicRecord, Content = DynamicContent>>;
pub type LiveWriter = Arc<dyn TimelineWriteRepo<Record = LiveRecord, Content = LiveContent>>;

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("`{0}` is not a valid day key (expected YYYY.MM.DD)")]
    InvalidDayKey(String),
    #[error("{kind} entry {id} not found")]
    NotFound { kind: TimelineKind, id: Uuid },
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<DomainError> for TimelineError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidDayKey { value } => TimelineError::InvalidDayKey(value),
            DomainError::Validation { message } => TimelineError::Validation(message),
            other @ DomainError::TimestampOutOfRange { .. } => {
                TimelineError::Validation(other.to_string())
            }
        }
    }
}

/// Input of a timeline add or update.
#[derive(Debug, Clone)]
pub struct TimelineEntryCommand<C> {
    pub timestamp: i64,
    pub content: C,
}

/// Adapters backing the two timeline sources.
#[derive(Clone)]
pub struct TimelineRepos {
    pub dynamics: DynamicSource,
    pub lives: LiveSource,
    pub dynamics_writer: DynamicWriter,
    pub lives_writer: LiveWriter,
}

#[derive(Clone)]
pub struct TimelineService {
    repos: TimelineRepos,
    cache: Arc<TimelineCache>,
}

impl TimelineService {
    pub fn new(repos: TimelineRepos, cache: Arc<TimelineCache>) -> Self {
        Self { repos, cache }
    }

    pub fn cache(&self) -> &Arc<TimelineCache> {
        &self.cache
    }

    /// Merged per-day counts of both sources.
    #[instrument(skip(self))]
    pub async fn day_index(&self) -> Result<Versioned<Vec<DayCount>>, TimelineError> {
        let epoch = match self.cache.day_index().lookup() {
            Lookup::Hit(entry) => {
                debug!(version = entry.version, "Day index served from cache");
                return Ok(Versioned::new(entry.value, entry.version));
            }
            Lookup::Miss(epoch) => epoch,
        };

        let started = Instant::now();
        let offset = self.cache.offset();
        let (dynamics, lives) = tokio::try_join!(
            self.repos.dynamics.day_counts(offset),
            self.repos.lives.day_counts(offset)
        )
        .map_err(|err| source_failure(CacheName::DayIndex, err))?;

        let (days, version) = merge_day_counts(dynamics, lives);
        record_populate(CacheName::DayIndex, started);

        let stored = self
            .cache
            .day_index()
            .put_if_current(epoch, CacheEntry::new(days.clone(), version));
        debug!(days = days.len(), version, stored, "Day index computed");

        Ok(Versioned::new(days, version))
    }

    /// Merged items of one day, keyed `YYYY.MM.DD`.
    #[instrument(skip(self))]
    pub async fn day(&self, day: &str) -> Result<Versioned<Vec<TimelineItem>>, TimelineError> {
        let key = DayKey::parse(day)?;

        let epoch = match self.cache.days().lookup(&key) {
            Lookup::Hit(entry) => {
                debug!(day = %key, version = entry.version, "Day served from cache");
                return Ok(Versioned::new(entry.value, entry.version));
            }
            Lookup::Miss(epoch) => epoch,
        };

        let started = Instant::now();
        let (start, end) = key.bounds(self.cache.offset());
        let (dynamics, lives) = tokio::try_join!(
            self.repos.dynamics.list_in_range(start, end),
            self.repos.lives.list_in_range(start, end)
        )
        .map_err(|err| source_failure(CacheName::DayDetail, err))?;

        let (items, version) = merge_items(dynamics, lives);
        record_populate(CacheName::DayDetail, started);

        let stored = self
            .cache
            .days()
            .put_if_current(epoch, key, CacheEntry::new(items.clone(), version));
        debug!(day = %key, items = items.len(), version, stored, "Day computed");

        Ok(Versioned::new(items, version))
    }

    pub async fn add_dynamic(
        &self,
        command: TimelineEntryCommand<DynamicContent>,
    ) -> Result<DynamicRecord, TimelineError> {
        self.create_entry(
            TimelineKind::Dynamic,
            self.repos.dynamics_writer.as_ref(),
            command,
        )
        .await
    }

    pub async fn update_dynamic(
        &self,
        id: Uuid,
        command: TimelineEntryCommand<DynamicContent>,
    ) -> Result<DynamicRecord, TimelineError> {
        self.update_entry(
            TimelineKind::Dynamic,
            self.repos.dynamics_writer.as_ref(),
            id,
            command,
        )
        .await
    }

    pub async fn add_live(
        &self,
        command: TimelineEntryCommand<LiveContent>,
    ) -> Result<LiveRecord, TimelineError> {
        self.create_entry(TimelineKind::Live, self.repos.lives_writer.as_ref(), command)
            .await
    }

    pub async fn update_live(
        &self,
        id: Uuid,
        command: TimelineEntryCommand<LiveContent>,
    ) -> Result<LiveRecord, TimelineError> {
        self.update_entry(
            TimelineKind::Live,
            self.repos.lives_writer.as_ref(),
            id,
            command,
        )
        .await
    }

    #[instrument(
        skip(self, kind, writer, command),
        fields(kind = kind.as_str(), timestamp = command.timestamp)
    )]
    async fn create_entry<R, C>(
        &self,
        kind: TimelineKind,
        writer: &dyn TimelineWriteRepo<Record = R, Content = C>,
        command: TimelineEntryCommand<C>,
    ) -> Result<R, TimelineError>
    where
        R: TimelineRecord + Send + 'static,
        C: Send + 'static,
    {
        self.ensure_dated(command.timestamp)?;

        let created = writer
            .create(CreateEntryParams {
                timestamp: command.timestamp,
                last_modified: now_millis(),
                content: command.content,
            })
            .await?;

        self.cache.invalidate_write(&[created.timestamp()]);
        info!(id = %created.id(), "Timeline entry created");
        Ok(created)
    }

    #[instrument(
        skip(self, kind, writer, command),
        fields(kind = kind.as_str(), timestamp = command.timestamp)
    )]
    async fn update_entry<R, C>(
        &self,
        kind: TimelineKind,
        writer: &dyn TimelineWriteRepo<Record = R, Content = C>,
        id: Uuid,
        command: TimelineEntryCommand<C>,
    ) -> Result<R, TimelineError>
    where
        R: TimelineRecord + Send + 'static,
        C: Send + 'static,
    {
        self.ensure_dated(command.timestamp)?;

        let existing = writer
            .find_by_id(id)
            .await?
            .ok_or(TimelineError::NotFound { kind, id })?;

        let updated = writer
            .update(UpdateEntryParams {
                id,
                timestamp: command.timestamp,
                last_modified: now_millis(),
                content: command.content,
            })
            .await
            .map_err(|err| match err {
                RepoError::NotFound => TimelineError::NotFound { kind, id },
                other => TimelineError::Repo(other),
            })?;

        self.cache
            .invalidate_write(&[existing.timestamp(), updated.timestamp()]);
        info!(
            %id,
            previous_timestamp = existing.timestamp(),
            "Timeline entry updated"
        );
        Ok(updated)
    }

    /// Reject timestamps that have no calendar day before anything is written.
    fn ensure_dated(&self, timestamp: i64) -> Result<(), TimelineError> {
        DayKey::from_timestamp(timestamp, self.cache.offset())?;
        Ok(())
    }
}

fn source_failure(cache: CacheName, err: RepoError) -> TimelineError {
    error!(cache = cache.as_str(), error = %err, "Timeline source query failed");
    TimelineError::Repo(err)
}

fn record_populate(cache: CacheName, started: Instant) {
    histogram!(METRIC_CACHE_POPULATE_MS, "cache" => cache.as_str())
        .record(started.elapsed().as_secs_f64() * 1000.0);
}
