//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use time::UtcOffset;
use uuid::Uuid;

use crate::domain::entities::VoiceRecord;
use crate::domain::timeline::DayCount;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Read side of one timeline source (dynamics or lives).
#[async_trait]
pub trait TimelineSource: Send + Sync {
    type Record: Send + 'static;

    /// Records with `start <= timestamp < end`, ascending by timestamp.
    async fn list_in_range(&self, start: i64, end: i64) -> Result<Vec<Self::Record>, RepoError>;

    /// Per-day counts bucketed in `offset`, ascending by day.
    async fn day_counts(&self, offset: UtcOffset) -> Result<Vec<DayCount>, RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateEntryParams<C> {
    pub timestamp: i64,
    pub last_modified: i64,
    pub content: C,
}

#[derive(Debug, Clone)]
pub struct UpdateEntryParams<C> {
    pub id: Uuid,
    pub timestamp: i64,
    pub last_modified: i64,
    pub content: C,
}

/// Write side of one timeline source.
#[async_trait]
pub trait TimelineWriteRepo: Send + Sync {
    type Record: Send + 'static;
    type Content: Send + 'static;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Self::Record>, RepoError>;

    async fn create(
        &self,
        params: CreateEntryParams<Self::Content>,
    ) -> Result<Self::Record, RepoError>;

    /// Fails with `RepoError::NotFound` when `params.id` does not exist.
    async fn update(
        &self,
        params: UpdateEntryParams<Self::Content>,
    ) -> Result<Self::Record, RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateVoiceParams {
    pub liver: String,
    pub category: String,
    pub title: String,
    pub sort_no: i64,
    pub remark: String,
    pub file_path: String,
    pub add_time: i64,
}

#[derive(Debug, Clone)]
pub struct UpdateVoiceParams {
    pub id: Uuid,
    pub liver: String,
    pub category: String,
    pub title: String,
    pub sort_no: i64,
    pub remark: String,
    /// Replaces the stored path only when present.
    pub file_path: Option<String>,
}

#[async_trait]
pub trait VoicesRepo: Send + Sync {
    /// Non-deleted voices of `liver`, ascending by `sort_no`.
    async fn list_by_liver(&self, liver: &str) -> Result<Vec<VoiceRecord>, RepoError>;

    /// A non-deleted voice by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<VoiceRecord>, RepoError>;
}

#[async_trait]
pub trait VoicesWriteRepo: Send + Sync {
    async fn create_voice(&self, params: CreateVoiceParams) -> Result<VoiceRecord, RepoError>;

    async fn update_voice(&self, params: UpdateVoiceParams) -> Result<VoiceRecord, RepoError>;

    async fn soft_delete_voice(&self, id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait HealthRepo: Send + Sync {
    /// Round-trip to the backing store.
    async fn ping(&self) -> Result<(), RepoError>;
}
