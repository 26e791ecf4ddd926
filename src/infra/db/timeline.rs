//! `dynamics` and `lives` tables.
//!
//! Both tables share one shape (`id`, `"timestamp"`, `last_modified`,
//! `content JSONB`), so a single adapter serves either, parameterised by the
//! payload type stored in `content`.

use std::marker::PhantomData;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use sqlx::types::Json;
use time::UtcOffset;
use uuid::Uuid;

use crate::application::repos::{
    CreateEntryParams, RepoError, TimelineSource, TimelineWriteRepo, UpdateEntryParams,
};
use crate::domain::entities::{DynamicContent, DynamicRecord, LiveContent, LiveRecord};
use crate::domain::timeline::DayCount;
use crate::domain::types::TimelineKind;

use super::PostgresRepositories;
use super::util::{decode_payload, map_sqlx_error};

const ENTRY_COLUMNS: &str = r#"id, "timestamp", last_modified, content"#;

/// Payload stored in a timeline table's `content` column.
pub trait TimelinePayload: Serialize + DeserializeOwned + Send + Sync + 'static {
    type Record: Send + 'static;

    const KIND: TimelineKind;

    fn into_record(id: Uuid, timestamp: i64, last_modified: i64, content: Self) -> Self::Record;
}

impl TimelinePayload for DynamicContent {
    type Record = DynamicRecord;

    const KIND: TimelineKind = TimelineKind::Dynamic;

    fn into_record(id: Uuid, timestamp: i64, last_modified: i64, content: Self) -> DynamicRecord {
        DynamicRecord {
            id,
            timestamp,
            last_modified,
            content,
        }
    }
}

impl TimelinePayload for LiveContent {
    type Record = LiveRecord;

    const KIND: TimelineKind = TimelineKind::Live;

    fn into_record(id: Uuid, timestamp: i64, last_modified: i64, content: Self) -> LiveRecord {
        LiveRecord {
            id,
            timestamp,
            last_modified,
            content,
        }
    }
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    id: Uuid,
    timestamp: i64,
    last_modified: i64,
    content: Json<serde_json::Value>,
}

impl EntryRow {
    fn into_record<C: TimelinePayload>(self) -> Result<C::Record, RepoError> {
        let content: C = decode_payload("content", self.content)?;
        Ok(C::into_record(
            self.id,
            self.timestamp,
            self.last_modified,
            content,
        ))
    }
}

#[derive(sqlx::FromRow)]
struct DayCountRow {
    day: String,
    count: i64,
    version: i64,
}

pub struct TimelineTable<C> {
    repos: PostgresRepositories,
    _payload: PhantomData<fn() -> C>,
}

impl<C: TimelinePayload> TimelineTable<C> {
    pub(super) fn new(repos: PostgresRepositories) -> Self {
        Self {
            repos,
            _payload: PhantomData,
        }
    }

    fn table(&self) -> &'static str {
        C::KIND.table()
    }

    fn decode_rows(rows: Vec<EntryRow>) -> Result<Vec<C::Record>, RepoError> {
        rows.into_iter().map(EntryRow::into_record::<C>).collect()
    }
}

#[async_trait]
impl<C: TimelinePayload> TimelineSource for TimelineTable<C> {
    type Record = C::Record;

    async fn list_in_range(&self, start: i64, end: i64) -> Result<Vec<C::Record>, RepoError> {
        let sql = format!(
            r#"SELECT {ENTRY_COLUMNS}
            FROM {table}
            WHERE "timestamp" >= $1 AND "timestamp" < $2
            ORDER BY "timestamp" ASC, id ASC"#,
            table = self.table()
        );
        let rows = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(self.repos.pool())
            .await
            .map_err(map_sqlx_error)?;

        Self::decode_rows(rows)
    }

    async fn day_counts(&self, offset: UtcOffset) -> Result<Vec<DayCount>, RepoError> {
        let sql = format!(
            r#"SELECT
                to_char(to_timestamp("timestamp" + $1) AT TIME ZONE 'UTC', 'YYYY.MM.DD') AS day,
                COUNT(*) AS count,
                MAX(last_modified) AS version
            FROM {table}
            GROUP BY day
            ORDER BY day ASC"#,
            table = self.table()
        );
        let rows = sqlx::query_as::<_, DayCountRow>(&sql)
            .bind(i64::from(offset.whole_seconds()))
            .fetch_all(self.repos.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| DayCount::new(row.day, row.count, row.version))
            .collect())
    }
}

#[async_trait]
impl<C: TimelinePayload> TimelineWriteRepo for TimelineTable<C> {
    type Record = C::Record;
    type Content = C;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<C::Record>, RepoError> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM {table} WHERE id = $1",
            table = self.table()
        );
        sqlx::query_as::<_, EntryRow>(&sql)
            .bind(id)
            .fetch_optional(self.repos.pool())
            .await
            .map_err(map_sqlx_error)?
            .map(EntryRow::into_record::<C>)
            .transpose()
    }

    async fn create(&self, params: CreateEntryParams<C>) -> Result<C::Record, RepoError> {
        let sql = format!(
            r#"INSERT INTO {table} ("timestamp", last_modified, content)
            VALUES ($1, $2, $3)
            RETURNING {ENTRY_COLUMNS}"#,
            table = self.table()
        );
        let row = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(params.timestamp)
            .bind(params.last_modified)
            .bind(Json(&params.content))
            .fetch_one(self.repos.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.into_record::<C>()
    }

    async fn update(&self, params: UpdateEntryParams<C>) -> Result<C::Record, RepoError> {
        let sql = format!(
            r#"UPDATE {table}
            SET "timestamp" = $2, last_modified = $3, content = $4
            WHERE id = $1
            RETURNING {ENTRY_COLUMNS}"#,
            table = self.table()
        );
        let row = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(params.id)
            .bind(params.timestamp)
            .bind(params.last_modified)
            .bind(Json(&params.content))
            .fetch_optional(self.repos.pool())
            .await
            .map_err(map_sqlx_error)?
            .ok_or(RepoError::NotFound)?;

        row.into_record::<C>()
    }
}
