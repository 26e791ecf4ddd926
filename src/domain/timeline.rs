//! The merged timeline element and the per-day summary row.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entities::{DynamicRecord, LiveRecord};
use super::types::TimelineKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineItem {
    Dynamic(DynamicRecord),
    Live(LiveRecord),
}

impl TimelineItem {
    pub fn kind(&self) -> TimelineKind {
        match self {
            TimelineItem::Dynamic(_) => TimelineKind::Dynamic,
            TimelineItem::Live(_) => TimelineKind::Live,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            TimelineItem::Dynamic(record) => record.id,
            TimelineItem::Live(record) => record.id,
        }
    }

    pub fn timestamp(&self) -> i64 {
        match self {
            TimelineItem::Dynamic(record) => record.timestamp,
            TimelineItem::Live(record) => record.timestamp,
        }
    }

    pub fn last_modified(&self) -> i64 {
        match self {
            TimelineItem::Dynamic(record) => record.last_modified,
            TimelineItem::Live(record) => record.last_modified,
        }
    }
}

/// Fields every timeline record carries regardless of its kind.
pub trait TimelineRecord {
    fn id(&self) -> Uuid;
    fn timestamp(&self) -> i64;
    fn last_modified(&self) -> i64;
}

impl TimelineRecord for DynamicRecord {
    fn id(&self) -> Uuid {
        self.id
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn last_modified(&self) -> i64 {
        self.last_modified
    }
}

impl TimelineRecord for LiveRecord {
    fn id(&self) -> Uuid {
        self.id
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn last_modified(&self) -> i64 {
        self.last_modified
    }
}

impl From<DynamicRecord> for TimelineItem {
    fn from(record: DynamicRecord) -> Self {
        TimelineItem::Dynamic(record)
    }
}

impl From<LiveRecord> for TimelineItem {
    fn from(record: LiveRecord) -> Self {
        TimelineItem::Live(record)
    }
}

/// Number of items on one calendar day and the newest modification among them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    pub day: String,
    pub count: i64,
    pub version: i64,
}

impl DayCount {
    pub fn new(day: impl Into<String>, count: i64, version: i64) -> Self {
        Self {
            day: day.into(),
            count,
            version,
        }
    }
}
