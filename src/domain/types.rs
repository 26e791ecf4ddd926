//! Shared domain enumerations and wrappers.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineKind {
    Dynamic,
    Live,
}

impl TimelineKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TimelineKind::Dynamic => "dynamic",
            TimelineKind::Live => "live",
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            TimelineKind::Dynamic => "dynamics",
            TimelineKind::Live => "lives",
        }
    }
}

impl fmt::Display for TimelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payload paired with the validation token it was cached under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Versioned<T> {
    pub value: T,
    pub version: i64,
}

impl<T> Versioned<T> {
    pub fn new(value: T, version: i64) -> Self {
        Self { value, version }
    }

    /// Quoted entity tag for the version.
    pub fn etag(&self) -> String {
        format!("\"{}\"", self.version)
    }
}
