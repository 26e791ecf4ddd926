use serde::{Deserialize, Serialize};

use crate::application::timeline::TimelineEntryCommand;
use crate::application::voices::VoiceCommand;

/// Body of a dynamic or live write: the timestamp plus the flattened payload.
#[derive(Debug, Deserialize, Serialize)]
pub struct TimelineEntryRequest<C> {
    pub timestamp: i64,
    #[serde(flatten)]
    pub content: C,
}

impl<C> From<TimelineEntryRequest<C>> for TimelineEntryCommand<C> {
    fn from(request: TimelineEntryRequest<C>) -> Self {
        Self {
            timestamp: request.timestamp,
            content: request.content,
        }
    }
}

/// Blank required fields are reported by the service as validation errors.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct VoiceRequest {
    pub liver: String,
    pub category: String,
    pub title: String,
    pub sort_no: i64,
    pub remark: String,
    pub file_path: Option<String>,
}

impl From<VoiceRequest> for VoiceCommand {
    fn from(request: VoiceRequest) -> Self {
        Self {
            liver: request.liver,
            category: request.category,
            title: request.title,
            sort_no: request.sort_no,
            remark: request.remark,
            file_path: request.file_path,
        }
    }
}
