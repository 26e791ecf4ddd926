use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UserProfile {
    pub uid: i64,
    pub uname: String,
    pub face: String,
    pub utype: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DynamicPicture {
    pub img_src: String,
    pub img_width: i32,
    pub img_height: i32,
    pub img_size: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DynamicCtrl {
    pub data: String,
    pub length: i32,
    pub location: i32,
    #[serde(rename = "type")]
    pub kind: i16,
}

/// Kind-specific body of a dynamic post. Opaque to the timeline merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DynamicContent {
    #[serde(rename = "type")]
    pub kind: i16,
    pub dynamic_id: i64,
    pub rid: i64,
    pub bvid: String,
    pub user_profile: Option<UserProfile>,
    pub user_profiles: Vec<UserProfile>,
    pub title: String,
    pub content: String,
    pub desc: String,
    pub pic: String,
    pub area_v2_name: String,
    pub image_urls: Vec<String>,
    pub ctrl: Vec<DynamicCtrl>,
    pub pictures: Vec<DynamicPicture>,
    pub origin: Option<Box<DynamicOrigin>>,
}

/// A reposted dynamic embedded in another one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DynamicOrigin {
    #[serde(default)]
    pub timestamp: i64,
    #[serde(flatten)]
    pub content: DynamicContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicRecord {
    pub id: Uuid,
    pub timestamp: i64,
    pub last_modified: i64,
    #[serde(flatten)]
    pub content: DynamicContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LiveCutDialogue {
    pub speaker: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LiveCut {
    #[serde(rename = "type")]
    pub kind: i8,
    pub file: String,
    pub title: String,
    pub dialogues: Vec<LiveCutDialogue>,
}

/// Kind-specific body of a live session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LiveContent {
    pub title: String,
    pub content: String,
    pub user_profile: Option<UserProfile>,
    pub join_user_profiles: Vec<UserProfile>,
    pub full_record: String,
    pub cuts: Vec<LiveCut>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveRecord {
    pub id: Uuid,
    pub timestamp: i64,
    pub last_modified: i64,
    #[serde(flatten)]
    pub content: LiveContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceRecord {
    pub id: Uuid,
    pub liver: String,
    pub category: String,
    pub title: String,
    pub sort_no: i64,
    pub remark: String,
    pub file_path: String,
    pub add_time: i64,
    #[serde(default, skip_serializing)]
    pub deleted: bool,
}
