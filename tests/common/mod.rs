//! In-memory repositories shared by the router and metrics tests.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use time::UtcOffset;
use time::macros::offset;
use uuid::Uuid;

use memoria::application::repos::{
    CreateEntryParams, CreateVoiceParams, HealthRepo, RepoError, TimelineSource,
    TimelineWriteRepo, UpdateEntryParams, UpdateVoiceParams, VoicesRepo, VoicesWriteRepo,
};
use memoria::application::timeline::{TimelineRepos, TimelineService};
use memoria::application::voices::VoiceService;
use memoria::cache::{CacheConfig, TimelineCache, VoiceGroupCache};
use memoria::domain::day_key::DayKey;
use memoria::domain::entities::{
    DynamicContent, DynamicRecord, LiveContent, LiveRecord, VoiceRecord,
};
use memoria::domain::timeline::{DayCount, TimelineRecord};
use memoria::infra::http::{AdminState, HttpState};

pub const OFFSET: UtcOffset = offset!(+8);

/// 2024-01-15 10:00:00 +08:00
pub const JAN_15: i64 = 1_705_284_000;
/// 2024-01-16 10:00:00 +08:00
pub const JAN_16: i64 = JAN_15 + 86_400;

type Builder<C, R> = fn(Uuid, i64, i64, C) -> R;

/// One timeline table held in memory.
pub struct MemoryTable<C, R> {
    rows: Mutex<Vec<R>>,
    build: Builder<C, R>,
    range_calls: AtomicUsize,
    count_calls: AtomicUsize,
    fail: AtomicBool,
}

impl<C, R> MemoryTable<C, R>
where
    R: TimelineRecord + Clone,
{
    pub fn new(build: Builder<C, R>) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            build,
            range_calls: AtomicUsize::new(0),
            count_calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    pub fn seed(&self, id: Uuid, timestamp: i64, last_modified: i64, content: C) {
        let record = (self.build)(id, timestamp, last_modified, content);
        self.rows.lock().unwrap().push(record);
    }

    pub fn range_calls(&self) -> usize {
        self.range_calls.load(Ordering::SeqCst)
    }

    pub fn count_calls(&self) -> usize {
        self.count_calls.load(Ordering::SeqCst)
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), RepoError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RepoError::from_persistence("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl<C, R> TimelineSource for MemoryTable<C, R>
where
    C: Send + Sync + 'static,
    R: TimelineRecord + Clone + Send + Sync + 'static,
{
    type Record = R;

    async fn list_in_range(&self, start: i64, end: i64) -> Result<Vec<R>, RepoError> {
        self.range_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut rows: Vec<R> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.timestamp() >= start && row.timestamp() < end)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.timestamp());
        Ok(rows)
    }

    async fn day_counts(&self, offset: UtcOffset) -> Result<Vec<DayCount>, RepoError> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut days: BTreeMap<String, (i64, i64)> = BTreeMap::new();
        for row in self.rows.lock().unwrap().iter() {
            let key = DayKey::from_timestamp(row.timestamp(), offset)
                .map_err(|err| RepoError::InvalidInput {
                    message: err.to_string(),
                })?
                .to_string();
            let slot = days.entry(key).or_insert((0, 0));
            slot.0 += 1;
            slot.1 = slot.1.max(row.last_modified());
        }
        Ok(days
            .into_iter()
            .map(|(day, (count, version))| DayCount::new(day, count, version))
            .collect())
    }
}

#[async_trait]
impl<C, R> TimelineWriteRepo for MemoryTable<C, R>
where
    C: Send + Sync + 'static,
    R: TimelineRecord + Clone + Send + Sync + 'static,
{
    type Record = R;
    type Content = C;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<R>, RepoError> {
        self.check()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.id() == id)
            .cloned())
    }

    async fn create(&self, params: CreateEntryParams<C>) -> Result<R, RepoError> {
        self.check()?;
        let record = (self.build)(
            Uuid::new_v4(),
            params.timestamp,
            params.last_modified,
            params.content,
        );
        self.rows.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update(&self, params: UpdateEntryParams<C>) -> Result<R, RepoError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let slot = rows
            .iter_mut()
            .find(|row| row.id() == params.id)
            .ok_or(RepoError::NotFound)?;
        *slot = (self.build)(
            params.id,
            params.timestamp,
            params.last_modified,
            params.content,
        );
        Ok(slot.clone())
    }
}

pub fn dynamic_record(
    id: Uuid,
    timestamp: i64,
    last_modified: i64,
    content: DynamicContent,
) -> DynamicRecord {
    DynamicRecord {
        id,
        timestamp,
        last_modified,
        content,
    }
}

pub fn live_record(
    id: Uuid,
    timestamp: i64,
    last_modified: i64,
    content: LiveContent,
) -> LiveRecord {
    LiveRecord {
        id,
        timestamp,
        last_modified,
        content,
    }
}

pub type DynamicTable = MemoryTable<DynamicContent, DynamicRecord>;
pub type LiveTable = MemoryTable<LiveContent, LiveRecord>;

#[derive(Default)]
pub struct MemoryVoices {
    rows: Mutex<Vec<VoiceRecord>>,
    list_calls: AtomicUsize,
}

impl MemoryVoices {
    pub fn seed(&self, liver: &str, category: &str, title: &str, sort_no: i64) -> Uuid {
        let id = Uuid::new_v4();
        self.rows.lock().unwrap().push(VoiceRecord {
            id,
            liver: liver.to_string(),
            category: category.to_string(),
            title: title.to_string(),
            sort_no,
            remark: String::new(),
            file_path: format!("voices/{title}.mp3"),
            add_time: sort_no,
            deleted: false,
        });
        id
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VoicesRepo for MemoryVoices {
    async fn list_by_liver(&self, liver: &str) -> Result<Vec<VoiceRecord>, RepoError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let mut rows: Vec<VoiceRecord> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|voice| voice.liver == liver && !voice.deleted)
            .cloned()
            .collect();
        rows.sort_by_key(|voice| voice.sort_no);
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<VoiceRecord>, RepoError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|voice| voice.id == id && !voice.deleted)
            .cloned())
    }
}

#[async_trait]
impl VoicesWriteRepo for MemoryVoices {
    async fn create_voice(&self, params: CreateVoiceParams) -> Result<VoiceRecord, RepoError> {
        let voice = VoiceRecord {
            id: Uuid::new_v4(),
            liver: params.liver,
            category: params.category,
            title: params.title,
            sort_no: params.sort_no,
            remark: params.remark,
            file_path: params.file_path,
            add_time: params.add_time,
            deleted: false,
        };
        self.rows.lock().unwrap().push(voice.clone());
        Ok(voice)
    }

    async fn update_voice(&self, params: UpdateVoiceParams) -> Result<VoiceRecord, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        let voice = rows
            .iter_mut()
            .find(|voice| voice.id == params.id && !voice.deleted)
            .ok_or(RepoError::NotFound)?;
        voice.liver = params.liver;
        voice.category = params.category;
        voice.title = params.title;
        voice.sort_no = params.sort_no;
        voice.remark = params.remark;
        if let Some(path) = params.file_path {
            voice.file_path = path;
        }
        Ok(voice.clone())
    }

    async fn soft_delete_voice(&self, id: Uuid) -> Result<(), RepoError> {
        let mut rows = self.rows.lock().unwrap();
        let voice = rows
            .iter_mut()
            .find(|voice| voice.id == id && !voice.deleted)
            .ok_or(RepoError::NotFound)?;
        voice.deleted = true;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryHealth {
    pub down: AtomicBool,
}

#[async_trait]
impl HealthRepo for MemoryHealth {
    async fn ping(&self) -> Result<(), RepoError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(RepoError::Timeout);
        }
        Ok(())
    }
}

/// Services wired to in-memory adapters, with handles for seeding and inspection.
pub struct Harness {
    pub dynamics: Arc<DynamicTable>,
    pub lives: Arc<LiveTable>,
    pub voices_repo: Arc<MemoryVoices>,
    pub health: Arc<MemoryHealth>,
    pub timeline: Arc<TimelineService>,
    pub voices: Arc<VoiceService>,
}

impl Harness {
    pub fn new() -> Self {
        let config = CacheConfig::default();
        let dynamics = Arc::new(DynamicTable::new(dynamic_record));
        let lives = Arc::new(LiveTable::new(live_record));
        let voices_repo = Arc::new(MemoryVoices::default());
        let health = Arc::new(MemoryHealth::default());

        let timeline = Arc::new(TimelineService::new(
            TimelineRepos {
                dynamics: dynamics.clone(),
                lives: lives.clone(),
                dynamics_writer: dynamics.clone(),
                lives_writer: lives.clone(),
            },
            Arc::new(TimelineCache::new(&config, OFFSET)),
        ));
        let voices = Arc::new(VoiceService::new(
            voices_repo.clone(),
            voices_repo.clone(),
            Arc::new(VoiceGroupCache::new(&config)),
        ));

        Self {
            dynamics,
            lives,
            voices_repo,
            health,
            timeline,
            voices,
        }
    }

    pub fn http_state(&self) -> HttpState {
        HttpState {
            timeline: self.timeline.clone(),
            voices: self.voices.clone(),
            health: self.health.clone(),
        }
    }

    pub fn admin_state(&self) -> AdminState {
        AdminState {
            timeline: self.timeline.clone(),
            voices: self.voices.clone(),
            health: self.health.clone(),
        }
    }
}

pub fn titled_live(title: &str) -> LiveContent {
    LiveContent {
        title: title.to_string(),
        ..Default::default()
    }
}

pub fn titled_dynamic(title: &str) -> DynamicContent {
    DynamicContent {
        title: title.to_string(),
        ..Default::default()
    }
}
