//! Voice clips grouped by category per performer.

use std::sync::Arc;
use std::time::Instant;

use metrics::histogram;
use thiserror::Error;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::application::repos::{
    CreateVoiceParams, RepoError, UpdateVoiceParams, VoicesRepo, VoicesWriteRepo,
};
use crate::cache::{CacheEntry, CacheName, Lookup, METRIC_CACHE_POPULATE_MS, VoiceGroupCache};
use crate::domain::entities::VoiceRecord;
use crate::domain::types::Versioned;
use crate::domain::voices::{CategoryGroup, group_by_category};
use crate::util::timezone::now_millis;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("voice {0} not found")]
    NotFound(Uuid),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Default)]
pub struct VoiceCommand {
    pub liver: String,
    pub category: String,
    pub title: String,
    /// Values `<= 0` fall back to the voice's add time.
    pub sort_no: i64,
    pub remark: String,
    pub file_path: Option<String>,
}

#[derive(Clone)]
pub struct VoiceService {
    reader: Arc<dyn VoicesRepo>,
    writer: Arc<dyn VoicesWriteRepo>,
    cache: Arc<VoiceGroupCache>,
}

impl VoiceService {
    pub fn new(
        reader: Arc<dyn VoicesRepo>,
        writer: Arc<dyn VoicesWriteRepo>,
        cache: Arc<VoiceGroupCache>,
    ) -> Self {
        Self {
            reader,
            writer,
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<VoiceGroupCache> {
        &self.cache
    }

    #[instrument(skip(self))]
    pub async fn voice_groups(
        &self,
        liver: &str,
    ) -> Result<Versioned<Vec<CategoryGroup>>, VoiceError> {
        let liver = liver.trim();
        if liver.is_empty() {
            return Err(VoiceError::Validation("liver is required".to_string()));
        }
        let key = liver.to_string();

        let epoch = match self.cache.groups().lookup(&key) {
            Lookup::Hit(entry) => {
                debug!(version = entry.version, "Voice groups served from cache");
                return Ok(Versioned::new(entry.value, entry.version));
            }
            Lookup::Miss(epoch) => epoch,
        };

        let started = Instant::now();
        let voices = self.reader.list_by_liver(liver).await.map_err(|err| {
            error!(
                cache = CacheName::VoiceGroups.as_str(),
                error = %err,
                "Voice source query failed"
            );
            VoiceError::Repo(err)
        })?;

        let groups = group_by_category(voices);
        let version = self.cache.next_version();
        histogram!(METRIC_CACHE_POPULATE_MS, "cache" => CacheName::VoiceGroups.as_str())
            .record(started.elapsed().as_secs_f64() * 1000.0);

        let stored = self
            .cache
            .groups()
            .put_if_current(epoch, key, CacheEntry::new(groups.clone(), version));
        debug!(groups = groups.len(), version, stored, "Voice groups computed");

        Ok(Versioned::new(groups, version))
    }

    #[instrument(skip(self, command), fields(liver = %command.liver))]
    pub async fn add_voice(&self, command: VoiceCommand) -> Result<VoiceRecord, VoiceError> {
        let command = normalize(command)?;
        let add_time = now_millis();

        let created = self
            .writer
            .create_voice(CreateVoiceParams {
                sort_no: default_sort_no(command.sort_no, add_time),
                liver: command.liver,
                category: command.category,
                title: command.title,
                remark: command.remark,
                file_path: command.file_path.unwrap_or_default(),
                add_time,
            })
            .await?;

        self.cache.invalidate(&created.liver);
        info!(id = %created.id, "Voice created");
        Ok(created)
    }

    #[instrument(skip(self, command), fields(liver = %command.liver))]
    pub async fn update_voice(
        &self,
        id: Uuid,
        command: VoiceCommand,
    ) -> Result<VoiceRecord, VoiceError> {
        let command = normalize(command)?;
        let existing = self
            .reader
            .find_by_id(id)
            .await?
            .ok_or(VoiceError::NotFound(id))?;

        let updated = self
            .writer
            .update_voice(UpdateVoiceParams {
                id,
                sort_no: default_sort_no(command.sort_no, existing.add_time),
                liver: command.liver,
                category: command.category,
                title: command.title,
                remark: command.remark,
                file_path: command.file_path,
            })
            .await
            .map_err(|err| not_found_or(err, id))?;

        self.cache.invalidate(&existing.liver);
        if updated.liver != existing.liver {
            self.cache.invalidate(&updated.liver);
        }
        info!(%id, previous_liver = %existing.liver, "Voice updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_voice(&self, id: Uuid) -> Result<(), VoiceError> {
        let existing = self
            .reader
            .find_by_id(id)
            .await?
            .ok_or(VoiceError::NotFound(id))?;

        self.writer
            .soft_delete_voice(id)
            .await
            .map_err(|err| not_found_or(err, id))?;

        self.cache.invalidate(&existing.liver);
        info!(liver = %existing.liver, "Voice deleted");
        Ok(())
    }
}

fn normalize(command: VoiceCommand) -> Result<VoiceCommand, VoiceError> {
    let required = |field: &str, value: String| -> Result<String, VoiceError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(VoiceError::Validation(format!("{field} is required")));
        }
        Ok(trimmed.to_string())
    };

    Ok(VoiceCommand {
        liver: required("liver", command.liver)?,
        category: required("category", command.category)?,
        title: required("title", command.title)?,
        sort_no: command.sort_no,
        remark: command.remark,
        file_path: command.file_path.filter(|path| !path.trim().is_empty()),
    })
}

fn default_sort_no(sort_no: i64, add_time: i64) -> i64 {
    if sort_no <= 0 { add_time } else { sort_no }
}

fn not_found_or(err: RepoError, id: Uuid) -> VoiceError {
    match err {
        RepoError::NotFound => VoiceError::NotFound(id),
        other => VoiceError::Repo(other),
    }
}
