use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    application::repos::{
        CreateVoiceParams, RepoError, UpdateVoiceParams, VoicesRepo, VoicesWriteRepo,
    },
    domain::entities::VoiceRecord,
};

use super::{PostgresRepositories, util::map_sqlx_error};

const VOICE_COLUMNS: &str =
    "id, liver, category, title, sort_no, remark, file_path, add_time, deleted";

#[derive(sqlx::FromRow)]
struct VoiceRow {
    id: Uuid,
    liver: String,
    category: String,
    title: String,
    sort_no: i64,
    remark: String,
    file_path: String,
    add_time: i64,
    deleted: bool,
}

impl From<VoiceRow> for VoiceRecord {
    fn from(row: VoiceRow) -> Self {
        Self {
            id: row.id,
            liver: row.liver,
            category: row.category,
            title: row.title,
            sort_no: row.sort_no,
            remark: row.remark,
            file_path: row.file_path,
            add_time: row.add_time,
            deleted: row.deleted,
        }
    }
}

#[async_trait]
impl VoicesRepo for PostgresRepositories {
    async fn list_by_liver(&self, liver: &str) -> Result<Vec<VoiceRecord>, RepoError> {
        let sql = format!(
            "SELECT {VOICE_COLUMNS}
            FROM voices
            WHERE liver = $1 AND deleted = FALSE
            ORDER BY sort_no ASC, add_time ASC"
        );
        let rows = sqlx::query_as::<_, VoiceRow>(&sql)
            .bind(liver)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(VoiceRecord::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<VoiceRecord>, RepoError> {
        let sql = format!("SELECT {VOICE_COLUMNS} FROM voices WHERE id = $1 AND deleted = FALSE");
        let row = sqlx::query_as::<_, VoiceRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(VoiceRecord::from))
    }
}

#[async_trait]
impl VoicesWriteRepo for PostgresRepositories {
    async fn create_voice(&self, params: CreateVoiceParams) -> Result<VoiceRecord, RepoError> {
        let sql = format!(
            "INSERT INTO voices (liver, category, title, sort_no, remark, file_path, add_time)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {VOICE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, VoiceRow>(&sql)
            .bind(&params.liver)
            .bind(&params.category)
            .bind(&params.title)
            .bind(params.sort_no)
            .bind(&params.remark)
            .bind(&params.file_path)
            .bind(params.add_time)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(VoiceRecord::from(row))
    }

    async fn update_voice(&self, params: UpdateVoiceParams) -> Result<VoiceRecord, RepoError> {
        let sql = format!(
            "UPDATE voices
            SET liver = $2,
                category = $3,
                title = $4,
                sort_no = $5,
                remark = $6,
                file_path = COALESCE($7, file_path)
            WHERE id = $1 AND deleted = FALSE
            RETURNING {VOICE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, VoiceRow>(&sql)
            .bind(params.id)
            .bind(&params.liver)
            .bind(&params.category)
            .bind(&params.title)
            .bind(params.sort_no)
            .bind(&params.remark)
            .bind(params.file_path.as_deref())
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?
            .ok_or(RepoError::NotFound)?;

        Ok(VoiceRecord::from(row))
    }

    async fn soft_delete_voice(&self, id: Uuid) -> Result<(), RepoError> {
        let result =
            sqlx::query("UPDATE voices SET deleted = TRUE WHERE id = $1 AND deleted = FALSE")
                .bind(id)
                .execute(self.pool())
                .await
                .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
