use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreError;
use crate::logs::repo_types::{DoseLog, DoseLogRow, NewDoseLog};

/// Number of entries `history` returns.
pub const HISTORY_LIMIT: i64 = 10;

/// Append-only persistence for dose events.
#[async_trait]
pub trait LogStore: Send + Sync {
    async fn insert(&self, log: NewDoseLog) -> Result<DoseLog, StoreError>;

    /// Most recent entries of `owner`, newest first, at most `limit`.
    async fn recent(&self, owner: Uuid, limit: i64) -> Result<Vec<DoseLog>, StoreError>;
}

#[derive(Clone)]
pub struct PgLogStore {
    db: PgPool,
}

impl PgLogStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LogStore for PgLogStore {
    async fn insert(&self, log: NewDoseLog) -> Result<DoseLog, StoreError> {
        let row = sqlx::query_as::<_, DoseLogRow>(
            r#"
            INSERT INTO dose_logs (id, user_id, schedule_id, status, schedule_ref, logged_at, log_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, schedule_id, status, schedule_ref, logged_at, log_date
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(log.user_id)
        .bind(log.schedule_id)
        .bind(log.status.as_str())
        .bind(&log.schedule_ref)
        .bind(log.timestamp)
        .bind(log.date())
        .fetch_one(&self.db)
        .await?;
        DoseLog::try_from(row).map_err(StoreError::Backend)
    }

    async fn recent(&self, owner: Uuid, limit: i64) -> Result<Vec<DoseLog>, StoreError> {
        let rows = sqlx::query_as::<_, DoseLogRow>(
            r#"
            SELECT id, user_id, schedule_id, status, schedule_ref, logged_at, log_date
            FROM dose_logs
            WHERE user_id = $1
            ORDER BY logged_at DESC
            LIMIT $2
            "#,
        )
        .bind(owner)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;
        rows.into_iter()
            .map(|r| DoseLog::try_from(r).map_err(StoreError::Backend))
            .collect()
    }
}
