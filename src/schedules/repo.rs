use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreError;
use crate::schedules::repo_types::{NewSchedule, Schedule, ScheduleRow};

/// Persistence for medication schedules. Every query is scoped to an owner.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn create(&self, schedule: NewSchedule) -> Result<Schedule, StoreError>;

    /// All schedules of `owner` in creation order.
    async fn list_for_owner(&self, owner: Uuid) -> Result<Vec<Schedule>, StoreError>;

    async fn find_for_owner(&self, owner: Uuid, id: Uuid) -> Result<Option<Schedule>, StoreError>;

    /// Deletes one schedule; returns whether a row was removed.
    async fn delete_one(&self, owner: Uuid, id: Uuid) -> Result<bool, StoreError>;

    /// Deletes every schedule of `owner`; returns the number removed.
    async fn delete_all(&self, owner: Uuid) -> Result<u64, StoreError>;
}

#[derive(Clone)]
pub struct PgScheduleStore {
    db: PgPool,
}

impl PgScheduleStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn into_schedule(row: ScheduleRow) -> Result<Schedule, StoreError> {
    Schedule::try_from(row).map_err(StoreError::Backend)
}

#[async_trait]
impl ScheduleStore for PgScheduleStore {
    async fn create(&self, s: NewSchedule) -> Result<Schedule, StoreError> {
        let row = sqlx::query_as::<_, ScheduleRow>(
            r#"
            INSERT INTO schedules (id, user_id, name, dosage, time, frequency, duration)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, name, dosage, time, frequency, duration, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(s.user_id)
        .bind(&s.name)
        .bind(&s.dosage)
        .bind(s.time.to_string())
        .bind(s.frequency.as_str())
        .bind(&s.duration)
        .fetch_one(&self.db)
        .await?;
        into_schedule(row)
    }

    async fn list_for_owner(&self, owner: Uuid) -> Result<Vec<Schedule>, StoreError> {
        let rows = sqlx::query_as::<_, ScheduleRow>(
            r#"
            SELECT id, user_id, name, dosage, time, frequency, duration, created_at
            FROM schedules
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.db)
        .await?;
        rows.into_iter().map(into_schedule).collect()
    }

    async fn find_for_owner(&self, owner: Uuid, id: Uuid) -> Result<Option<Schedule>, StoreError> {
        let row = sqlx::query_as::<_, ScheduleRow>(
            r#"
            SELECT id, user_id, name, dosage, time, frequency, duration, created_at
            FROM schedules
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.db)
        .await?;
        row.map(into_schedule).transpose()
    }

    async fn delete_one(&self, owner: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM schedules WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_all(&self, owner: Uuid) -> Result<u64, StoreError> {
        let res = sqlx::query("DELETE FROM schedules WHERE user_id = $1")
            .bind(owner)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected())
    }
}
