//! In-process stores used by tests and local runs without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    auth::{
        repo::UserStore,
        repo_types::{NewUser, User},
    },
    error::StoreError,
    logs::{
        repo::LogStore,
        repo_types::{DoseLog, NewDoseLog},
    },
    schedules::{
        repo::ScheduleStore,
        repo_types::{NewSchedule, Schedule},
    },
};

#[derive(Default)]
pub struct MemoryUserStore {
    by_email: RwLock<HashMap<String, User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.by_email.read().await.get(email).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.by_email.write().await;
        if users.contains_key(&user.email) {
            return Err(StoreError::Duplicate);
        }
        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(user.email.clone(), user.clone());
        Ok(user)
    }
}

#[derive(Default)]
pub struct MemoryScheduleStore {
    rows: RwLock<Vec<Schedule>>,
}

#[async_trait]
impl ScheduleStore for MemoryScheduleStore {
    async fn create(&self, s: NewSchedule) -> Result<Schedule, StoreError> {
        let schedule = Schedule {
            id: Uuid::new_v4(),
            user_id: s.user_id,
            name: s.name,
            dosage: s.dosage,
            time: s.time,
            frequency: s.frequency,
            duration: s.duration,
            created_at: OffsetDateTime::now_utc(),
        };
        self.rows.write().await.push(schedule.clone());
        Ok(schedule)
    }

    async fn list_for_owner(&self, owner: Uuid) -> Result<Vec<Schedule>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().filter(|s| s.user_id == owner).cloned().collect())
    }

    async fn find_for_owner(&self, owner: Uuid, id: Uuid) -> Result<Option<Schedule>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|s| s.id == id && s.user_id == owner).cloned())
    }

    async fn delete_one(&self, owner: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|s| !(s.id == id && s.user_id == owner));
        Ok(rows.len() != before)
    }

    async fn delete_all(&self, owner: Uuid) -> Result<u64, StoreError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|s| s.user_id != owner);
        Ok((before - rows.len()) as u64)
    }
}

#[derive(Default)]
pub struct MemoryLogStore {
    rows: RwLock<Vec<DoseLog>>,
}

#[async_trait]
impl LogStore for MemoryLogStore {
    async fn insert(&self, log: NewDoseLog) -> Result<DoseLog, StoreError> {
        let date = log.date();
        let entry = DoseLog {
            id: Uuid::new_v4(),
            user_id: log.user_id,
            schedule_id: log.schedule_id,
            status: log.status,
            schedule_ref: log.schedule_ref,
            timestamp: log.timestamp,
            date,
        };
        self.rows.write().await.push(entry.clone());
        Ok(entry)
    }

    async fn recent(&self, owner: Uuid, limit: i64) -> Result<Vec<DoseLog>, StoreError> {
        let rows = self.rows.read().await;
        let mut mine: Vec<DoseLog> = rows.iter().filter(|l| l.user_id == owner).cloned().collect();
        mine.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        mine.truncate(limit.max(0) as usize);
        Ok(mine)
    }
}
