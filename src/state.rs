use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    auth::repo::{PgUserStore, UserStore},
    config::AppConfig,
    logs::repo::{LogStore, PgLogStore},
    memory::{MemoryLogStore, MemoryScheduleStore, MemoryUserStore},
    schedules::repo::{PgScheduleStore, ScheduleStore},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub schedules: Arc<dyn ScheduleStore>,
    pub logs: Arc<dyn LogStore>,
}

impl AppState {
    /// Connects to Postgres and returns the state plus the pool for migrations.
    pub async fn init(config: AppConfig) -> anyhow::Result<(Self, PgPool)> {
        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        Ok((Self::from_pool(db.clone(), Arc::new(config)), db))
    }

    pub fn from_pool(db: PgPool, config: Arc<AppConfig>) -> Self {
        Self {
            config,
            users: Arc::new(PgUserStore::new(db.clone())),
            schedules: Arc::new(PgScheduleStore::new(db.clone())),
            logs: Arc::new(PgLogStore::new(db)),
        }
    }

    /// State backed by in-memory stores.
    pub fn in_memory(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            users: Arc::new(MemoryUserStore::default()),
            schedules: Arc::new(MemoryScheduleStore::default()),
            logs: Arc::new(MemoryLogStore::default()),
        }
    }
}
