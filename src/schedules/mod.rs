pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use repo::ScheduleStore;
pub use repo_types::{Frequency, Schedule, TimeOfDay};

pub fn router() -> Router<AppState> {
    handlers::schedule_routes()
}
