use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::AppError,
    schedules::{
        dto::CreateScheduleRequest,
        repo::ScheduleStore,
        repo_types::{Frequency, NewSchedule, Schedule, TimeOfDay},
    },
    validate::{optional, required},
};

pub const DEFAULT_DURATION: &str = "N/A";

/// Validates the request and turns it into a storable schedule.
pub fn validate(owner: Uuid, req: CreateScheduleRequest) -> Result<NewSchedule, AppError> {
    const MISSING: &str = "Name and time are required";
    let name = required(req.name, MISSING)?;
    let time: TimeOfDay = required(req.time, MISSING)?
        .parse()
        .map_err(AppError::Validation)?;
    let frequency = match optional(req.frequency) {
        Some(f) => f.parse::<Frequency>().map_err(AppError::Validation)?,
        None => Frequency::default(),
    };
    Ok(NewSchedule {
        user_id: owner,
        name,
        dosage: optional(req.dosage),
        time,
        frequency,
        duration: optional(req.duration).unwrap_or_else(|| DEFAULT_DURATION.to_string()),
    })
}

pub async fn create(
    store: &dyn ScheduleStore,
    owner: Uuid,
    req: CreateScheduleRequest,
) -> Result<Schedule, AppError> {
    let new = validate(owner, req).inspect_err(|e| warn!(%owner, error = %e, "invalid schedule"))?;
    let schedule = store.create(new).await?;
    info!(%owner, schedule_id = %schedule.id, time = %schedule.time, "schedule created");
    Ok(schedule)
}

/// Deletes one schedule. Unknown, malformed or foreign ids still succeed.
pub async fn delete_one(store: &dyn ScheduleStore, owner: Uuid, raw_id: &str) -> Result<(), AppError> {
    let Ok(id) = Uuid::parse_str(raw_id) else {
        warn!(%owner, id = raw_id, "delete with malformed schedule id ignored");
        return Ok(());
    };
    let removed = store.delete_one(owner, id).await?;
    info!(%owner, schedule_id = %id, removed, "schedule delete");
    Ok(())
}

pub async fn delete_all(store: &dyn ScheduleStore, owner: Uuid) -> Result<(), AppError> {
    let removed = store.delete_all(owner).await?;
    info!(%owner, removed, "all schedules deleted");
    Ok(())
}
