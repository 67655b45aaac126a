use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::AppError,
    logs::{
        dto::RecordLogRequest,
        repo::{LogStore, HISTORY_LIMIT},
        repo_types::{DoseLog, DoseStatus, NewDoseLog},
    },
    schedules::ScheduleStore,
    validate::required,
};

/// Records a dose event against one of the caller's own schedules.
pub async fn record(
    logs: &dyn LogStore,
    schedules: &dyn ScheduleStore,
    owner: Uuid,
    req: RecordLogRequest,
    now: OffsetDateTime,
) -> Result<DoseLog, AppError> {
    const MISSING: &str = "scheduleId and status required";
    let raw_id = required(req.schedule_id, MISSING)?;
    let status: DoseStatus = required(req.status, MISSING)?
        .parse()
        .map_err(AppError::Validation)?;

    let not_found = || AppError::NotFound("Schedule not found".into());
    let schedule_id = Uuid::parse_str(&raw_id).map_err(|_| not_found())?;
    let Some(schedule) = schedules.find_for_owner(owner, schedule_id).await? else {
        warn!(%owner, %schedule_id, "log for unknown schedule");
        return Err(not_found());
    };

    let log = logs
        .insert(NewDoseLog {
            user_id: owner,
            schedule_id,
            status,
            schedule_ref: schedule.name,
            timestamp: now,
        })
        .await?;
    info!(%owner, %schedule_id, status = status.as_str(), "dose logged");
    Ok(log)
}

pub async fn history(logs: &dyn LogStore, owner: Uuid) -> Result<Vec<DoseLog>, AppError> {
    Ok(logs.recent(owner, HISTORY_LIMIT).await?)
}
