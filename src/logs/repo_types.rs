use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Outcome recorded for a scheduled dose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoseStatus {
    Taken,
    Missed,
    Skipped,
}

impl DoseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DoseStatus::Taken => "taken",
            DoseStatus::Missed => "missed",
            DoseStatus::Skipped => "skipped",
        }
    }
}

impl FromStr for DoseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "taken" => Ok(DoseStatus::Taken),
            "missed" => Ok(DoseStatus::Missed),
            "skipped" => Ok(DoseStatus::Skipped),
            other => Err(format!("Unknown status {other:?}")),
        }
    }
}

/// Raw `dose_logs` row.
#[derive(Debug, Clone, FromRow)]
pub struct DoseLogRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub schedule_id: Uuid,
    pub status: String,
    pub schedule_ref: String,
    pub logged_at: OffsetDateTime,
    pub log_date: String,
}

/// An immutable dose event. `schedule_ref` is the schedule name at log time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoseLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub schedule_id: Uuid,
    pub status: DoseStatus,
    pub schedule_ref: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Calendar day of `timestamp` (UTC), `YYYY-MM-DD`.
    pub date: String,
}

impl TryFrom<DoseLogRow> for DoseLog {
    type Error = anyhow::Error;

    fn try_from(r: DoseLogRow) -> Result<Self, Self::Error> {
        Ok(Self {
            status: r.status.parse().map_err(anyhow::Error::msg)?,
            id: r.id,
            user_id: r.user_id,
            schedule_id: r.schedule_id,
            schedule_ref: r.schedule_ref,
            timestamp: r.logged_at,
            date: r.log_date,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewDoseLog {
    pub user_id: Uuid,
    pub schedule_id: Uuid,
    pub status: DoseStatus,
    pub schedule_ref: String,
    pub timestamp: OffsetDateTime,
}

impl NewDoseLog {
    pub fn date(&self) -> String {
        let d = self.timestamp.to_offset(time::UtcOffset::UTC).date();
        format!("{:04}-{:02}-{:02}", d.year(), u8::from(d.month()), d.day())
    }
}
