use std::{fmt, str::FromStr};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{OffsetDateTime, Time};
use uuid::Uuid;

/// A wall-clock time of day written as zero-padded 24h `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(Time);

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        Time::from_hms(hour, minute, 0).ok().map(Self)
    }

    pub fn hour(self) -> u8 {
        self.0.hour()
    }

    pub fn minute(self) -> u8 {
        self.0.minute()
    }

    pub fn as_time(self) -> Time {
        self.0
    }

    /// The minute `at` falls in, seconds dropped.
    pub fn of(at: OffsetDateTime) -> Self {
        let minutes = at.hour() as i64 * 60 + at.minute() as i64;
        Self(Time::MIDNIGHT + time::Duration::minutes(minutes))
    }
}

impl FromStr for TimeOfDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let digits_ok = bytes.len() == 5
            && bytes[2] == b':'
            && [0, 1, 3, 4].iter().all(|&i| bytes[i].is_ascii_digit());
        if !digits_ok {
            return Err(format!("Invalid time {s:?}, expected HH:MM"));
        }
        let hour = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
        let minute = (bytes[3] - b'0') * 10 + (bytes[4] - b'0');
        TimeOfDay::new(hour, minute).ok_or_else(|| format!("Invalid time {s:?}, expected HH:MM"))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// How often a schedule repeats. `Custom` is accepted for compatibility with
/// the dashboard form; reminders treat it like `Daily`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Custom,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Custom => "custom",
        }
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "custom" => Ok(Frequency::Custom),
            other => Err(format!("Unknown frequency {other:?}")),
        }
    }
}

/// Raw `schedules` row.
#[derive(Debug, Clone, FromRow)]
pub struct ScheduleRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub dosage: Option<String>,
    pub time: String,
    pub frequency: String,
    pub duration: String,
    pub created_at: OffsetDateTime,
}

/// A medication schedule owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub dosage: Option<String>,
    pub time: TimeOfDay,
    pub frequency: Frequency,
    pub duration: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl TryFrom<ScheduleRow> for Schedule {
    type Error = anyhow::Error;

    fn try_from(r: ScheduleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            time: r
                .time
                .parse()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("schedule {} has bad time", r.id))?,
            frequency: r
                .frequency
                .parse()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("schedule {} has bad frequency", r.id))?,
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            dosage: r.dosage,
            duration: r.duration,
            created_at: r.created_at,
        })
    }
}

/// Validated input for a new schedule.
#[derive(Debug, Clone)]
pub struct NewSchedule {
    pub user_id: Uuid,
    pub name: String,
    pub dosage: Option<String>,
    pub time: TimeOfDay,
    pub frequency: Frequency,
    pub duration: String,
}
