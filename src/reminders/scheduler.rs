use std::collections::HashMap;

use time::{Duration, OffsetDateTime, UtcOffset};
use tracing::debug;
use uuid::Uuid;

use crate::schedules::{Schedule, TimeOfDay};

/// A schedule that has come due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub schedule_id: Uuid,
    pub name: String,
    pub dosage: Option<String>,
    pub time: TimeOfDay,
    /// The instant the reminder was due, which may precede the tick that saw it.
    pub due_at: OffsetDateTime,
}

impl Reminder {
    /// Sample reminder used to check that notifications get through.
    pub fn test(now: OffsetDateTime) -> Self {
        Self {
            schedule_id: Uuid::nil(),
            name: "This is a test reminder!".into(),
            dosage: None,
            time: TimeOfDay::of(now),
            due_at: now,
        }
    }

    pub fn title(&self) -> &'static str {
        "Medicine Reminder"
    }

    pub fn body(&self) -> String {
        match &self.dosage {
            Some(d) => format!("{} ({})", self.name, d),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    schedule: Schedule,
    next_fire: OffsetDateTime,
}

/// Tracks, per schedule, the absolute instant it is next due.
///
/// A schedule fires when a tick observes `now >= next_fire`, after which it is
/// pushed to its next occurrence strictly after `now`. Each schedule therefore
/// fires at most once per occurrence no matter how often `tick` runs, and a
/// new calendar day needs no explicit reset.
#[derive(Debug)]
pub struct ReminderScheduler {
    offset: UtcOffset,
    entries: HashMap<Uuid, Entry>,
}

impl ReminderScheduler {
    pub fn new(offset: UtcOffset) -> Self {
        Self {
            offset,
            entries: HashMap::new(),
        }
    }

    /// Replaces the schedule snapshot.
    ///
    /// Schedules already tracked with an unchanged time keep their pending
    /// instant, so reloading right after a reminder fired does not fire it
    /// again. New schedules become due at their next occurrence counted from
    /// the start of the current minute.
    pub fn load(&mut self, schedules: Vec<Schedule>, now: OffsetDateTime) {
        let now = now.to_offset(self.offset);
        let minute_start = now
            - Duration::seconds(now.second() as i64)
            - Duration::nanoseconds(now.nanosecond() as i64);

        let mut previous = std::mem::take(&mut self.entries);
        for schedule in schedules {
            let next_fire = match previous.remove(&schedule.id) {
                Some(old) if old.schedule.time == schedule.time => old.next_fire,
                _ => occurrence_at_or_after(schedule.time, minute_start),
            };
            self.entries.insert(schedule.id, Entry { schedule, next_fire });
        }
        debug!(
            tracked = self.entries.len(),
            dropped = previous.len(),
            "reminder snapshot loaded"
        );
    }

    /// Returns every schedule due at `now` and reschedules it.
    pub fn tick(&mut self, now: OffsetDateTime) -> Vec<Reminder> {
        let now = now.to_offset(self.offset);
        let mut due: Vec<Reminder> = Vec::new();
        for entry in self.entries.values_mut() {
            if entry.next_fire > now {
                continue;
            }
            let s = &entry.schedule;
            due.push(Reminder {
                schedule_id: s.id,
                name: s.name.clone(),
                dosage: s.dosage.clone(),
                time: s.time,
                due_at: entry.next_fire,
            });
            entry.next_fire = occurrence_after(s.time, now);
        }
        due.sort_by(|a, b| a.due_at.cmp(&b.due_at).then_with(|| a.name.cmp(&b.name)));
        due
    }

    /// Earliest pending instant across all tracked schedules.
    pub fn next_due(&self) -> Option<OffsetDateTime> {
        self.entries.values().map(|e| e.next_fire).min()
    }

    pub fn next_fire_of(&self, schedule_id: Uuid) -> Option<OffsetDateTime> {
        self.entries.get(&schedule_id).map(|e| e.next_fire)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// First instant with wall time `t` that is `>= from`.
fn occurrence_at_or_after(t: TimeOfDay, from: OffsetDateTime) -> OffsetDateTime {
    let candidate = from.replace_time(t.as_time());
    if candidate >= from {
        candidate
    } else {
        candidate + Duration::days(1)
    }
}

/// First instant with wall time `t` that is `> from`.
fn occurrence_after(t: TimeOfDay, from: OffsetDateTime) -> OffsetDateTime {
    let candidate = from.replace_time(t.as_time());
    if candidate > from {
        candidate
    } else {
        candidate + Duration::days(1)
    }
}
