//! Turns a user's schedule list into at-most-once-per-occurrence reminders.

pub mod clock;
pub mod notifier;
pub mod runner;
pub mod scheduler;

use std::sync::Arc;

use time::UtcOffset;
use tracing::info;

pub use clock::{Clock, ManualClock, SystemClock};
pub use notifier::{dispatch, ConsoleNotifier, Notifier, Permission};
pub use scheduler::{Reminder, ReminderScheduler};

use crate::schedules::Schedule;

/// Owns the schedule snapshot and delivers reminders using an injected clock.
pub struct ReminderSession {
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    scheduler: ReminderScheduler,
}

impl ReminderSession {
    pub fn new(clock: Arc<dyn Clock>, notifier: Arc<dyn Notifier>, offset: UtcOffset) -> Self {
        Self {
            clock,
            notifier,
            scheduler: ReminderScheduler::new(offset),
        }
    }

    /// Replaces the snapshot with a freshly fetched schedule list.
    pub fn refresh(&mut self, schedules: Vec<Schedule>) {
        self.scheduler.load(schedules, self.clock.now());
    }

    /// Fires whatever is due now; returns the reminders that came due.
    pub fn tick(&mut self) -> Vec<Reminder> {
        let due = self.scheduler.tick(self.clock.now());
        if !due.is_empty() {
            let shown = dispatch(self.notifier.as_ref(), &due);
            info!(due = due.len(), shown, "reminders delivered");
        }
        due
    }

    pub fn scheduler(&self) -> &ReminderScheduler {
        &self.scheduler
    }
}
