use tracing::{debug, info, warn};

use super::scheduler::Reminder;

/// Whether the desktop notification channel may be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    Unsupported,
}

/// Delivery channel for due reminders.
pub trait Notifier: Send + Sync {
    fn permission(&self) -> Permission;

    /// Shows a notification. Only called when `permission()` is `Granted`.
    fn notify(&self, reminder: &Reminder) -> anyhow::Result<()>;

    /// In-app fallback; runs for every reminder regardless of permission.
    fn alert(&self, reminder: &Reminder) {
        info!(schedule_id = %reminder.schedule_id, "{}: {}", reminder.title(), reminder.body());
    }
}

/// Delivers `reminders`; returns how many notifications were shown.
pub fn dispatch(notifier: &dyn Notifier, reminders: &[Reminder]) -> usize {
    let mut shown = 0;
    for reminder in reminders {
        notifier.alert(reminder);
        match notifier.permission() {
            Permission::Granted => match notifier.notify(reminder) {
                Ok(()) => shown += 1,
                Err(e) => warn!(error = %e, schedule_id = %reminder.schedule_id, "notification failed"),
            },
            other => debug!(permission = ?other, "notifications unavailable, alert only"),
        }
    }
    shown
}

/// Writes reminders to the terminal and the log.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleNotifier {
    pub permission: Permission,
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self {
            permission: Permission::Granted,
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn permission(&self) -> Permission {
        self.permission
    }

    fn notify(&self, reminder: &Reminder) -> anyhow::Result<()> {
        info!(
            schedule_id = %reminder.schedule_id,
            due_at = %reminder.due_at,
            title = reminder.title(),
            body = %reminder.body(),
            "notification"
        );
        Ok(())
    }

    fn alert(&self, reminder: &Reminder) {
        println!("{}\n{}", reminder.title(), reminder.body());
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;
    use time::macros::datetime;
    use uuid::Uuid;

    /// Records every call for assertions.
    pub(crate) struct RecordingNotifier {
        pub permission: Permission,
        pub fail: bool,
        pub notified: Mutex<Vec<String>>,
        pub alerted: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        pub(crate) fn new(permission: Permission) -> Self {
            Self {
                permission,
                fail: false,
                notified: Mutex::new(Vec::new()),
                alerted: Mutex::new(Vec::new()),
            }
        }
    }

    impl Notifier for RecordingNotifier {
        fn permission(&self) -> Permission {
            self.permission
        }

        fn notify(&self, reminder: &Reminder) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("channel closed");
            }
            self.notified.lock().unwrap().push(reminder.body());
            Ok(())
        }

        fn alert(&self, reminder: &Reminder) {
            self.alerted.lock().unwrap().push(reminder.body());
        }
    }

    fn reminder(name: &str) -> Reminder {
        Reminder {
            schedule_id: Uuid::new_v4(),
            name: name.into(),
            dosage: None,
            time: "08:00".parse().unwrap(),
            due_at: datetime!(2026-10-18 08:00 UTC),
        }
    }

    #[test]
    fn granted_permission_notifies_and_alerts() {
        let n = RecordingNotifier::new(Permission::Granted);
        assert_eq!(dispatch(&n, &[reminder("Aspirin"), reminder("Zinc")]), 2);
        assert_eq!(*n.notified.lock().unwrap(), vec!["Aspirin", "Zinc"]);
        assert_eq!(n.alerted.lock().unwrap().len(), 2);
    }

    #[test]
    fn denied_or_unsupported_falls_back_to_alert() {
        for permission in [Permission::Denied, Permission::Unsupported] {
            let n = RecordingNotifier::new(permission);
            assert_eq!(dispatch(&n, &[reminder("Aspirin")]), 0);
            assert!(n.notified.lock().unwrap().is_empty());
            assert_eq!(*n.alerted.lock().unwrap(), vec!["Aspirin"]);
        }
    }

    #[test]
    fn failed_notification_is_not_retried() {
        let mut n = RecordingNotifier::new(Permission::Granted);
        n.fail = true;
        assert_eq!(dispatch(&n, &[reminder("Aspirin")]), 0);
        assert_eq!(n.alerted.lock().unwrap().len(), 1);
    }
}
