use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::Tz;

use nudge_checker::{CheckerSettings, Notifier, ReminderChecker, RunningChecker};
use nudge_models::reminder::{Recurrence, Reminder, ReminderId};
use nudge_parser::{ParseError, parse_reminder_input};
use nudge_storage::{InMemoryReminderStorage, NewReminder, ReminderStorage};

/// Human-readable confirmation of an accepted reminder.
#[derive(Debug, Clone)]
pub struct ReminderSummary {
    pub id: ReminderId,
    pub message: String,
    pub due_at: DateTime<Tz>,
    pub recurrence: Recurrence,
}

impl From<&Reminder> for ReminderSummary {
    fn from(reminder: &Reminder) -> Self {
        ReminderSummary {
            id: reminder.id,
            message: reminder.message.clone(),
            due_at: reminder.due_at,
            recurrence: reminder.recurrence,
        }
    }
}

impl fmt::Display for ReminderSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "reminder #{}: \"{}\" at {}",
            self.id,
            self.message,
            self.due_at.format("%a %Y-%m-%d %H:%M %Z")
        )?;
        if self.recurrence.is_recurring() {
            write!(f, " ({})", self.recurrence)?;
        }
        Ok(())
    }
}

/// Front door of the reminder core: turns submitted text into stored
/// reminders and owns the background checker's lifecycle.
pub struct ReminderEngine {
    storage: Arc<InMemoryReminderStorage>,
    notifier: Arc<dyn Notifier>,
    tz: Tz,
    default_fire_time: NaiveTime,
    checker_settings: CheckerSettings,
    running: Option<RunningChecker>,
}

impl ReminderEngine {
    pub fn new(
        notifier: Arc<dyn Notifier>,
        tz: Tz,
        default_fire_time: NaiveTime,
        checker_settings: CheckerSettings,
    ) -> Self {
        ReminderEngine {
            storage: Arc::new(InMemoryReminderStorage::new()),
            notifier,
            tz,
            default_fire_time,
            checker_settings,
            running: None,
        }
    }

    pub async fn submit_reminder_text(&self, text: &str) -> Result<ReminderSummary, ParseError> {
        let now = Utc::now().with_timezone(&self.tz);
        self.submit_at(text, now).await
    }

    pub(crate) async fn submit_at(
        &self,
        text: &str,
        now: DateTime<Tz>,
    ) -> Result<ReminderSummary, ParseError> {
        let parsed = parse_reminder_input(text, now, self.default_fire_time)?;
        let reminder = self
            .storage
            .insert(NewReminder {
                message: parsed.message,
                due_at: parsed.due_at,
                recurrence: parsed.recurrence,
            })
            .await;

        log::info!(
            "Created reminder. [reminder_id = {}, due_at = {}, recurrence = {}]",
            reminder.id,
            reminder.due_at,
            reminder.recurrence
        );

        Ok(ReminderSummary::from(&reminder))
    }

    /// Starts the background checker. Calling it on an already-running
    /// engine is a no-op.
    pub fn start_checking(&mut self) {
        if self.running.is_some() {
            log::warn!("Checker already running, ignoring start request");
            return;
        }
        let checker = ReminderChecker::new(
            Arc::clone(&self.storage) as Arc<dyn ReminderStorage>,
            Arc::clone(&self.notifier),
            self.tz,
            self.checker_settings,
        );
        self.running = Some(checker.start());
    }

    /// Stops the background checker, waiting for the in-flight cycle to
    /// finish. Pending reminders stay in the store.
    pub async fn stop_checking(&mut self) {
        if let Some(running) = self.running.take() {
            running.stop().await;
        }
    }

    /// Current reminders, soonest first.
    pub async fn pending(&self) -> Vec<Reminder> {
        let mut reminders = self.storage.snapshot().await;
        reminders.sort_by_key(|reminder| reminder.due_at);
        reminders
    }

    pub async fn cancel(&self, id: ReminderId) -> Option<Reminder> {
        let removed = self.storage.remove(id).await;
        if let Some(reminder) = &removed {
            log::info!("Cancelled reminder. [reminder_id = {}]", reminder.id);
        }
        removed
    }

    #[cfg(test)]
    fn storage(&self) -> &InMemoryReminderStorage {
        &self.storage
    }
}
