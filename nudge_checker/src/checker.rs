use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use nudge_models::reminder::Reminder;
use nudge_storage::{NewReminder, ReminderStorage};

use crate::delivery::Notifier;

#[derive(Debug, Clone, Copy)]
pub struct CheckerSettings {
    /// How often pending reminders are evaluated. A tunable, not a
    /// correctness requirement.
    pub poll_interval: Duration,
    /// Upper bound on a single notifier call; a hung delivery must not
    /// stall the rest of the cycle indefinitely.
    pub notify_timeout: Duration,
}

impl Default for CheckerSettings {
    fn default() -> Self {
        CheckerSettings {
            poll_interval: Duration::from_secs(30),
            notify_timeout: Duration::from_secs(10),
        }
    }
}

/// Background loop that polls the store, fires due reminders through the
/// injected [`Notifier`], removes fired one-shots and re-arms fired
/// recurring reminders.
pub struct ReminderChecker {
    storage: Arc<dyn ReminderStorage>,
    notifier: Arc<dyn Notifier>,
    tz: Tz,
    settings: CheckerSettings,
}

/// Handle to a started checker. Dropping it does not stop the loop; call
/// [`RunningChecker::stop`] for a clean shutdown.
pub struct RunningChecker {
    task_handle: JoinHandle<()>,
    cancellation_token: CancellationToken,
}

impl RunningChecker {
    pub async fn stop(self) {
        self.cancellation_token.cancel();
        let _ = self.task_handle.await;
    }
}

impl ReminderChecker {
    pub fn new(
        storage: Arc<dyn ReminderStorage>,
        notifier: Arc<dyn Notifier>,
        tz: Tz,
        settings: CheckerSettings,
    ) -> Self {
        ReminderChecker {
            storage,
            notifier,
            tz,
            settings,
        }
    }

    pub fn start(self) -> RunningChecker {
        let cancellation_token = CancellationToken::new();
        let task_token = cancellation_token.child_token();

        let task_handle = tokio::spawn(async move {
            log::info!(
                "Reminder checker started. [poll_interval = {:?}]",
                self.settings.poll_interval
            );
            loop {
                tokio::select! {
                    _ = task_token.cancelled() => {
                        log::info!("Reminder checker shutting down");
                        break;
                    }
                    _ = tokio::time::sleep(self.settings.poll_interval) => {
                        let now = Utc::now().with_timezone(&self.tz);
                        run_cycle(
                            self.storage.as_ref(),
                            self.notifier.as_ref(),
                            now,
                            self.settings.notify_timeout,
                        )
                        .await;
                    }
                }
            }
        });

        RunningChecker {
            task_handle,
            cancellation_token,
        }
    }
}

/// One poll cycle: evaluate every reminder in a store snapshot against
/// `now`, firing the due ones. Kept a plain function of `now` so cycles are
/// directly drivable in tests.
pub async fn run_cycle(
    storage: &dyn ReminderStorage,
    notifier: &dyn Notifier,
    now: DateTime<Tz>,
    notify_timeout: Duration,
) {
    for reminder in storage.snapshot().await {
        if reminder.is_due(now) {
            fire(storage, notifier, reminder, notify_timeout).await;
        }
    }
}

/// Fires a single due reminder. Failures are contained here so one broken
/// reminder never blocks the others in the cycle.
async fn fire(
    storage: &dyn ReminderStorage,
    notifier: &dyn Notifier,
    mut reminder: Reminder,
    notify_timeout: Duration,
) {
    match tokio::time::timeout(notify_timeout, notifier.notify(&reminder.message)).await {
        Ok(Ok(())) => {
            reminder.fired = true;
            match reminder.next_occurrence() {
                None => {
                    storage.remove(reminder.id).await;
                    log::info!(
                        "Fired one-shot reminder. [reminder_id = {}]",
                        reminder.id
                    );
                }
                Some(next_due) => {
                    let next = NewReminder {
                        message: reminder.message.clone(),
                        due_at: next_due,
                        recurrence: reminder.recurrence,
                    };
                    match storage.replace(reminder.id, next).await {
                        Some(rearmed) => log::info!(
                            "Fired recurring reminder. [series = {}, next_due = {}]",
                            rearmed.series,
                            rearmed.due_at
                        ),
                        None => log::warn!(
                            "Fired reminder vanished before re-arm. [reminder_id = {}]",
                            reminder.id
                        ),
                    }
                }
            }
        }
        Ok(Err(err)) => {
            log::warn!(
                "Notifier failed, reminder stays pending. [reminder_id = {}, error = {}]",
                reminder.id,
                err
            );
        }
        Err(_) => {
            log::warn!(
                "Notifier timed out, reminder stays pending. [reminder_id = {}, timeout = {:?}]",
                reminder.id,
                notify_timeout
            );
        }
    }
}
