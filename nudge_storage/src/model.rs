use chrono::DateTime;
use chrono_tz::Tz;

use nudge_models::reminder::Recurrence;

/// Input for [`crate::ReminderStorage::insert`] and
/// [`crate::ReminderStorage::replace`]; ids and timestamps are assigned by
/// the store.
#[derive(Debug, Clone)]
pub struct NewReminder {
    pub message: String,
    pub due_at: DateTime<Tz>,
    pub recurrence: Recurrence,
}
