use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use nudge_models::reminder::{Reminder, ReminderId, SeriesId};

use crate::model::NewReminder;

#[async_trait]
pub trait ReminderStorage: Send + Sync {
    /// Inserts a new pending reminder, assigning instance and series ids.
    /// Always succeeds.
    async fn insert(&self, reminder: NewReminder) -> Reminder;

    /// Point-in-time copy of all current reminders; safe to iterate without
    /// holding any lock.
    async fn snapshot(&self) -> Vec<Reminder>;

    async fn get(&self, id: ReminderId) -> Option<Reminder>;

    /// Removes a reminder by id. Removing an absent id is a no-op.
    async fn remove(&self, id: ReminderId) -> Option<Reminder>;

    /// Swaps a fired recurring instance for its next-cycle instance within
    /// one write-lock scope. The replacement keeps the series id but gets a
    /// fresh instance id. Returns `None` when `id` is no longer present.
    async fn replace(&self, id: ReminderId, next: NewReminder) -> Option<Reminder>;
}

struct Store {
    next_id: ReminderId,
    next_series: SeriesId,
    reminders: HashMap<ReminderId, Reminder>,
}

impl Store {
    fn build(&mut self, new: NewReminder, series: Option<SeriesId>) -> Reminder {
        let id = self.next_id;
        self.next_id += 1;
        let series = series.unwrap_or_else(|| {
            let series = self.next_series;
            self.next_series += 1;
            series
        });

        let reminder = Reminder {
            id,
            series,
            message: new.message,
            due_at: new.due_at,
            fired: false,
            recurrence: new.recurrence,
            created_at: Utc::now(),
        };
        self.reminders.insert(id, reminder.clone());
        reminder
    }
}

pub struct InMemoryReminderStorage {
    store: RwLock<Store>,
}

impl InMemoryReminderStorage {
    pub fn new() -> Self {
        InMemoryReminderStorage {
            store: RwLock::new(Store {
                next_id: 1,
                next_series: 1,
                reminders: HashMap::new(),
            }),
        }
    }
}

impl Default for InMemoryReminderStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReminderStorage for InMemoryReminderStorage {
    async fn insert(&self, reminder: NewReminder) -> Reminder {
        let mut store = self.store.write().await;
        let reminder = store.build(reminder, None);
        log::info!(
            "Stored reminder. [reminder_id = {}, due_at = {}]",
            reminder.id,
            reminder.due_at
        );
        reminder
    }

    async fn snapshot(&self) -> Vec<Reminder> {
        self.store.read().await.reminders.values().cloned().collect()
    }

    async fn get(&self, id: ReminderId) -> Option<Reminder> {
        self.store.read().await.reminders.get(&id).cloned()
    }

    async fn remove(&self, id: ReminderId) -> Option<Reminder> {
        self.store.write().await.reminders.remove(&id)
    }

    async fn replace(&self, id: ReminderId, next: NewReminder) -> Option<Reminder> {
        let mut store = self.store.write().await;
        let previous = store.reminders.remove(&id)?;
        let rearmed = store.build(next, Some(previous.series));
        log::info!(
            "Re-armed reminder. [series = {}, reminder_id = {}, due_at = {}]",
            rearmed.series,
            rearmed.id,
            rearmed.due_at
        );
        Some(rearmed)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone};
    use chrono_tz::Asia::Kolkata;
    use chrono_tz::Tz;

    use nudge_models::reminder::Recurrence;

    use super::*;

    fn due_at() -> DateTime<Tz> {
        Kolkata.with_ymd_and_hms(2026, 8, 7, 17, 0, 0).unwrap()
    }

    fn new_reminder(message: &str, recurrence: Recurrence) -> NewReminder {
        NewReminder {
            message: message.to_string(),
            due_at: due_at(),
            recurrence,
        }
    }

    #[tokio::test]
    async fn insert_assigns_distinct_ids_and_series() {
        let storage = InMemoryReminderStorage::new();

        let first = storage.insert(new_reminder("one", Recurrence::None)).await;
        let second = storage.insert(new_reminder("two", Recurrence::Daily)).await;

        assert_ne!(first.id, second.id);
        assert_ne!(first.series, second.series);
        assert!(!first.fired);
        assert_eq!(storage.snapshot().await.len(), 2);
    }

    #[tokio::test]
    async fn snapshot_is_a_copy() {
        let storage = InMemoryReminderStorage::new();
        let stored = storage.insert(new_reminder("one", Recurrence::None)).await;

        let mut snapshot = storage.snapshot().await;
        snapshot[0].fired = true;
        snapshot.clear();

        assert!(!storage.get(stored.id).await.unwrap().fired);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let storage = InMemoryReminderStorage::new();
        let stored = storage.insert(new_reminder("one", Recurrence::None)).await;

        assert!(storage.remove(stored.id).await.is_some());
        assert!(storage.remove(stored.id).await.is_none());
        assert!(storage.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn replace_keeps_series_and_assigns_fresh_id() {
        let storage = InMemoryReminderStorage::new();
        let stored = storage.insert(new_reminder("water", Recurrence::Daily)).await;

        let next = NewReminder {
            message: stored.message.clone(),
            due_at: stored.due_at + Duration::days(1),
            recurrence: stored.recurrence,
        };
        let rearmed = storage.replace(stored.id, next).await.unwrap();

        assert_eq!(rearmed.series, stored.series);
        assert_ne!(rearmed.id, stored.id);
        assert!(!rearmed.fired);
        assert_eq!(rearmed.due_at, stored.due_at + Duration::days(1));

        assert!(storage.get(stored.id).await.is_none());
        assert_eq!(storage.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn replace_of_absent_id_is_a_noop() {
        let storage = InMemoryReminderStorage::new();

        let rearmed = storage
            .replace(42, new_reminder("ghost", Recurrence::Daily))
            .await;

        assert!(rearmed.is_none());
        assert!(storage.snapshot().await.is_empty());
    }
}
