use std::fmt;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

/// Identifier of a single stored reminder instance.
pub type ReminderId = i64;

/// Identifier of a recurrence series. Stays stable when a recurring
/// reminder is swapped for its next-cycle instance, while the per-instance
/// [`ReminderId`] changes.
pub type SeriesId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    None,
    Daily,
    Weekly,
    Interval(Duration),
}

impl Recurrence {
    /// The step a fired instance's due time is advanced by, or `None` for
    /// one-shot reminders.
    pub fn period(&self) -> Option<Duration> {
        match self {
            Recurrence::None => None,
            Recurrence::Daily => Some(Duration::days(1)),
            Recurrence::Weekly => Some(Duration::days(7)),
            Recurrence::Interval(step) => Some(*step),
        }
    }

    pub fn is_recurring(&self) -> bool {
        self.period().is_some()
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recurrence::None => write!(f, "once"),
            Recurrence::Daily => write!(f, "every day"),
            Recurrence::Weekly => write!(f, "every week"),
            Recurrence::Interval(step) => write!(f, "every {}", describe_step(step)),
        }
    }
}

fn describe_step(step: &Duration) -> String {
    let minutes = step.num_minutes();
    let (count, unit) = if minutes >= 24 * 60 && minutes % (24 * 60) == 0 {
        (step.num_days(), "day")
    } else if minutes >= 60 && minutes % 60 == 0 {
        (step.num_hours(), "hour")
    } else {
        (minutes, "minute")
    };

    if count == 1 {
        unit.to_string()
    } else {
        format!("{count} {unit}s")
    }
}

#[derive(Debug, Clone)]
pub struct Reminder {
    pub id: ReminderId,
    pub series: SeriesId,
    pub message: String,
    pub due_at: DateTime<Tz>,
    pub fired: bool,
    pub recurrence: Recurrence,
    pub created_at: DateTime<Utc>,
}

impl Reminder {
    pub fn is_due(&self, now: DateTime<Tz>) -> bool {
        !self.fired && self.due_at <= now
    }

    /// Due time of the next-cycle instance, advanced from this instance's
    /// own due time rather than from the evaluation moment.
    pub fn next_occurrence(&self) -> Option<DateTime<Tz>> {
        self.recurrence.period().map(|period| self.due_at + period)
    }
}
