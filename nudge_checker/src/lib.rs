mod checker;
mod delivery;

pub use checker::{CheckerSettings, ReminderChecker, RunningChecker, run_cycle};
pub use delivery::{Notifier, NotifyError};
