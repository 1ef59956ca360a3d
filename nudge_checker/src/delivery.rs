use async_trait::async_trait;
use thiserror::Error;

/// Raised by a [`Notifier`] that could not deliver a reminder. The checker
/// treats it as transient: the reminder stays unfired and is retried on the
/// next poll cycle.
#[derive(Debug, Error)]
#[error("notification delivery failed: {reason}")]
pub struct NotifyError {
    reason: String,
}

impl NotifyError {
    pub fn new(reason: impl Into<String>) -> Self {
        NotifyError {
            reason: reason.into(),
        }
    }
}

/// Delivery mechanism for fired reminders. The checker only ever hands it
/// the reminder's message text; rendering (console, speech, push) is the
/// implementation's concern.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn notify(&self, message: &str) -> Result<(), NotifyError>;
}
