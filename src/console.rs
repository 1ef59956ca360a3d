use async_trait::async_trait;

use nudge_checker::{Notifier, NotifyError};

/// Prints fired reminders as a framed banner on stdout.
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        let rule = "=".repeat(40);
        println!("\n{rule}");
        println!("REMINDER: {message}");
        println!("{rule}\n");
        Ok(())
    }
}
