mod appsettings;
mod console;
mod engine;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::NaiveTime;
use chrono_tz::Tz;
use tokio::io::{AsyncBufReadExt, BufReader};

use nudge_checker::CheckerSettings;

use crate::console::ConsoleNotifier;
use crate::engine::{ReminderEngine, ReminderSummary};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let settings = appsettings::get();
    let tz: Tz = settings
        .timezone
        .parse()
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("unknown timezone {:?}", settings.timezone))?;
    let default_fire_time = NaiveTime::parse_from_str(&settings.default_fire_time, "%H:%M")
        .with_context(|| format!("bad default_fire_time {:?}", settings.default_fire_time))?;
    let checker_settings = CheckerSettings {
        poll_interval: Duration::from_secs(settings.checker.poll_interval_secs),
        notify_timeout: Duration::from_secs(settings.checker.notify_timeout_secs),
    };

    let mut engine = ReminderEngine::new(
        Arc::new(ConsoleNotifier),
        tz,
        default_fire_time,
        checker_settings,
    );
    engine.start_checking();

    println!("nudge is listening. Type a reminder, \"list\", \"cancel <id>\" or \"quit\".");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                break;
            }
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if !handle_line(&engine, line.trim()).await {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    engine.stop_checking().await;
    log::info!("Shut down cleanly");
    Ok(())
}

/// Returns false when the user asked to quit.
async fn handle_line(engine: &ReminderEngine, line: &str) -> bool {
    match line {
        "" => {}
        "quit" | "exit" => return false,
        "list" => {
            let pending = engine.pending().await;
            if pending.is_empty() {
                println!("No pending reminders.");
            }
            for reminder in pending {
                println!("{}", ReminderSummary::from(&reminder));
            }
        }
        _ => {
            if let Some(id) = line
                .strip_prefix("cancel ")
                .and_then(|rest| rest.trim().parse().ok())
            {
                match engine.cancel(id).await {
                    Some(reminder) => println!("Cancelled \"{}\".", reminder.message),
                    None => println!("No reminder with id {id}."),
                }
            } else {
                match engine.submit_reminder_text(line).await {
                    Ok(summary) => println!("Okay: {summary}"),
                    Err(err) => println!("Sorry, {err}."),
                }
            }
        }
    }
    true
}
