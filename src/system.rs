// File: ./src/system.rs
//! Background tasks: the delayed reminder and the cache-refresh debouncer.
use crate::aggregator::TaskAggregator;
use crate::controller::{ReminderController, ReminderOutcome};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, sleep};

/// Quiet period after the last vault change before the cache is dropped.
pub const REFRESH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Runs a non-forced reminder after `delay`.
///
/// Abort the returned handle to cancel (e.g. on shutdown). The outcome is sent to
/// `ui_sender` if one is given.
pub fn spawn_reminder_timer(
    controller: ReminderController,
    delay: Duration,
    ui_sender: Option<mpsc::Sender<ReminderOutcome>>,
) -> JoinHandle<()> {
    log::debug!("Scheduling reminder in {}s", delay.as_secs());
    tokio::spawn(async move {
        sleep(delay).await;
        match controller.show_reminder(false).await {
            Ok(outcome) => {
                if let Some(tx) = &ui_sender {
                    let _ = tx.send(outcome).await;
                }
            }
            Err(e) => log::error!("Reminder failed: {:#}", e),
        }
    })
}

/// Spawns the refresh actor. Send the modified path on every vault change; the
/// aggregator cache is invalidated once changes stop for `REFRESH_DEBOUNCE`.
pub fn spawn_refresh_debouncer(aggregator: Arc<TaskAggregator>) -> mpsc::Sender<String> {
    let (tx, mut rx) = mpsc::channel::<String>(64);

    tokio::spawn(async move {
        while let Some(path) = rx.recv().await {
            log::trace!("Vault modified: {}", path);
            loop {
                tokio::select! {
                    _ = sleep(REFRESH_DEBOUNCE) => {
                        aggregator.invalidate_cache();
                        break;
                    }
                    next = rx.recv() => match next {
                        Some(path) => log::trace!("Vault modified: {}", path),
                        None => {
                            aggregator.invalidate_cache();
                            return;
                        }
                    }
                }
            }
        }
    });

    tx
}
