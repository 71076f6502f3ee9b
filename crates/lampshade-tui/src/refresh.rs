//! Periodic refresh timer.
//!
//! The timer never touches view state. It only asks the app loop to
//! refresh, and the app loop decides whether a fetch is already running.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::action::Action;

/// Spawn the refresh timer. The first request fires after one full `period`;
/// the app triggers the initial fetch itself on startup.
pub fn spawn_refresh_loop(
    period: Duration,
    action_tx: UnboundedSender<Action>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // Consume the immediate first tick
        interval.tick().await;

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = interval.tick() => {
                    if action_tx.send(Action::RefreshRequested).is_err() {
                        break;
                    }
                }
            }
        }
        debug!("refresh loop stopped");
    })
}
