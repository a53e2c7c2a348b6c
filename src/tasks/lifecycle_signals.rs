//! Process suspension handling
//!
//! `SIGTSTP` (Ctrl+Z) is treated as the host going to background: the live
//! position is snapshotted and boundary notifications are scheduled before the
//! process actually stops. `SIGCONT` brings it back and reconciles the engine
//! against the wall-clock time spent stopped.

use std::sync::Arc;

use futures::stream::StreamExt;
use signal_hook::consts::{SIGCONT, SIGSTOP, SIGTSTP};
use signal_hook_tokio::Signals;
use tracing::{error, info};

use crate::state::AppState;

/// Background task that maps job-control signals to background/active transitions
pub async fn lifecycle_signal_task(state: Arc<AppState>) {
    let mut signals = match Signals::new([SIGTSTP, SIGCONT]) {
        Ok(signals) => signals,
        Err(e) => {
            error!("Failed to register lifecycle signal handlers: {}", e);
            return;
        }
    };
    info!("Starting lifecycle signal task");

    while let Some(signal) = signals.next().await {
        match signal {
            SIGTSTP => {
                info!("Received SIGTSTP, entering background");
                state.enter_background();
                // The handler replaced the default stop action, so stop explicitly
                if let Err(e) = signal_hook::low_level::raise(SIGSTOP) {
                    error!("Failed to stop process: {}", e);
                }
            }
            SIGCONT => {
                info!("Received SIGCONT, becoming active");
                state.become_active();
            }
            _ => {}
        }
    }
}
