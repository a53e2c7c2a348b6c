//! Session tracking background task

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::state::{AppState, TimerEvent};

/// Background task that republishes the session state on every engine event.
///
/// Each engine session has its own event stream. When a stream closes because
/// the engine was reset or reconfigured, the task subscribes to the new one.
pub async fn session_tracker_task(state: Arc<AppState>) {
    info!("Starting session tracker task");

    loop {
        let (session, mut events) = state.engine.subscribe_session();
        debug!(session, "Tracking engine session");
        state.publish_session();

        loop {
            match events.recv().await {
                Ok(TimerEvent::Completed) => {
                    info!(session, "Workout completed");
                    state.publish_session();
                }
                Ok(event) => {
                    debug!(session, ?event, "Engine event");
                    state.publish_session();
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(session, skipped, "Session tracker lagged behind engine events");
                    state.publish_session();
                }
                Err(RecvError::Closed) => {
                    debug!(session, "Engine session closed");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{services::TracingNotifier, workout::WorkoutConfig};
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn follows_ticks_across_sessions() {
        let state = Arc::new(AppState::new(
            0,
            "127.0.0.1".to_string(),
            WorkoutConfig::new(0, 5, 0, 1, 1, 0),
            Arc::new(TracingNotifier::new()),
        ));
        tokio::spawn(session_tracker_task(Arc::clone(&state)));
        let rx = state.session_tx.subscribe();

        state.start();
        sleep(Duration::from_millis(2500)).await;
        assert_eq!(rx.borrow().remaining_time, 3);

        state.reset();
        sleep(Duration::from_millis(100)).await;
        state.start();
        sleep(Duration::from_millis(1500)).await;
        assert_eq!(rx.borrow().remaining_time, 4);

        sleep(Duration::from_secs(10)).await;
        assert_eq!(rx.borrow().progress, 1.0);
        assert_eq!(rx.borrow().elapsed_time, 5);
    }
}
