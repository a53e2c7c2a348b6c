//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Instant,
};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::SessionState;
use crate::{
    background::{BackgroundReconciler, Notifier, PositionReport},
    engine::TimerEngine,
    workout::{PlanBuilder, WorkoutConfig},
};

/// Shared state of the server: one engine, its reconciler and the published session
pub struct AppState {
    pub engine: TimerEngine,
    /// Configuration the current plan was built from
    workout: Mutex<WorkoutConfig>,
    reconciler: Mutex<BackgroundReconciler>,
    /// Channel for session updates
    pub session_tx: watch::Sender<SessionState>,
    /// Keep the receiver alive to prevent channel closure
    pub _session_rx: watch::Receiver<SessionState>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<(String, DateTime<Utc>)>>,
}

impl AppState {
    /// Create the state with an engine configured for `workout`
    pub fn new(port: u16, host: String, workout: WorkoutConfig, notifier: Arc<dyn Notifier>) -> Self {
        let plan = PlanBuilder::build(&workout);
        let session = SessionState::idle(&workout, &plan);
        let engine = TimerEngine::with_plan(plan);
        let (session_tx, session_rx) = watch::channel(session);

        let snapshot_engine = engine.clone();
        let plan_engine = engine.clone();
        let reseed_engine = engine.clone();
        let reconciler = BackgroundReconciler::new(
            notifier,
            move || {
                let position = snapshot_engine.position();
                PositionReport {
                    index: position.index,
                    remaining: position.remaining,
                    running: position.state.is_active(),
                }
            },
            move || plan_engine.plan(),
            move |reconciled| {
                reseed_engine.reseed(reconciled.index, reconciled.remaining, reconciled.finished);
                if !reconciled.finished {
                    reseed_engine.resume();
                }
            },
        );

        Self {
            engine,
            workout: Mutex::new(workout),
            reconciler: Mutex::new(reconciler),
            session_tx,
            _session_rx: session_rx,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
        }
    }

    fn reconciler(&self) -> MutexGuard<'_, BackgroundReconciler> {
        self.reconciler.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Configuration of the current plan
    pub fn workout(&self) -> WorkoutConfig {
        *self.workout.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Build a plan for `workout` and hand it to the engine
    pub fn configure(&self, workout: WorkoutConfig) -> SessionState {
        info!(?workout, total = workout.total_duration(), "Configuring workout");
        *self.workout.lock().unwrap_or_else(PoisonError::into_inner) = workout;
        self.reconciler().discard_snapshot();
        self.engine.configure(PlanBuilder::build(&workout));
        self.record_action("configure");
        self.publish_session()
    }

    pub fn start(&self) -> SessionState {
        self.engine.start();
        self.record_action("start");
        self.publish_session()
    }

    pub fn pause(&self) -> SessionState {
        self.engine.pause();
        self.record_action("pause");
        self.publish_session()
    }

    pub fn resume(&self) -> SessionState {
        self.engine.resume();
        self.record_action("resume");
        self.publish_session()
    }

    pub fn reset(&self) -> SessionState {
        self.reconciler().discard_snapshot();
        self.engine.reset();
        self.record_action("reset");
        self.publish_session()
    }

    /// Host is about to be suspended: snapshot, schedule alerts, stop ticking
    pub fn enter_background(&self) -> SessionState {
        let mut reconciler = self.reconciler();
        if reconciler.has_snapshot() {
            debug!("Already in background, keeping the first snapshot");
        } else {
            reconciler.enter_background();
            self.engine.pause();
        }
        drop(reconciler);
        self.record_action("background");
        self.publish_session()
    }

    /// Host is back: cancel alerts and jump to the wall-clock position
    pub fn become_active(&self) -> SessionState {
        self.reconciler().become_active();
        self.record_action("active");
        self.publish_session()
    }

    /// Session state derived from the engine's current position
    pub fn session_state(&self) -> SessionState {
        let workout = self.workout();
        let plan = self.engine.plan();
        let position = self.engine.position();
        if position.state.is_terminal() {
            SessionState::completed(&workout, &plan)
        } else {
            SessionState::at_position(&workout, &plan, position.index, position.remaining)
        }
    }

    /// Recompute the session state and push it to watchers
    pub fn publish_session(&self) -> SessionState {
        let session = self.session_state();
        if self.session_tx.send(session.clone()).is_err() {
            warn!("Failed to publish session update");
        }
        session
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    fn record_action(&self, action: &str) {
        let mut last = self.last_action.lock().unwrap_or_else(PoisonError::into_inner);
        *last = Some((action.to_string(), Utc::now()));
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last = self.last_action.lock().unwrap_or_else(PoisonError::into_inner);
        match last.as_ref() {
            Some((action, at)) => (Some(action.clone()), Some(*at)),
            None => (None, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{services::TracingNotifier, state::TimerState, workout::Phase};
    use std::time::Duration;
    use tokio::time::sleep;

    fn app() -> AppState {
        AppState::new(
            0,
            "127.0.0.1".to_string(),
            WorkoutConfig::new(3, 5, 2, 2, 1, 0),
            Arc::new(TracingNotifier::new()),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn control_calls_publish_session() {
        let app = app();
        let mut rx = app.session_tx.subscribe();

        let session = app.start();
        assert_eq!(session.current_phase, Phase::Prepare);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().remaining_time, 3);

        sleep(Duration::from_millis(4500)).await;
        let session = app.pause();
        assert_eq!(session.current_interval_index, 1);
        assert_eq!(session.remaining_time, 4);
        assert_eq!(session.elapsed_time, 4);
        assert_eq!(app.get_last_action().0.as_deref(), Some("pause"));
    }

    #[tokio::test(start_paused = true)]
    async fn background_round_trip_without_wall_clock_gap() {
        let app = app();
        app.start();
        sleep(Duration::from_millis(1500)).await;

        app.enter_background();
        assert_eq!(app.engine.state(), TimerState::Paused);

        // The system clock barely moved, so the engine resumes where it stopped
        let session = app.become_active();
        assert_eq!(app.engine.state(), TimerState::Running);
        assert_eq!(session.current_interval_index, 0);
        assert_eq!(session.remaining_time, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn background_while_paused_stays_paused() {
        let app = app();
        app.start();
        app.pause();
        app.enter_background();
        app.become_active();
        assert_eq!(app.engine.state(), TimerState::Paused);
    }

    #[tokio::test(start_paused = true)]
    async fn configure_replaces_plan() {
        let app = app();
        app.start();
        let session = app.configure(WorkoutConfig::new(0, 7, 0, 1, 3, 0));
        assert_eq!(app.engine.state(), TimerState::Idle);
        assert_eq!(session.current_phase, Phase::Work);
        assert_eq!(session.total_duration, 21);
        assert_eq!(app.workout().sets, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_background_keeps_first_snapshot() {
        let app = app();
        app.start();
        sleep(Duration::from_millis(1500)).await;

        app.enter_background();
        let session = app.enter_background();
        assert_eq!(session.remaining_time, 2);
        assert_eq!(app.engine.state(), TimerState::Paused);

        app.become_active();
        assert_eq!(app.engine.state(), TimerState::Running);
        assert_eq!(app.engine.position().remaining, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn configure_while_backgrounded_drops_snapshot() {
        let app = app();
        app.start();
        sleep(Duration::from_millis(8500)).await;
        app.enter_background();

        app.configure(WorkoutConfig::new(0, 100, 0, 1, 1, 0));
        app.start();
        let session = app.become_active();
        assert_eq!(app.engine.state(), TimerState::Running);
        assert_eq!(session.current_interval_index, 0);
        assert_eq!(session.current_phase, Phase::Work);
        assert_eq!(session.remaining_time, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_while_backgrounded_drops_snapshot() {
        let app = app();
        app.start();
        sleep(Duration::from_millis(4500)).await;
        app.enter_background();

        app.reset();
        let session = app.become_active();
        assert_eq!(app.engine.state(), TimerState::Idle);
        assert_eq!(session.current_interval_index, 0);
        assert_eq!(session.remaining_time, 3);

        // A fresh suspend after the reset works normally
        app.start();
        sleep(Duration::from_millis(1500)).await;
        app.enter_background();
        app.become_active();
        assert_eq!(app.engine.state(), TimerState::Running);
    }
}
