//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use super::responses::{ControlResponse, HealthResponse, PlanResponse, StatusResponse};
use crate::{
    state::{AppState, SessionState},
    workout::WorkoutConfig,
};

fn control(
    state: &AppState,
    action: &str,
    apply: impl FnOnce(&AppState) -> SessionState,
) -> Json<ControlResponse> {
    let session = apply(state);
    let timer_state = state.engine.state();
    info!(action, state = ?timer_state, "Control endpoint called");
    Json(ControlResponse::new(action, timer_state, session))
}

/// Handle POST /configure - Rebuild the plan from a workout configuration
pub async fn configure_handler(
    State(state): State<Arc<AppState>>,
    Json(workout): Json<WorkoutConfig>,
) -> Json<ControlResponse> {
    control(&state, "configure", |s| s.configure(workout))
}

/// Handle POST /start - Start or continue the session
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Json<ControlResponse> {
    control(&state, "start", AppState::start)
}

/// Handle POST /pause - Pause the session
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Json<ControlResponse> {
    control(&state, "pause", AppState::pause)
}

/// Handle POST /resume - Resume a paused session
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> Json<ControlResponse> {
    control(&state, "resume", AppState::resume)
}

/// Handle POST /reset - Rewind to the first interval
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Json<ControlResponse> {
    control(&state, "reset", AppState::reset)
}

/// Handle POST /lifecycle/background - Host is about to be suspended
pub async fn background_handler(State(state): State<Arc<AppState>>) -> Json<ControlResponse> {
    control(&state, "background", AppState::enter_background)
}

/// Handle POST /lifecycle/active - Host is back in the foreground
pub async fn active_handler(State(state): State<Arc<AppState>>) -> Json<ControlResponse> {
    control(&state, "active", AppState::become_active)
}

/// Handle GET /status - Return current engine and session status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        state: state.engine.state(),
        session: state.session_state(),
        workout: state.workout(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /plan - Return the current plan
pub async fn plan_handler(State(state): State<Arc<AppState>>) -> Json<PlanResponse> {
    let plan = state.engine.plan();
    Json(PlanResponse {
        total_duration: plan.total_duration(),
        intervals: plan.intervals().to_vec(),
    })
}

/// Handle GET /events - Stream the current session's events as SSE.
///
/// The stream ends when the session is replaced by a reset or reconfigure.
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (session, events) = state.engine.subscribe_session();
    info!(session, "Event stream subscriber connected");

    let stream = stream::unfold(events, move |mut events| async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let sse = Event::default()
                        .id(session.to_string())
                        .json_data(event)
                        .unwrap_or_else(|_| Event::default().comment("unserializable event"));
                    return Some((Ok(sse), events));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(session, skipped, "Event stream subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
