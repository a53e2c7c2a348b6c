//! Interval Timer - an interval workout timer with an HTTP control surface
//!
//! This is the main entry point for the interval-timer application.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use interval_timer::{
    api::create_router,
    config::Config,
    services::TracingNotifier,
    state::AppState,
    tasks::{lifecycle_signal_task, session_tracker_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("interval_timer={},tower_http=info", config.log_level()))
        .init();

    let workout = config.workout();
    info!("Starting interval-timer v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, workout={:?}, total={}s",
        config.host,
        config.port,
        workout,
        workout.total_duration()
    );

    // Create application state
    let notifier = Arc::new(TracingNotifier::new());
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        workout,
        notifier,
    ));

    // Keep the published session in step with the engine
    let tracker_state = Arc::clone(&state);
    tokio::spawn(async move {
        session_tracker_task(tracker_state).await;
    });

    // Ctrl+Z / fg drive background reconciliation
    let lifecycle_state = Arc::clone(&state);
    tokio::spawn(async move {
        lifecycle_signal_task(lifecycle_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /configure            - Rebuild the plan from a workout");
    info!("  POST /start                - Start or continue the session");
    info!("  POST /pause                - Pause the session");
    info!("  POST /resume               - Resume the session");
    info!("  POST /reset                - Rewind to the first interval");
    info!("  POST /lifecycle/background - Snapshot and schedule notifications");
    info!("  POST /lifecycle/active     - Reconcile after a suspension");
    info!("  GET  /status               - Engine and session status");
    info!("  GET  /plan                 - Current plan");
    info!("  GET  /events               - Server-sent timer events");
    info!("  GET  /health               - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
