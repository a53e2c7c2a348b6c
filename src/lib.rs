//! Interval Timer - a single-session interval workout timer
//!
//! This library expands a workout configuration into a plan of timed phases,
//! drives that plan in real time with a concurrent engine, and reconciles the
//! engine's position after the host process has been suspended.

pub mod api;
pub mod background;
pub mod config;
pub mod engine;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;
pub mod workout;

// Re-export commonly used types
pub use api::create_router;
pub use background::{advance_position, BackgroundReconciler, NotificationRequest, Notifier};
pub use config::Config;
pub use engine::{EnginePosition, TimerEngine};
pub use state::{AppState, SessionState, TimerEvent, TimerState};
pub use utils::signals::shutdown_signal;
pub use workout::{Interval, Phase, Plan, PlanBuilder, WorkoutConfig};
