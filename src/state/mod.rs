//! State management module
//!
//! This module contains the timer lifecycle types, the UI-facing session
//! aggregate, and the shared application state of the server.

pub mod app_state;
pub mod session_state;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use session_state::SessionState;
pub use timer_state::{TimerEvent, TimerState};
