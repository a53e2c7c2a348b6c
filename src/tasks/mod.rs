//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod lifecycle_signals;
pub mod session_tracker;

// Re-export main functions
pub use lifecycle_signals::lifecycle_signal_task;
pub use session_tracker::session_tracker_task;
