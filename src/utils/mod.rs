//! Process-level helpers
//!
//! Signal handling shared by the binary and its background tasks.

pub mod signals;

pub use signals::shutdown_signal;
