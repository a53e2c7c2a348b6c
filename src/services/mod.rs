//! Concrete collaborators module
//!
//! This module contains implementations of the seams the core consumes.

pub mod notifier;

// Re-export main types
pub use notifier::TracingNotifier;
