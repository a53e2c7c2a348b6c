//! Workout model module
//!
//! This module contains the workout configuration, the phase and interval
//! types, and the builder that expands a configuration into a plan.

pub mod config;
pub mod interval;
pub mod phase;
pub mod plan;

// Re-export main types
pub use config::WorkoutConfig;
pub use interval::Interval;
pub use phase::Phase;
pub use plan::{Plan, PlanBuilder};
