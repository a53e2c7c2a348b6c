//! Timer lifecycle state and the events an engine publishes

use serde::{Deserialize, Serialize};

use crate::workout::Phase;

/// Lifecycle of one engine instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    /// Configured but not counting
    #[default]
    Idle,
    Running,
    /// Counting suspended, position preserved
    Paused,
    /// Every interval has elapsed
    Finished,
}

impl TimerState {
    /// Check if the timer is counting down
    pub fn is_active(&self) -> bool {
        matches!(self, TimerState::Running)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, TimerState::Paused)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, TimerState::Idle)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TimerState::Finished)
    }
}

/// State-change notification published by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TimerEvent {
    /// One second elapsed in the current interval
    #[serde(rename_all = "camelCase")]
    Tick { remaining_seconds: u32 },
    /// The interval at `index` became current
    PhaseChanged { phase: Phase, index: usize },
    /// The session ran to its end
    Completed,
}
