//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    state::{SessionState, TimerState},
    workout::{Interval, WorkoutConfig},
};

/// Response for control endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlResponse {
    pub action: String,
    pub state: TimerState,
    pub timestamp: DateTime<Utc>,
    pub session: SessionState,
}

impl ControlResponse {
    pub fn new(action: &str, state: TimerState, session: SessionState) -> Self {
        Self {
            action: action.to_string(),
            state,
            timestamp: Utc::now(),
            session,
        }
    }
}

/// Status response with engine and server information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub state: TimerState,
    pub session: SessionState,
    pub workout: WorkoutConfig,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// The current plan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub total_duration: u64,
    pub intervals: Vec<Interval>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
