//! Notification requests and the notifier seam

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::workout::{Interval, Phase, Plan};

pub const COMPLETED_TITLE: &str = "Session completed";
pub const COMPLETED_BODY: &str = "Well done! Training finished.";

/// A notification to deliver `delay_seconds` from now
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    pub id: String,
    pub title: String,
    pub body: String,
    pub delay_seconds: u64,
    pub play_sound: bool,
}

/// Fire-and-forget delivery of scheduled notifications
pub trait Notifier: Send + Sync {
    /// Schedule every request relative to now
    fn schedule(&self, requests: Vec<NotificationRequest>) -> anyhow::Result<()>;

    /// Drop every pending request
    fn cancel_all(&self);
}

/// Title and body announcing that `interval` begins
pub fn notification_copy(interval: &Interval) -> (&'static str, &'static str) {
    match interval.phase {
        Phase::Prepare => ("Prepare", "Get ready to start."),
        Phase::Work => ("Work", "Go! Focus on intensity."),
        Phase::Rest => ("Rest", "Recover before next cycle."),
        Phase::RestBetweenSets => ("Set Break", "Recover before next set."),
        Phase::Finished => ("Completed", "Training finished."),
    }
}

/// One request per phase boundary after `(index, remaining)`, ending with a
/// single completion request. Delays are strictly cumulative.
pub fn build_boundary_notifications(
    plan: &Plan,
    index: usize,
    remaining: u32,
) -> Vec<NotificationRequest> {
    let mut requests = Vec::new();
    let mut accumulated = u64::from(remaining);

    for (idx, next) in plan.iter().enumerate().skip(index + 1) {
        if next.phase.is_finished() {
            requests.push(NotificationRequest {
                id: format!("interval.completed.{}", Uuid::new_v4()),
                title: COMPLETED_TITLE.to_string(),
                body: COMPLETED_BODY.to_string(),
                delay_seconds: accumulated,
                play_sound: true,
            });
            break;
        }

        let (title, body) = notification_copy(next);
        requests.push(NotificationRequest {
            id: format!("interval.phase.{}.{}", idx, Uuid::new_v4()),
            title: title.to_string(),
            body: body.to_string(),
            delay_seconds: accumulated,
            play_sound: true,
        });
        accumulated += u64::from(next.duration);
    }

    requests
}
