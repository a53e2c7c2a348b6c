//! Suspend/resume coordinator

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::{
    advance::{advance_position, Reconciled},
    clock::{system_clock, Clock},
    notifications::{build_boundary_notifications, Notifier},
};
use crate::workout::Plan;

/// Live position as reported by whoever owns the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionReport {
    pub index: usize,
    pub remaining: u32,
    pub running: bool,
}

type SnapshotProvider = Box<dyn Fn() -> PositionReport + Send + Sync>;
type PlanProvider = Box<dyn Fn() -> Arc<Plan> + Send + Sync>;
type ReconcileHandler = Box<dyn Fn(Reconciled) + Send + Sync>;

/// Position captured at suspend time, consumed by the next resume
#[derive(Debug, Clone, Copy)]
struct PositionSnapshot {
    timestamp: DateTime<Utc>,
    index: usize,
    remaining: u32,
}

/// Plans boundary notifications on suspend and recomputes the position on resume.
///
/// The reconciler never touches an engine. It reads through the providers it
/// was built with and hands its result to the reconcile callback.
pub struct BackgroundReconciler {
    notifier: Arc<dyn Notifier>,
    clock: Clock,
    snapshot_provider: SnapshotProvider,
    plan_provider: PlanProvider,
    on_reconcile: ReconcileHandler,
    snapshot: Option<PositionSnapshot>,
}

impl BackgroundReconciler {
    /// Create a reconciler reading the system clock
    pub fn new(
        notifier: Arc<dyn Notifier>,
        snapshot_provider: impl Fn() -> PositionReport + Send + Sync + 'static,
        plan_provider: impl Fn() -> Arc<Plan> + Send + Sync + 'static,
        on_reconcile: impl Fn(Reconciled) + Send + Sync + 'static,
    ) -> Self {
        Self {
            notifier,
            clock: system_clock(),
            snapshot_provider: Box::new(snapshot_provider),
            plan_provider: Box::new(plan_provider),
            on_reconcile: Box::new(on_reconcile),
            snapshot: None,
        }
    }

    /// Replace the wall clock
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Whether a suspend snapshot is waiting for the next resume
    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Drop any pending snapshot and its notifications. The owner calls this
    /// when the session the snapshot was taken from is replaced.
    pub fn discard_snapshot(&mut self) {
        if self.snapshot.take().is_some() {
            debug!("Discarded background snapshot of a replaced session");
            self.notifier.cancel_all();
        }
    }

    /// Record the live position and schedule a notification for every
    /// remaining phase boundary. Does nothing unless the session is running.
    pub fn enter_background(&mut self) {
        let plan = (self.plan_provider)();
        let position = (self.snapshot_provider)();
        if !position.running || plan.is_empty() {
            debug!("Entering background while not running, nothing to schedule");
            self.snapshot = None;
            return;
        }

        let timestamp = (self.clock)();
        self.snapshot = Some(PositionSnapshot {
            timestamp,
            index: position.index,
            remaining: position.remaining,
        });

        let requests = build_boundary_notifications(&plan, position.index, position.remaining);
        info!(
            index = position.index,
            remaining = position.remaining,
            notifications = requests.len(),
            "Entered background"
        );

        // A missed alert only costs timeliness, the resume math does not depend on it
        if let Err(e) = self.notifier.schedule(requests) {
            warn!("Failed to schedule background notifications: {}", e);
        }
    }

    /// Cancel pending notifications and, if a snapshot exists, report the
    /// position the session would have reached had it kept ticking.
    pub fn become_active(&mut self) {
        self.notifier.cancel_all();

        let Some(snapshot) = self.snapshot.take() else {
            debug!("Became active without a snapshot");
            return;
        };

        let plan = (self.plan_provider)();
        if plan.is_empty() {
            return;
        }

        let now = (self.clock)();
        let elapsed = elapsed_seconds(snapshot.timestamp, now);
        let reconciled = advance_position(&plan, snapshot.index, snapshot.remaining, elapsed);
        info!(
            elapsed,
            index = reconciled.index,
            remaining = reconciled.remaining,
            finished = reconciled.finished,
            "Reconciled position after background"
        );

        (self.on_reconcile)(reconciled);
    }
}

/// Whole seconds between two instants, rounded, never negative
fn elapsed_seconds(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    let millis = (to - from).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    ((millis as f64) / 1000.0).round() as u64
}
