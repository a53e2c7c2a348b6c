//! Background reconciliation module
//!
//! Keeps a session's logical position correct across a suspension of the
//! host process: notifications are scheduled for every upcoming phase boundary
//! on suspend, and the exact position is recomputed from wall-clock time on
//! resume.

pub mod advance;
pub mod clock;
pub mod notifications;
pub mod reconciler;

// Re-export main types
pub use advance::{advance_position, Reconciled};
pub use clock::{system_clock, Clock};
pub use notifications::{build_boundary_notifications, NotificationRequest, Notifier};
pub use reconciler::{BackgroundReconciler, PositionReport};
