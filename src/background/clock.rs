//! Injectable wall clock

use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Function returning "now"
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Clock backed by the system time
pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}
