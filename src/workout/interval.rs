//! A single timed interval of a plan

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Phase;

/// One entry of a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interval {
    /// Opaque identifier for correlating UI rows
    pub id: Uuid,
    pub phase: Phase,
    /// Length in seconds; zero only for the terminal Finished interval
    pub duration: u32,
    /// 0-based set index, `None` when not applicable
    pub set_index: Option<u32>,
    /// 0-based cycle index within the set, `None` when not applicable
    pub cycle_index: Option<u32>,
    /// Position of this interval in its plan
    pub order_index: usize,
}

impl Interval {
    pub fn new(
        phase: Phase,
        duration: u32,
        set_index: Option<u32>,
        cycle_index: Option<u32>,
        order_index: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            phase,
            duration,
            set_index,
            cycle_index,
            order_index,
        }
    }

    /// True for the zero-length interval that terminates a plan
    pub fn is_terminal(&self) -> bool {
        self.phase.is_finished() && self.duration == 0
    }
}
