//! Workout phase enumeration

use serde::{Deserialize, Serialize};

/// Category of a workout interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Countdown before the first work interval
    Prepare,
    Work,
    /// Rest between cycles inside one set
    Rest,
    RestBetweenSets,
    /// Terminal zero-length interval
    Finished,
}

impl Phase {
    /// Short human-readable name of the phase
    pub fn title(&self) -> &'static str {
        match self {
            Phase::Prepare => "Prepare",
            Phase::Work => "Work",
            Phase::Rest => "Rest",
            Phase::RestBetweenSets => "Rest Between Sets",
            Phase::Finished => "Finished",
        }
    }

    /// Palette key a renderer can map to a color
    pub fn color_key(&self) -> &'static str {
        match self {
            Phase::Prepare => "phase.prepare",
            Phase::Work => "phase.work",
            Phase::Rest => "phase.rest",
            Phase::RestBetweenSets => "phase.restBetweenSets",
            Phase::Finished => "phase.finished",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Phase::Finished)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}
