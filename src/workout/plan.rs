//! Plan construction
//!
//! A plan is the linear, ordered list of intervals for one configuration:
//!
//! ```text
//! [Prepare] (Work [Rest])* [RestBetweenSets] ... Finished
//! ```
//!
//! Optional phases with a zero duration are left out entirely. Only the
//! terminal `Finished` interval ever has a zero duration.

use std::ops::Index;

use serde::{Deserialize, Serialize};

use super::{Interval, Phase, WorkoutConfig};

/// Immutable, non-empty interval sequence ending in exactly one `Finished`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plan {
    intervals: Vec<Interval>,
}

impl Plan {
    /// Wrap a raw interval list, used for hand-built or degenerate plans
    pub fn from_intervals(intervals: Vec<Interval>) -> Self {
        Self { intervals }
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn get(&self, index: usize) -> Option<&Interval> {
        self.intervals.get(index)
    }

    pub fn first(&self) -> Option<&Interval> {
        self.intervals.first()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Interval> {
        self.intervals.iter()
    }

    /// Sum of every non-Finished duration, in seconds
    pub fn total_duration(&self) -> u64 {
        self.intervals
            .iter()
            .filter(|interval| !interval.phase.is_finished())
            .map(|interval| u64::from(interval.duration))
            .sum()
    }

    /// Seconds consumed before `index` starts
    pub fn offset_of(&self, index: usize) -> u64 {
        self.intervals
            .iter()
            .take(index)
            .filter(|interval| !interval.phase.is_finished())
            .map(|interval| u64::from(interval.duration))
            .sum()
    }
}

impl Index<usize> for Plan {
    type Output = Interval;

    fn index(&self, index: usize) -> &Interval {
        &self.intervals[index]
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a Interval;
    type IntoIter = std::slice::Iter<'a, Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}

/// Expands a [`WorkoutConfig`] into a [`Plan`]
pub struct PlanBuilder;

impl PlanBuilder {
    /// Build the plan for `config`. Pure and total.
    pub fn build(config: &WorkoutConfig) -> Plan {
        let config = config.clamped();
        let mut intervals = Vec::new();
        let mut push = |phase: Phase, duration: u32, set_index: Option<u32>, cycle_index: Option<u32>| {
            let order_index = intervals.len();
            intervals.push(Interval::new(phase, duration, set_index, cycle_index, order_index));
        };

        if config.prepare > 0 {
            push(Phase::Prepare, config.prepare, Some(0), None);
        }

        for set in 0..config.sets {
            for cycle in 0..config.cycles_per_set {
                push(Phase::Work, config.work, Some(set), Some(cycle));

                let last_cycle = cycle == config.cycles_per_set - 1;
                if !last_cycle && config.rest > 0 {
                    push(Phase::Rest, config.rest, Some(set), Some(cycle));
                }
            }

            let last_set = set == config.sets - 1;
            if !last_set && config.rest_between_sets > 0 {
                push(Phase::RestBetweenSets, config.rest_between_sets, Some(set), None);
            }
        }

        push(Phase::Finished, 0, Some(config.sets - 1), None);

        Plan { intervals }
    }
}
