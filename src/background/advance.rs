//! Pure position advance over a plan

use serde::Serialize;

use crate::workout::Plan;

/// Target position after reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciled {
    pub index: usize,
    pub remaining: u32,
    pub finished: bool,
}

impl Reconciled {
    fn new(index: usize, remaining: u32, finished: bool) -> Self {
        Self {
            index,
            remaining,
            finished,
        }
    }
}

/// Where an engine at `(index, remaining)` ends up after `elapsed` seconds of
/// uninterrupted ticking. An empty plan reports `(0, 0, finished)`.
pub fn advance_position(plan: &Plan, index: usize, remaining: u32, elapsed: u64) -> Reconciled {
    if plan.is_empty() {
        return Reconciled::new(0, 0, true);
    }

    let last = plan.len() - 1;
    let mut index = index.min(last);
    let remaining = u64::from(remaining);
    let mut left = elapsed;

    if left == 0 {
        return Reconciled::new(index, remaining as u32, plan[index].phase.is_finished());
    }

    if left < remaining {
        return Reconciled::new(index, (remaining - left) as u32, false);
    }
    left -= remaining;
    index += 1;

    while let Some(current) = plan.get(index) {
        if current.phase.is_finished() {
            return Reconciled::new(index, 0, true);
        }

        let duration = u64::from(current.duration);
        if left < duration {
            return Reconciled::new(index, (duration - left) as u32, false);
        }
        left -= duration;
        index += 1;
    }

    Reconciled::new(last, 0, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::{PlanBuilder, WorkoutConfig};

    fn scenario_plan() -> Plan {
        PlanBuilder::build(&WorkoutConfig::new(3, 5, 2, 2, 1, 0))
    }

    #[test]
    fn lands_inside_rest() {
        let plan = scenario_plan();
        assert_eq!(advance_position(&plan, 0, 3, 9), Reconciled::new(2, 1, false));
    }

    #[test]
    fn overshoot_finishes() {
        let plan = scenario_plan();
        assert_eq!(advance_position(&plan, 3, 5, 6), Reconciled::new(4, 0, true));
    }

    #[test]
    fn zero_elapsed_is_identity() {
        let plan = scenario_plan();
        assert_eq!(advance_position(&plan, 1, 4, 0), Reconciled::new(1, 4, false));
        assert_eq!(advance_position(&plan, 4, 0, 0), Reconciled::new(4, 0, true));
    }

    #[test]
    fn exact_remaining_total_finishes() {
        let plan = scenario_plan();
        // 3 + 5 + 2 + 5
        assert_eq!(advance_position(&plan, 0, 3, 15), Reconciled::new(4, 0, true));
        assert_eq!(advance_position(&plan, 0, 3, 14), Reconciled::new(3, 1, false));
    }

    #[test]
    fn boundary_lands_at_start_of_next_interval() {
        let plan = scenario_plan();
        assert_eq!(advance_position(&plan, 0, 3, 3), Reconciled::new(1, 5, false));
    }

    #[test]
    fn out_of_range_index_is_clamped() {
        let plan = scenario_plan();
        assert_eq!(advance_position(&plan, 99, 0, 0), Reconciled::new(4, 0, true));
        assert_eq!(advance_position(&plan, 99, 0, 10), Reconciled::new(4, 0, true));
    }

    #[test]
    fn empty_plan() {
        let plan = Plan::from_intervals(Vec::new());
        assert_eq!(advance_position(&plan, 0, 0, 5), Reconciled::new(0, 0, true));
    }
}
