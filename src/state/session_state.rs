//! UI-facing aggregate of the current session

use serde::{Deserialize, Serialize};

use crate::workout::{Phase, Plan, WorkoutConfig};

/// Snapshot of session progress for renderers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub current_interval_index: usize,
    pub current_phase: Phase,
    /// Seconds left in the current interval
    pub remaining_time: u32,
    pub total_duration: u64,
    pub elapsed_time: u64,
    /// 1-based, 0 when not applicable
    pub current_set: u32,
    pub total_sets: u32,
    /// 1-based, 0 when not applicable
    pub current_cycle: u32,
    pub total_cycles_per_set: u32,
    /// Overall progress in `[0, 1]`
    pub progress: f64,
}

impl SessionState {
    /// Initial state before the first start
    pub fn idle(config: &WorkoutConfig, plan: &Plan) -> Self {
        Self {
            current_interval_index: 0,
            current_phase: plan.first().map(|i| i.phase).unwrap_or(Phase::Finished),
            remaining_time: plan.first().map(|i| i.duration).unwrap_or(0),
            total_duration: plan.total_duration(),
            elapsed_time: 0,
            current_set: 0,
            total_sets: config.sets,
            current_cycle: 0,
            total_cycles_per_set: config.cycles_per_set,
            progress: 0.0,
        }
    }

    /// State at an arbitrary position; elapsed time is derived from the position
    pub fn at_position(config: &WorkoutConfig, plan: &Plan, index: usize, remaining: u32) -> Self {
        let total = plan.total_duration();
        let Some(interval) = plan.get(index) else {
            return Self::completed(config, plan);
        };

        let remaining = remaining.min(interval.duration);
        let consumed = u64::from(interval.duration - remaining);
        let elapsed = (plan.offset_of(index) + consumed).min(total);

        Self {
            current_interval_index: index,
            current_phase: interval.phase,
            remaining_time: remaining,
            total_duration: total,
            elapsed_time: elapsed,
            current_set: interval.set_index.map(|s| s + 1).unwrap_or(0),
            total_sets: config.sets,
            current_cycle: interval.cycle_index.map(|c| c + 1).unwrap_or(0),
            total_cycles_per_set: config.cycles_per_set,
            progress: progress(elapsed, total),
        }
    }

    /// Final state once the session has completed
    pub fn completed(config: &WorkoutConfig, plan: &Plan) -> Self {
        let total = plan.total_duration();
        let last = plan.len().saturating_sub(1);
        let set = plan.get(last).and_then(|i| i.set_index).map(|s| s + 1).unwrap_or(0);

        Self {
            current_interval_index: last,
            current_phase: Phase::Finished,
            remaining_time: 0,
            total_duration: total,
            elapsed_time: total,
            current_set: set,
            total_sets: config.sets,
            current_cycle: 0,
            total_cycles_per_set: config.cycles_per_set,
            progress: if total > 0 { 1.0 } else { 0.0 },
        }
    }
}

fn progress(elapsed: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (elapsed as f64 / total as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::PlanBuilder;

    #[test]
    fn position_derives_elapsed_and_ui_indices() {
        let config = WorkoutConfig::new(3, 5, 2, 2, 1, 0);
        let plan = PlanBuilder::build(&config);

        // Rest after the first work interval, one second in
        let state = SessionState::at_position(&config, &plan, 2, 1);
        assert_eq!(state.current_phase, Phase::Rest);
        assert_eq!(state.elapsed_time, 9);
        assert_eq!(state.current_set, 1);
        assert_eq!(state.current_cycle, 1);
        assert!((state.progress - 9.0 / 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn prepare_has_no_cycle() {
        let config = WorkoutConfig::new(3, 5, 2, 2, 1, 0);
        let plan = PlanBuilder::build(&config);
        let state = SessionState::at_position(&config, &plan, 0, 3);
        assert_eq!(state.current_cycle, 0);
        assert_eq!(state.elapsed_time, 0);
        assert_eq!(state.progress, 0.0);
    }

    #[test]
    fn completed_is_full_progress() {
        let config = WorkoutConfig::new(0, 4, 0, 1, 2, 0);
        let plan = PlanBuilder::build(&config);
        let state = SessionState::completed(&config, &plan);
        assert_eq!(state.current_interval_index, plan.len() - 1);
        assert_eq!(state.elapsed_time, 8);
        assert_eq!(state.progress, 1.0);
        assert_eq!(state.current_set, 2);
    }

    #[test]
    fn idle_starts_at_first_interval() {
        let config = WorkoutConfig::default();
        let plan = PlanBuilder::build(&config);
        let state = SessionState::idle(&config, &plan);
        assert_eq!(state.current_phase, Phase::Prepare);
        assert_eq!(state.remaining_time, 10);
        assert_eq!(state.total_duration, config.total_duration());
    }
}
