//! Workout configuration with construction-time clamping

use serde::{Deserialize, Serialize};

pub const MAX_PREPARE: u32 = 300;
pub const MAX_WORK: u32 = 600;
pub const MAX_REST: u32 = 600;
pub const MAX_REST_BETWEEN_SETS: u32 = 900;
pub const MAX_CYCLES_PER_SET: u32 = 50;
pub const MAX_SETS: u32 = 50;

/// Numeric description of one interval workout. All durations are in seconds.
///
/// Every constructor clamps its inputs, so a `WorkoutConfig` in hand always
/// satisfies `work >= 1`, `cycles_per_set >= 1` and `sets >= 1`, and no field
/// exceeds its `MAX_*` bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "WorkoutConfigInput", rename_all = "camelCase")]
pub struct WorkoutConfig {
    pub prepare: u32,
    pub work: u32,
    pub rest: u32,
    pub rest_between_sets: u32,
    pub cycles_per_set: u32,
    pub sets: u32,
}

impl WorkoutConfig {
    /// Create a configuration, clamping every field into its valid range
    pub fn new(
        prepare: i64,
        work: i64,
        rest: i64,
        cycles_per_set: i64,
        sets: i64,
        rest_between_sets: i64,
    ) -> Self {
        Self {
            prepare: clamp_field(prepare, 0, MAX_PREPARE),
            work: clamp_field(work, 1, MAX_WORK),
            rest: clamp_field(rest, 0, MAX_REST),
            rest_between_sets: clamp_field(rest_between_sets, 0, MAX_REST_BETWEEN_SETS),
            cycles_per_set: clamp_field(cycles_per_set, 1, MAX_CYCLES_PER_SET),
            sets: clamp_field(sets, 1, MAX_SETS),
        }
    }

    /// Re-apply the bounds, for values assembled field by field
    pub fn clamped(&self) -> Self {
        Self::new(
            i64::from(self.prepare),
            i64::from(self.work),
            i64::from(self.rest),
            i64::from(self.cycles_per_set),
            i64::from(self.sets),
            i64::from(self.rest_between_sets),
        )
    }

    /// Number of work intervals in the whole session
    pub fn total_cycles(&self) -> u64 {
        u64::from(self.cycles_per_set) * u64::from(self.sets)
    }

    /// Total session length in seconds, not counting the terminal interval
    pub fn total_duration(&self) -> u64 {
        let cycles = u64::from(self.cycles_per_set);
        let sets = u64::from(self.sets);
        let per_set = cycles
            .saturating_mul(u64::from(self.work))
            .saturating_add(cycles.saturating_sub(1).saturating_mul(u64::from(self.rest)));
        u64::from(self.prepare)
            .saturating_add(sets.saturating_mul(per_set))
            .saturating_add(sets.saturating_sub(1).saturating_mul(u64::from(self.rest_between_sets)))
    }
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self::new(10, 180, 60, 12, 1, 0)
    }
}

fn clamp_field(value: i64, min: u32, max: u32) -> u32 {
    value.clamp(i64::from(min), i64::from(max)) as u32
}

/// Wire shape accepted from clients; negative or oversized values are clamped
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkoutConfigInput {
    #[serde(default)]
    prepare: i64,
    work: i64,
    #[serde(default)]
    rest: i64,
    #[serde(default)]
    rest_between_sets: i64,
    cycles_per_set: i64,
    sets: i64,
}

impl From<WorkoutConfigInput> for WorkoutConfig {
    fn from(input: WorkoutConfigInput) -> Self {
        Self::new(
            input.prepare,
            input.work,
            input.rest,
            input.cycles_per_set,
            input.sets,
            input.rest_between_sets,
        )
    }
}
