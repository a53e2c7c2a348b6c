//! Cancellable per-second tick loop

use std::{
    sync::{Mutex, PoisonError, Weak},
    time::Duration,
};

use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::debug;

use super::EngineCore;

pub(crate) const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Spawn the loop for ticker `generation`.
///
/// Ticks are scheduled against fixed deadlines (`start + n * period`) so
/// scheduling jitter does not accumulate over a long session. The loop exits
/// when the engine is dropped, when ticking is cancelled, or on completion.
pub(crate) fn spawn(core: Weak<Mutex<EngineCore>>, generation: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticks = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticks.tick().await;

            let Some(core) = core.upgrade() else {
                debug!(generation, "Engine dropped, ticker exiting");
                break;
            };
            let mut core = core.lock().unwrap_or_else(PoisonError::into_inner);
            if !core.step(generation) {
                debug!(generation, "Ticker stopped");
                break;
            }
        }
    })
}
