//! Real-time engine that drives one plan
//!
//! The engine owns its position (`current_index`, `remaining_seconds`) and
//! lifecycle state behind a single mutex. Control calls and the per-second
//! tick step all take that lock, so they are serialized with respect to each
//! other:
//!
//! ```text
//! Idle --start--> Running --pause--> Paused --resume/start--> Running
//!   ^                |                                          |
//!   +----reset-------+--------------- completion ------------> Finished
//! ```
//!
//! Control calls that do not match a transition above are silent no-ops.

mod ticker;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, info};

use crate::{
    state::{TimerEvent, TimerState},
    workout::Plan,
};

/// Capacity of each session's event channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Readable position of an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnginePosition {
    pub index: usize,
    pub remaining: u32,
    pub state: TimerState,
}

/// Handle to a timer engine. Clones share the same engine.
#[derive(Clone)]
pub struct TimerEngine {
    core: Arc<Mutex<EngineCore>>,
}

/// Mutable engine state, only touched while the lock is held
pub(crate) struct EngineCore {
    plan: Arc<Plan>,
    state: TimerState,
    current_index: usize,
    remaining_seconds: u32,
    events: broadcast::Sender<TimerEvent>,
    /// Incremented whenever the event stream is replaced
    session: u64,
    /// Incremented whenever ticking is cancelled; stale tickers compare against it
    ticker_generation: u64,
    ticker: Option<JoinHandle<()>>,
}

impl TimerEngine {
    /// Create an idle engine with an empty plan
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            core: Arc::new(Mutex::new(EngineCore {
                plan: Arc::new(Plan::from_intervals(Vec::new())),
                state: TimerState::Idle,
                current_index: 0,
                remaining_seconds: 0,
                events,
                session: 0,
                ticker_generation: 0,
                ticker: None,
            })),
        }
    }

    /// Create an engine already configured with `plan`
    pub fn with_plan(plan: Plan) -> Self {
        let engine = Self::new();
        engine.configure(plan);
        engine
    }

    fn lock(&self) -> MutexGuard<'_, EngineCore> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Install a new plan, rewind to its first interval and open a fresh event stream
    pub fn configure(&self, plan: Plan) {
        let mut core = self.lock();
        core.cancel_ticker();
        core.plan = Arc::new(plan);
        core.rewind();
        info!(intervals = core.plan.len(), session = core.session, "Engine configured");
    }

    /// Start from Idle, or continue from Paused
    pub fn start(&self) {
        let mut core = self.lock();
        if core.plan.is_empty() {
            return;
        }

        let state = core.state;
        match state {
            TimerState::Idle => {
                core.current_index = core.current_index.min(core.plan.len() - 1);
                let interval = &core.plan[core.current_index];
                let (phase, duration) = (interval.phase, interval.duration);
                core.remaining_seconds = duration;
                core.state = TimerState::Running;
                info!(index = core.current_index, %phase, "Timer started");
                let index = core.current_index;
                core.emit(TimerEvent::PhaseChanged { phase, index });
                self.start_ticking(&mut core);
            }
            TimerState::Paused => self.continue_paused(&mut core),
            TimerState::Running | TimerState::Finished => {}
        }
    }

    /// Stop ticking and keep the remaining time
    pub fn pause(&self) {
        let mut core = self.lock();
        if !core.state.is_active() {
            return;
        }
        core.cancel_ticker();
        core.state = TimerState::Paused;
        info!(
            index = core.current_index,
            remaining = core.remaining_seconds,
            "Timer paused"
        );
    }

    /// Continue ticking after a pause
    pub fn resume(&self) {
        let mut core = self.lock();
        if !core.state.is_paused() {
            return;
        }
        self.continue_paused(&mut core);
    }

    /// Return to Idle at the first interval and open a fresh event stream
    pub fn reset(&self) {
        let mut core = self.lock();
        core.cancel_ticker();
        core.rewind();
        info!(session = core.session, "Timer reset");
    }

    /// Move a running or paused engine to a reconciled position.
    ///
    /// Ticking stops. When `finished` is set the engine completes, otherwise it
    /// lands Paused at `(index, remaining)` and emits `PhaseChanged` if the
    /// interval differs from the current one; call [`resume`](Self::resume)
    /// afterwards to continue.
    pub fn reseed(&self, index: usize, remaining: u32, finished: bool) {
        let mut core = self.lock();
        if core.state.is_idle() || core.state.is_terminal() || core.plan.is_empty() {
            return;
        }
        core.cancel_ticker();

        if finished {
            core.current_index = core.plan.len() - 1;
            core.remaining_seconds = 0;
            core.finish();
            return;
        }

        let index = index.min(core.plan.len() - 1);
        let interval = &core.plan[index];
        let (phase, duration) = (interval.phase, interval.duration);
        let changed = index != core.current_index;

        core.current_index = index;
        core.remaining_seconds = remaining.min(duration);
        core.state = TimerState::Paused;
        info!(index, remaining = core.remaining_seconds, "Timer reseeded");

        if changed {
            core.emit(TimerEvent::PhaseChanged { phase, index });
        }
    }

    /// Subscribe to the current session's events.
    ///
    /// The receiver closes when the session is replaced by `configure` or `reset`.
    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.lock().events.subscribe()
    }

    /// Subscribe and learn which session the receiver belongs to
    pub fn subscribe_session(&self) -> (u64, broadcast::Receiver<TimerEvent>) {
        let core = self.lock();
        (core.session, core.events.subscribe())
    }

    pub fn state(&self) -> TimerState {
        self.lock().state
    }

    pub fn position(&self) -> EnginePosition {
        let core = self.lock();
        EnginePosition {
            index: core.current_index,
            remaining: core.remaining_seconds,
            state: core.state,
        }
    }

    pub fn plan(&self) -> Arc<Plan> {
        Arc::clone(&self.lock().plan)
    }

    /// Identifier of the current event stream
    pub fn session(&self) -> u64 {
        self.lock().session
    }

    fn continue_paused(&self, core: &mut EngineCore) {
        core.state = TimerState::Running;
        info!(
            index = core.current_index,
            remaining = core.remaining_seconds,
            "Timer resumed"
        );
        // Parked on the terminal interval: complete without a catch-up tick
        if !core.at_terminal() {
            let remaining_seconds = core.remaining_seconds;
            core.emit(TimerEvent::Tick { remaining_seconds });
        }
        self.start_ticking(core);
    }

    fn start_ticking(&self, core: &mut EngineCore) {
        core.cancel_ticker();
        if core.at_terminal() {
            core.finish();
            return;
        }
        let generation = core.ticker_generation;
        core.ticker = Some(ticker::spawn(Arc::downgrade(&self.core), generation));
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineCore {
    /// One elapsed second. Returns `false` once the ticker should stop.
    pub(crate) fn step(&mut self, generation: u64) -> bool {
        if !self.state.is_active() || self.ticker_generation != generation {
            return false;
        }
        if self.at_terminal() {
            self.finish();
            return false;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        debug!(index = self.current_index, remaining = self.remaining_seconds, "Tick");
        let remaining_seconds = self.remaining_seconds;
        self.emit(TimerEvent::Tick { remaining_seconds });

        if self.remaining_seconds == 0 {
            return self.advance();
        }
        true
    }

    fn advance(&mut self) -> bool {
        self.current_index += 1;

        let next = self
            .plan
            .get(self.current_index)
            .filter(|interval| !interval.phase.is_finished())
            .map(|interval| (interval.phase, interval.duration));

        let Some((phase, duration)) = next else {
            self.current_index = self.current_index.min(self.plan.len().saturating_sub(1));
            self.finish();
            return false;
        };

        self.remaining_seconds = duration;
        info!(index = self.current_index, %phase, "Phase changed");
        let index = self.current_index;
        self.emit(TimerEvent::PhaseChanged { phase, index });
        true
    }

    fn finish(&mut self) {
        self.cancel_ticker();
        self.state = TimerState::Finished;
        info!(session = self.session, "Session completed");
        self.emit(TimerEvent::Completed);
    }

    fn at_terminal(&self) -> bool {
        self.plan
            .get(self.current_index)
            .map_or(true, |interval| interval.is_terminal())
    }

    /// Back to Idle at the first interval, with a new event stream
    fn rewind(&mut self) {
        self.current_index = 0;
        self.remaining_seconds = self.plan.first().map(|i| i.duration).unwrap_or(0);
        self.state = TimerState::Idle;

        // Dropping the old sender closes every receiver of the previous session
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        self.events = events;
        self.session += 1;
    }

    fn cancel_ticker(&mut self) {
        self.ticker_generation += 1;
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }

    fn emit(&self, event: TimerEvent) {
        // No subscribers is fine
        self.events.send(event).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::{Interval, Phase, PlanBuilder, WorkoutConfig};
    use std::time::Duration;
    use tokio::{sync::broadcast::error::TryRecvError, time::sleep};

    fn scenario_plan() -> Plan {
        PlanBuilder::build(&WorkoutConfig::new(3, 5, 2, 2, 1, 0))
    }

    async fn collect_until_completed(rx: &mut broadcast::Receiver<TimerEvent>) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.recv().await {
            events.push(event);
            if event == TimerEvent::Completed {
                break;
            }
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn runs_a_full_session() {
        let engine = TimerEngine::with_plan(scenario_plan());
        let mut rx = engine.subscribe();
        engine.start();

        let events = collect_until_completed(&mut rx).await;

        let phase_changes: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                TimerEvent::PhaseChanged { phase, index } => Some((*phase, *index)),
                _ => None,
            })
            .collect();
        assert_eq!(
            phase_changes,
            vec![(Phase::Prepare, 0), (Phase::Work, 1), (Phase::Rest, 2), (Phase::Work, 3)]
        );

        let ticks = events
            .iter()
            .filter(|e| matches!(e, TimerEvent::Tick { .. }))
            .count();
        assert_eq!(ticks, 15);

        assert_eq!(events.first(), Some(&TimerEvent::PhaseChanged { phase: Phase::Prepare, index: 0 }));
        assert_eq!(events[1], TimerEvent::Tick { remaining_seconds: 2 });
        assert_eq!(engine.state(), TimerState::Finished);
        assert_eq!(engine.position().index, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn completed_is_emitted_once() {
        let engine = TimerEngine::with_plan(PlanBuilder::build(&WorkoutConfig::new(0, 1, 0, 1, 1, 0)));
        let mut rx = engine.subscribe();
        engine.start();
        let events = collect_until_completed(&mut rx).await;
        assert_eq!(events.iter().filter(|e| **e == TimerEvent::Completed).count(), 1);

        // Control calls after completion emit nothing
        engine.start();
        engine.resume();
        engine.pause();
        sleep(Duration::from_secs(3)).await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(engine.state(), TimerState::Finished);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_keeps_remaining_and_resume_ticks_immediately() {
        let engine = TimerEngine::with_plan(scenario_plan());
        engine.start();
        sleep(Duration::from_millis(2500)).await;

        engine.pause();
        assert_eq!(engine.state(), TimerState::Paused);
        assert_eq!(engine.position().remaining, 1);

        sleep(Duration::from_secs(10)).await;
        assert_eq!(engine.position().remaining, 1);

        let mut rx = engine.subscribe();
        engine.resume();
        assert_eq!(rx.try_recv().unwrap(), TimerEvent::Tick { remaining_seconds: 1 });
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        // A full second passes before the next decrement
        sleep(Duration::from_millis(900)).await;
        assert_eq!(engine.position().remaining, 1);
        sleep(Duration::from_millis(200)).await;
        assert_eq!(engine.position().index, 1);
        assert_eq!(engine.position().remaining, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn start_from_paused_behaves_like_resume() {
        let engine = TimerEngine::with_plan(scenario_plan());
        engine.start();
        sleep(Duration::from_millis(1500)).await;
        engine.pause();

        let mut rx = engine.subscribe();
        engine.start();
        assert_eq!(rx.try_recv().unwrap(), TimerEvent::Tick { remaining_seconds: 2 });
        assert_eq!(engine.state(), TimerState::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_rewinds_and_closes_old_stream() {
        let plan = scenario_plan();
        let engine = TimerEngine::with_plan(plan.clone());
        let mut old = engine.subscribe();
        let old_session = engine.session();
        engine.start();
        sleep(Duration::from_millis(4500)).await;

        engine.reset();
        let position = engine.position();
        assert_eq!(position.index, 0);
        assert_eq!(position.remaining, plan[0].duration);
        assert_eq!(position.state, TimerState::Idle);
        assert_ne!(engine.session(), old_session);

        // Drain whatever the old session produced, then the stream is closed
        loop {
            match old.recv().await {
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
            }
        }

        // No stale tick survives the reset
        sleep(Duration::from_secs(3)).await;
        assert_eq!(engine.position().remaining, plan[0].duration);
    }

    #[tokio::test(start_paused = true)]
    async fn inapplicable_calls_are_noops() {
        let engine = TimerEngine::with_plan(scenario_plan());
        let mut rx = engine.subscribe();
        engine.pause();
        engine.resume();
        assert_eq!(engine.state(), TimerState::Idle);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        engine.start();
        engine.start();
        assert_eq!(rx.try_recv().unwrap(), TimerEvent::PhaseChanged { phase: Phase::Prepare, index: 0 });
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_plan_never_starts() {
        let engine = TimerEngine::new();
        engine.start();
        assert_eq!(engine.state(), TimerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn degenerate_plan_completes_immediately() {
        let engine = TimerEngine::with_plan(Plan::from_intervals(vec![Interval::new(
            Phase::Finished,
            0,
            None,
            None,
            0,
        )]));
        let mut rx = engine.subscribe();
        engine.start();
        assert_eq!(rx.try_recv().unwrap(), TimerEvent::PhaseChanged { phase: Phase::Finished, index: 0 });
        assert_eq!(rx.try_recv().unwrap(), TimerEvent::Completed);
        assert_eq!(engine.state(), TimerState::Finished);
    }

    #[tokio::test(start_paused = true)]
    async fn reseed_moves_position_and_announces_phase() {
        let engine = TimerEngine::with_plan(scenario_plan());
        engine.start();
        sleep(Duration::from_millis(500)).await;

        let mut rx = engine.subscribe();
        engine.reseed(2, 1, false);
        assert_eq!(engine.state(), TimerState::Paused);
        assert_eq!(rx.try_recv().unwrap(), TimerEvent::PhaseChanged { phase: Phase::Rest, index: 2 });

        engine.resume();
        assert_eq!(rx.try_recv().unwrap(), TimerEvent::Tick { remaining_seconds: 1 });
        sleep(Duration::from_millis(1100)).await;
        assert_eq!(rx.try_recv().unwrap(), TimerEvent::Tick { remaining_seconds: 0 });
        assert_eq!(rx.try_recv().unwrap(), TimerEvent::PhaseChanged { phase: Phase::Work, index: 3 });
    }

    #[tokio::test(start_paused = true)]
    async fn reseed_to_finished_completes() {
        let engine = TimerEngine::with_plan(scenario_plan());
        engine.start();
        engine.pause();

        let mut rx = engine.subscribe();
        engine.reseed(4, 0, true);
        assert_eq!(rx.try_recv().unwrap(), TimerEvent::Completed);
        assert_eq!(engine.state(), TimerState::Finished);

        engine.reseed(4, 0, true);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn resume_on_terminal_interval_completes_without_tick() {
        let engine = TimerEngine::with_plan(scenario_plan());
        engine.start();
        engine.reseed(4, 0, false);
        assert_eq!(engine.state(), TimerState::Paused);

        let mut rx = engine.subscribe();
        engine.resume();
        assert_eq!(rx.try_recv().unwrap(), TimerEvent::Completed);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(engine.state(), TimerState::Finished);
    }

    #[tokio::test(start_paused = true)]
    async fn reseed_is_ignored_while_idle() {
        let engine = TimerEngine::with_plan(scenario_plan());
        engine.reseed(3, 2, false);
        assert_eq!(engine.position(), EnginePosition { index: 0, remaining: 3, state: TimerState::Idle });
    }
}
