//! Machine controller
//!
//! The one owner of the round engine. Every mutation goes through
//! [`Machine::advance_to`], which dispatches scheduler jobs in time order:
//! the recurring spin tick, and per round a deferred evaluation plus an
//! animation-settled acknowledgement.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::scheduler::{Scheduler, TimerHandle};
use super::state::{RoundEvent, RoundPhase, RoundState};
use super::tick::RoundEngine;
use crate::settings::{Settings, SettingsError};
use crate::stats::SessionStats;
use crate::view::Presentation;

/// Work the scheduler hands back to the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    /// Recurring round tick
    Spin,
    /// Resolve a started round once its reels have stopped
    Evaluate { round: u64 },
    /// Reels for `round` have finished their spin
    AnimationSettled { round: u64 },
}

pub struct Machine<P, R = Pcg32> {
    engine: RoundEngine<R>,
    scheduler: Scheduler<Job>,
    view: P,
    settings: Settings,
    stats: SessionStats,
    spin_timer: Option<TimerHandle>,
}

impl<P: Presentation> Machine<P, Pcg32> {
    /// Mount a machine at `now_ms`, seeding from settings or the clock.
    ///
    /// Settings are validated first; nothing is rendered on error.
    pub fn new(settings: Settings, view: P, now_ms: u64) -> Result<Self, SettingsError> {
        settings.validate()?;
        let seed = settings.seed.unwrap_or(now_ms);
        log::info!("Machine seeded with {}", seed);
        Ok(Self::with_rng(settings, view, Pcg32::seed_from_u64(seed), now_ms))
    }
}

impl<P: Presentation, R: Rng> Machine<P, R> {
    /// Mount with an injected random source.
    ///
    /// Settings are used as given. Callers that did not build them through
    /// [`Settings::from_json`] should run [`Settings::validate`] first: with
    /// an evaluation delay at or past the tick period, the ticks in between
    /// report [`RoundEvent::Busy`].
    pub fn with_rng(settings: Settings, mut view: P, rng: R, now_ms: u64) -> Self {
        let engine = RoundEngine::new(rng, settings.starting_balance_cents);
        view.render_balance(&engine.state().balance_display());

        let mut scheduler = Scheduler::new(now_ms);
        let spin_timer = scheduler.schedule_at_fixed_rate(
            settings.first_tick_delay_ms,
            settings.tick_period_ms,
            Job::Spin,
        );

        log::info!(
            "Machine mounted: balance {}, spin every {}ms",
            engine.state().balance_display(),
            settings.tick_period_ms
        );

        Self {
            engine,
            scheduler,
            view,
            stats: SessionStats::new(settings.starting_balance_cents),
            settings,
            spin_timer,
        }
    }

    /// Run every job due at or before `now_ms`, in time order
    pub fn advance_to(&mut self, now_ms: u64) -> Vec<RoundEvent> {
        let mut events = Vec::new();
        while let Some(job) = self.scheduler.pop_due(now_ms) {
            if let Some(event) = self.dispatch(job) {
                self.stats.record(&event);
                events.push(event);
            }
        }
        events
    }

    /// Presentation acknowledgement that the reels have stopped.
    ///
    /// Views that track their own animation call this; the scheduled
    /// settle job makes the same call for views that don't.
    pub fn animation_complete(&mut self) {
        self.engine.on_animation_complete();
    }

    pub fn is_animating(&self) -> bool {
        self.engine.is_animating()
    }

    pub fn state(&self) -> &RoundState {
        self.engine.state()
    }

    pub fn phase(&self) -> RoundPhase {
        self.engine.state().phase()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn view(&self) -> &P {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut P {
        &mut self.view
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    /// Out of funds with nothing left to count down or resolve
    pub fn is_finished(&self) -> bool {
        self.phase() == RoundPhase::OutOfFunds
    }

    /// Tear down: cancel the spin timer and any pending evaluation.
    ///
    /// Consumes the machine, so nothing can tick it afterwards. A round
    /// whose evaluation was still pending keeps its stake deducted.
    pub fn unmount(mut self) -> (RoundState, SessionStats) {
        if let Some(handle) = self.spin_timer.take() {
            self.scheduler.cancel(handle);
        }
        let dropped = self.scheduler.shutdown();
        let state = self.engine.into_state();
        log::info!(
            "Machine unmounted: balance {}, {} rounds, {} wins, {} pending jobs dropped",
            state.balance_display(),
            self.stats.rounds,
            self.stats.wins,
            dropped
        );
        (state, self.stats)
    }

    fn dispatch(&mut self, job: Job) -> Option<RoundEvent> {
        match job {
            Job::Spin => {
                let event = self.engine.tick(&mut self.view);
                if let RoundEvent::RoundStarted { round, .. } = event {
                    self.schedule_round_followups(round);
                }
                Some(event)
            }
            Job::Evaluate { round } => Some(self.engine.evaluate(round, &mut self.view)),
            Job::AnimationSettled { round } => {
                log::trace!("Reels settled for round {}", round);
                self.engine.on_animation_complete();
                None
            }
        }
    }

    fn schedule_round_followups(&mut self, round: u64) {
        let settle = self
            .scheduler
            .schedule_once(self.settings.spin_settle_ms(), Job::AnimationSettled { round });
        let evaluate = self
            .scheduler
            .schedule_once(self.settings.evaluation_delay_ms, Job::Evaluate { round });
        debug_assert!(
            settle.is_some() && evaluate.is_some(),
            "scheduler shut down while the machine is mounted"
        );
    }
}
