//! Round engine tick
//!
//! Decides whether a round is playable, draws the reels and resolves the
//! result. Evaluation is a separate call so the controller can defer it
//! until the reels have stopped.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{Draw, RoundEvent, RoundState, is_winning_draw};
use crate::animation::SpinAnimation;
use crate::consts::*;
use crate::symbols::Symbol;
use crate::view::Presentation;

/// Owns the round state, the RNG and the animation guard
#[derive(Debug, Clone)]
pub struct RoundEngine<R = Pcg32> {
    state: RoundState,
    rng: R,
    /// Set when reels start spinning, cleared by the presentation ack
    animating: bool,
    /// Round number and draw awaiting evaluation
    in_flight: Option<(u64, Draw)>,
}

impl RoundEngine<Pcg32> {
    /// Engine with a seeded PCG stream
    pub fn seeded(seed: u64, starting_balance_cents: u32) -> Self {
        Self::new(Pcg32::seed_from_u64(seed), starting_balance_cents)
    }
}

impl<R: Rng> RoundEngine<R> {
    pub fn new(rng: R, starting_balance_cents: u32) -> Self {
        Self {
            state: RoundState::new(starting_balance_cents),
            rng,
            animating: false,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn into_state(self) -> RoundState {
        self.state
    }

    /// Is a spin animation still running?
    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Round and draw started but not yet evaluated
    pub fn in_flight(&self) -> Option<(u64, Draw)> {
        self.in_flight
    }

    /// Presentation acknowledgement: reels have stopped
    pub fn on_animation_complete(&mut self) {
        self.animating = false;
    }

    /// Advance one tick, drawing from the engine's RNG if a round starts
    pub fn tick<P: Presentation + ?Sized>(&mut self, view: &mut P) -> RoundEvent {
        if let Some(event) = self.gate(view) {
            return event;
        }
        let draw: Draw = std::array::from_fn(|_| Symbol::random(&mut self.rng));
        self.start_round(draw, view)
    }

    /// Advance one tick with a predetermined draw (replays, tests).
    ///
    /// The draw is ignored when the tick does not start a round.
    pub fn tick_with_draw<P: Presentation + ?Sized>(
        &mut self,
        draw: Draw,
        view: &mut P,
    ) -> RoundEvent {
        if let Some(event) = self.gate(view) {
            return event;
        }
        self.start_round(draw, view)
    }

    /// Resolve the round started by a previous tick, judging the draw that
    /// tick displayed
    ///
    /// # Panics
    ///
    /// If no round is in flight, `round` is not the one in flight, or the
    /// payout would overflow the balance.
    pub fn evaluate<P: Presentation + ?Sized>(&mut self, round: u64, view: &mut P) -> RoundEvent {
        let (in_flight, draw) = self
            .in_flight
            .take()
            .unwrap_or_else(|| panic!("evaluate called for round {round} with no round in flight"));
        assert_eq!(
            in_flight, round,
            "evaluate called for round {round} while round {in_flight} is in flight"
        );
        self.state.round_in_progress = false;

        let event = if is_winning_draw(&draw) {
            self.state.balance_cents = self
                .state
                .balance_cents
                .checked_add(PAYOUT_CENTS)
                .unwrap_or_else(|| {
                    panic!("balance overflow paying out round {round}")
                });
            self.state.cooldown_rounds_remaining = WIN_COOLDOWN_ROUNDS;
            self.state.winner_visual = true;
            view.set_winner_visual(true);
            log::info!(
                "We have a WINNER! {} {} {} - balance {}",
                draw[0],
                draw[1],
                draw[2],
                self.state.balance_display()
            );
            RoundEvent::Won {
                round,
                symbol: draw[0],
                balance_cents: self.state.balance_cents,
            }
        } else {
            log::debug!(
                "No winner in round {}: {} {} {} - balance {}",
                round,
                draw[0],
                draw[1],
                draw[2],
                self.state.balance_display()
            );
            RoundEvent::Lost {
                round,
                balance_cents: self.state.balance_cents,
            }
        };

        view.render_balance(&self.state.balance_display());
        event
    }

    /// Cooldown, funds and in-flight checks. `None` means play a round.
    fn gate<P: Presentation + ?Sized>(&mut self, view: &mut P) -> Option<RoundEvent> {
        if self.state.cooldown_rounds_remaining > 0 {
            self.state.cooldown_rounds_remaining -= 1;
            if self.state.cooldown_rounds_remaining == 0 {
                self.state.winner_visual = false;
                view.set_winner_visual(false);
                log::debug!("Cooldown ended");
                return Some(RoundEvent::CooldownEnded);
            }
            return Some(RoundEvent::CooldownTick {
                remaining: self.state.cooldown_rounds_remaining,
            });
        }

        if !self.state.can_afford_round() {
            return Some(RoundEvent::OutOfFunds {
                balance_cents: self.state.balance_cents,
            });
        }

        if self.state.round_in_progress || self.animating {
            log::debug!("Previous round still spinning, skipping tick");
            return Some(RoundEvent::Busy);
        }

        None
    }

    fn start_round<P: Presentation + ?Sized>(&mut self, draw: Draw, view: &mut P) -> RoundEvent {
        assert!(
            self.state.balance_cents >= STAKE_CENTS,
            "stake of {STAKE_CENTS} would drive balance {} negative",
            self.state.balance_cents
        );
        self.state.balance_cents -= STAKE_CENTS;
        self.state.round_in_progress = true;
        self.state.rounds_played += 1;
        self.animating = true;
        self.in_flight = Some((self.state.rounds_played, draw));

        for (reel, symbol) in draw.iter().enumerate() {
            view.display(reel, *symbol, &SpinAnimation::new(reel, *symbol));
        }

        RoundEvent::RoundStarted {
            round: self.state.rounds_played,
            draw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{Transcript, ViewCall};
    use proptest::prelude::*;
    use crate::symbols::Symbol::*;

    fn started(event: &RoundEvent) -> (u64, Draw) {
        match event {
            RoundEvent::RoundStarted { round, draw } => (*round, *draw),
            other => panic!("expected RoundStarted, got {:?}", other),
        }
    }

    #[test]
    fn test_winning_round() {
        let mut engine = RoundEngine::seeded(1, 10_000);
        let mut view = Transcript::new();

        let ev = engine.tick_with_draw([Grinning, Grinning, Grinning], &mut view);
        let (round, draw) = started(&ev);
        assert_eq!(round, 1);
        assert_eq!(engine.state().balance_cents, 9_980);
        assert!(engine.state().round_in_progress);
        assert!(engine.is_animating());
        assert_eq!(view.faces(), "😀 😀 😀");
        assert_eq!(engine.in_flight(), Some((1, draw)));

        let ev = engine.evaluate(round, &mut view);
        assert_eq!(
            ev,
            RoundEvent::Won {
                round: 1,
                symbol: Grinning,
                balance_cents: 12_480
            }
        );
        assert_eq!(engine.state().balance_cents, 12_480);
        assert_eq!(engine.in_flight(), None);
        assert_eq!(engine.state().cooldown_rounds_remaining, WIN_COOLDOWN_ROUNDS);
        assert!(view.winner_visual);
        assert_eq!(view.balance, "$124.80");
    }

    #[test]
    fn test_losing_round() {
        let mut engine = RoundEngine::seeded(1, 10_000);
        let mut view = Transcript::new();

        let ev = engine.tick_with_draw([Grinning, Beaming, Grinning], &mut view);
        let (round, _) = started(&ev);
        let ev = engine.evaluate(round, &mut view);

        assert_eq!(
            ev,
            RoundEvent::Lost {
                round: 1,
                balance_cents: 9_980
            }
        );
        assert_eq!(engine.state().cooldown_rounds_remaining, 0);
        assert!(!view.winner_visual);
        assert_eq!(view.balance, "$99.80");
    }

    #[test]
    fn test_out_of_funds_is_absorbing() {
        let mut engine = RoundEngine::seeded(1, 10);
        let mut view = Transcript::new();

        for _ in 0..50 {
            let ev = engine.tick(&mut view);
            assert_eq!(ev, RoundEvent::OutOfFunds { balance_cents: 10 });
        }
        assert_eq!(engine.state().balance_cents, 10);
        assert_eq!(engine.state().rounds_played, 0);
        assert!(view.calls.is_empty());
    }

    #[test]
    fn test_exact_stake_plays_then_stops() {
        let mut engine = RoundEngine::seeded(3, STAKE_CENTS);
        let mut view = Transcript::new();

        let (round, _) = started(&engine.tick_with_draw([Joy, Sweat, Blush], &mut view));
        engine.evaluate(round, &mut view);
        engine.on_animation_complete();
        assert_eq!(engine.state().balance_cents, 0);
        assert_eq!(
            engine.tick(&mut view),
            RoundEvent::OutOfFunds { balance_cents: 0 }
        );
    }

    #[test]
    fn test_cooldown_counts_down_then_plays() {
        let mut engine = RoundEngine::seeded(9, 10_000);
        let mut view = Transcript::new();

        let (round, _) = started(&engine.tick_with_draw([Joy, Joy, Joy], &mut view));
        engine.evaluate(round, &mut view);
        engine.on_animation_complete();
        view.clear_calls();

        assert_eq!(
            engine.tick(&mut view),
            RoundEvent::CooldownTick { remaining: 2 }
        );
        assert_eq!(
            engine.tick(&mut view),
            RoundEvent::CooldownTick { remaining: 1 }
        );
        assert!(view.winner_visual);
        assert_eq!(engine.tick(&mut view), RoundEvent::CooldownEnded);
        assert!(!view.winner_visual);
        assert!(!engine.state().winner_visual);
        assert_eq!(view.calls, vec![ViewCall::WinnerVisual(false)]);

        let balance = engine.state().balance_cents;
        started(&engine.tick(&mut view));
        assert_eq!(engine.state().balance_cents, balance - STAKE_CENTS);
    }

    #[test]
    fn test_busy_while_in_flight() {
        let mut engine = RoundEngine::seeded(5, 10_000);
        let mut view = Transcript::new();

        let (round, _) = started(&engine.tick_with_draw([Joy, Sweat, Joy], &mut view));
        // Evaluation pending: refuse
        assert_eq!(engine.tick(&mut view), RoundEvent::Busy);
        assert_eq!(engine.state().balance_cents, 9_980);

        engine.evaluate(round, &mut view);
        // Evaluated but reels still animating: refuse
        assert_eq!(engine.tick(&mut view), RoundEvent::Busy);

        engine.on_animation_complete();
        started(&engine.tick(&mut view));
        assert_eq!(engine.state().balance_cents, 9_960);
    }

    #[test]
    fn test_animation_ack_alone_does_not_release_round() {
        let mut engine = RoundEngine::seeded(5, 10_000);
        let mut view = Transcript::new();

        started(&engine.tick(&mut view));
        engine.on_animation_complete();
        engine.on_animation_complete();
        assert_eq!(engine.tick(&mut view), RoundEvent::Busy);
    }

    #[test]
    #[should_panic(expected = "no round in flight")]
    fn test_evaluate_without_round_panics() {
        let mut engine = RoundEngine::seeded(1, 10_000);
        let mut view = Transcript::new();
        engine.evaluate(1, &mut view);
    }

    #[test]
    #[should_panic(expected = "while round 1 is in flight")]
    fn test_evaluate_wrong_round_panics() {
        let mut engine = RoundEngine::seeded(1, 10_000);
        let mut view = Transcript::new();
        started(&engine.tick_with_draw([Grinning, Beaming, Joy], &mut view));
        engine.evaluate(42, &mut view);
    }

    #[test]
    fn test_evaluate_judges_the_displayed_draw() {
        let mut engine = RoundEngine::seeded(1, 10_000);
        let mut view = Transcript::new();

        let (round, _) = started(&engine.tick_with_draw([Grinning, Beaming, Joy], &mut view));
        assert_eq!(view.faces(), "😀 😁 😂");
        assert_eq!(
            engine.evaluate(round, &mut view),
            RoundEvent::Lost {
                round: 1,
                balance_cents: 9_980
            }
        );
        assert_eq!(engine.state().balance_cents, 9_980);
        assert!(!view.winner_visual);
    }

    #[test]
    fn test_win_rate_near_one_in_49() {
        let mut engine = RoundEngine::seeded(2024, u32::MAX / 2);
        let mut view = Transcript::new();
        let rounds = 49_000;
        let mut wins = 0;

        for _ in 0..rounds {
            // Skip straight past cooldown and the guard
            engine.state.cooldown_rounds_remaining = 0;
            let (round, _) = started(&engine.tick(&mut view));
            if let RoundEvent::Won { .. } = engine.evaluate(round, &mut view) {
                wins += 1;
            }
            engine.on_animation_complete();
        }

        // Expected 1000, sd ~31
        assert!((850..1150).contains(&wins), "wins = {wins}");
    }

    #[test]
    fn test_determinism() {
        let mut a = RoundEngine::seeded(777, 10_000);
        let mut b = RoundEngine::seeded(777, 10_000);
        let mut va = Transcript::new();
        let mut vb = Transcript::new();

        for _ in 0..20 {
            let ea = a.tick(&mut va);
            let eb = b.tick(&mut vb);
            assert_eq!(ea, eb);
            if let RoundEvent::RoundStarted { round, .. } = ea {
                assert_eq!(a.evaluate(round, &mut va), b.evaluate(round, &mut vb));
                a.on_animation_complete();
                b.on_animation_complete();
            }
        }
        assert_eq!(a.state(), b.state());
        assert_eq!(va.calls, vb.calls);
    }

    /// One step of a random driver
    #[derive(Debug, Clone, Copy)]
    enum Step {
        Tick,
        Evaluate,
        Ack,
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![Just(Step::Tick), Just(Step::Evaluate), Just(Step::Ack)]
    }

    proptest! {
        #[test]
        fn prop_balance_accounting(
            seed in any::<u64>(),
            start in 0u32..2_000,
            steps in prop::collection::vec(step(), 1..200),
        ) {
            let mut engine = RoundEngine::seeded(seed, start);
            let mut view = Transcript::new();
            let mut pending: Option<(u64, Draw)> = None;

            for s in steps {
                let before = engine.state().clone();
                match s {
                    Step::Tick => {
                        let ev = engine.tick(&mut view);
                        let after = engine.state();
                        match ev {
                            RoundEvent::RoundStarted { round, draw } => {
                                prop_assert_eq!(before.cooldown_rounds_remaining, 0);
                                prop_assert!(before.balance_cents >= STAKE_CENTS);
                                prop_assert!(!before.round_in_progress);
                                prop_assert_eq!(after.balance_cents, before.balance_cents - STAKE_CENTS);
                                pending = Some((round, draw));
                            }
                            RoundEvent::CooldownTick { remaining } => {
                                prop_assert_eq!(remaining, before.cooldown_rounds_remaining - 1);
                                prop_assert!(remaining > 0);
                                prop_assert_eq!(after.balance_cents, before.balance_cents);
                            }
                            RoundEvent::CooldownEnded => {
                                prop_assert_eq!(before.cooldown_rounds_remaining, 1);
                                prop_assert_eq!(after.cooldown_rounds_remaining, 0);
                            }
                            _ => prop_assert_eq!(after.balance_cents, before.balance_cents),
                        }
                    }
                    Step::Evaluate => {
                        if let Some((round, draw)) = pending.take() {
                            let ev = engine.evaluate(round, &mut view);
                            let after = engine.state();
                            if is_winning_draw(&draw) {
                                prop_assert!(matches!(ev, RoundEvent::Won { .. }), "unexpected {:?}", ev);
                                prop_assert_eq!(after.balance_cents, before.balance_cents + PAYOUT_CENTS);
                                prop_assert_eq!(after.cooldown_rounds_remaining, WIN_COOLDOWN_ROUNDS);
                            } else {
                                prop_assert!(matches!(ev, RoundEvent::Lost { .. }), "unexpected {:?}", ev);
                                prop_assert_eq!(after.balance_cents, before.balance_cents);
                            }
                        }
                    }
                    Step::Ack => engine.on_animation_complete(),
                }
                prop_assert!(engine.state().cooldown_rounds_remaining <= WIN_COOLDOWN_ROUNDS);
                prop_assert_eq!(engine.state().round_in_progress, pending.is_some());
                prop_assert_eq!(engine.in_flight(), pending);
            }
        }
    }
}
