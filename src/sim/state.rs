//! Round state and core simulation types
//!
//! Everything the engine mutates lives in [`RoundState`].

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::symbols::Symbol;

/// One symbol per reel, left to right
pub type Draw = [Symbol; REEL_COUNT];

/// True when every reel shows the same symbol
pub fn is_winning_draw(draw: &Draw) -> bool {
    draw.windows(2).all(|pair| pair[0] == pair[1])
}

/// Glyphs of a draw, space separated
pub fn draw_faces(draw: &Draw) -> String {
    draw.iter()
        .map(|symbol| symbol.glyph())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Where the machine is in its round cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Waiting for the next tick to start a round
    Idle,
    /// Reels spinning, evaluation pending
    InFlight,
    /// Ticks being skipped after a win
    Cooldown,
    /// Balance below the stake; absorbing
    OutOfFunds,
}

/// What a single tick or evaluation did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundEvent {
    /// Cooldown decremented, still positive
    CooldownTick { remaining: u32 },
    /// Cooldown reached zero; winner flash cleared
    CooldownEnded,
    /// Not enough balance to play
    OutOfFunds { balance_cents: u32 },
    /// Previous round still animating or awaiting evaluation
    Busy,
    /// Stake deducted and reels drawn
    RoundStarted { round: u64, draw: Draw },
    /// Three of a kind
    Won {
        round: u64,
        symbol: Symbol,
        balance_cents: u32,
    },
    /// No match
    Lost { round: u64, balance_cents: u32 },
}

/// Mutable widget state, created at mount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    /// Balance in cents
    pub balance_cents: u32,
    /// Ticks left to skip after a win
    pub cooldown_rounds_remaining: u32,
    /// A draw is waiting for evaluation
    pub round_in_progress: bool,
    /// Winner flash currently raised
    pub winner_visual: bool,
    /// Rounds started so far
    pub rounds_played: u64,
}

impl Default for RoundState {
    fn default() -> Self {
        Self::new(STARTING_BALANCE_CENTS)
    }
}

impl RoundState {
    pub fn new(balance_cents: u32) -> Self {
        Self {
            balance_cents,
            cooldown_rounds_remaining: 0,
            round_in_progress: false,
            winner_visual: false,
            rounds_played: 0,
        }
    }

    pub fn can_afford_round(&self) -> bool {
        self.balance_cents >= STAKE_CENTS
    }

    pub fn phase(&self) -> RoundPhase {
        if self.round_in_progress {
            RoundPhase::InFlight
        } else if self.cooldown_rounds_remaining > 0 {
            RoundPhase::Cooldown
        } else if !self.can_afford_round() {
            RoundPhase::OutOfFunds
        } else {
            RoundPhase::Idle
        }
    }

    /// Formatted balance for display
    pub fn balance_display(&self) -> String {
        crate::format_cents(self.balance_cents)
    }
}
