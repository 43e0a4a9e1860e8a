//! Session statistics
//!
//! Tallied from round events while the machine is mounted and logged at
//! unmount. Never persisted.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::RoundEvent;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub rounds: u64,
    pub wins: u64,
    /// Total cents staked
    pub staked_cents: u64,
    /// Total cents paid out
    pub paid_cents: u64,
    /// Highest balance seen after an evaluation
    pub peak_balance_cents: u32,
    /// Losses since the last win
    pub losing_streak: u64,
    pub longest_losing_streak: u64,
}

impl SessionStats {
    pub fn new(starting_balance_cents: u32) -> Self {
        Self {
            peak_balance_cents: starting_balance_cents,
            ..Self::default()
        }
    }

    /// Fold one event into the tally
    pub fn record(&mut self, event: &RoundEvent) {
        match *event {
            RoundEvent::RoundStarted { .. } => {
                self.rounds += 1;
                self.staked_cents += u64::from(STAKE_CENTS);
            }
            RoundEvent::Won { balance_cents, .. } => {
                self.wins += 1;
                self.paid_cents += u64::from(PAYOUT_CENTS);
                self.losing_streak = 0;
                self.peak_balance_cents = self.peak_balance_cents.max(balance_cents);
            }
            RoundEvent::Lost { .. } => {
                self.losing_streak += 1;
                self.longest_losing_streak = self.longest_losing_streak.max(self.losing_streak);
            }
            _ => {}
        }
    }

    /// Paid out per cent staked (None before the first round)
    pub fn return_ratio(&self) -> Option<f64> {
        if self.staked_cents == 0 {
            return None;
        }
        Some(self.paid_cents as f64 / self.staked_cents as f64)
    }

    /// Fraction of rounds won
    pub fn win_rate(&self) -> Option<f64> {
        if self.rounds == 0 {
            return None;
        }
        Some(self.wins as f64 / self.rounds as f64)
    }
}
