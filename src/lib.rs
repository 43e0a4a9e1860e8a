//! Monarch Reels - A three-reel emoji slot machine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (round engine, scheduler, controller)
//! - `animation`: Reel spin scroll tween
//! - `view`: Presentation seam and a headless transcript
//! - `settings`: Timer cadence and seed configuration
//! - `stats`: Per-session round statistics

pub mod animation;
pub mod settings;
pub mod sim;
pub mod stats;
pub mod symbols;
pub mod view;

pub use settings::{Settings, SettingsError};
pub use stats::SessionStats;
pub use symbols::Symbol;

/// Game configuration constants
pub mod consts {
    /// Cents deducted to play one round
    pub const STAKE_CENTS: u32 = 20;
    /// Cents credited when all three reels match
    pub const PAYOUT_CENTS: u32 = 2500;
    /// Balance at mount ($100.00)
    pub const STARTING_BALANCE_CENTS: u32 = 10_000;
    /// Ticks skipped after a win while the winner flash is shown
    pub const WIN_COOLDOWN_ROUNDS: u32 = 3;
    /// Number of reels
    pub const REEL_COUNT: usize = 3;

    /// Spin timer period
    pub const TICK_PERIOD_MS: u64 = 4000;
    /// Delay between the draw and its evaluation (longest reel 1400ms + buffer)
    pub const EVALUATION_DELAY_MS: u64 = 1600;
}

/// Format a cent amount as dollars, e.g. `12480` -> `"$124.80"`.
///
/// Integer arithmetic only, so the output never depends on the host locale.
pub fn format_cents(cents: u32) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(10_000), "$100.00");
        assert_eq!(format_cents(12_480), "$124.80");
        assert_eq!(format_cents(9_980), "$99.80");
        assert_eq!(format_cents(10), "$0.10");
        assert_eq!(format_cents(5), "$0.05");
        assert_eq!(format_cents(0), "$0.00");
        assert_eq!(format_cents(123_456_789), "$1234567.89");
    }
}
