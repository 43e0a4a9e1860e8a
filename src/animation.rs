//! Reel spin animation
//!
//! Each reel scrolls through several full cycles of its column before easing
//! to a stop on the drawn symbol. Later reels spin longer so they stop one
//! after another. Pure math: presentations sample [`SpinAnimation::scroll_at`]
//! once per frame.

use serde::{Deserialize, Serialize};

use crate::consts::REEL_COUNT;
use crate::symbols::Symbol;

/// Spin duration of the first reel
pub const BASE_SPIN_MS: f64 = 800.0;
/// Extra duration per reel to the right
pub const SPIN_STAGGER_MS: f64 = 300.0;
/// Full column cycles of the first reel
pub const BASE_SPIN_CYCLES: u32 = 3;

/// Ease-in-out cubic: slow start, fast middle, slow stop
#[inline]
pub fn ease_in_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Scroll plan for one reel landing on one symbol
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinAnimation {
    pub reel: usize,
    pub target: Symbol,
    pub duration_ms: f64,
    pub cycles: u32,
}

impl SpinAnimation {
    pub fn new(reel: usize, target: Symbol) -> Self {
        debug_assert!(reel < REEL_COUNT, "reel index {reel} out of range");
        Self {
            reel,
            target,
            duration_ms: BASE_SPIN_MS + SPIN_STAGGER_MS * reel as f64,
            cycles: BASE_SPIN_CYCLES + reel as u32,
        }
    }

    /// Duration of the slowest reel, i.e. when every reel has stopped
    pub fn longest_duration_ms() -> f64 {
        BASE_SPIN_MS + SPIN_STAGGER_MS * (REEL_COUNT - 1) as f64
    }

    /// Progress in [0, 1]
    pub fn progress(&self, elapsed_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        (elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, elapsed_ms: f64) -> bool {
        self.progress(elapsed_ms) >= 1.0
    }

    /// Scroll offset where the reel comes to rest
    pub fn final_scroll(&self, item_height: f64) -> f64 {
        self.target.index() as f64 * item_height
    }

    /// Scroll offset `elapsed_ms` into the spin.
    ///
    /// `max_scroll` is the scrollable range of the column (content height
    /// minus viewport height). The virtual distance wraps modulo that range
    /// so the column appears to loop.
    pub fn scroll_at(&self, elapsed_ms: f64, item_height: f64, max_scroll: f64) -> f64 {
        if self.is_finished(elapsed_ms) {
            return self.final_scroll(item_height);
        }
        if max_scroll <= 0.0 {
            return 0.0;
        }
        let total = self.cycles as f64 * max_scroll + self.final_scroll(item_height);
        let virtual_scroll = total * ease_in_out_cubic(self.progress(elapsed_ms));
        virtual_scroll % max_scroll
    }
}
