//! Presentation seam
//!
//! The engine never touches the DOM. It talks to a [`Presentation`], which
//! in the browser drives the reel columns and natively is a [`Transcript`].

use crate::animation::SpinAnimation;
use crate::consts::REEL_COUNT;
use crate::symbols::Symbol;

/// Calls from the engine to whatever is drawing the machine
pub trait Presentation {
    /// Spin `reel` so it comes to rest on `symbol`
    fn display(&mut self, reel: usize, symbol: Symbol, spin: &SpinAnimation);
    /// Toggle the winner flash
    fn set_winner_visual(&mut self, on: bool);
    /// Show the formatted balance, e.g. `"$99.80"`
    fn render_balance(&mut self, formatted: &str);
}

/// Recorded presentation call
#[derive(Debug, Clone, PartialEq)]
pub enum ViewCall {
    Display { reel: usize, symbol: Symbol },
    WinnerVisual(bool),
    Balance(String),
}

/// Headless presentation: keeps the latest visible state plus a log of calls
#[derive(Debug, Clone)]
pub struct Transcript {
    pub reels: [Option<Symbol>; REEL_COUNT],
    pub winner_visual: bool,
    pub balance: String,
    pub calls: Vec<ViewCall>,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            reels: [None; REEL_COUNT],
            winner_visual: false,
            balance: String::new(),
            calls: Vec::new(),
        }
    }

    /// Reel faces as a string, `?` for reels that never spun
    pub fn faces(&self) -> String {
        self.reels
            .iter()
            .map(|r| r.map_or("?", Symbol::glyph))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl Presentation for Transcript {
    fn display(&mut self, reel: usize, symbol: Symbol, spin: &SpinAnimation) {
        log::trace!("reel {} -> {} over {}ms", reel, symbol, spin.duration_ms);
        self.reels[reel] = Some(symbol);
        self.calls.push(ViewCall::Display { reel, symbol });
    }

    fn set_winner_visual(&mut self, on: bool) {
        self.winner_visual = on;
        self.calls.push(ViewCall::WinnerVisual(on));
    }

    fn render_balance(&mut self, formatted: &str) {
        self.balance = formatted.to_string();
        self.calls.push(ViewCall::Balance(formatted.to_string()));
    }
}
