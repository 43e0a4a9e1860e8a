//! Reel symbols
//!
//! Seven smileys. Order only matters for where a symbol sits in a reel
//! column (and therefore how far the spin animation scrolls).

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    Grinning,
    Beaming,
    Joy,
    Sweat,
    Squinting,
    Winking,
    Blush,
}

impl Symbol {
    /// Every symbol in reel order
    pub const ALL: [Symbol; 7] = [
        Symbol::Grinning,
        Symbol::Beaming,
        Symbol::Joy,
        Symbol::Sweat,
        Symbol::Squinting,
        Symbol::Winking,
        Symbol::Blush,
    ];

    /// Number of distinct symbols on a reel
    pub const COUNT: usize = Self::ALL.len();

    pub fn glyph(self) -> &'static str {
        match self {
            Symbol::Grinning => "😀",
            Symbol::Beaming => "😁",
            Symbol::Joy => "😂",
            Symbol::Sweat => "😅",
            Symbol::Squinting => "😆",
            Symbol::Winking => "😉",
            Symbol::Blush => "😊",
        }
    }

    /// Row of this symbol within a reel column
    pub fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`Symbol::index`]; `None` outside the alphabet.
    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    /// Draw one symbol uniformly at random
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::COUNT)]
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.glyph())
    }
}
