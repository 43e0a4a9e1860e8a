//! Deterministic simulation module
//!
//! All round logic lives here. This module must be pure and deterministic:
//! - Virtual clock only (the scheduler)
//! - Seeded RNG only
//! - State mutated only from scheduler dispatch
//! - No DOM or platform dependencies

pub mod machine;
pub mod scheduler;
pub mod state;
pub mod tick;

pub use machine::{Job, Machine};
pub use scheduler::{Scheduler, TimerHandle};
pub use state::{Draw, RoundEvent, RoundPhase, RoundState, draw_faces, is_winning_draw};
pub use tick::RoundEngine;
