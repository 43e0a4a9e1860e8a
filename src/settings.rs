//! Machine settings
//!
//! Timer cadence, starting balance and RNG seed. Read from LocalStorage on
//! the web, from a JSON file natively. Stake, payout and the symbol
//! set are not configurable.

use serde::{Deserialize, Serialize};

use crate::animation::SpinAnimation;
use crate::consts::*;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("settings file unreadable: {0}")]
    Io(#[from] std::io::Error),

    #[error("tick period must be positive")]
    ZeroTickPeriod,

    #[error("starting balance must be positive")]
    ZeroStartingBalance,

    #[error("evaluation delay {delay_ms}ms is shorter than the longest reel spin ({spin_ms}ms)")]
    EvaluationBeforeReelsStop { delay_ms: u64, spin_ms: u64 },

    #[error("evaluation delay {delay_ms}ms must be shorter than the tick period {period_ms}ms")]
    EvaluationOutlastsTick { delay_ms: u64, period_ms: u64 },
}

/// Machine settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Time between spin ticks
    pub tick_period_ms: u64,
    /// Time from mount to the first tick
    pub first_tick_delay_ms: u64,
    /// Time from the draw to its evaluation
    pub evaluation_delay_ms: u64,
    /// Balance at mount, in cents
    pub starting_balance_cents: u32,
    /// Fixed RNG seed; `None` seeds from the clock
    pub seed: Option<u64>,
    /// Skip the reel animation and evaluate on the spin tick
    pub instant_spins: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_period_ms: TICK_PERIOD_MS,
            first_tick_delay_ms: TICK_PERIOD_MS,
            evaluation_delay_ms: EVALUATION_DELAY_MS,
            starting_balance_cents: STARTING_BALANCE_CENTS,
            seed: None,
            instant_spins: false,
        }
    }
}

impl Settings {
    /// Settings for headless runs: no animation, immediate evaluation
    pub fn instant() -> Self {
        Self {
            evaluation_delay_ms: 0,
            instant_spins: true,
            ..Self::default()
        }
    }

    /// Parse and validate
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.tick_period_ms == 0 {
            return Err(SettingsError::ZeroTickPeriod);
        }
        if self.starting_balance_cents == 0 {
            return Err(SettingsError::ZeroStartingBalance);
        }
        let spin_ms = self.spin_settle_ms();
        if self.evaluation_delay_ms < spin_ms {
            return Err(SettingsError::EvaluationBeforeReelsStop {
                delay_ms: self.evaluation_delay_ms,
                spin_ms,
            });
        }
        if self.evaluation_delay_ms >= self.tick_period_ms {
            return Err(SettingsError::EvaluationOutlastsTick {
                delay_ms: self.evaluation_delay_ms,
                period_ms: self.tick_period_ms,
            });
        }
        Ok(())
    }

    /// How long after a draw every reel has stopped
    pub fn spin_settle_ms(&self) -> u64 {
        if self.instant_spins {
            0
        } else {
            SpinAnimation::longest_duration_ms().ceil() as u64
        }
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "monarch_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Load settings from a JSON file (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_file(path: &std::path::Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
