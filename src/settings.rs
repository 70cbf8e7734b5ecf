//! Engine settings
//!
//! Loaded from a JSON file; every field is optional and falls back to the
//! standard table constants.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SettingsError;
use crate::sim::PhysicsParams;

/// Two neighbours nudged toward each other must still not touch
const MAX_RACK_NUDGE: f64 = 1.4;

/// Engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Physics ===
    pub physics: PhysicsParams,

    // === Shot ===
    /// Seconds between animation frames
    pub frame_rate: f64,
    /// Physics events allowed before a shot is abandoned
    pub max_events: u32,

    // === Setup ===
    /// Largest random offset applied to each racked ball, per axis
    pub rack_nudge: f64,
    /// Fixed RNG seed for reproducible racks and opening shooters
    pub seed: Option<u64>,

    // === Storage ===
    /// Shot history file; history is kept in memory when unset
    pub history_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            physics: PhysicsParams::default(),
            frame_rate: FRAME_RATE,
            max_events: MAX_EVENTS,
            rack_nudge: 1.0,
            seed: None,
            history_path: None,
        }
    }
}

impl Settings {
    /// Load and validate settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(&fs::read_to_string(path)?)?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Settings from `path` if it exists and is valid, defaults otherwise
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::info!("Using default settings");
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring settings in {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Reject values that would stall or break a shot
    pub fn validate(&self) -> Result<(), SettingsError> {
        positive("physics.sim_rate", self.physics.sim_rate)?;
        positive("physics.max_time", self.physics.max_time)?;
        positive("physics.vel_epsilon", self.physics.vel_epsilon)?;
        positive("physics.drag", self.physics.drag)?;
        positive("frame_rate", self.frame_rate)?;
        if self.max_events == 0 {
            return Err(invalid("max_events", "must be at least 1"));
        }
        // Racked balls start 4 units apart
        if !(0.0..=MAX_RACK_NUDGE).contains(&self.rack_nudge) {
            return Err(invalid("rack_nudge", &format!("must be in [0, {MAX_RACK_NUDGE}]")));
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), SettingsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(name, &format!("must be positive and finite, got {value}")))
    }
}

fn invalid(name: &'static str, reason: &str) -> SettingsError {
    SettingsError::Invalid {
        name,
        reason: reason.to_string(),
    }
}
