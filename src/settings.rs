//! Player settings and preferences
//!
//! Persisted separately from the game record.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, KeyValueStore, PersistenceError, SETTINGS_KEY};

/// Largest screen offset a merge shake may request (pixels)
const MAX_SHAKE: f32 = 24.0;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,

    // === Display ===
    pub fullscreen: bool,
    /// Screen shake on merges
    pub screen_shake: bool,

    // === Accessibility ===
    /// Reduced motion (no shake, shorter squash)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.5,
            fullscreen: false,
            screen_shake: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Shake offset for a merge impact, 0 when shake is off
    pub fn shake_for(&self, impact: f32) -> f32 {
        if self.effective_screen_shake() {
            impact.clamp(0.0, MAX_SHAKE)
        } else {
            0.0
        }
    }

    /// Volume after clamping to the valid range
    pub fn volume(&self) -> f32 {
        self.master_volume.clamp(0.0, 1.0)
    }

    /// Load settings from the store, defaults when missing or corrupt
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let mut settings: Settings = persistence::load_or_default(store, SETTINGS_KEY);
        settings.master_volume = settings.volume();
        settings
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), PersistenceError> {
        persistence::save_json(store, SETTINGS_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}
