//! Persisted game record

use serde::{Deserialize, Serialize};

use super::{KeyValueStore, PersistenceError, STATE_KEY, load_or_default, save_json};
use crate::cosmetics::ActiveCosmetics;

/// Everything that survives a restart except inventory and settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveData {
    pub score: u64,
    pub high_score: u64,
    pub coins: u64,
    /// Raw tier index; out-of-range values are clamped on load
    pub highest_tier: u8,
    pub active_skin: String,
    pub active_theme: String,
    pub active_border: String,
    pub active_hitbox: String,
    pub active_outline: String,
}

impl Default for SaveData {
    fn default() -> Self {
        let cosmetics = ActiveCosmetics::default();
        Self {
            score: 0,
            high_score: 0,
            coins: crate::consts::STARTING_COINS,
            highest_tier: 0,
            active_skin: cosmetics.skin,
            active_theme: cosmetics.theme,
            active_border: cosmetics.border,
            active_hitbox: cosmetics.hitbox,
            active_outline: cosmetics.outline,
        }
    }
}

impl SaveData {
    /// Active selections as stored (not yet validated)
    pub fn cosmetics(&self) -> ActiveCosmetics {
        ActiveCosmetics {
            skin: self.active_skin.clone(),
            theme: self.active_theme.clone(),
            border: self.active_border.clone(),
            hitbox: self.active_hitbox.clone(),
            outline: self.active_outline.clone(),
        }
    }
}

/// Load the game record, or a fresh one if missing or corrupt
pub fn load_save<S: KeyValueStore + ?Sized>(store: &S) -> SaveData {
    load_or_default(store, STATE_KEY)
}

pub fn store_save<S: KeyValueStore + ?Sized>(
    store: &mut S,
    save: &SaveData,
) -> Result<(), PersistenceError> {
    save_json(store, STATE_KEY, save)?;
    log::debug!("Saved game: score {}, {} coins", save.score, save.coins);
    Ok(())
}
