//! Data-driven game balance
//!
//! Defaults come from [`crate::consts`]. A tuning document only needs the
//! fields it wants to override.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::persistence::PersistenceError;

/// Balance knobs carried by the game state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub well_width: f32,
    pub well_height: f32,
    pub breach_line_y: f32,
    /// Seconds of continuous breach tolerated (exclusive)
    pub breach_limit: f32,
    pub spawn_y: f32,

    pub max_multiplier: u8,
    pub combo_decay_secs: f32,

    pub power_up_cost: u64,
    pub area_clear_small_radius: f32,
    pub area_clear_large_radius: f32,
    pub tier_up_reach: f32,

    pub spawn_squash: f32,
    pub tier_up_squash: f32,
    pub squash_decay_per_sec: f32,

    /// Number of lowest tiers the drop controller draws from
    pub drop_pool: u8,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            well_width: WELL_WIDTH,
            well_height: WELL_HEIGHT,
            breach_line_y: BREACH_LINE_Y,
            breach_limit: BREACH_LIMIT,
            spawn_y: SPAWN_Y,

            max_multiplier: MAX_MULTIPLIER,
            combo_decay_secs: COMBO_DECAY_SECS,

            power_up_cost: POWER_UP_COST,
            area_clear_small_radius: AREA_CLEAR_SMALL_RADIUS,
            area_clear_large_radius: AREA_CLEAR_LARGE_RADIUS,
            tier_up_reach: TIER_UP_REACH,

            spawn_squash: SPAWN_SQUASH,
            tier_up_squash: TIER_UP_SQUASH,
            squash_decay_per_sec: SQUASH_DECAY_PER_SEC,

            drop_pool: DROP_POOL,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        let mut tuning: Tuning = serde_json::from_str(json)?;
        tuning.sanitize();
        Ok(tuning)
    }

    /// Clamp values that would break gameplay invariants
    fn sanitize(&mut self) {
        self.max_multiplier = self.max_multiplier.max(1);
        self.drop_pool = self.drop_pool.clamp(1, crate::sim::tier::TIER_COUNT as u8);
        self.breach_limit = self.breach_limit.max(0.0);
        self.combo_decay_secs = self.combo_decay_secs.max(0.0);
        self.squash_decay_per_sec = self.squash_decay_per_sec.max(0.0);
    }
}
