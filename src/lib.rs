//! Merge Well - a drop-and-merge puzzle engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (merges, breach timer, economy, power-ups)
//! - `session`: Fixed-step runner that owns the state and a physics world
//! - `persistence`: Key-value store abstraction and save layout
//! - `cosmetics`: Cosmetic catalog, inventory, purchases
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences

pub mod cosmetics;
pub mod persistence;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use session::Session;
pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal simulation timestep (60 Hz, matches the breach timer resolution)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta the runner will accept
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Well dimensions (y grows downward)
    pub const WELL_WIDTH: f32 = 380.0;
    pub const WELL_HEIGHT: f32 = 600.0;
    /// Pieces whose center is above this line are breaching
    pub const BREACH_LINE_Y: f32 = 100.0;
    /// Seconds of continuous breach before the run ends
    pub const BREACH_LIMIT: f32 = 2.5;
    /// Vertical position where dropped pieces appear
    pub const SPAWN_Y: f32 = 50.0;

    /// Combo multiplier cap
    pub const MAX_MULTIPLIER: u8 = 5;
    /// Seconds after the latest merge before the multiplier falls back to 1
    pub const COMBO_DECAY_SECS: f32 = 1.2;

    /// Cost of any power-up activation
    pub const POWER_UP_COST: u64 = 100;
    pub const AREA_CLEAR_SMALL_RADIUS: f32 = 80.0;
    pub const AREA_CLEAR_LARGE_RADIUS: f32 = 120.0;
    /// How far outside a piece's surface a TierUp tap still counts
    pub const TIER_UP_REACH: f32 = 15.0;

    /// Squash scale on spawn/merge
    pub const SPAWN_SQUASH: f32 = 1.5;
    /// Squash scale after a TierUp
    pub const TIER_UP_SQUASH: f32 = 1.8;
    /// Squash decay per second (0.015 per 60 Hz frame)
    pub const SQUASH_DECAY_PER_SEC: f32 = 0.9;

    /// Drops are drawn from tiers 0..DROP_POOL
    pub const DROP_POOL: u8 = 5;
    /// Coins granted to a fresh save
    pub const STARTING_COINS: u64 = 1000;
}

/// Midpoint between two positions
#[inline]
pub fn midpoint(a: Vec2, b: Vec2) -> Vec2 {
    (a + b) * 0.5
}

/// Integer ceiling division for coin rewards
#[inline]
pub fn ceil_div(value: u64, divisor: u64) -> u64 {
    value.div_ceil(divisor)
}
