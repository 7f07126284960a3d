//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep only
//! - Seeded RNG only
//! - Stable iteration order (by piece handle)
//! - No rendering or platform dependencies

pub mod merge;
pub mod powerup;
pub mod sandbox;
pub mod skin;
pub mod state;
pub mod tick;
pub mod tier;
pub mod world;

pub use merge::{MergeOutcome, resolve_collisions};
pub use powerup::{PowerUpKind, PowerUpOutcome, confirm_power_up, select_power_up};
pub use sandbox::SandboxWorld;
pub use skin::{DEFAULT_SKIN_ID, PhysicsParams, SKINS, SkinProfile};
pub use state::{
    BreachTimer, ComboState, DropController, GameEvent, GameState, SessionState, Snapshot,
};
pub use tick::{
    Command, ReleaseAction, TickInput, apply_command, pointer_release, request_drop, retry,
    set_active_skin, tick,
};
pub use tier::{TIER_COUNT, TIERS, Tier, TierInfo};
pub use world::{CollisionPair, PhysicsWorld, PieceHandle, PieceInfo, PieceSpec};
