//! Game state and core simulation types
//!
//! Everything the engine owns lives here. Pieces themselves belong to the
//! physics world; only their handles cross into this state via events.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::powerup::PowerUpKind;
use super::skin::{self, SkinProfile};
use super::tier::{Tier, TierInfo};
use super::world::PieceHandle;
use crate::cosmetics::ActiveCosmetics;
use crate::persistence::SaveData;
use crate::tuning::Tuning;

/// Score, wallet and progression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Reset only by retry
    pub score: u64,
    /// Never decreases, survives retry
    pub high_score: u64,
    pub coins: u64,
    /// Highest tier ever produced, survives retry
    pub highest_tier: Tier,
    /// Highest tier produced in the current run (mastery bar)
    pub run_highest_tier: Tier,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            score: 0,
            high_score: 0,
            coins: crate::consts::STARTING_COINS,
            highest_tier: Tier::MIN,
            run_highest_tier: Tier::MIN,
        }
    }
}

impl SessionState {
    /// Record that a piece of `tier` now exists
    pub fn note_tier(&mut self, tier: Tier) {
        self.highest_tier = self.highest_tier.max(tier);
        self.run_highest_tier = self.run_highest_tier.max(tier);
    }

    /// Credit a merge that produced a piece described by `info`.
    /// Returns (added score, added coins).
    pub fn apply_merge(&mut self, info: &TierInfo) -> (u64, u64) {
        let added_score = info.merge_score();
        let added_coins = info.merge_coins();
        let score = self.score.saturating_add(added_score);
        *self = Self {
            score,
            high_score: self.high_score.max(score),
            coins: self.coins.saturating_add(added_coins),
            highest_tier: self.highest_tier.max(info.tier),
            run_highest_tier: self.run_highest_tier.max(info.tier),
        };
        (added_score, added_coins)
    }

    pub fn can_afford(&self, cost: u64) -> bool {
        self.coins >= cost
    }

    /// Deduct `cost` if affordable; never partially charges
    pub fn try_spend(&mut self, cost: u64) -> bool {
        match self.coins.checked_sub(cost) {
            Some(rest) => {
                self.coins = rest;
                true
            }
            None => false,
        }
    }

    /// Start a new run: score and run progress only
    pub fn reset_run(&mut self) {
        self.score = 0;
        self.run_highest_tier = Tier::MIN;
    }
}

/// Multiplier with a single owned decay timer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboState {
    pub multiplier: u8,
    /// Display-only phrase of the latest merge
    pub phrase: Option<String>,
    /// Seconds until the multiplier falls back to 1; rescheduled by every merge
    decay_remaining: Option<f32>,
}

impl Default for ComboState {
    fn default() -> Self {
        Self {
            multiplier: 1,
            phrase: None,
            decay_remaining: None,
        }
    }
}

impl ComboState {
    /// Register a merge: bump (capped), set phrase, reschedule the decay
    pub fn advance(&mut self, phrase: Option<&str>, cap: u8, decay_secs: f32) {
        self.multiplier = self.multiplier.saturating_add(1).min(cap.max(1));
        self.phrase = phrase.map(str::to_owned);
        self.decay_remaining = Some(decay_secs);
    }

    /// Run the decay timer; returns true when the multiplier was reset
    pub fn update(&mut self, dt: f32) -> bool {
        let Some(remaining) = self.decay_remaining else {
            return false;
        };
        let remaining = remaining - dt;
        if remaining <= 0.0 {
            self.multiplier = 1;
            self.decay_remaining = None;
            true
        } else {
            self.decay_remaining = Some(remaining);
            false
        }
    }

    pub fn pending_decay(&self) -> Option<f32> {
        self.decay_remaining
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Overflow state machine
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum BreachTimer {
    #[default]
    Safe,
    /// Seconds of continuous overflow so far
    Overflowing { elapsed: f32 },
    /// Terminal until retry
    GameOver,
}

/// What changed during a breach update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreachTransition {
    None,
    Started,
    Cleared,
    GameOver,
}

impl BreachTimer {
    /// Evaluate one tick
    pub fn update(&mut self, overflowing: bool, dt: f32, limit: f32) -> BreachTransition {
        match (*self, overflowing) {
            (BreachTimer::GameOver, _) => BreachTransition::None,
            (BreachTimer::Safe, false) => BreachTransition::None,
            (BreachTimer::Overflowing { .. }, false) => {
                *self = BreachTimer::Safe;
                BreachTransition::Cleared
            }
            (BreachTimer::Safe, true) => {
                *self = BreachTimer::Overflowing { elapsed: 0.0 };
                BreachTransition::Started
            }
            (BreachTimer::Overflowing { elapsed }, true) => {
                let elapsed = elapsed + dt;
                if elapsed > limit {
                    *self = BreachTimer::GameOver;
                    BreachTransition::GameOver
                } else {
                    *self = BreachTimer::Overflowing { elapsed };
                    BreachTransition::None
                }
            }
        }
    }

    pub fn elapsed(&self) -> f32 {
        match self {
            BreachTimer::Overflowing { elapsed } => *elapsed,
            _ => 0.0,
        }
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self, BreachTimer::GameOver)
    }
}

/// Current and preview drop tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropController {
    pub current: Tier,
    pub next: Tier,
}

impl DropController {
    /// Draw both tiers independently
    pub fn new(rng: &mut Pcg32, pool: u8) -> Self {
        Self {
            current: draw_tier(rng, pool),
            next: draw_tier(rng, pool),
        }
    }

    /// Consume the current tier, shift the preview in, draw a new preview
    pub fn advance(&mut self, rng: &mut Pcg32, pool: u8) -> Tier {
        let dropped = self.current;
        self.current = self.next;
        self.next = draw_tier(rng, pool);
        dropped
    }
}

/// Uniform draw from the `pool` lowest tiers
fn draw_tier(rng: &mut Pcg32, pool: u8) -> Tier {
    let index = rng.random_range(0..pool.max(1));
    Tier::new(index).unwrap_or(Tier::MIN)
}

/// Signals for rendering, audio and UI (drained by the host)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    PieceDropped {
        handle: PieceHandle,
        tier: Tier,
        /// Spawn x after clamping inside the side walls, not the raw input
        x: f32,
    },
    Merged {
        handle: PieceHandle,
        tier: Tier,
        pos: Vec2,
        added_score: u64,
        added_coins: u64,
        /// Screen-shake strength
        impact: f32,
    },
    ComboAdvanced { multiplier: u8, phrase: Option<String> },
    ComboReset,
    PowerUpSelected { kind: Option<PowerUpKind> },
    PowerUpUsed { kind: PowerUpKind, affected: usize },
    PowerUpCancelled { kind: PowerUpKind },
    BreachStarted,
    BreachCleared,
    GameOver { score: u64 },
    Retried,
    SkinChanged { skin: &'static str },
}

/// Read-only view handed to UI and persistence at tick boundaries
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub revision: u64,
    pub session: SessionState,
    pub multiplier: u8,
    pub combo_phrase: Option<String>,
    pub breach: BreachTimer,
    pub current_tier: Tier,
    pub next_tier: Tier,
    pub power_up: Option<PowerUpKind>,
    pub cosmetics: ActiveCosmetics,
}

/// Complete engine-owned state
#[derive(Debug, Clone)]
pub struct GameState {
    pub seed: u64,
    pub tuning: Tuning,
    pub session: SessionState,
    pub combo: ComboState,
    pub breach: BreachTimer,
    pub drop: DropController,
    pub power_up: Option<PowerUpKind>,
    pub cosmetics: ActiveCosmetics,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Bumped on every mutation visible in a snapshot
    revision: u64,
    pub(crate) rng: Pcg32,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Fresh game with default save data
    pub fn new(seed: u64) -> Self {
        Self::from_save(&SaveData::default(), Tuning::default(), seed)
    }

    /// Rehydrate from persisted data; unknown cosmetic ids fall back
    pub fn from_save(save: &SaveData, tuning: Tuning, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let drop = DropController::new(&mut rng, tuning.drop_pool);
        let highest_tier = Tier::new(save.highest_tier).unwrap_or(Tier::TERMINAL);
        let mut cosmetics = save.cosmetics();
        cosmetics.sanitize();

        Self {
            seed,
            tuning,
            session: SessionState {
                score: save.score,
                high_score: save.high_score.max(save.score),
                coins: save.coins,
                highest_tier,
                run_highest_tier: Tier::MIN,
            },
            combo: ComboState::default(),
            breach: BreachTimer::Safe,
            drop,
            power_up: None,
            cosmetics,
            time_ticks: 0,
            revision: 0,
            rng,
            events: Vec::new(),
        }
    }

    /// Persisted shape of this state
    pub fn to_save(&self) -> SaveData {
        SaveData {
            score: self.session.score,
            high_score: self.session.high_score,
            coins: self.session.coins,
            highest_tier: self.session.highest_tier.value(),
            active_skin: self.cosmetics.skin.clone(),
            active_theme: self.cosmetics.theme.clone(),
            active_border: self.cosmetics.border.clone(),
            active_hitbox: self.cosmetics.hitbox.clone(),
            active_outline: self.cosmetics.outline.clone(),
        }
    }

    /// The active skin (default when the id is unknown)
    pub fn skin(&self) -> &'static SkinProfile {
        skin::resolve(&self.cosmetics.skin)
    }

    pub fn is_game_over(&self) -> bool {
        self.breach.is_game_over()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn touch(&mut self) {
        self.revision += 1;
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Pending events, oldest first
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            revision: self.revision,
            session: self.session.clone(),
            multiplier: self.combo.multiplier,
            combo_phrase: self.combo.phrase.clone(),
            breach: self.breach,
            current_tier: self.drop.current,
            next_tier: self.drop.next,
            power_up: self.power_up,
            cosmetics: self.cosmetics.clone(),
        }
    }
}
