//! Power-up economy
//!
//! Three paid one-shot effects. A selection is armed first, then confirmed at
//! a point; coins are only charged when the effect touched at least one piece.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GameState};
use super::world::{PhysicsWorld, PieceHandle, PieceInfo};
use crate::tuning::Tuning;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Remove every piece near the point (small radius)
    AreaClearSmall,
    /// Remove every piece near the point (large radius)
    AreaClearLarge,
    /// Raise the piece under the point by one tier
    TierUp,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::AreaClearSmall,
        PowerUpKind::AreaClearLarge,
        PowerUpKind::TierUp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpKind::AreaClearSmall => "bomb",
            PowerUpKind::AreaClearLarge => "wipe",
            PowerUpKind::TierUp => "evo",
        }
    }

    /// Clear radius for the area kinds
    pub fn clear_radius(&self, tuning: &Tuning) -> Option<f32> {
        match self {
            PowerUpKind::AreaClearSmall => Some(tuning.area_clear_small_radius),
            PowerUpKind::AreaClearLarge => Some(tuning.area_clear_large_radius),
            PowerUpKind::TierUp => None,
        }
    }

    /// Whether a piece would be affected by activating at `point`.
    /// For TierUp this only checks reach; the nearest candidate wins.
    pub fn in_range(&self, tuning: &Tuning, piece: &PieceInfo, point: Vec2) -> bool {
        let dist = piece.pos.distance(point);
        match self.clear_radius(tuning) {
            Some(radius) => dist < radius,
            None => dist < piece.radius + tuning.tier_up_reach,
        }
    }
}

/// Result of confirming a power-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpOutcome {
    /// Nothing was armed
    NoSelection,
    /// Run is over; nothing happens
    Suppressed,
    /// Not enough coins; selection dropped, nothing charged
    Cancelled,
    /// Effect touched nothing; not charged
    Missed,
    /// Effect applied and charged once
    Used { affected: usize },
}

/// Arm, switch or disarm a power-up. Re-selecting the armed kind disarms it.
/// Unaffordable kinds cannot be armed.
pub fn select_power_up(state: &mut GameState, kind: Option<PowerUpKind>) -> Option<PowerUpKind> {
    if state.is_game_over() {
        return state.power_up;
    }

    let selection = match kind {
        None => None,
        Some(k) if state.power_up == Some(k) => None,
        Some(k) if !state.session.can_afford(state.tuning.power_up_cost) => {
            log::debug!(
                "Cannot arm {}: {} coins < {}",
                k.as_str(),
                state.session.coins,
                state.tuning.power_up_cost
            );
            return state.power_up;
        }
        Some(k) => Some(k),
    };

    if selection != state.power_up {
        state.power_up = selection;
        state.emit(GameEvent::PowerUpSelected { kind: selection });
        state.touch();
    }
    selection
}

/// Fire the armed power-up at `point`. The selection is always cleared.
pub fn confirm_power_up<W: PhysicsWorld + ?Sized>(
    state: &mut GameState,
    world: &mut W,
    point: Vec2,
) -> PowerUpOutcome {
    if state.is_game_over() {
        return PowerUpOutcome::Suppressed;
    }
    let Some(kind) = state.power_up.take() else {
        return PowerUpOutcome::NoSelection;
    };
    state.touch();

    let cost = state.tuning.power_up_cost;
    if !state.session.can_afford(cost) {
        log::debug!("{} cancelled: {} coins", kind.as_str(), state.session.coins);
        state.emit(GameEvent::PowerUpCancelled { kind });
        return PowerUpOutcome::Cancelled;
    }

    let affected = match kind {
        PowerUpKind::AreaClearSmall | PowerUpKind::AreaClearLarge => {
            area_clear(&state.tuning, kind, world, point)
        }
        PowerUpKind::TierUp => usize::from(tier_up(state, world, point)),
    };

    if affected == 0 {
        log::debug!("{} at ({:.0}, {:.0}) hit nothing", kind.as_str(), point.x, point.y);
        return PowerUpOutcome::Missed;
    }

    // Affordability was checked above and nothing else spends in between
    state.session.try_spend(cost);
    log::debug!(
        "{} affected {} piece(s), {} coins left",
        kind.as_str(),
        affected,
        state.session.coins
    );
    state.emit(GameEvent::PowerUpUsed { kind, affected });
    PowerUpOutcome::Used { affected }
}

/// Remove every piece within the kind's radius of `point`
fn area_clear<W: PhysicsWorld + ?Sized>(
    tuning: &Tuning,
    kind: PowerUpKind,
    world: &mut W,
    point: Vec2,
) -> usize {
    let mut doomed: Vec<PieceHandle> = Vec::new();
    world.for_each_piece(&mut |p| {
        if kind.in_range(tuning, p, point) {
            doomed.push(p.handle);
        }
    });
    doomed
        .into_iter()
        .filter(|&h| world.remove_piece(h))
        .count()
}

/// Upgrade the nearest piece within reach; false if none qualified
fn tier_up<W: PhysicsWorld + ?Sized>(state: &mut GameState, world: &mut W, point: Vec2) -> bool {
    let tuning = &state.tuning;
    let mut target: Option<(f32, PieceInfo)> = None;
    world.for_each_piece(&mut |p| {
        if !PowerUpKind::TierUp.in_range(tuning, p, point) {
            return;
        }
        let surface_dist = p.pos.distance(point) - p.radius;
        if target.is_none_or(|(best, _)| surface_dist < best) {
            target = Some((surface_dist, *p));
        }
    });

    let Some((_, piece)) = target else {
        return false;
    };
    let Some(next) = piece.tier.next() else {
        return false;
    };

    let skin = state.skin();
    world.set_tier(piece.handle, next, next.info().radius);
    world.set_physics_params(piece.handle, skin.physics);
    world.set_squash(piece.handle, state.tuning.tier_up_squash);
    state.session.note_tier(next);
    log::debug!("Tier-up {} -> {}", piece.label(), next.info().name);
    true
}
