//! Merge resolution
//!
//! Turns collision-start pairs into merges: two same-label pieces below the
//! terminal tier become one piece of the next tier at their midpoint.

use glam::Vec2;
use rand::Rng;

use super::state::{GameEvent, GameState};
use super::tier::Tier;
use super::world::{CollisionPair, PhysicsWorld, PieceHandle, PieceSpec};
use crate::midpoint;

/// A merge that happened during a collision batch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeOutcome {
    pub handle: PieceHandle,
    pub tier: Tier,
    pub pos: Vec2,
    pub added_score: u64,
    pub added_coins: u64,
}

/// Process one batch of collision-start pairs in order.
///
/// Pairs whose pieces were already consumed earlier in the batch are skipped,
/// and pieces created by this batch are never merged again within it.
pub fn resolve_collisions<W: PhysicsWorld + ?Sized>(
    state: &mut GameState,
    world: &mut W,
    pairs: &[CollisionPair],
) -> Vec<MergeOutcome> {
    let mut merges: Vec<MergeOutcome> = Vec::new();

    for pair in pairs {
        if state.is_game_over() {
            break;
        }
        let fresh = |h: PieceHandle| merges.iter().any(|m| m.handle == h);
        if fresh(pair.a) || fresh(pair.b) {
            continue;
        }
        if let Some(outcome) = try_merge(state, world, pair) {
            merges.push(outcome);
        }
    }

    merges
}

fn try_merge<W: PhysicsWorld + ?Sized>(
    state: &mut GameState,
    world: &mut W,
    pair: &CollisionPair,
) -> Option<MergeOutcome> {
    if pair.a == pair.b {
        return None;
    }
    // Both must still be live, non-static pieces
    let a = world.piece(pair.a)?;
    let b = world.piece(pair.b)?;
    if a.label() != b.label() {
        return None;
    }
    // Terminal pieces have no next tier and stay put
    let new_tier = a.tier.next()?;
    let info = new_tier.info();
    let pos = midpoint(a.pos, b.pos);

    world.remove_piece(a.handle);
    world.remove_piece(b.handle);

    let skin = state.skin();
    let handle = world.spawn_piece(PieceSpec {
        tier: new_tier,
        pos,
        radius: info.radius,
        params: skin.physics,
        squash: state.tuning.spawn_squash,
    });

    let (added_score, added_coins) = state.session.apply_merge(info);

    let phrase = if skin.phrases.is_empty() {
        None
    } else {
        Some(skin.phrases[state.rng.random_range(0..skin.phrases.len())])
    };
    let (cap, decay) = (state.tuning.max_multiplier, state.tuning.combo_decay_secs);
    state.combo.advance(phrase, cap, decay);

    log::debug!(
        "Merged {} + {} -> {} at ({:.1}, {:.1}): +{} score, +{} coins, x{}",
        a.label(),
        b.label(),
        info.name,
        pos.x,
        pos.y,
        added_score,
        added_coins,
        state.combo.multiplier
    );

    state.emit(GameEvent::Merged {
        handle,
        tier: new_tier,
        pos,
        added_score,
        added_coins,
        impact: new_tier.value() as f32 * 2.0,
    });
    state.emit(GameEvent::ComboAdvanced {
        multiplier: state.combo.multiplier,
        phrase: state.combo.phrase.clone(),
    });
    state.touch();

    Some(MergeOutcome {
        handle,
        tier: new_tier,
        pos,
        added_score,
        added_coins,
    })
}
