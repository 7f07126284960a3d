//! Simulation tick and player commands
//!
//! Commands queued between ticks are applied atomically at the start of the
//! next tick, then physics, merges, squash decay, combo decay and the breach
//! timer run in that order.

use glam::Vec2;

use super::merge::resolve_collisions;
use super::powerup::{PowerUpKind, PowerUpOutcome, confirm_power_up, select_power_up};
use super::skin;
use super::state::{BreachTimer, BreachTransition, DropController, GameEvent, GameState};
use super::world::{PhysicsWorld, PieceHandle, PieceSpec};

/// A player action
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Drop the current tier at horizontal position `x`
    Drop { x: f32 },
    /// Arm, switch or disarm a power-up
    SelectPowerUp(Option<PowerUpKind>),
    /// Fire the armed power-up
    ConfirmPowerUp(Vec2),
    /// Pointer released in the well: fires the power-up if armed, drops otherwise
    PointerRelease(Vec2),
    SetSkin(String),
    Retry,
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub commands: Vec<Command>,
}

impl TickInput {
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Advance the game by one step of `dt` seconds
pub fn tick<W: PhysicsWorld + ?Sized>(
    state: &mut GameState,
    world: &mut W,
    input: &TickInput,
    dt: f32,
) {
    for command in &input.commands {
        apply_command(state, world, command);
    }

    // Nothing moves, merges or scores until retry
    if state.is_game_over() {
        return;
    }

    state.time_ticks += 1;

    let pairs = world.step(dt);
    if !pairs.is_empty() {
        resolve_collisions(state, world, &pairs);
    }

    decay_squash(state, world, dt);

    if state.combo.update(dt) {
        state.emit(GameEvent::ComboReset);
        state.touch();
    }

    update_breach(state, world, dt);
}

/// Apply one player command immediately
pub fn apply_command<W: PhysicsWorld + ?Sized>(
    state: &mut GameState,
    world: &mut W,
    command: &Command,
) {
    match command {
        Command::Drop { x } => {
            request_drop(state, world, *x);
        }
        Command::SelectPowerUp(kind) => {
            select_power_up(state, *kind);
        }
        Command::ConfirmPowerUp(point) => {
            confirm_power_up(state, world, *point);
        }
        Command::PointerRelease(point) => {
            pointer_release(state, world, *point);
        }
        Command::SetSkin(id) => {
            set_active_skin(state, world, id);
        }
        Command::Retry => {
            retry(state, world);
        }
    }
}

/// Drop the current tier at `x`, clamped so the piece spawns inside the side
/// walls. Ignored while a power-up is armed or the run is over.
pub fn request_drop<W: PhysicsWorld + ?Sized>(
    state: &mut GameState,
    world: &mut W,
    x: f32,
) -> Option<PieceHandle> {
    if state.is_game_over() || state.power_up.is_some() {
        return None;
    }

    let pool = state.tuning.drop_pool;
    let tier = state.drop.advance(&mut state.rng, pool);
    let info = tier.info();
    // Keep the new piece inside the side walls
    let max_x = (state.tuning.well_width - info.radius).max(info.radius);
    let x = x.clamp(info.radius, max_x);

    let handle = world.spawn_piece(PieceSpec {
        tier,
        pos: Vec2::new(x, state.tuning.spawn_y),
        radius: info.radius,
        params: state.skin().physics,
        squash: state.tuning.spawn_squash,
    });
    state.session.note_tier(tier);
    state.emit(GameEvent::PieceDropped { handle, tier, x });
    state.touch();
    log::debug!("Dropped {} at x={:.0}, next {}", info.name, x, state.drop.current.info().name);
    Some(handle)
}

/// What a pointer release did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseAction {
    Dropped(PieceHandle),
    PowerUp(PowerUpOutcome),
    Ignored,
}

/// Route a pointer release the way the well does: an armed power-up fires,
/// otherwise the current tier is dropped at the pointer's x.
pub fn pointer_release<W: PhysicsWorld + ?Sized>(
    state: &mut GameState,
    world: &mut W,
    point: Vec2,
) -> ReleaseAction {
    if state.is_game_over() {
        return ReleaseAction::Ignored;
    }
    if state.power_up.is_some() {
        return ReleaseAction::PowerUp(confirm_power_up(state, world, point));
    }
    request_drop(state, world, point.x)
        .map(ReleaseAction::Dropped)
        .unwrap_or(ReleaseAction::Ignored)
}

/// Switch skins and push the new physics onto every live piece. Unknown ids
/// fall back to the default skin. Returns the id actually applied.
pub fn set_active_skin<W: PhysicsWorld + ?Sized>(
    state: &mut GameState,
    world: &mut W,
    id: &str,
) -> &'static str {
    let profile = skin::resolve(id);
    state.cosmetics.skin = profile.id.to_owned();

    for piece in world.pieces() {
        world.set_physics_params(piece.handle, profile.physics);
    }

    state.emit(GameEvent::SkinChanged { skin: profile.id });
    state.touch();
    log::info!("Skin set to {} ({})", profile.name, profile.id);
    profile.id
}

/// Leave game over: clear the well and start a fresh run. Coins, high score
/// and highest tier carry over. No-op unless the run is over.
pub fn retry<W: PhysicsWorld + ?Sized>(state: &mut GameState, world: &mut W) -> bool {
    if !state.is_game_over() {
        log::debug!("Retry ignored: run still in progress");
        return false;
    }

    for piece in world.pieces() {
        world.remove_piece(piece.handle);
    }

    state.session.reset_run();
    state.combo.reset();
    state.breach = BreachTimer::Safe;
    state.power_up = None;
    state.drop = DropController::new(&mut state.rng, state.tuning.drop_pool);

    state.emit(GameEvent::Retried);
    state.touch();
    log::info!(
        "Retry: high score {}, {} coins",
        state.session.high_score,
        state.session.coins
    );
    true
}

/// Ease every piece's squash back toward 1.0
fn decay_squash<W: PhysicsWorld + ?Sized>(state: &GameState, world: &mut W, dt: f32) {
    let step = state.tuning.squash_decay_per_sec * dt;
    let mut settling: Vec<(PieceHandle, f32)> = Vec::new();
    world.for_each_piece(&mut |p| {
        if p.squash > 1.0 {
            settling.push((p.handle, (p.squash - step).max(1.0)));
        }
    });
    for (handle, squash) in settling {
        world.set_squash(handle, squash);
    }
}

fn update_breach<W: PhysicsWorld + ?Sized>(state: &mut GameState, world: &W, dt: f32) {
    let line = state.tuning.breach_line_y;
    let mut overflowing = false;
    world.for_each_piece(&mut |p| overflowing |= p.pos.y < line);

    let limit = state.tuning.breach_limit;
    match state.breach.update(overflowing, dt, limit) {
        BreachTransition::None => {}
        BreachTransition::Started => {
            state.emit(GameEvent::BreachStarted);
            state.touch();
        }
        BreachTransition::Cleared => {
            state.emit(GameEvent::BreachCleared);
            state.touch();
        }
        BreachTransition::GameOver => {
            // Armed selections cannot outlive the run
            state.power_up = None;
            state.emit(GameEvent::GameOver {
                score: state.session.score,
            });
            state.touch();
            log::info!(
                "Game over: score {}, high score {}",
                state.session.score,
                state.session.high_score
            );
        }
    }
    if let BreachTimer::Overflowing { elapsed } = state.breach {
        log::trace!("Breach {:.2}s / {:.2}s", elapsed, limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::persistence::SaveData;
    use crate::sim::sandbox::SandboxWorld;
    use crate::sim::tier::Tier;
    use crate::tuning::Tuning;

    fn tier(i: u8) -> Tier {
        Tier::new(i).unwrap()
    }

    fn place(world: &mut SandboxWorld, t: u8, pos: Vec2) -> PieceHandle {
        world.spawn_piece(PieceSpec {
            tier: tier(t),
            pos,
            radius: tier(t).info().radius,
            params: skin::default_skin().physics,
            squash: 1.0,
        })
    }

    fn still_world() -> SandboxWorld {
        SandboxWorld::with_default_well().with_gravity(Vec2::ZERO)
    }

    #[test]
    fn test_drop_advances_queue() {
        let mut state = GameState::new(5);
        let mut world = SandboxWorld::with_default_well();
        let (current, next) = (state.drop.current, state.drop.next);

        let handle = request_drop(&mut state, &mut world, 190.0).unwrap();
        let piece = world.piece(handle).unwrap();
        assert_eq!(piece.tier, current);
        assert_eq!(piece.pos, Vec2::new(190.0, 50.0));
        assert_eq!(piece.squash, 1.5);
        assert_eq!(state.drop.current, next);
        assert!(state.drop.next.value() < 5);
        assert!(state.session.highest_tier >= current);
    }

    #[test]
    fn test_drop_blocked_by_power_up_and_game_over() {
        let mut state = GameState::new(5);
        let mut world = SandboxWorld::with_default_well();
        select_power_up(&mut state, Some(PowerUpKind::AreaClearSmall));
        assert!(request_drop(&mut state, &mut world, 100.0).is_none());

        select_power_up(&mut state, None);
        state.breach = BreachTimer::GameOver;
        assert!(request_drop(&mut state, &mut world, 100.0).is_none());
        assert_eq!(world.piece_count(), 0);
    }

    #[test]
    fn test_drop_clamped_inside_walls() {
        let mut state = GameState::new(5);
        let mut world = SandboxWorld::with_default_well();
        let handle = request_drop(&mut state, &mut world, -500.0).unwrap();
        let piece = world.piece(handle).unwrap();
        assert_eq!(piece.pos.x, piece.radius);
        // The event carries the spawn position, not the raw input
        assert!(matches!(
            state.events().last(),
            Some(GameEvent::PieceDropped { x, .. }) if *x == piece.radius
        ));
    }

    #[test]
    fn test_pointer_release_routes() {
        let mut state = GameState::new(5);
        let mut world = still_world();
        let first = pointer_release(&mut state, &mut world, Vec2::new(120.0, 300.0));
        assert!(matches!(first, ReleaseAction::Dropped(_)));

        select_power_up(&mut state, Some(PowerUpKind::AreaClearLarge));
        let second = pointer_release(&mut state, &mut world, Vec2::new(120.0, 60.0));
        assert_eq!(second, ReleaseAction::PowerUp(PowerUpOutcome::Used { affected: 1 }));
        assert_eq!(world.piece_count(), 0);
        assert_eq!(state.session.coins, 900);
    }

    #[test]
    fn test_two_dropped_tier_zero_pieces_merge() {
        let mut state = GameState::new(77);
        state.session.coins = 1000;
        state.drop.current = tier(0);
        state.drop.next = tier(0);
        let mut world = SandboxWorld::with_default_well();

        let input = TickInput {
            commands: vec![Command::Drop { x: 190.0 }],
        };
        tick(&mut state, &mut world, &input, SIM_DT);
        for _ in 0..90 {
            tick(&mut state, &mut world, &TickInput::default(), SIM_DT);
        }
        tick(&mut state, &mut world, &input, SIM_DT);

        let mut merged = false;
        for _ in 0..240 {
            tick(&mut state, &mut world, &TickInput::default(), SIM_DT);
            if world.pieces().iter().any(|p| p.tier == tier(1)) {
                merged = true;
                break;
            }
        }
        assert!(merged, "pieces never merged");
        assert_eq!(world.piece_count(), 1);
        assert_eq!(state.session.score, 8);
        assert_eq!(state.session.coins, 1001);
    }

    #[test]
    fn test_breach_leads_to_game_over() {
        let mut state = GameState::new(1);
        let mut world = still_world();
        place(&mut world, 0, Vec2::new(190.0, 40.0));

        let input = TickInput::default();
        // First overflowing tick only starts the timer
        tick(&mut state, &mut world, &input, 0.5);
        assert_eq!(state.breach, BreachTimer::Overflowing { elapsed: 0.0 });
        for _ in 0..5 {
            tick(&mut state, &mut world, &input, 0.5);
        }
        assert_eq!(state.breach, BreachTimer::Overflowing { elapsed: 2.5 });
        tick(&mut state, &mut world, &input, 0.5);
        assert!(state.is_game_over());
        assert!(
            state
                .events()
                .iter()
                .any(|e| matches!(e, GameEvent::GameOver { .. }))
        );
    }

    #[test]
    fn test_breach_at_sim_rate_waits_past_limit() {
        let mut state = GameState::new(1);
        let mut world = still_world();
        place(&mut world, 0, Vec2::new(190.0, 40.0));

        let input = TickInput::default();
        let mut overflowing_ticks = 0u32;
        while !state.is_game_over() && overflowing_ticks < 1000 {
            tick(&mut state, &mut world, &input, SIM_DT);
            overflowing_ticks += 1;
            if !state.is_game_over() {
                assert!(state.breach.elapsed() <= state.tuning.breach_limit);
            }
        }
        // Tick 1 starts the timer at zero; tick 151 sits right at the limit
        assert_eq!(overflowing_ticks, 152);
        let seconds = (overflowing_ticks - 1) as f32 * SIM_DT;
        assert!(seconds > state.tuning.breach_limit);
    }

    #[test]
    fn test_well_follows_tuning() {
        let tuning = Tuning {
            well_width: 300.0,
            well_height: 500.0,
            ..Tuning::default()
        };
        let world = SandboxWorld::for_tuning(&tuning);
        assert_eq!(world.size(), Vec2::new(300.0, 500.0));

        let mut state = GameState::from_save(&SaveData::default(), tuning, 3);
        let mut world = world.with_gravity(Vec2::ZERO);
        let handle = request_drop(&mut state, &mut world, 1000.0).unwrap();
        let piece = world.piece(handle).unwrap();
        assert_eq!(piece.pos.x, 300.0 - piece.radius);
    }

    #[test]
    fn test_breach_resets_when_clear() {
        let mut state = GameState::new(1);
        let mut world = still_world();
        let h = place(&mut world, 0, Vec2::new(190.0, 40.0));
        let input = TickInput::default();
        tick(&mut state, &mut world, &input, 0.5);
        tick(&mut state, &mut world, &input, 0.5);
        assert_eq!(state.breach.elapsed(), 0.5);

        world.teleport(h, Vec2::new(190.0, 400.0));
        tick(&mut state, &mut world, &input, 0.5);
        assert_eq!(state.breach, BreachTimer::Safe);
    }

    #[test]
    fn test_game_over_freezes_world() {
        let mut state = GameState::new(1);
        let mut world = SandboxWorld::with_default_well();
        let h = place(&mut world, 0, Vec2::new(190.0, 300.0));
        state.breach = BreachTimer::GameOver;
        let before = world.piece(h).unwrap().pos;
        let ticks = state.time_ticks;
        tick(&mut state, &mut world, &TickInput::default(), SIM_DT);
        assert_eq!(world.piece(h).unwrap().pos, before);
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_retry_after_game_over() {
        let mut state = GameState::new(3);
        let mut world = still_world();
        place(&mut world, 4, Vec2::new(100.0, 300.0));
        place(&mut world, 2, Vec2::new(300.0, 300.0));
        state.session.score = 500;
        state.session.high_score = 500;
        state.session.coins = 300;
        state.session.highest_tier = tier(7);
        state.combo.advance(Some("x"), 5, 1.2);
        state.breach = BreachTimer::GameOver;

        let input = TickInput {
            commands: vec![Command::Retry],
        };
        tick(&mut state, &mut world, &input, SIM_DT);

        assert_eq!(world.piece_count(), 0);
        assert_eq!(state.session.score, 0);
        assert_eq!(state.session.high_score, 500);
        assert_eq!(state.session.coins, 300);
        assert_eq!(state.session.highest_tier, tier(7));
        assert_eq!(state.combo.multiplier, 1);
        assert_eq!(state.breach, BreachTimer::Safe);
        assert!(state.drop.current.value() < 5);
    }

    #[test]
    fn test_retry_ignored_mid_run() {
        let mut state = GameState::new(3);
        let mut world = still_world();
        place(&mut world, 1, Vec2::new(100.0, 300.0));
        state.session.score = 20;
        assert!(!retry(&mut state, &mut world));
        assert_eq!(state.session.score, 20);
        assert_eq!(world.piece_count(), 1);
    }

    #[test]
    fn test_skin_change_updates_live_pieces() {
        let mut state = GameState::new(3);
        let mut world = still_world();
        let a = place(&mut world, 1, Vec2::new(100.0, 300.0));
        let b = place(&mut world, 5, Vec2::new(250.0, 300.0));

        assert_eq!(set_active_skin(&mut state, &mut world, "sk_dessert"), "sk_dessert");
        let dessert = skin::find("sk_dessert").unwrap().physics;
        assert_eq!(world.physics_params(a), Some(dessert));
        assert_eq!(world.physics_params(b), Some(dessert));
        assert_eq!(state.cosmetics.skin, "sk_dessert");

        assert_eq!(set_active_skin(&mut state, &mut world, "sk_bogus"), skin::DEFAULT_SKIN_ID);
        assert_eq!(world.physics_params(a), Some(skin::default_skin().physics));
    }

    #[test]
    fn test_squash_decays_to_floor() {
        let mut state = GameState::new(3);
        let mut world = still_world();
        let h = world.spawn_piece(PieceSpec {
            tier: tier(2),
            pos: Vec2::new(190.0, 400.0),
            radius: 32.0,
            params: skin::default_skin().physics,
            squash: 1.5,
        });
        tick(&mut state, &mut world, &TickInput::default(), SIM_DT);
        let after_one = world.piece(h).unwrap().squash;
        assert!((after_one - 1.485).abs() < 1e-4);
        for _ in 0..60 {
            tick(&mut state, &mut world, &TickInput::default(), SIM_DT);
        }
        assert_eq!(world.piece(h).unwrap().squash, 1.0);
    }

    #[test]
    fn test_combo_resets_after_quiet_period() {
        let mut state = GameState::new(3);
        let mut world = still_world();
        state.combo.advance(None, 5, 1.2);
        state.combo.advance(None, 5, 1.2);
        assert_eq!(state.combo.multiplier, 3);
        for _ in 0..71 {
            tick(&mut state, &mut world, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.combo.multiplier, 3);
        for _ in 0..2 {
            tick(&mut state, &mut world, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.combo.multiplier, 1);
        assert!(state.events().contains(&GameEvent::ComboReset));
    }

    #[test]
    fn test_determinism() {
        let run = |seed: u64| {
            let mut state = GameState::new(seed);
            let mut world = SandboxWorld::with_default_well();
            for i in 0..600 {
                let mut input = TickInput::default();
                if i % 40 == 0 {
                    input.push(Command::Drop {
                        x: 60.0 + (i % 7) as f32 * 40.0,
                    });
                }
                tick(&mut state, &mut world, &input, SIM_DT);
            }
            (state.snapshot(), world.pieces().len())
        };
        assert_eq!(run(2024), run(2024));
    }
}
