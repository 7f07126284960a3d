//! Fixed-step session runner
//!
//! Owns the game state and a physics world. Commands are queued between
//! frames and applied atomically at the start of the next fixed step.

use glam::Vec2;

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::persistence::{self, KeyValueStore, PersistenceError};
use crate::sim::{Command, GameEvent, GameState, PhysicsWorld, PowerUpKind, Snapshot, TickInput, tick};
use crate::tuning::Tuning;

pub struct Session<W: PhysicsWorld> {
    state: GameState,
    world: W,
    accumulator: f32,
    pending: TickInput,
    /// Revision at the last successful save
    saved_revision: Option<u64>,
}

impl<W: PhysicsWorld> Session<W> {
    pub fn new(state: GameState, world: W) -> Self {
        Self {
            state,
            world,
            accumulator: 0.0,
            pending: TickInput::default(),
            saved_revision: None,
        }
    }

    /// Resume from the stored game record (or a fresh one)
    pub fn load<S: KeyValueStore + ?Sized>(store: &S, tuning: Tuning, seed: u64, world: W) -> Self {
        let save = persistence::load_save(store);
        let state = GameState::from_save(&save, tuning, seed);
        log::info!(
            "Session loaded: high score {}, {} coins, skin {}",
            state.session.high_score,
            state.session.coins,
            state.cosmetics.skin
        );
        let mut session = Self::new(state, world);
        session.saved_revision = Some(session.state.revision());
        session
    }

    /// Write the game record
    pub fn save<S: KeyValueStore + ?Sized>(&mut self, store: &mut S) -> Result<(), PersistenceError> {
        persistence::store_save(store, &self.state.to_save())?;
        self.saved_revision = Some(self.state.revision());
        Ok(())
    }

    /// Whether anything visible changed since the last save or load
    pub fn is_dirty(&self) -> bool {
        self.saved_revision != Some(self.state.revision())
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    /// Direct access for shop operations between ticks
    pub fn parts_mut(&mut self) -> (&mut GameState, &mut W) {
        (&mut self.state, &mut self.world)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    /// Queue a command for the next step
    pub fn push(&mut self, command: Command) {
        self.pending.push(command);
    }

    pub fn drop_at(&mut self, x: f32) {
        self.push(Command::Drop { x });
    }

    pub fn select_power_up(&mut self, kind: Option<PowerUpKind>) {
        self.push(Command::SelectPowerUp(kind));
    }

    pub fn pointer_release(&mut self, point: Vec2) {
        self.push(Command::PointerRelease(point));
    }

    pub fn set_skin(&mut self, id: &str) {
        self.push(Command::SetSkin(id.to_owned()));
    }

    pub fn retry(&mut self) {
        self.push(Command::Retry);
    }

    /// Run one fixed step with whatever is queued
    pub fn step(&mut self) {
        let input = std::mem::take(&mut self.pending);
        tick(&mut self.state, &mut self.world, &input, SIM_DT);
    }

    /// Advance by a frame delta. Returns the number of fixed steps run.
    pub fn update(&mut self, frame_dt: f32) -> u32 {
        // f32::max/min discard NaN, so a bad delta counts as zero
        let dt = frame_dt.max(0.0).min(MAX_FRAME_DT);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.step();
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        // Drop time we could not catch up on
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }

    /// Fraction of a step left in the accumulator, for render interpolation
    pub fn alpha(&self) -> f32 {
        (self.accumulator / SIM_DT).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::sim::SandboxWorld;

    fn session(seed: u64) -> Session<SandboxWorld> {
        Session::new(GameState::new(seed), SandboxWorld::with_default_well())
    }

    #[test]
    fn test_update_runs_fixed_steps() {
        let mut s = session(1);
        assert_eq!(s.update(SIM_DT * 3.5), 3);
        assert_eq!(s.state().time_ticks, 3);
        // The half step carries over
        assert_eq!(s.update(SIM_DT * 0.6), 1);
    }

    #[test]
    fn test_update_clamps_long_frames() {
        let mut s = session(1);
        // Clamped to 0.1 s, roughly six steps at 60 Hz
        let steps = s.update(5.0);
        assert!((5..=6).contains(&steps), "ran {steps} steps");
        assert_eq!(s.state().time_ticks, steps as u64);
        assert_eq!(s.update(-1.0), 0);
    }

    #[test]
    fn test_update_survives_nan_frame() {
        let mut s = session(1);
        assert_eq!(s.update(f32::NAN), 0);
        assert!(s.alpha().is_finite());

        s.drop_at(190.0);
        let steps: u32 = (0..60).map(|_| s.update(SIM_DT)).sum();
        assert!(steps >= 59, "ran {steps} steps");
        assert_eq!(s.state().time_ticks, steps as u64);
        assert_eq!(s.world().piece_count(), 1);

        // Infinite deltas clamp like any long frame
        let steps = s.update(f32::INFINITY);
        assert!((5..=6).contains(&steps), "ran {steps} steps");
    }

    #[test]
    fn test_queued_commands_wait_for_a_step() {
        let mut s = session(1);
        s.drop_at(190.0);
        assert_eq!(s.update(SIM_DT * 0.5), 0);
        assert_eq!(s.world().piece_count(), 0);

        assert_eq!(s.update(SIM_DT * 0.6), 1);
        assert_eq!(s.world().piece_count(), 1);
        let events = s.drain_events();
        assert!(matches!(events[0], GameEvent::PieceDropped { .. }));
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn test_commands_apply_once() {
        let mut s = session(1);
        s.drop_at(100.0);
        s.update(SIM_DT * 4.0);
        assert_eq!(s.world().piece_count(), 1);
    }

    #[test]
    fn test_save_and_resume() {
        let mut store = MemoryStore::new();
        let mut s = session(9);
        assert!(s.is_dirty());
        {
            let (state, _) = s.parts_mut();
            state.session.coins = 4321;
            state.session.high_score = 77;
        }
        s.set_skin("sk_animals");
        s.step();
        s.save(&mut store).unwrap();
        assert!(!s.is_dirty());

        let resumed = Session::load(&store, Tuning::default(), 10, SandboxWorld::with_default_well());
        assert_eq!(resumed.state().session.coins, 4321);
        assert_eq!(resumed.state().session.high_score, 77);
        assert_eq!(resumed.state().cosmetics.skin, "sk_animals");
        assert!(!resumed.is_dirty());
    }

    #[test]
    fn test_snapshot_tracks_revision() {
        let mut s = session(1);
        let before = s.snapshot().revision;
        s.select_power_up(Some(PowerUpKind::TierUp));
        s.step();
        let snap = s.snapshot();
        assert!(snap.revision > before);
        assert_eq!(snap.power_up, Some(PowerUpKind::TierUp));
    }
}
