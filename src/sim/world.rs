//! Physics world boundary
//!
//! The rigid-body simulation owns every piece. The engine only spawns,
//! removes, re-parameterizes and enumerates pieces through this trait, and
//! receives collision-start pairs synchronously from [`PhysicsWorld::step`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::skin::PhysicsParams;
use super::tier::Tier;

/// Opaque handle to a piece owned by the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PieceHandle(pub u32);

/// Everything needed to create a piece
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieceSpec {
    pub tier: Tier,
    pub pos: Vec2,
    pub radius: f32,
    pub params: PhysicsParams,
    pub squash: f32,
}

/// Read-only view of a live, non-static piece
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieceInfo {
    pub handle: PieceHandle,
    pub tier: Tier,
    pub pos: Vec2,
    pub radius: f32,
    pub squash: f32,
}

impl PieceInfo {
    /// Merge-equality label (the tier name)
    pub fn label(&self) -> &'static str {
        self.tier.info().name
    }
}

/// A pair of bodies that started touching during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPair {
    pub a: PieceHandle,
    pub b: PieceHandle,
}

pub trait PhysicsWorld {
    /// Create a dynamic piece
    fn spawn_piece(&mut self, spec: PieceSpec) -> PieceHandle;

    /// Remove a piece; returns false if it was already gone
    fn remove_piece(&mut self, handle: PieceHandle) -> bool;

    /// Look up a live non-static piece. Static bodies and removed pieces
    /// yield None.
    fn piece(&self, handle: PieceHandle) -> Option<PieceInfo>;

    /// Visit every live non-static piece in a stable order
    fn for_each_piece(&self, visitor: &mut dyn FnMut(&PieceInfo));

    fn set_physics_params(&mut self, handle: PieceHandle, params: PhysicsParams);

    /// Change a piece's tier in place (label and radius follow the tier)
    fn set_tier(&mut self, handle: PieceHandle, tier: Tier, radius: f32);

    /// Visual-only squash scale
    fn set_squash(&mut self, handle: PieceHandle, squash: f32);

    /// Advance the simulation and report the pairs that started colliding
    fn step(&mut self, dt: f32) -> Vec<CollisionPair>;

    /// Snapshot of all live pieces
    fn pieces(&self) -> Vec<PieceInfo> {
        let mut out = Vec::new();
        self.for_each_piece(&mut |p| out.push(*p));
        out
    }

    fn piece_count(&self) -> usize {
        let mut count = 0;
        self.for_each_piece(&mut |_| count += 1);
        count
    }
}
