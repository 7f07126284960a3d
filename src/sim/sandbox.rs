//! Minimal in-process physics world
//!
//! Circles under gravity inside an open-topped box. Good enough to drive the
//! headless demo and scenario tests; not a faithful rigid-body solver.

use std::collections::BTreeSet;

use glam::Vec2;

use super::skin::PhysicsParams;
use super::tier::Tier;
use super::world::{CollisionPair, PhysicsWorld, PieceHandle, PieceInfo, PieceSpec};
use crate::tuning::Tuning;

/// Downward acceleration (pixels/s²)
pub const GRAVITY: f32 = 980.0;
/// Distance under which two circles count as touching
pub const CONTACT_SLOP: f32 = 0.5;

/// Result of a circle-circle overlap test
#[derive(Debug, Clone)]
pub struct ContactResult {
    /// Whether the circles touch (within slop)
    pub hit: bool,
    /// Unit normal from the first circle toward the second
    pub normal: Vec2,
    /// Overlap depth (0 when merely touching)
    pub penetration: f32,
}

impl ContactResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Signed distance from a point to a circle's surface
#[inline]
pub fn sd_circle(p: Vec2, center: Vec2, radius: f32) -> f32 {
    (p - center).length() - radius
}

/// Check contact between two circles
pub fn circle_contact(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> ContactResult {
    let gap = sd_circle(b_pos, a_pos, a_radius) - b_radius;
    if gap >= CONTACT_SLOP {
        return ContactResult::miss();
    }
    // Coincident centers: push straight up
    let normal = (b_pos - a_pos).try_normalize().unwrap_or(Vec2::NEG_Y);
    ContactResult {
        hit: true,
        normal,
        penetration: (-gap).max(0.0),
    }
}

/// Reflect velocity off a surface: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

#[derive(Debug, Clone)]
struct Body {
    handle: PieceHandle,
    tier: Tier,
    pos: Vec2,
    vel: Vec2,
    radius: f32,
    params: PhysicsParams,
    squash: f32,
}

impl Body {
    fn info(&self) -> PieceInfo {
        PieceInfo {
            handle: self.handle,
            tier: self.tier,
            pos: self.pos,
            radius: self.radius,
            squash: self.squash,
        }
    }

    /// Mass proxy (area)
    fn inv_mass(&self) -> f32 {
        1.0 / (self.radius * self.radius).max(1.0)
    }
}

/// Box-shaped well with floor and side walls
#[derive(Debug, Clone)]
pub struct SandboxWorld {
    width: f32,
    height: f32,
    gravity: Vec2,
    /// Live bodies, sorted by handle for deterministic iteration
    bodies: Vec<Body>,
    /// Pairs touching at the end of the previous step
    contacts: BTreeSet<(PieceHandle, PieceHandle)>,
    /// Contacts reported on the next step regardless of geometry
    scripted: Vec<CollisionPair>,
    next_id: u32,
}

impl SandboxWorld {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            gravity: Vec2::new(0.0, GRAVITY),
            bodies: Vec::new(),
            contacts: BTreeSet::new(),
            scripted: Vec::new(),
            next_id: 1,
        }
    }

    /// Well sized from the default tuning
    pub fn with_default_well() -> Self {
        Self::for_tuning(&Tuning::default())
    }

    /// Well matching the geometry the game state clamps drops against
    pub fn for_tuning(tuning: &Tuning) -> Self {
        Self::new(tuning.well_width, tuning.well_height)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    /// Report a collision start on the next step without any contact
    pub fn queue_collision(&mut self, a: PieceHandle, b: PieceHandle) {
        self.scripted.push(CollisionPair { a, b });
    }

    /// Physics parameters currently applied to a piece
    pub fn physics_params(&self, handle: PieceHandle) -> Option<PhysicsParams> {
        self.find(handle).map(|b| b.params)
    }

    /// Move a piece (tests and tooling)
    pub fn teleport(&mut self, handle: PieceHandle, pos: Vec2) {
        if let Some(body) = self.find_mut(handle) {
            body.pos = pos;
            body.vel = Vec2::ZERO;
        }
    }

    fn find(&self, handle: PieceHandle) -> Option<&Body> {
        self.bodies
            .binary_search_by_key(&handle, |b| b.handle)
            .ok()
            .map(|i| &self.bodies[i])
    }

    fn find_mut(&mut self, handle: PieceHandle) -> Option<&mut Body> {
        self.bodies
            .binary_search_by_key(&handle, |b| b.handle)
            .ok()
            .map(|i| &mut self.bodies[i])
    }

    fn integrate(&mut self, dt: f32) {
        let (width, height, gravity) = (self.width, self.height, self.gravity);
        for body in &mut self.bodies {
            body.vel += gravity * dt;
            body.pos += body.vel * dt;

            let r = body.radius;
            let bounce = body.params.restitution;
            if body.pos.x - r < 0.0 {
                body.pos.x = r;
                if body.vel.x < 0.0 {
                    body.vel = reflect_velocity(body.vel, Vec2::X) * Vec2::new(bounce, 1.0);
                }
            } else if body.pos.x + r > width {
                body.pos.x = width - r;
                if body.vel.x > 0.0 {
                    body.vel = reflect_velocity(body.vel, Vec2::NEG_X) * Vec2::new(bounce, 1.0);
                }
            }
            if body.pos.y + r > height {
                body.pos.y = height - r;
                if body.vel.y > 0.0 {
                    body.vel = reflect_velocity(body.vel, Vec2::NEG_Y) * Vec2::new(1.0, bounce);
                }
                body.vel.x *= 1.0 - body.params.friction;
            }
        }
    }

    /// Separate overlapping circles and exchange impulse along the normal
    fn resolve_pair(a: &mut Body, b: &mut Body, contact: &ContactResult) {
        let n = contact.normal;
        let (inv_a, inv_b) = (a.inv_mass(), b.inv_mass());
        let inv_sum = inv_a + inv_b;

        if contact.penetration > 0.0 {
            let correction = n * (contact.penetration / inv_sum);
            a.pos -= correction * inv_a;
            b.pos += correction * inv_b;
        }

        let rel = b.vel - a.vel;
        let vn = rel.dot(n);
        if vn < 0.0 {
            let e = a.params.restitution.min(b.params.restitution);
            let j = -(1.0 + e) * vn / inv_sum;
            a.vel -= n * j * inv_a;
            b.vel += n * j * inv_b;

            let tangent = rel - n * vn;
            let mu = (a.params.friction + b.params.friction) * 0.5;
            a.vel += tangent * mu * (inv_a / inv_sum);
            b.vel -= tangent * mu * (inv_b / inv_sum);
        }
    }

    fn solve_contacts(&mut self) -> BTreeSet<(PieceHandle, PieceHandle)> {
        let mut touching = BTreeSet::new();
        let n = self.bodies.len();
        for j in 1..n {
            let (left, right) = self.bodies.split_at_mut(j);
            let b = &mut right[0];
            for a in left.iter_mut() {
                let contact = circle_contact(a.pos, a.radius, b.pos, b.radius);
                if contact.hit {
                    touching.insert((a.handle, b.handle));
                    Self::resolve_pair(a, b, &contact);
                }
            }
        }
        touching
    }
}

impl PhysicsWorld for SandboxWorld {
    fn spawn_piece(&mut self, spec: PieceSpec) -> PieceHandle {
        let handle = PieceHandle(self.next_id);
        self.next_id += 1;
        // Handles are monotonic, so pushing keeps the vec sorted
        self.bodies.push(Body {
            handle,
            tier: spec.tier,
            pos: spec.pos,
            vel: Vec2::ZERO,
            radius: spec.radius,
            params: spec.params,
            squash: spec.squash,
        });
        handle
    }

    fn remove_piece(&mut self, handle: PieceHandle) -> bool {
        match self.bodies.binary_search_by_key(&handle, |b| b.handle) {
            Ok(i) => {
                self.bodies.remove(i);
                self.contacts.retain(|&(a, b)| a != handle && b != handle);
                true
            }
            Err(_) => false,
        }
    }

    fn piece(&self, handle: PieceHandle) -> Option<PieceInfo> {
        self.find(handle).map(Body::info)
    }

    fn for_each_piece(&self, visitor: &mut dyn FnMut(&PieceInfo)) {
        for body in &self.bodies {
            visitor(&body.info());
        }
    }

    fn set_physics_params(&mut self, handle: PieceHandle, params: PhysicsParams) {
        if let Some(body) = self.find_mut(handle) {
            body.params = params;
        }
    }

    fn set_tier(&mut self, handle: PieceHandle, tier: Tier, radius: f32) {
        if let Some(body) = self.find_mut(handle) {
            body.tier = tier;
            body.radius = radius;
        }
    }

    fn set_squash(&mut self, handle: PieceHandle, squash: f32) {
        if let Some(body) = self.find_mut(handle) {
            body.squash = squash;
        }
    }

    fn step(&mut self, dt: f32) -> Vec<CollisionPair> {
        self.integrate(dt);
        let touching = self.solve_contacts();

        let mut started: Vec<CollisionPair> = std::mem::take(&mut self.scripted);
        started.extend(
            touching
                .difference(&self.contacts)
                .map(|&(a, b)| CollisionPair { a, b }),
        );
        self.contacts = touching;
        started
    }
}
