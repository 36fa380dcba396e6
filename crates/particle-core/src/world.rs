use glam::Vec2;

use crate::math::{cross_sv, Aabb, RayCastInput, RayCastOutput, Transform};

/// Opaque handle to a rigid body owned by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub u32);

/// Opaque handle to a fixture (shape attached to a body).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FixtureHandle(pub u32);

/// Snapshot of a body's motion and mass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyState {
    pub linear_velocity: Vec2,
    pub angular_velocity: f32,
    /// Centre of mass in world space.
    pub world_center: Vec2,
    pub mass: f32,
    /// Rotational inertia about the body origin.
    pub inertia: f32,
    /// Centre of mass in body space.
    pub local_center: Vec2,
    pub transform: Transform,
    /// Transform at the start of the current step.
    pub previous_transform: Transform,
}

impl Default for BodyState {
    fn default() -> Self {
        Self {
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            world_center: Vec2::ZERO,
            mass: 0.0,
            inertia: 0.0,
            local_center: Vec2::ZERO,
            transform: Transform::IDENTITY,
            previous_transform: Transform::IDENTITY,
        }
    }
}

impl BodyState {
    /// Velocity of the body at world point `p`.
    #[inline]
    pub fn velocity_at(&self, p: Vec2) -> Vec2 {
        self.linear_velocity + cross_sv(self.angular_velocity, p - self.world_center)
    }

    pub fn inv_mass(&self) -> f32 {
        if self.mass > 0.0 {
            1.0 / self.mass
        } else {
            0.0
        }
    }

    /// Inverse inertia about the centre of mass.
    pub fn inv_inertia(&self) -> f32 {
        let inertia = self.inertia - self.mass * self.local_center.length_squared();
        if inertia > 0.0 {
            1.0 / inertia
        } else {
            0.0
        }
    }
}

/// The rigid-body world the particles live in.
///
/// Queries take `&self`; only impulse application mutates the world, so a
/// step can collect fixtures first and push impulses afterwards.
pub trait RigidWorld {
    fn gravity(&self) -> Vec2;

    /// Report every fixture whose bounds overlap `aabb`. The callback returns
    /// `false` to stop early.
    fn query_aabb(&self, aabb: &Aabb, callback: &mut dyn FnMut(FixtureHandle) -> bool);

    fn fixture_body(&self, fixture: FixtureHandle) -> BodyHandle;

    fn fixture_is_sensor(&self, fixture: FixtureHandle) -> bool;

    fn fixture_child_count(&self, fixture: FixtureHandle) -> usize;

    fn fixture_aabb(&self, fixture: FixtureHandle, child_index: usize) -> Aabb;

    /// Distance from `point` to the fixture surface and the unit normal
    /// pointing away from the fixture at the closest point.
    fn fixture_distance(&self, fixture: FixtureHandle, point: Vec2, child_index: usize) -> (f32, Vec2);

    fn fixture_raycast(
        &self,
        fixture: FixtureHandle,
        input: &RayCastInput,
        child_index: usize,
    ) -> Option<RayCastOutput>;

    fn body_state(&self, body: BodyHandle) -> BodyState;

    fn apply_linear_impulse(&mut self, body: BodyHandle, impulse: Vec2, point: Vec2);

    /// Fixtures overlapping `aabb`, collected up front.
    fn overlapping_fixtures(&self, aabb: &Aabb) -> Vec<FixtureHandle> {
        let mut fixtures = Vec::new();
        self.query_aabb(aabb, &mut |f| {
            fixtures.push(f);
            true
        });
        fixtures
    }
}

/// A world with gravity and no bodies.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyWorld {
    pub gravity: Vec2,
}

impl EmptyWorld {
    pub fn new(gravity: Vec2) -> Self {
        Self { gravity }
    }
}

impl RigidWorld for EmptyWorld {
    fn gravity(&self) -> Vec2 {
        self.gravity
    }

    fn query_aabb(&self, _aabb: &Aabb, _callback: &mut dyn FnMut(FixtureHandle) -> bool) {}

    fn fixture_body(&self, fixture: FixtureHandle) -> BodyHandle {
        BodyHandle(fixture.0)
    }

    fn fixture_is_sensor(&self, _fixture: FixtureHandle) -> bool {
        true
    }

    fn fixture_child_count(&self, _fixture: FixtureHandle) -> usize {
        0
    }

    fn fixture_aabb(&self, _fixture: FixtureHandle, _child_index: usize) -> Aabb {
        Aabb::empty()
    }

    fn fixture_distance(&self, _fixture: FixtureHandle, _point: Vec2, _child_index: usize) -> (f32, Vec2) {
        (f32::MAX, Vec2::ZERO)
    }

    fn fixture_raycast(
        &self,
        _fixture: FixtureHandle,
        _input: &RayCastInput,
        _child_index: usize,
    ) -> Option<RayCastOutput> {
        None
    }

    fn body_state(&self, _body: BodyHandle) -> BodyState {
        BodyState::default()
    }

    fn apply_linear_impulse(&mut self, _body: BodyHandle, _impulse: Vec2, _point: Vec2) {}
}
