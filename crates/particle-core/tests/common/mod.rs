#![allow(dead_code)]

use glam::Vec2;
use particle_core::{
    Aabb, BodyHandle, BodyState, FixtureHandle, ParticleDef, ParticleSystem, RayCastInput, RayCastOutput,
    RigidWorld, Shape, Transform,
};

pub const DT: f32 = 1.0 / 60.0;

/// Disc of `radius` around `center` in local space.
pub struct CircleShape {
    pub center: Vec2,
    pub radius: f32,
}

impl Shape for CircleShape {
    fn test_point(&self, xf: &Transform, p: Vec2) -> bool {
        let center = xf.mul_vec(self.center);
        (p - center).length_squared() <= self.radius * self.radius
    }

    fn compute_aabb(&self, xf: &Transform, _child_index: usize) -> Aabb {
        let center = xf.mul_vec(self.center);
        Aabb::new(center - Vec2::splat(self.radius), center + Vec2::splat(self.radius))
    }
}

/// Rectangle centred on the local origin.
pub struct BoxShape {
    pub half_extents: Vec2,
}

impl BoxShape {
    pub fn new(half_width: f32, half_height: f32) -> Self {
        Self {
            half_extents: Vec2::new(half_width, half_height),
        }
    }
}

impl Shape for BoxShape {
    fn test_point(&self, xf: &Transform, p: Vec2) -> bool {
        let local = xf.mul_t_vec(p);
        local.x.abs() <= self.half_extents.x && local.y.abs() <= self.half_extents.y
    }

    fn compute_aabb(&self, xf: &Transform, _child_index: usize) -> Aabb {
        let mut aabb = Aabb::empty();
        for corner in [
            Vec2::new(-1.0, -1.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(-1.0, 1.0),
        ] {
            aabb.include(xf.mul_vec(corner * self.half_extents));
        }
        aabb
    }
}

/// Axis-aligned box fixture attached to one body.
pub struct BoxFixture {
    pub body: BodyHandle,
    pub lower: Vec2,
    pub upper: Vec2,
    pub sensor: bool,
}

/// Minimal rigid world: axis-aligned box fixtures on bodies whose state is
/// set directly. Impulses are recorded, not integrated.
#[derive(Default)]
pub struct TestWorld {
    pub gravity: Vec2,
    pub bodies: Vec<BodyState>,
    pub fixtures: Vec<BoxFixture>,
    pub impulses: Vec<(BodyHandle, Vec2, Vec2)>,
}

impl TestWorld {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            ..Default::default()
        }
    }

    /// Static body with one box fixture spanning `lower..upper`.
    pub fn add_static_box(&mut self, lower: Vec2, upper: Vec2) -> BodyHandle {
        self.add_box(BodyState::default(), lower, upper)
    }

    pub fn add_box(&mut self, state: BodyState, lower: Vec2, upper: Vec2) -> BodyHandle {
        let body = BodyHandle(self.bodies.len() as u32);
        self.bodies.push(state);
        self.fixtures.push(BoxFixture {
            body,
            lower,
            upper,
            sensor: false,
        });
        body
    }

    pub fn total_impulse(&self, body: BodyHandle) -> Vec2 {
        self.impulses
            .iter()
            .filter(|(b, _, _)| *b == body)
            .map(|(_, impulse, _)| *impulse)
            .sum()
    }

    fn fixture(&self, fixture: FixtureHandle) -> &BoxFixture {
        &self.fixtures[fixture.0 as usize]
    }
}

impl RigidWorld for TestWorld {
    fn gravity(&self) -> Vec2 {
        self.gravity
    }

    fn query_aabb(&self, aabb: &Aabb, callback: &mut dyn FnMut(FixtureHandle) -> bool) {
        for (i, f) in self.fixtures.iter().enumerate() {
            let overlaps = f.lower.x <= aabb.upper.x
                && aabb.lower.x <= f.upper.x
                && f.lower.y <= aabb.upper.y
                && aabb.lower.y <= f.upper.y;
            if overlaps && !callback(FixtureHandle(i as u32)) {
                return;
            }
        }
    }

    fn fixture_body(&self, fixture: FixtureHandle) -> BodyHandle {
        self.fixture(fixture).body
    }

    fn fixture_is_sensor(&self, fixture: FixtureHandle) -> bool {
        self.fixture(fixture).sensor
    }

    fn fixture_child_count(&self, _fixture: FixtureHandle) -> usize {
        1
    }

    fn fixture_aabb(&self, fixture: FixtureHandle, _child_index: usize) -> Aabb {
        let f = self.fixture(fixture);
        Aabb::new(f.lower, f.upper)
    }

    fn fixture_distance(&self, fixture: FixtureHandle, point: Vec2, _child_index: usize) -> (f32, Vec2) {
        let f = self.fixture(fixture);
        let closest = point.clamp(f.lower, f.upper);
        let d = point - closest;
        let length = d.length();
        if length > 0.0 {
            return (length, d / length);
        }
        // Inside: report the shallowest face as a negative distance.
        let faces = [
            (point.x - f.lower.x, Vec2::NEG_X),
            (f.upper.x - point.x, Vec2::X),
            (point.y - f.lower.y, Vec2::NEG_Y),
            (f.upper.y - point.y, Vec2::Y),
        ];
        let (depth, normal) = faces
            .into_iter()
            .fold((f32::MAX, Vec2::ZERO), |best, face| if face.0 < best.0 { face } else { best });
        (-depth, normal)
    }

    fn fixture_raycast(
        &self,
        fixture: FixtureHandle,
        input: &RayCastInput,
        _child_index: usize,
    ) -> Option<RayCastOutput> {
        let f = self.fixture(fixture);
        let d = input.p2 - input.p1;
        let mut t_min = -f32::MAX;
        let mut t_max = f32::MAX;
        let mut normal = Vec2::ZERO;
        for axis in 0..2 {
            let (p, dir, lo, hi) = (input.p1[axis], d[axis], f.lower[axis], f.upper[axis]);
            if dir.abs() < f32::EPSILON {
                if p < lo || hi < p {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / dir;
            let mut t1 = (lo - p) * inv;
            let mut t2 = (hi - p) * inv;
            let mut sign = -1.0;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
                sign = 1.0;
            }
            if t1 > t_min {
                normal = Vec2::ZERO;
                normal[axis] = sign;
                t_min = t1;
            }
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }
        if t_min < 0.0 || input.max_fraction < t_min {
            return None;
        }
        Some(RayCastOutput {
            normal,
            fraction: t_min,
        })
    }

    fn body_state(&self, body: BodyHandle) -> BodyState {
        self.bodies[body.0 as usize]
    }

    fn apply_linear_impulse(&mut self, body: BodyHandle, impulse: Vec2, point: Vec2) {
        self.impulses.push((body, impulse, point));
    }
}

/// `nx * ny` particles on a lattice with the given spacing, lower-left at `origin`.
pub fn lattice(system: &mut ParticleSystem, origin: Vec2, nx: usize, ny: usize, spacing: f32, def: ParticleDef) -> Vec<usize> {
    let mut indices = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            let position = origin + spacing * Vec2::new(i as f32, j as f32);
            if let Some(index) = system.create_particle(&ParticleDef { position, ..def }) {
                indices.push(index);
            }
        }
    }
    indices
}

pub fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}
