use glam::Vec2;

use crate::buffer::reserve_doubling;
use crate::grid::{for_each_neighbour_pair, proxy_range};
use crate::math::Aabb;
use crate::particle::ParticleFlags;
use crate::system::ParticleSystem;
use crate::world::{BodyHandle, RigidWorld};

/// Two particles closer than one diameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleContact {
    pub index_a: usize,
    pub index_b: usize,
    /// Union of both particles' flags.
    pub flags: ParticleFlags,
    /// `1` at zero distance, falling linearly to `0` at one diameter.
    pub weight: f32,
    /// Unit vector from A towards B.
    pub normal: Vec2,
}

/// A particle closer than one diameter to a fixture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleBodyContact {
    pub index: usize,
    pub body: BodyHandle,
    pub weight: f32,
    /// Unit vector from the particle towards the fixture.
    pub normal: Vec2,
    /// Effective mass of the particle/body pair along `normal`.
    pub mass: f32,
}

/// Persistent spring between two particles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pair {
    pub index_a: usize,
    pub index_b: usize,
    pub flags: ParticleFlags,
    pub strength: f32,
    /// Rest length, fixed when the pair is made.
    pub distance: f32,
}

/// Persistent elastic triangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triad {
    pub index_a: usize,
    pub index_b: usize,
    pub index_c: usize,
    pub flags: ParticleFlags,
    pub strength: f32,
    /// Rest offsets of each corner from the centroid.
    pub pa: Vec2,
    pub pb: Vec2,
    pub pc: Vec2,
    pub ka: f32,
    pub kb: f32,
    pub kc: f32,
    /// Twice the signed rest area.
    pub s: f32,
}

impl Triad {
    pub(crate) fn new(
        (a, b, c): (usize, usize, usize),
        (pa, pb, pc): (Vec2, Vec2, Vec2),
        flags: ParticleFlags,
        strength: f32,
    ) -> Self {
        let dab = pa - pb;
        let dbc = pb - pc;
        let dca = pc - pa;
        let mid = (pa + pb + pc) / 3.0;
        Self {
            index_a: a,
            index_b: b,
            index_c: c,
            flags,
            strength,
            pa: pa - mid,
            pb: pb - mid,
            pc: pc - mid,
            ka: -dca.dot(dab),
            kb: -dab.dot(dbc),
            kc: -dbc.dot(dca),
            s: pa.perp_dot(pb) + pb.perp_dot(pc) + pc.perp_dot(pa),
        }
    }
}

/// All three edges shorter than `max_distance_squared`.
#[inline]
pub(crate) fn triangle_within(pa: Vec2, pb: Vec2, pc: Vec2, max_distance_squared: f32) -> bool {
    pa.distance_squared(pb) < max_distance_squared
        && pb.distance_squared(pc) < max_distance_squared
        && pc.distance_squared(pa) < max_distance_squared
}

/// Contact between `a` and `b`, if they are closer than one diameter.
#[inline]
pub fn make_contact(
    positions: &[Vec2],
    flags: &[ParticleFlags],
    a: usize,
    b: usize,
    squared_diameter: f32,
    inverse_diameter: f32,
) -> Option<ParticleContact> {
    let d = positions[b] - positions[a];
    let d2 = d.length_squared();
    if d2 >= squared_diameter {
        return None;
    }
    let inv_d = if d2 != 0.0 { (1.0 / d2).sqrt() } else { f32::MAX };
    Some(ParticleContact {
        index_a: a,
        index_b: b,
        flags: flags[a] | flags[b],
        weight: 1.0 - d2 * inv_d * inverse_diameter,
        normal: inv_d * d,
    })
}

impl ParticleSystem {
    /// Record a contact between `a` and `b` if they overlap.
    pub fn add_contact(&mut self, a: usize, b: usize) {
        assert_ne!(a, b, "a particle cannot touch itself");
        if let Some(contact) = make_contact(
            self.particles.position.data(),
            self.particles.flags.data(),
            a,
            b,
            self.squared_diameter,
            self.inverse_diameter,
        ) {
            reserve_doubling(&mut self.contacts);
            self.contacts.push(contact);
        }
    }

    /// Re-tag and sort proxies, then rebuild all particle-particle contacts.
    ///
    /// With `exclude_zombies`, contacts touching a particle marked for
    /// removal are dropped.
    pub fn update_contacts(&mut self, exclude_zombies: bool) {
        self.refresh_proxies();
        self.contacts.clear();
        let positions = self.particles.position.data();
        let flags = self.particles.flags.data();
        let (squared_diameter, inverse_diameter) = (self.squared_diameter, self.inverse_diameter);
        let contacts = &mut self.contacts;
        for_each_neighbour_pair(&self.proxies, |a, b| {
            if let Some(contact) = make_contact(positions, flags, a, b, squared_diameter, inverse_diameter) {
                reserve_doubling(contacts);
                contacts.push(contact);
            }
        });
        if exclude_zombies {
            self.contacts.retain(|c| !c.flags.contains(ParticleFlags::ZOMBIE));
        }
    }

    /// Rebuild particle-fixture contacts against `world`.
    pub fn update_body_contacts(&mut self, world: &dyn RigidWorld) {
        self.body_contacts.clear();
        if self.particles.count == 0 {
            return;
        }
        self.ensure_proxies_sorted();
        let count = self.particles.count;
        let positions = self.particles.position.data();
        let flags = self.particles.flags.data();
        let diameter = self.particle_diameter;

        let mut bounds = Aabb::empty();
        for &p in &positions[..count] {
            bounds.include(p);
        }
        let bounds = bounds.expanded(diameter);

        let particle_inv_mass = self.particle_inv_mass();
        for fixture in world.overlapping_fixtures(&bounds) {
            if world.fixture_is_sensor(fixture) {
                continue;
            }
            let body = world.fixture_body(fixture);
            let state = world.body_state(body);
            let inv_bm = state.inv_mass();
            let inv_bi = state.inv_inertia();
            for child in 0..world.fixture_child_count(fixture) {
                let aabb = world.fixture_aabb(fixture, child).expanded(diameter);
                let (first, last) = proxy_range(&self.proxies, &aabb, self.inverse_diameter);
                for proxy in &self.proxies[first..last] {
                    let a = proxy.index;
                    let ap = positions[a];
                    if !aabb.contains(ap) {
                        continue;
                    }
                    let (d, n) = world.fixture_distance(fixture, ap, child);
                    if d >= diameter {
                        continue;
                    }
                    let inv_am = if flags[a].contains(ParticleFlags::WALL) {
                        0.0
                    } else {
                        particle_inv_mass
                    };
                    let rpn = (ap - state.world_center).perp_dot(n);
                    let denominator = inv_am + inv_bm + inv_bi * rpn * rpn;
                    reserve_doubling(&mut self.body_contacts);
                    self.body_contacts.push(ParticleBodyContact {
                        index: a,
                        body,
                        weight: 1.0 - d * self.inverse_diameter,
                        normal: -n,
                        mass: if denominator > 0.0 { 1.0 / denominator } else { 0.0 },
                    });
                }
            }
        }
    }
}
