use glam::Vec2;

use crate::contacts::ParticleContact;
use crate::particle::{ParticleFlags, ParticleSet};

/// Surface tension between tensile particles.
///
/// Two terms along each contact normal: strength A pulls pairs together
/// when their combined contact weight is below that of a bulk particle,
/// strength B pushes along the imbalance of the weighted normals, which is
/// large at the surface and cancels in the bulk.
pub fn solve_tensile(
    particles: &mut ParticleSet,
    contacts: &[ParticleContact],
    surface_tension_strength_a: f32,
    surface_tension_strength_b: f32,
    critical_velocity: f32,
) {
    let count = particles.count;
    let accumulation = &mut particles.accumulation;
    let accumulation2 = &mut particles.accumulation2;
    for i in 0..count {
        accumulation[i] = 0.0;
        accumulation2[i] = Vec2::ZERO;
    }
    for contact in contacts {
        if !contact.flags.contains(ParticleFlags::TENSILE) {
            continue;
        }
        let (a, b) = (contact.index_a, contact.index_b);
        let w = contact.weight;
        accumulation[a] += w;
        accumulation[b] += w;
        let pull = (1.0 - w) * w * contact.normal;
        accumulation2[a] -= pull;
        accumulation2[b] += pull;
    }

    let strength_a = surface_tension_strength_a * critical_velocity;
    let strength_b = surface_tension_strength_b * critical_velocity;
    let velocities = particles.velocity.data_mut();
    for contact in contacts {
        if !contact.flags.contains(ParticleFlags::TENSILE) {
            continue;
        }
        let (a, b) = (contact.index_a, contact.index_b);
        let n = contact.normal;
        let h = accumulation[a] + accumulation[b];
        let s = accumulation2[b] - accumulation2[a];
        let fn_ = (strength_a * (h - 2.0) + strength_b * s.dot(n)) * contact.weight;
        velocities[a] -= fn_ * n;
        velocities[b] += fn_ * n;
    }
}
