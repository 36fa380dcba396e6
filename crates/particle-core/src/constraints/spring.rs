use crate::contacts::Pair;
use crate::particle::{ParticleFlags, ParticleSet};

/// Pull each spring pair back towards its rest length.
///
/// `f = spring_strength / dt * pair.strength * (r0 - r1) / r1 * d`
pub fn solve_spring(particles: &mut ParticleSet, pairs: &[Pair], spring_strength: f32, inv_dt: f32) {
    let strength = inv_dt * spring_strength;
    let positions = particles.position.data();
    let velocities = particles.velocity.data_mut();
    for pair in pairs {
        if !pair.flags.contains(ParticleFlags::SPRING) {
            continue;
        }
        let (a, b) = (pair.index_a, pair.index_b);
        let d = positions[b] - positions[a];
        let r1 = d.length();
        let r1 = if r1 == 0.0 { f32::MAX } else { r1 };
        let f = strength * pair.strength * (pair.distance - r1) / r1 * d;
        velocities[a] -= f;
        velocities[b] += f;
    }
}
