use crate::contacts::Triad;
use crate::math::Rot;
use crate::particle::{ParticleFlags, ParticleSet};

/// Restore each elastic triangle towards its rest shape.
///
/// The best-fit rotation of the rest offsets onto the current corners is
/// found from the summed cross and dot products, then each corner is
/// driven towards its rotated rest offset about the current centroid.
/// Translation and rotation of the whole triangle cost nothing.
pub fn solve_elastic(particles: &mut ParticleSet, triads: &[Triad], elastic_strength: f32, inv_dt: f32) {
    let strength = inv_dt * elastic_strength;
    let positions = particles.position.data();
    let velocities = particles.velocity.data_mut();
    for triad in triads {
        if !triad.flags.contains(ParticleFlags::ELASTIC) {
            continue;
        }
        let (a, b, c) = (triad.index_a, triad.index_b, triad.index_c);
        let (pa, pb, pc) = (positions[a], positions[b], positions[c]);
        let centroid = (pa + pb + pc) / 3.0;
        let s = triad.pa.perp_dot(pa) + triad.pb.perp_dot(pb) + triad.pc.perp_dot(pc);
        let cs = triad.pa.dot(pa) + triad.pb.dot(pb) + triad.pc.dot(pc);
        let r2 = s * s + cs * cs;
        let inv_r = if r2 == 0.0 { f32::MAX } else { (1.0 / r2).sqrt() };
        let rotation = Rot { s: s * inv_r, c: cs * inv_r };
        let k = strength * triad.strength;
        velocities[a] += k * (rotation.mul_vec(triad.pa) - (pa - centroid));
        velocities[b] += k * (rotation.mul_vec(triad.pb) - (pb - centroid));
        velocities[c] += k * (rotation.mul_vec(triad.pc) - (pc - centroid));
    }
}
