use crate::contacts::ParticleContact;
use crate::particle::ParticleSet;

/// Eject particles of different groups that interpenetrate.
///
/// Contacts across group boundaries push apart proportionally to the sum
/// of both particles' surface depths, so deeply buried particles are
/// expelled hardest. Depths must already be allocated.
pub fn solve_solid(particles: &mut ParticleSet, contacts: &[ParticleContact], ejection_strength: f32, inv_dt: f32) {
    let strength = inv_dt * ejection_strength;
    let capacity = particles.capacity;
    let groups = &particles.group;
    let depth = particles.depth.request(capacity);
    let velocities = particles.velocity.data_mut();
    for contact in contacts {
        let (a, b) = (contact.index_a, contact.index_b);
        if groups[a] == groups[b] {
            continue;
        }
        let h = depth[a] + depth[b];
        let f = strength * h * contact.weight * contact.normal;
        velocities[a] -= f;
        velocities[b] += f;
    }
}
