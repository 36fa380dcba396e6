use crate::config::settings;
use crate::contacts::{ParticleBodyContact, ParticleContact};
use crate::particle::{ParticleFlags, ParticleSet};
use crate::world::RigidWorld;

/// Repel powder particles that overlap more than a packed grid would.
///
/// Contacts lighter than `1 - PARTICLE_STRIDE` are left alone so a resting
/// heap keeps its shape.
pub fn solve_powder(
    particles: &mut ParticleSet,
    contacts: &[ParticleContact],
    body_contacts: &[ParticleBodyContact],
    world: &mut dyn RigidWorld,
    powder_strength: f32,
    critical_velocity: f32,
    particle_inv_mass: f32,
) {
    let strength = powder_strength * critical_velocity;
    let min_weight = 1.0 - settings::PARTICLE_STRIDE;
    let flags = particles.flags.data();
    let positions = particles.position.data();
    let velocities = particles.velocity.data_mut();
    for contact in body_contacts {
        let a = contact.index;
        if !flags[a].contains(ParticleFlags::POWDER) || contact.weight <= min_weight {
            continue;
        }
        let f = strength * contact.mass * (contact.weight - min_weight) * contact.normal;
        velocities[a] -= particle_inv_mass * f;
        world.apply_linear_impulse(contact.body, f, positions[a]);
    }
    for contact in contacts {
        if !contact.flags.contains(ParticleFlags::POWDER) || contact.weight <= min_weight {
            continue;
        }
        let f = strength * (contact.weight - min_weight) * contact.normal;
        velocities[contact.index_a] -= f;
        velocities[contact.index_b] += f;
    }
}
