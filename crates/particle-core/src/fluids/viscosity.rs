use crate::contacts::{ParticleBodyContact, ParticleContact};
use crate::particle::{ParticleFlags, ParticleSet};
use crate::world::RigidWorld;

/// Blend the velocities of touching viscous particles.
///
/// Particle pairs exchange `viscous * w * (v_b - v_a)`; a viscous particle
/// touching a body is dragged towards the body's velocity at its position.
pub fn solve_viscous(
    particles: &mut ParticleSet,
    contacts: &[ParticleContact],
    body_contacts: &[ParticleBodyContact],
    world: &mut dyn RigidWorld,
    viscous_strength: f32,
    particle_inv_mass: f32,
) {
    let flags = particles.flags.data();
    let positions = particles.position.data();
    let velocities = particles.velocity.data_mut();
    for contact in body_contacts {
        let a = contact.index;
        if !flags[a].contains(ParticleFlags::VISCOUS) {
            continue;
        }
        let p = positions[a];
        let body_velocity = world.body_state(contact.body).velocity_at(p);
        let f = viscous_strength * contact.mass * contact.weight * (body_velocity - velocities[a]);
        velocities[a] += particle_inv_mass * f;
        world.apply_linear_impulse(contact.body, -f, p);
    }
    for contact in contacts {
        if !contact.flags.contains(ParticleFlags::VISCOUS) {
            continue;
        }
        let (a, b) = (contact.index_a, contact.index_b);
        let f = viscous_strength * contact.weight * (velocities[b] - velocities[a]);
        velocities[a] += f;
        velocities[b] -= f;
    }
}
