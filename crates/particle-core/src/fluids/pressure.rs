use crate::config::settings;
use crate::contacts::{ParticleBodyContact, ParticleContact};
use crate::particle::{ParticleFlags, ParticleSet};
use crate::world::RigidWorld;

/// Scalars the pressure pass needs from the system.
#[derive(Clone, Copy, Debug)]
pub struct PressureParams {
    pub pressure_strength: f32,
    pub density: f32,
    pub particle_diameter: f32,
    pub particle_inv_mass: f32,
    pub critical_velocity_squared: f32,
    pub dt: f32,
}

/// Push crowded particles apart.
///
/// Each particle's pressure comes from the sum of its contact weights,
/// clamped to `[MIN_PARTICLE_WEIGHT, MAX_PARTICLE_WEIGHT]` and shifted so
/// that a particle with exactly one neighbour's worth of overlap feels
/// nothing. Powder particles exert no pressure. Pairs are pushed along the
/// contact normal by the sum of both pressures; bodies get the reaction.
pub fn solve_pressure(
    particles: &mut ParticleSet,
    contacts: &[ParticleContact],
    body_contacts: &[ParticleBodyContact],
    world: &mut dyn RigidWorld,
    all_particle_flags: ParticleFlags,
    params: &PressureParams,
) {
    let count = particles.count;
    let accumulation = &mut particles.accumulation;
    for w in &mut accumulation[..count] {
        *w = 0.0;
    }
    for contact in body_contacts {
        accumulation[contact.index] += contact.weight;
    }
    for contact in contacts {
        accumulation[contact.index_a] += contact.weight;
        accumulation[contact.index_b] += contact.weight;
    }
    if all_particle_flags.intersects(ParticleFlags::NO_PRESSURE_FLAGS) {
        let flags = particles.flags.data();
        for i in 0..count {
            if flags[i].intersects(ParticleFlags::NO_PRESSURE_FLAGS) {
                accumulation[i] = 0.0;
            }
        }
    }

    let pressure_per_weight = params.pressure_strength * params.density * params.critical_velocity_squared;
    for w in &mut accumulation[..count] {
        let weight = w.min(settings::MAX_PARTICLE_WEIGHT) - settings::MIN_PARTICLE_WEIGHT;
        *w = pressure_per_weight * weight.max(0.0);
    }

    let velocity_per_pressure = params.dt / (params.density * params.particle_diameter);
    let positions = particles.position.data();
    let velocities = particles.velocity.data_mut();
    for contact in body_contacts {
        let a = contact.index;
        let w = contact.weight;
        let h = accumulation[a] + pressure_per_weight * w;
        let f = velocity_per_pressure * w * contact.mass * h * contact.normal;
        velocities[a] -= params.particle_inv_mass * f;
        world.apply_linear_impulse(contact.body, f, positions[a]);
    }
    for contact in contacts {
        let (a, b) = (contact.index_a, contact.index_b);
        let h = accumulation[a] + accumulation[b];
        let f = velocity_per_pressure * contact.weight * h * contact.normal;
        velocities[a] -= f;
        velocities[b] += f;
    }
}
