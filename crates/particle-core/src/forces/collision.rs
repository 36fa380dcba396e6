use crate::config::settings;
use crate::grid::{proxy_range, Proxy};
use crate::math::{Aabb, RayCastInput, TimeStep};
use crate::particle::ParticleSet;
use crate::world::RigidWorld;

/// Stop particles that would tunnel through a fixture this step.
///
/// Each particle near a fixture is swept from where it sat relative to the
/// body at the start of the step (`body.transform * previous_transform^-1 * p`)
/// to where its velocity takes it. On a hit the particle is snapped to the
/// hit point plus [`settings::LINEAR_SLOP`] along the normal, its velocity
/// becomes whatever reaches that point in one step, and the lost momentum
/// along the normal is pushed into the body.
///
/// `proxies` must be sorted against current positions.
pub fn solve_collision(
    particles: &mut ParticleSet,
    proxies: &[Proxy],
    world: &mut dyn RigidWorld,
    step: &TimeStep,
    particle_diameter: f32,
    particle_mass: f32,
) {
    let count = particles.count;
    if count == 0 {
        return;
    }
    let inverse_diameter = 1.0 / particle_diameter;
    let mut sweep = Aabb::empty();
    {
        let positions = particles.position.data();
        let velocities = particles.velocity.data();
        for i in 0..count {
            let p1 = positions[i];
            let p2 = p1 + step.dt * velocities[i];
            sweep.include(p1);
            sweep.include(p2);
        }
    }

    for fixture in world.overlapping_fixtures(&sweep) {
        if world.fixture_is_sensor(fixture) {
            continue;
        }
        let body = world.fixture_body(fixture);
        let state = world.body_state(body);
        for child in 0..world.fixture_child_count(fixture) {
            let aabb = world.fixture_aabb(fixture, child).expanded(particle_diameter);
            let (first, last) = proxy_range(proxies, &aabb, inverse_diameter);
            for proxy in &proxies[first..last] {
                let a = proxy.index;
                let ap = particles.position.data()[a];
                if !aabb.contains(ap) {
                    continue;
                }
                let av = particles.velocity.data()[a];
                let input = RayCastInput {
                    p1: state.transform.mul_vec(state.previous_transform.mul_t_vec(ap)),
                    p2: ap + step.dt * av,
                    max_fraction: 1.0,
                };
                let Some(output) = world.fixture_raycast(fixture, &input, child) else {
                    continue;
                };
                let f = output.fraction;
                let n = output.normal;
                let p = (1.0 - f) * input.p1 + f * input.p2 + settings::LINEAR_SLOP * n;
                let v = step.inv_dt * (p - ap);
                particles.velocity.data_mut()[a] = v;
                let impulse = particle_mass * (av - v);
                world.apply_linear_impulse(body, impulse.dot(n) * n, p);
            }
        }
    }
}
