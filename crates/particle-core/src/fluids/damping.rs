use crate::contacts::{ParticleBodyContact, ParticleContact};
use crate::particle::ParticleSet;
use crate::world::RigidWorld;

/// Remove approach speed along contact normals.
///
/// Only closing contacts (`vn < 0`) are damped, so separating particles
/// are never held back.
pub fn solve_damping(
    particles: &mut ParticleSet,
    contacts: &[ParticleContact],
    body_contacts: &[ParticleBodyContact],
    world: &mut dyn RigidWorld,
    damping: f32,
    particle_inv_mass: f32,
) {
    let positions = particles.position.data();
    let velocities = particles.velocity.data_mut();
    for contact in body_contacts {
        let a = contact.index;
        let p = positions[a];
        let body_velocity = world.body_state(contact.body).velocity_at(p);
        let n = contact.normal;
        let vn = (body_velocity - velocities[a]).dot(n);
        if vn < 0.0 {
            let f = damping * contact.weight * contact.mass * vn * n;
            velocities[a] += particle_inv_mass * f;
            world.apply_linear_impulse(contact.body, -f, p);
        }
    }
    for contact in contacts {
        let (a, b) = (contact.index_a, contact.index_b);
        let n = contact.normal;
        let vn = (velocities[b] - velocities[a]).dot(n);
        if vn < 0.0 {
            let f = damping * contact.weight * vn * n;
            velocities[a] += f;
            velocities[b] -= f;
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::particle::ParticleFlags;
    use crate::world::EmptyWorld;

    fn pair(va: Vec2, vb: Vec2) -> ParticleSet {
        let mut set = ParticleSet::new();
        set.reallocate(2);
        set.count = 2;
        set.velocity.data_mut()[0] = va;
        set.velocity.data_mut()[1] = vb;
        set
    }

    fn contact() -> ParticleContact {
        ParticleContact {
            index_a: 0,
            index_b: 1,
            flags: ParticleFlags::WATER,
            weight: 0.5,
            normal: Vec2::X,
        }
    }

    #[test]
    fn test_approaching_pair_slows() {
        let mut set = pair(Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0));
        solve_damping(&mut set, &[contact()], &[], &mut EmptyWorld::default(), 1.0, 1.0);
        let v = set.velocity.data();
        assert_eq!(v[0], Vec2::ZERO, "w=0.5, vn=-2 removes exactly the closing speed");
        assert_eq!(v[1], Vec2::ZERO);
    }

    #[test]
    fn test_separating_pair_untouched() {
        let mut set = pair(Vec2::new(-1.0, 0.0), Vec2::new(1.0, 0.0));
        solve_damping(&mut set, &[contact()], &[], &mut EmptyWorld::default(), 1.0, 1.0);
        assert_eq!(set.velocity.data()[0], Vec2::new(-1.0, 0.0));
    }
}
