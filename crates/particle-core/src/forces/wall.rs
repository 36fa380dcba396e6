use glam::Vec2;

use crate::particle::{ParticleFlags, ParticleSet};

/// Pin wall particles by zeroing their velocity.
pub fn solve_wall(particles: &mut ParticleSet) {
    let count = particles.count;
    let flags = particles.flags.data();
    let velocities = particles.velocity.data_mut();
    for i in 0..count {
        if flags[i].contains(ParticleFlags::WALL) {
            velocities[i] = Vec2::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::ParticleDef;

    #[test]
    fn test_only_walls_stop() {
        let mut set = ParticleSet::new();
        set.reallocate(2);
        set.count = 2;
        set.write_row(
            0,
            &ParticleDef {
                flags: ParticleFlags::WALL,
                velocity: Vec2::new(1.0, 1.0),
                ..Default::default()
            },
        );
        set.write_row(
            1,
            &ParticleDef {
                velocity: Vec2::new(1.0, 1.0),
                ..Default::default()
            },
        );
        solve_wall(&mut set);
        assert_eq!(set.velocity.data()[0], Vec2::ZERO);
        assert_eq!(set.velocity.data()[1], Vec2::new(1.0, 1.0));
    }
}
