use crate::group::{GroupFlags, GroupList};
use crate::math::{Rot, TimeStep, Transform};
use crate::particle::ParticleSet;

/// Move every rigid group as one body.
///
/// The group's linear and angular velocity over this step define a rigid
/// displacement about its centre of mass. That displacement is folded into
/// the group transform, and every member gets the velocity that carries it
/// along the displacement in exactly one step.
pub fn solve_rigid(
    particles: &mut ParticleSet,
    groups: &mut GroupList,
    step: &TimeStep,
    particle_mass: f32,
    timestamp: u32,
) {
    for id in groups.ids() {
        let Some(group) = groups.get_mut(id) else {
            continue;
        };
        if !group.group_flags.contains(GroupFlags::RIGID) {
            continue;
        }
        let stats = group.update_statistics(
            particles.position.data(),
            particles.velocity.data(),
            particle_mass,
            timestamp,
        );
        let rotation = Rot::new(step.dt * stats.angular_velocity);
        let displacement = Transform {
            p: step.dt * stats.linear_velocity + stats.center - rotation.mul_vec(stats.center),
            q: rotation,
        };
        group.transform = displacement.mul(&group.transform);

        let velocity_transform = Transform {
            p: step.inv_dt * displacement.p,
            q: Rot {
                s: step.inv_dt * rotation.s,
                c: step.inv_dt * (rotation.c - 1.0),
            },
        };
        let (first, last) = (group.first_index, group.last_index);
        let positions = particles.position.data();
        let velocities = particles.velocity.data_mut();
        for i in first..last {
            velocities[i] = velocity_transform.mul_vec(positions[i]);
        }
    }
}
