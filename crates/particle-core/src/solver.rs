use log::trace;

use crate::constraints::{elastic, solid, spring};
use crate::fluids::pressure::PressureParams;
use crate::fluids::{color_mixing, damping, powder, pressure, tensile, viscosity};
use crate::forces::{collision, gravity, rigid, wall};
use crate::group::GroupFlags;
use crate::math::TimeStep;
use crate::particle::ParticleFlags;
use crate::stats::StepStats;
use crate::system::ParticleSystem;
use crate::world::RigidWorld;

impl ParticleSystem {
    /// Advance every particle by one time step.
    ///
    /// Order of work:
    ///   1. remove zombie particles
    ///   2. gravity, then clamp to the critical speed
    ///   3. swept collision against fixtures
    ///   4. rigid groups, walls
    ///   5. integrate positions
    ///   6. rebuild particle and body contacts
    ///   7. material passes (viscous, powder, tensile, elastic, spring,
    ///      solid, colour mixing) for materials present
    ///   8. pressure, then damping
    ///
    /// Passes 3 to 8 read and write velocities only; positions move once, in 5.
    pub fn step(&mut self, step: &TimeStep, world: &mut dyn RigidWorld) -> StepStats {
        self.timestamp = self.timestamp.wrapping_add(1);
        let mut stats = StepStats::default();
        if self.particles.count == 0 || step.dt <= 0.0 {
            return self.fill_stats(stats);
        }

        self.all_particle_flags = self.particles.flag_union();
        if self.all_particle_flags.contains(ParticleFlags::ZOMBIE) {
            stats.destroyed = self.solve_zombie();
        }
        if self.particles.count == 0 {
            return self.fill_stats(stats);
        }
        self.all_group_flags = self.groups.flag_union();

        let count = self.particles.count;
        let critical_velocity = self.critical_velocity(step);
        let critical_velocity_squared = self.critical_velocity_squared(step);
        let particle_mass = self.particle_mass();
        let particle_inv_mass = self.particle_inv_mass();

        {
            let velocities = &mut self.particles.velocity.data_mut()[..count];
            gravity::apply_gravity(velocities, world.gravity(), self.config.gravity_scale, step.dt);
            gravity::clamp_velocities(velocities, critical_velocity_squared);
        }

        self.ensure_proxies_sorted();
        collision::solve_collision(
            &mut self.particles,
            &self.proxies,
            world,
            step,
            self.particle_diameter,
            particle_mass,
        );
        if self.all_group_flags.contains(GroupFlags::RIGID) {
            rigid::solve_rigid(&mut self.particles, &mut self.groups, step, particle_mass, self.timestamp);
        }
        if self.all_particle_flags.contains(ParticleFlags::WALL) {
            wall::solve_wall(&mut self.particles);
        }

        {
            let velocities = self.particles.velocity.data();
            let positions = self.particles.position.data_mut();
            for i in 0..count {
                positions[i] += step.dt * velocities[i];
            }
        }
        self.proxies_sorted = false;

        self.update_contacts(false);
        self.update_body_contacts(world);

        let flags = self.all_particle_flags;
        if flags.contains(ParticleFlags::VISCOUS) {
            viscosity::solve_viscous(
                &mut self.particles,
                &self.contacts,
                &self.body_contacts,
                world,
                self.config.viscous_strength,
                particle_inv_mass,
            );
        }
        if flags.contains(ParticleFlags::POWDER) {
            powder::solve_powder(
                &mut self.particles,
                &self.contacts,
                &self.body_contacts,
                world,
                self.config.powder_strength,
                critical_velocity,
                particle_inv_mass,
            );
        }
        if flags.contains(ParticleFlags::TENSILE) {
            tensile::solve_tensile(
                &mut self.particles,
                &self.contacts,
                self.config.surface_tension_strength_a,
                self.config.surface_tension_strength_b,
                critical_velocity,
            );
        }
        if flags.contains(ParticleFlags::ELASTIC) {
            elastic::solve_elastic(&mut self.particles, &self.triads, self.config.elastic_strength, step.inv_dt);
        }
        if flags.contains(ParticleFlags::SPRING) {
            spring::solve_spring(&mut self.particles, &self.pairs, self.config.spring_strength, step.inv_dt);
        }
        if self.all_group_flags.contains(GroupFlags::SOLID) {
            solid::solve_solid(&mut self.particles, &self.contacts, self.config.ejection_strength, step.inv_dt);
        }
        if flags.contains(ParticleFlags::COLOR_MIXING) {
            let capacity = self.particles.capacity;
            let flags = self.particles.flags.data();
            let colors = self.particles.color.request(capacity);
            color_mixing::solve_color_mixing(colors, flags, &self.contacts, self.config.color_mixing_strength);
        }

        pressure::solve_pressure(
            &mut self.particles,
            &self.contacts,
            &self.body_contacts,
            world,
            flags,
            &PressureParams {
                pressure_strength: self.config.pressure_strength,
                density: self.config.density,
                particle_diameter: self.particle_diameter,
                particle_inv_mass,
                critical_velocity_squared,
                dt: step.dt,
            },
        );
        damping::solve_damping(
            &mut self.particles,
            &self.contacts,
            &self.body_contacts,
            world,
            self.config.damping_strength,
            particle_inv_mass,
        );

        let stats = self.fill_stats(stats);
        trace!("step {}: {:?}", self.timestamp, stats);
        stats
    }

    fn fill_stats(&self, stats: StepStats) -> StepStats {
        StepStats {
            particle_count: self.particles.count,
            contact_count: self.contacts.len(),
            body_contact_count: self.body_contacts.len(),
            pair_count: self.pairs.len(),
            triad_count: self.triads.len(),
            ..stats
        }
    }
}
