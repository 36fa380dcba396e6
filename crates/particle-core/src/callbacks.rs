use glam::Vec2;

use crate::group::GroupId;

/// Notified when particles or groups go away.
pub trait DestructionListener {
    /// A particle flagged with [`crate::particle::ParticleFlags::DESTRUCTION_LISTENER`]
    /// is about to be removed. `index` is its slot before compaction.
    fn on_particle_destroyed(&mut self, _index: usize) {}

    /// Called before the group's bookkeeping is torn down.
    fn on_group_destroyed(&mut self, _group: GroupId) {}
}

/// Receives particles found by an area query.
pub trait QueryCallback {
    /// Return `false` to stop the query.
    fn report_particle(&mut self, index: usize) -> bool;
}

impl<F: FnMut(usize) -> bool> QueryCallback for F {
    fn report_particle(&mut self, index: usize) -> bool {
        self(index)
    }
}

/// Receives particles hit by a ray.
pub trait RaycastCallback {
    /// Returns the new fraction ceiling. `0` or less stops the cast, a value
    /// below the current ceiling clips later hits, `1` keeps going.
    fn report_particle(&mut self, index: usize, point: Vec2, normal: Vec2, fraction: f32) -> f32;
}

impl<F: FnMut(usize, Vec2, Vec2, f32) -> f32> RaycastCallback for F {
    fn report_particle(&mut self, index: usize, point: Vec2, normal: Vec2, fraction: f32) -> f32 {
        self(index, point, normal, fraction)
    }
}
