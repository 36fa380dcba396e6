/// Counters describing the outcome of one [`crate::system::ParticleSystem::step`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepStats {
    pub particle_count: usize,
    pub contact_count: usize,
    pub body_contact_count: usize,
    pub pair_count: usize,
    pub triad_count: usize,
    /// Particles removed by compaction at the start of the step.
    pub destroyed: usize,
}
