/// Engine constants shared by the broad-phase, group fill and solver passes.
pub mod settings {
    /// Initial capacity of every growable particle buffer.
    pub const MIN_BUFFER_CAPACITY: usize = 256;
    /// Grid spacing used to fill group shapes, as a fraction of the diameter.
    pub const PARTICLE_STRIDE: f32 = 0.75;
    /// Contact weight sum below which a particle exerts no pressure.
    pub const MIN_PARTICLE_WEIGHT: f32 = 1.0;
    /// Contact weight sum at which pressure saturates.
    pub const MAX_PARTICLE_WEIGHT: f32 = 5.0;
    /// Longest triad edge accepted from triangulation, in diameters.
    pub const MAX_TRIAD_DISTANCE: f32 = 2.0;
    pub const MAX_TRIAD_DISTANCE_SQUARED: f32 = MAX_TRIAD_DISTANCE * MAX_TRIAD_DISTANCE;
    /// Offset along the hit normal applied when a particle is snapped to a fixture.
    pub const LINEAR_SLOP: f32 = 0.005;
    /// Accumulated contact weight below which a solid particle counts as surface.
    pub const SURFACE_DEPTH_WEIGHT: f32 = 0.8;
    /// Empirical factor in the particle inverse mass.
    pub const PARTICLE_INV_MASS_FACTOR: f32 = 1.777777;
}

/// Construction parameters and global strengths for a particle system.
///
/// Every field has a runtime setter on [`crate::system::ParticleSystem`];
/// this struct only fixes the initial values.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleSystemDef {
    pub radius: f32,
    pub density: f32,
    pub gravity_scale: f32,
    /// Hard cap on live particles. `0` means unlimited.
    pub max_count: usize,
    pub pressure_strength: f32,
    pub damping_strength: f32,
    pub elastic_strength: f32,
    pub spring_strength: f32,
    pub viscous_strength: f32,
    pub surface_tension_strength_a: f32,
    pub surface_tension_strength_b: f32,
    pub powder_strength: f32,
    pub ejection_strength: f32,
    pub color_mixing_strength: f32,
}

impl Default for ParticleSystemDef {
    fn default() -> Self {
        Self {
            radius: 0.5,
            density: 1.0,
            gravity_scale: 1.0,
            max_count: 0,
            pressure_strength: 0.05,
            damping_strength: 1.0,
            elastic_strength: 0.25,
            spring_strength: 0.25,
            viscous_strength: 0.25,
            surface_tension_strength_a: 0.1,
            surface_tension_strength_b: 0.2,
            powder_strength: 0.5,
            ejection_strength: 0.5,
            color_mixing_strength: 0.5,
        }
    }
}
