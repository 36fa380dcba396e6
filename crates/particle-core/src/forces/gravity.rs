use glam::Vec2;

/// Apply world gravity to every live velocity.
///
/// `v += dt * gravity_scale * gravity`
pub fn apply_gravity(velocities: &mut [Vec2], gravity: Vec2, gravity_scale: f32, dt: f32) {
    let dv = dt * gravity_scale * gravity;
    for v in velocities {
        *v += dv;
    }
}

/// Scale down any velocity faster than the critical speed.
///
/// A particle may cross at most one diameter per step, otherwise the
/// broad-phase would miss contacts. Direction is preserved.
pub fn clamp_velocities(velocities: &mut [Vec2], critical_velocity_squared: f32) {
    for v in velocities {
        let v2 = v.length_squared();
        if v2 > critical_velocity_squared {
            *v *= (critical_velocity_squared / v2).sqrt();
        }
    }
}
