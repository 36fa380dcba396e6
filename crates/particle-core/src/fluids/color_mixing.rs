use crate::contacts::ParticleContact;
use crate::particle::{ParticleColor, ParticleFlags};

/// Exchange colour between touching colour-mixing particles.
///
/// Each channel moves `k * (cb - ca) / 256` from B to A with
/// `k = 256 * strength` clamped to `[0, 256]`. Integer arithmetic keeps the
/// per-channel sum of every pair exact.
pub fn solve_color_mixing(
    colors: &mut [ParticleColor],
    flags: &[ParticleFlags],
    contacts: &[ParticleContact],
    color_mixing_strength: f32,
) {
    let k = ((256.0 * color_mixing_strength) as i32).clamp(0, 256);
    for contact in contacts {
        let (a, b) = (contact.index_a, contact.index_b);
        if !(flags[a] & flags[b]).contains(ParticleFlags::COLOR_MIXING) {
            continue;
        }
        let (ca, cb) = (colors[a], colors[b]);
        let (ra, rb) = mix(ca.r, cb.r, k);
        let (ga, gb) = mix(ca.g, cb.g, k);
        let (ba, bb) = mix(ca.b, cb.b, k);
        let (aa, ab) = mix(ca.a, cb.a, k);
        colors[a] = ParticleColor::new(ra, ga, ba, aa);
        colors[b] = ParticleColor::new(rb, gb, bb, ab);
    }
}

#[inline]
fn mix(a: u8, b: u8, k: i32) -> (u8, u8) {
    let (a, b) = (a as i32, b as i32);
    let d = (k * (b - a)) >> 8;
    ((a + d) as u8, (b - d) as u8)
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;

    fn contact() -> ParticleContact {
        ParticleContact {
            index_a: 0,
            index_b: 1,
            flags: ParticleFlags::COLOR_MIXING,
            weight: 0.5,
            normal: Vec2::X,
        }
    }

    #[test]
    fn test_half_strength_meets_in_middle() {
        let mut colors = vec![ParticleColor::new(0, 0, 0, 255), ParticleColor::new(200, 100, 50, 255)];
        let flags = [ParticleFlags::COLOR_MIXING; 2];
        solve_color_mixing(&mut colors, &flags, &[contact()], 0.5);
        assert_eq!(colors[0], ParticleColor::new(100, 50, 25, 255));
        assert_eq!(colors[1], ParticleColor::new(100, 50, 25, 255));
    }

    #[test]
    fn test_channel_sums_conserved() {
        let mut colors = vec![ParticleColor::new(13, 250, 7, 90), ParticleColor::new(201, 3, 77, 31)];
        let flags = [ParticleFlags::COLOR_MIXING; 2];
        solve_color_mixing(&mut colors, &flags, &[contact()], 0.3);
        assert_eq!(colors[0].r as u32 + colors[1].r as u32, 214);
        assert_eq!(colors[0].g as u32 + colors[1].g as u32, 253);
        assert_eq!(colors[0].a as u32 + colors[1].a as u32, 121);
    }

    #[test]
    fn test_requires_both_particles_mixing() {
        let mut colors = vec![ParticleColor::new(0, 0, 0, 0), ParticleColor::new(255, 255, 255, 255)];
        let flags = [ParticleFlags::COLOR_MIXING, ParticleFlags::WATER];
        solve_color_mixing(&mut colors, &flags, &[contact()], 1.0);
        assert_eq!(colors[0], ParticleColor::new(0, 0, 0, 0));
    }
}
