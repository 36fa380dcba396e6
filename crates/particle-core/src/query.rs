use glam::Vec2;

use crate::callbacks::{QueryCallback, RaycastCallback};
use crate::grid::{compute_tag, lower_bound, proxy_range, upper_bound};
use crate::math::Aabb;
use crate::system::ParticleSystem;

impl ParticleSystem {
    /// Report every particle strictly inside `aabb`, in proxy order, until
    /// the callback returns `false`.
    pub fn query_aabb<C: QueryCallback + ?Sized>(&mut self, aabb: &Aabb, callback: &mut C) {
        if self.proxies.is_empty() {
            return;
        }
        self.ensure_proxies_sorted();
        let (first, last) = proxy_range(&self.proxies, aabb, self.inverse_diameter);
        let positions = self.particles.position.data();
        for proxy in &self.proxies[first..last] {
            if aabb.contains_strict(positions[proxy.index]) && !callback.report_particle(proxy.index) {
                break;
            }
        }
    }

    /// Cast the segment `p1 -> p2` against every particle, treated as a disc
    /// of the particle radius.
    ///
    /// Hits are reported with the entry point, the outward normal there and
    /// the fraction along the segment. The value the callback returns becomes
    /// the new fraction ceiling; hits beyond it are skipped, and a ceiling of
    /// `0` or less ends the cast. Hits are not sorted by distance.
    pub fn raycast<C: RaycastCallback + ?Sized>(&mut self, p1: Vec2, p2: Vec2, callback: &mut C) {
        if self.proxies.is_empty() {
            return;
        }
        self.ensure_proxies_sorted();
        let inv_d = self.inverse_diameter;
        let lower = p1.min(p2);
        let upper = p1.max(p2);
        let first = lower_bound(
            &self.proxies,
            compute_tag(inv_d * lower.x - 1.0, inv_d * lower.y - 1.0),
        );
        let last = upper_bound(
            &self.proxies,
            compute_tag(inv_d * upper.x + 1.0, inv_d * upper.y + 1.0),
        );
        if first >= last {
            return;
        }

        let radius = self.radius();
        let radius_squared = radius * radius;
        let v = p2 - p1;
        let v2 = match v.length_squared() {
            l if l == 0.0 => f32::MAX,
            l => l,
        };
        let mut fraction = 1.0_f32;
        let positions = self.particles.position.data();
        for proxy in &self.proxies[first..last] {
            let i = proxy.index;
            let p = p1 - positions[i];
            let pv = p.dot(v);
            let determinant = pv * pv - v2 * (p.length_squared() - radius_squared);
            if determinant < 0.0 {
                continue;
            }
            let sqrt_determinant = determinant.sqrt();
            let mut t = (-pv - sqrt_determinant) / v2;
            if t > fraction {
                continue;
            }
            if t < 0.0 {
                t = (-pv + sqrt_determinant) / v2;
                if t < 0.0 || t > fraction {
                    continue;
                }
            }
            let normal = (p + t * v).normalize_or_zero();
            let result = callback.report_particle(i, p1 + t * v, normal, t);
            fraction = fraction.min(result);
            if fraction <= 0.0 {
                break;
            }
        }
    }

    /// Kinetic energy lost to head-on particle collisions this step:
    /// `0.5 * particle_mass * sum(vn^2)` over approaching contacts.
    pub fn compute_collision_energy(&self) -> f32 {
        let velocities = self.particles.velocity.data();
        let sum: f32 = self
            .contacts
            .iter()
            .map(|contact| {
                let vn = (velocities[contact.index_b] - velocities[contact.index_a]).dot(contact.normal);
                if vn < 0.0 {
                    vn * vn
                } else {
                    0.0
                }
            })
            .sum();
        0.5 * self.particle_mass() * sum
    }
}
