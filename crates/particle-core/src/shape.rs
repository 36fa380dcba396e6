use glam::Vec2;

use crate::math::{Aabb, Transform};

/// Geometry used to fill groups and to select particles for destruction.
///
/// Compound shapes expose several children; a point belongs to the shape if
/// `test_point` accepts it.
pub trait Shape {
    fn child_count(&self) -> usize {
        1
    }

    fn test_point(&self, xf: &Transform, p: Vec2) -> bool;

    fn compute_aabb(&self, xf: &Transform, child_index: usize) -> Aabb;

    /// Bounds of every child combined.
    fn compute_full_aabb(&self, xf: &Transform) -> Aabb {
        let mut aabb = self.compute_aabb(xf, 0);
        for child in 1..self.child_count() {
            aabb.combine(&self.compute_aabb(xf, child));
        }
        aabb
    }
}
