use glam::Vec2;

/// Rotation stored as sine/cosine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rot {
    pub s: f32,
    pub c: f32,
}

impl Rot {
    pub const IDENTITY: Self = Self { s: 0.0, c: 1.0 };

    pub fn new(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self { s, c }
    }

    pub fn angle(&self) -> f32 {
        self.s.atan2(self.c)
    }

    /// Rotate a vector.
    #[inline]
    pub fn mul_vec(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.c * v.x - self.s * v.y, self.s * v.x + self.c * v.y)
    }

    /// Inverse-rotate a vector.
    #[inline]
    pub fn mul_t_vec(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.c * v.x + self.s * v.y, -self.s * v.x + self.c * v.y)
    }

    /// Compose two rotations: `self * other`.
    #[inline]
    pub fn mul(&self, other: &Rot) -> Rot {
        Rot {
            s: self.s * other.c + self.c * other.s,
            c: self.c * other.c - self.s * other.s,
        }
    }
}

/// Rigid transform: rotation followed by translation.
///
/// The rotation is not required to be normalized. Rigid-group kinematics
/// builds a "velocity transform" whose `q` is `((c - 1) / dt, s / dt)`,
/// which is why this type does not wrap `glam::Affine2`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub p: Vec2,
    pub q: Rot,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        p: Vec2::ZERO,
        q: Rot::IDENTITY,
    };

    pub fn new(position: Vec2, angle: f32) -> Self {
        Self {
            p: position,
            q: Rot::new(angle),
        }
    }

    #[inline]
    pub fn mul_vec(&self, v: Vec2) -> Vec2 {
        self.q.mul_vec(v) + self.p
    }

    /// Map a world point into this transform's local frame.
    #[inline]
    pub fn mul_t_vec(&self, v: Vec2) -> Vec2 {
        self.q.mul_t_vec(v - self.p)
    }

    /// Compose: applying the result equals applying `other` then `self`.
    #[inline]
    pub fn mul(&self, other: &Transform) -> Transform {
        Transform {
            q: self.q.mul(&other.q),
            p: self.q.mul_vec(other.p) + self.p,
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub lower: Vec2,
    pub upper: Vec2,
}

impl Aabb {
    pub fn new(lower: Vec2, upper: Vec2) -> Self {
        Self { lower, upper }
    }

    /// An inverted box that any `include` call will replace.
    pub fn empty() -> Self {
        Self {
            lower: Vec2::splat(f32::MAX),
            upper: Vec2::splat(-f32::MAX),
        }
    }

    pub fn include(&mut self, p: Vec2) {
        self.lower = self.lower.min(p);
        self.upper = self.upper.max(p);
    }

    pub fn combine(&mut self, other: &Aabb) {
        self.lower = self.lower.min(other.lower);
        self.upper = self.upper.max(other.upper);
    }

    pub fn expanded(&self, margin: f32) -> Aabb {
        Aabb {
            lower: self.lower - Vec2::splat(margin),
            upper: self.upper + Vec2::splat(margin),
        }
    }

    /// Inclusive containment test.
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        self.lower.x <= p.x && p.x <= self.upper.x && self.lower.y <= p.y && p.y <= self.upper.y
    }

    /// Exclusive containment test.
    #[inline]
    pub fn contains_strict(&self, p: Vec2) -> bool {
        self.lower.x < p.x && p.x < self.upper.x && self.lower.y < p.y && p.y < self.upper.y
    }
}

/// Segment `p1 -> p1 + max_fraction * (p2 - p1)` cast against a fixture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayCastInput {
    pub p1: Vec2,
    pub p2: Vec2,
    pub max_fraction: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayCastOutput {
    pub normal: Vec2,
    pub fraction: f32,
}

/// Duration of one simulation step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeStep {
    pub dt: f32,
    pub inv_dt: f32,
}

impl TimeStep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            inv_dt: if dt > 0.0 { 1.0 / dt } else { 0.0 },
        }
    }
}

/// Cross product of a scalar (angular velocity) and a vector.
#[inline]
pub fn cross_sv(s: f32, v: Vec2) -> Vec2 {
    Vec2::new(-s * v.y, s * v.x)
}
