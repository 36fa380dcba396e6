use std::ops::{BitAnd, BitOr, BitOrAssign};

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::buffer::ParticleBuffer;
use crate::group::GroupId;

/// Material and behaviour tags of one particle.
///
/// A particle with no bits set is plain water. Bits combine freely; a
/// contact between two particles carries the union of both sets.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct ParticleFlags(u32);

impl ParticleFlags {
    pub const WATER: Self = Self(0);
    /// Marked for removal at the next compaction.
    pub const ZOMBIE: Self = Self(1 << 1);
    /// Immovable; velocity is zeroed every step.
    pub const WALL: Self = Self(1 << 2);
    pub const SPRING: Self = Self(1 << 3);
    pub const ELASTIC: Self = Self(1 << 4);
    pub const VISCOUS: Self = Self(1 << 5);
    pub const POWDER: Self = Self(1 << 6);
    pub const TENSILE: Self = Self(1 << 7);
    pub const COLOR_MIXING: Self = Self(1 << 8);
    /// Report removal to the destruction listener.
    pub const DESTRUCTION_LISTENER: Self = Self(1 << 9);

    /// Materials that get persistent pairs when a group is built.
    pub const PAIR_FLAGS: Self = Self::SPRING;
    /// Materials that get persistent triads when a group is built.
    pub const TRIAD_FLAGS: Self = Self::ELASTIC;
    /// Materials excluded from the pressure pass.
    pub const NO_PRESSURE_FLAGS: Self = Self::POWDER;

    #[inline]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// All bits of `other` are set.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// At least one bit of `other` is set.
    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for ParticleFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ParticleFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ParticleFlags {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

/// 8-bit RGBA colour, laid out for direct upload.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct ParticleColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ParticleColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0 && self.a == 0
    }
}

/// Initial state of a single particle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ParticleDef {
    pub flags: ParticleFlags,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Setting a colour allocates the colour column for every particle.
    pub color: Option<ParticleColor>,
    /// Setting user data allocates the user-data column for every particle.
    pub user_data: Option<u64>,
}

/// Per-particle columns, indexed by particle slot `0..count`.
///
/// `flags`, `position`, `velocity` and `group` are always allocated.
/// `color`, `user_data` and `depth` are allocated the first time they are
/// needed and from then on track the same capacity. Slots past `count`
/// hold stale data.
pub struct ParticleSet {
    pub count: usize,
    pub(crate) capacity: usize,
    pub flags: ParticleBuffer<ParticleFlags>,
    pub position: ParticleBuffer<Vec2>,
    pub velocity: ParticleBuffer<Vec2>,
    pub color: ParticleBuffer<ParticleColor>,
    pub user_data: ParticleBuffer<u64>,
    /// Distance to the group surface, used by solid groups.
    pub depth: ParticleBuffer<f32>,
    pub group: Vec<Option<GroupId>>,
    /// Scratch scalar per particle (contact weight sums, pressure).
    pub(crate) accumulation: Vec<f32>,
    /// Scratch vector per particle (surface tension pull).
    pub(crate) accumulation2: Vec<Vec2>,
}

impl Default for ParticleSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticleSet {
    pub fn new() -> Self {
        Self {
            count: 0,
            capacity: 0,
            flags: ParticleBuffer::eager(ParticleFlags::empty),
            position: ParticleBuffer::eager(|| Vec2::ZERO),
            velocity: ParticleBuffer::eager(|| Vec2::ZERO),
            color: ParticleBuffer::deferred(ParticleColor::default),
            user_data: ParticleBuffer::deferred(|| 0),
            depth: ParticleBuffer::deferred(|| 0.0),
            group: Vec::new(),
            accumulation: Vec::new(),
            accumulation2: Vec::new(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Clamp a proposed capacity to every caller-supplied column.
    pub fn limit_capacity(&self, capacity: usize) -> usize {
        let capacity = self.flags.limit_capacity(capacity);
        let capacity = self.position.limit_capacity(capacity);
        let capacity = self.velocity.limit_capacity(capacity);
        let capacity = self.color.limit_capacity(capacity);
        self.user_data.limit_capacity(capacity)
    }

    /// Shrink the working capacity after a caller-supplied column replaced
    /// storage shorter than the current capacity.
    pub(crate) fn fit_capacity_to_user_buffers(&mut self) {
        self.capacity = self.limit_capacity(self.capacity);
    }

    /// Grow every allocated column to `capacity` slots.
    pub fn reallocate(&mut self, capacity: usize) {
        if capacity <= self.capacity {
            return;
        }
        self.flags.reallocate(capacity);
        self.position.reallocate(capacity);
        self.velocity.reallocate(capacity);
        self.color.reallocate(capacity);
        self.user_data.reallocate(capacity);
        self.depth.reallocate(capacity);
        self.group.resize(capacity, None);
        self.accumulation.resize(capacity, 0.0);
        self.accumulation2.resize(capacity, Vec2::ZERO);
        self.capacity = capacity;
    }

    /// Write `def` into slot `index`, allocating optional columns it needs.
    pub(crate) fn write_row(&mut self, index: usize, def: &ParticleDef) {
        self.flags.data_mut()[index] = def.flags;
        self.position.data_mut()[index] = def.position;
        self.velocity.data_mut()[index] = def.velocity;
        self.group[index] = None;
        if self.depth.is_allocated() {
            self.depth.data_mut()[index] = 0.0;
        }
        if self.color.is_allocated() || def.color.is_some() {
            let capacity = self.capacity;
            self.color.request(capacity)[index] = def.color.unwrap_or_default();
        }
        if self.user_data.is_allocated() || def.user_data.is_some() {
            let capacity = self.capacity;
            self.user_data.request(capacity)[index] = def.user_data.unwrap_or_default();
        }
    }

    /// Move row `from` down into slot `to` across every column.
    pub(crate) fn move_row(&mut self, from: usize, to: usize) {
        self.flags.move_row(from, to);
        self.position.move_row(from, to);
        self.velocity.move_row(from, to);
        self.color.move_row(from, to);
        self.user_data.move_row(from, to);
        self.depth.move_row(from, to);
        self.group.swap(from, to);
    }

    /// Rotate `[start, end)` of every column so that `mid` becomes `start`.
    pub(crate) fn rotate(&mut self, start: usize, mid: usize, end: usize) {
        self.flags.rotate(start, mid, end);
        self.position.rotate(start, mid, end);
        self.velocity.rotate(start, mid, end);
        self.color.rotate(start, mid, end);
        self.user_data.rotate(start, mid, end);
        self.depth.rotate(start, mid, end);
        self.group[start..end].rotate_left(mid - start);
    }

    /// OR of the flags of all live particles.
    pub fn flag_union(&self) -> ParticleFlags {
        self.flags.data()[..self.count]
            .iter()
            .fold(ParticleFlags::empty(), |acc, &f| acc | f)
    }

    /// Colour column, allocating it on first use.
    pub fn request_color(&mut self) -> &mut [ParticleColor] {
        let capacity = self.capacity;
        self.color.request(capacity)
    }

    pub fn request_depth(&mut self) -> &mut [f32] {
        let capacity = self.capacity;
        self.depth.request(capacity)
    }

    pub fn request_user_data(&mut self) -> &mut [u64] {
        let capacity = self.capacity;
        self.user_data.request(capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_algebra() {
        let f = ParticleFlags::SPRING | ParticleFlags::VISCOUS;
        assert!(f.contains(ParticleFlags::SPRING));
        assert!(!f.contains(ParticleFlags::SPRING | ParticleFlags::WALL));
        assert!(f.intersects(ParticleFlags::VISCOUS | ParticleFlags::WALL));
        assert!(ParticleFlags::WATER.is_empty());
        assert_eq!(f.bits(), (1 << 3) | (1 << 5));
    }

    #[test]
    fn test_write_row_allocates_color_lazily() {
        let mut set = ParticleSet::new();
        set.reallocate(4);
        set.write_row(0, &ParticleDef::default());
        assert!(!set.color.is_allocated(), "plain particle must not allocate colours");
        set.write_row(
            1,
            &ParticleDef {
                color: Some(ParticleColor::new(1, 2, 3, 4)),
                ..Default::default()
            },
        );
        assert!(set.color.is_allocated());
        assert_eq!(set.color.data().len(), 4, "colour column tracks set capacity");
        assert_eq!(set.color.data()[1], ParticleColor::new(1, 2, 3, 4));
    }

    #[test]
    fn test_rotate_keeps_columns_aligned() {
        let mut set = ParticleSet::new();
        set.reallocate(5);
        for i in 0..5 {
            set.write_row(
                i,
                &ParticleDef {
                    position: Vec2::new(i as f32, 0.0),
                    user_data: Some(i as u64),
                    ..Default::default()
                },
            );
        }
        set.count = 5;
        set.rotate(0, 2, 5);
        let xs: Vec<f32> = set.position.data().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0, 0.0, 1.0]);
        assert_eq!(set.user_data.data(), &[2, 3, 4, 0, 1]);
    }
}
