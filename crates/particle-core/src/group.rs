use std::ops::{BitOr, BitOrAssign};

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::math::Transform;
use crate::particle::{ParticleColor, ParticleFlags};
use crate::shape::Shape;

/// Behaviour tags shared by a whole group.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct GroupFlags(u32);

impl GroupFlags {
    /// Members of different solid groups repel by surface depth.
    pub const SOLID: Self = Self(1 << 0);
    /// Members move as one rigid body.
    pub const RIGID: Self = Self(1 << 1);

    #[inline]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for GroupFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for GroupFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Stable handle to a group.
///
/// Handles carry a generation so that a handle to a destroyed group never
/// resolves to a group later created in the same slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GroupId {
    index: u32,
    generation: u32,
}

/// Parameters for [`crate::system::ParticleSystem::create_particle_group`].
#[derive(Clone, Copy)]
pub struct ParticleGroupDef<'a> {
    /// Flags given to every particle of the group.
    pub flags: ParticleFlags,
    pub group_flags: GroupFlags,
    pub position: Vec2,
    pub angle: f32,
    pub linear_velocity: Vec2,
    pub angular_velocity: f32,
    pub color: Option<ParticleColor>,
    /// Strength of pairs and triads built for this group.
    pub strength: f32,
    /// Region to fill, in the group's local frame. `None` creates an empty group.
    pub shape: Option<&'a dyn Shape>,
    /// Destroy the group once compaction leaves it with no members.
    pub destroy_automatically: bool,
    pub user_data: Option<u64>,
}

impl Default for ParticleGroupDef<'_> {
    fn default() -> Self {
        Self {
            flags: ParticleFlags::empty(),
            group_flags: GroupFlags::empty(),
            position: Vec2::ZERO,
            angle: 0.0,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            color: None,
            strength: 1.0,
            shape: None,
            destroy_automatically: true,
            user_data: None,
        }
    }
}

/// Mass properties and motion of a group, derived from its members.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GroupStatistics {
    pub mass: f32,
    /// Rotational inertia about `center`.
    pub inertia: f32,
    pub center: Vec2,
    pub linear_velocity: Vec2,
    pub angular_velocity: f32,
}

impl GroupStatistics {
    /// Mass-weighted centre, velocity and angular velocity of `[first, last)`,
    /// with every particle weighing `particle_mass`.
    pub fn compute(positions: &[Vec2], velocities: &[Vec2], first: usize, last: usize, particle_mass: f32) -> Self {
        let m = particle_mass;
        let mut stats = GroupStatistics::default();
        for i in first..last {
            stats.mass += m;
            stats.center += m * positions[i];
            stats.linear_velocity += m * velocities[i];
        }
        if stats.mass > 0.0 {
            stats.center *= 1.0 / stats.mass;
            stats.linear_velocity *= 1.0 / stats.mass;
        }
        for i in first..last {
            let p = positions[i] - stats.center;
            let v = velocities[i] - stats.linear_velocity;
            stats.inertia += m * p.length_squared();
            stats.angular_velocity += m * p.perp_dot(v);
        }
        if stats.inertia > 0.0 {
            stats.angular_velocity *= 1.0 / stats.inertia;
        }
        stats
    }
}

/// A contiguous range `[first_index, last_index)` of particles.
#[derive(Clone, Debug)]
pub struct ParticleGroup {
    pub(crate) first_index: usize,
    pub(crate) last_index: usize,
    pub(crate) group_flags: GroupFlags,
    pub(crate) strength: f32,
    pub(crate) user_data: Option<u64>,
    pub(crate) destroy_automatically: bool,
    pub(crate) to_be_split: bool,
    pub(crate) transform: Transform,
    stats: GroupStatistics,
    /// System timestamp `stats` was computed at.
    stats_timestamp: Option<u32>,
    prev: Option<GroupId>,
    next: Option<GroupId>,
}

impl ParticleGroup {
    pub(crate) fn new(first_index: usize, last_index: usize, def: &ParticleGroupDef<'_>, transform: Transform) -> Self {
        Self {
            first_index,
            last_index,
            group_flags: def.group_flags,
            strength: def.strength,
            user_data: def.user_data,
            destroy_automatically: def.destroy_automatically,
            to_be_split: false,
            transform,
            stats: GroupStatistics::default(),
            stats_timestamp: None,
            prev: None,
            next: None,
        }
    }

    #[inline]
    pub fn first_index(&self) -> usize {
        self.first_index
    }

    #[inline]
    pub fn last_index(&self) -> usize {
        self.last_index
    }

    #[inline]
    pub fn particle_count(&self) -> usize {
        self.last_index - self.first_index
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.first_index <= index && index < self.last_index
    }

    pub fn group_flags(&self) -> GroupFlags {
        self.group_flags
    }

    pub fn set_group_flags(&mut self, flags: GroupFlags) {
        self.group_flags = flags;
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    pub fn user_data(&self) -> Option<u64> {
        self.user_data
    }

    pub fn set_user_data(&mut self, user_data: Option<u64>) {
        self.user_data = user_data;
    }

    pub fn destroy_automatically(&self) -> bool {
        self.destroy_automatically
    }

    pub fn set_destroy_automatically(&mut self, value: bool) {
        self.destroy_automatically = value;
    }

    /// A rigid group lost members during compaction and may now consist
    /// of disconnected pieces. Splitting is left to the caller.
    pub fn needs_split(&self) -> bool {
        self.to_be_split
    }

    /// Accumulated rigid motion since creation.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn position(&self) -> Vec2 {
        self.transform.p
    }

    pub fn angle(&self) -> f32 {
        self.transform.q.angle()
    }

    /// Statistics, recomputed at most once per system timestamp.
    pub(crate) fn update_statistics(
        &mut self,
        positions: &[Vec2],
        velocities: &[Vec2],
        particle_mass: f32,
        timestamp: u32,
    ) -> GroupStatistics {
        if self.stats_timestamp != Some(timestamp) {
            self.stats = GroupStatistics::compute(positions, velocities, self.first_index, self.last_index, particle_mass);
            self.stats_timestamp = Some(timestamp);
        }
        self.stats
    }
}

struct Slot {
    generation: u32,
    group: Option<ParticleGroup>,
}

/// Arena of groups threaded into a doubly-linked list.
///
/// New groups go to the front. Insert and remove are O(1); removed slots are
/// recycled with a bumped generation.
#[derive(Default)]
pub struct GroupList {
    slots: Vec<Slot>,
    free: Vec<u32>,
    head: Option<GroupId>,
    len: usize,
}

impl GroupList {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn head(&self) -> Option<GroupId> {
        self.head
    }

    pub fn insert(&mut self, mut group: ParticleGroup) -> GroupId {
        group.prev = None;
        group.next = self.head;
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.group = Some(group);
                GroupId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    group: Some(group),
                });
                GroupId { index, generation: 0 }
            }
        };
        if let Some(old_head) = self.head {
            if let Some(g) = self.get_mut(old_head) {
                g.prev = Some(id);
            }
        }
        self.head = Some(id);
        self.len += 1;
        id
    }

    pub fn remove(&mut self, id: GroupId) -> Option<ParticleGroup> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let group = slot.group.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        if let Some(prev) = group.prev {
            if let Some(g) = self.get_mut(prev) {
                g.next = group.next;
            }
        }
        if let Some(next) = group.next {
            if let Some(g) = self.get_mut(next) {
                g.prev = group.prev;
            }
        }
        if self.head == Some(id) {
            self.head = group.next;
        }
        self.len -= 1;
        Some(group)
    }

    pub fn get(&self, id: GroupId) -> Option<&ParticleGroup> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.group.as_ref()
    }

    pub fn get_mut(&mut self, id: GroupId) -> Option<&mut ParticleGroup> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.group.as_mut()
    }

    pub fn contains(&self, id: GroupId) -> bool {
        self.get(id).is_some()
    }

    /// Handles in list order, for passes that mutate groups while walking.
    pub fn ids(&self) -> Vec<GroupId> {
        self.iter().map(|(id, _)| id).collect()
    }

    pub fn iter(&self) -> GroupIter<'_> {
        GroupIter {
            list: self,
            cursor: self.head,
        }
    }

    /// OR of the flags of every group.
    pub fn flag_union(&self) -> GroupFlags {
        self.iter()
            .fold(GroupFlags::empty(), |acc, (_, g)| acc | g.group_flags)
    }
}

pub struct GroupIter<'a> {
    list: &'a GroupList,
    cursor: Option<GroupId>,
}

impl<'a> Iterator for GroupIter<'a> {
    type Item = (GroupId, &'a ParticleGroup);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let group = self.list.get(id)?;
        self.cursor = group.next;
        Some((id, group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(first: usize, last: usize) -> ParticleGroup {
        ParticleGroup::new(first, last, &ParticleGroupDef::default(), Transform::IDENTITY)
    }

    #[test]
    fn test_insert_prepends() {
        let mut list = GroupList::new();
        let a = list.insert(group(0, 1));
        let b = list.insert(group(1, 2));
        let order: Vec<GroupId> = list.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![b, a]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_remove_middle_relinks() {
        let mut list = GroupList::new();
        let a = list.insert(group(0, 1));
        let b = list.insert(group(1, 2));
        let c = list.insert(group(2, 3));
        assert!(list.remove(b).is_some());
        let order: Vec<GroupId> = list.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![c, a]);
        assert!(list.remove(c).is_some());
        assert_eq!(list.head(), Some(a));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_stale_id_does_not_resolve() {
        let mut list = GroupList::new();
        let a = list.insert(group(0, 1));
        list.remove(a);
        let b = list.insert(group(5, 6));
        assert!(list.get(a).is_none(), "stale handle must not see the recycled slot");
        assert_eq!(list.get(b).map(|g| g.first_index()), Some(5));
        assert!(list.remove(a).is_none());
    }

    #[test]
    fn test_statistics_of_spinning_pair() {
        let positions = [Vec2::new(-1.0, 0.0), Vec2::new(1.0, 0.0)];
        let velocities = [Vec2::new(0.0, -1.0), Vec2::new(0.0, 1.0)];
        let stats = GroupStatistics::compute(&positions, &velocities, 0, 2, 0.5);
        assert_eq!(stats.mass, 1.0);
        assert_eq!(stats.center, Vec2::ZERO);
        assert_eq!(stats.linear_velocity, Vec2::ZERO);
        assert!((stats.inertia - 1.0).abs() < 1e-6);
        assert!((stats.angular_velocity - 1.0).abs() < 1e-6, "w = {}", stats.angular_velocity);
    }
}
