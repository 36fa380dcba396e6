use glam::Vec2;
use log::debug;

use crate::buffer::{limit_capacity, reserve_doubling};
use crate::callbacks::DestructionListener;
use crate::config::{settings, ParticleSystemDef};
use crate::contacts::{triangle_within, Pair, ParticleBodyContact, ParticleContact, Triad};
use crate::error::ParticleError;
use crate::grid::{refresh_proxies, Proxy};
use crate::group::{GroupFlags, GroupId, GroupIter, GroupList, GroupStatistics, ParticleGroup, ParticleGroupDef};
use crate::math::{cross_sv, Aabb, TimeStep, Transform};
use crate::particle::{ParticleColor, ParticleDef, ParticleFlags, ParticleSet};
use crate::shape::Shape;
use crate::voronoi::{Triangulator, VoronoiDiagram};

/// Owner of all particle state: per-particle columns, the broad-phase
/// proxies, contact sets, persistent pairs and triads, and the group list.
///
/// Particle indices are dense slots `0..particle_count()`. They stay valid
/// until the next compaction, which runs at the start of [`ParticleSystem::step`].
pub struct ParticleSystem {
    pub(crate) timestamp: u32,
    pub(crate) all_particle_flags: ParticleFlags,
    pub(crate) all_group_flags: GroupFlags,
    pub(crate) config: ParticleSystemDef,
    pub(crate) particle_diameter: f32,
    pub(crate) inverse_diameter: f32,
    pub(crate) squared_diameter: f32,
    pub(crate) inverse_density: f32,
    pub(crate) particles: ParticleSet,
    pub(crate) proxies: Vec<Proxy>,
    /// Proxy tags match current positions and the proxy array is sorted.
    pub(crate) proxies_sorted: bool,
    pub(crate) contacts: Vec<ParticleContact>,
    pub(crate) body_contacts: Vec<ParticleBodyContact>,
    pub(crate) pairs: Vec<Pair>,
    pub(crate) triads: Vec<Triad>,
    pub(crate) groups: GroupList,
    pub(crate) destruction_listener: Option<Box<dyn DestructionListener>>,
    pub(crate) triangulator: Box<dyn Triangulator>,
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new(&ParticleSystemDef::default())
    }
}

impl ParticleSystem {
    pub fn new(def: &ParticleSystemDef) -> Self {
        let mut system = Self {
            timestamp: 0,
            all_particle_flags: ParticleFlags::empty(),
            all_group_flags: GroupFlags::empty(),
            config: def.clone(),
            particle_diameter: 1.0,
            inverse_diameter: 1.0,
            squared_diameter: 1.0,
            inverse_density: 1.0,
            particles: ParticleSet::new(),
            proxies: Vec::new(),
            proxies_sorted: true,
            contacts: Vec::new(),
            body_contacts: Vec::new(),
            pairs: Vec::new(),
            triads: Vec::new(),
            groups: GroupList::new(),
            destruction_listener: None,
            triangulator: Box::new(VoronoiDiagram::new()),
        };
        system.set_radius(def.radius);
        system.set_density(def.density);
        system
    }

    // ---------- derived quantities ----------

    /// Grid spacing used to fill group shapes.
    #[inline]
    pub fn particle_stride(&self) -> f32 {
        settings::PARTICLE_STRIDE * self.particle_diameter
    }

    #[inline]
    pub fn particle_mass(&self) -> f32 {
        let stride = self.particle_stride();
        self.config.density * stride * stride
    }

    #[inline]
    pub fn particle_inv_mass(&self) -> f32 {
        settings::PARTICLE_INV_MASS_FACTOR * self.inverse_density * self.inverse_diameter * self.inverse_diameter
    }

    /// Speed that moves a particle one diameter in one step.
    #[inline]
    pub fn critical_velocity(&self, step: &TimeStep) -> f32 {
        self.particle_diameter * step.inv_dt
    }

    #[inline]
    pub fn critical_velocity_squared(&self, step: &TimeStep) -> f32 {
        let v = self.critical_velocity(step);
        v * v
    }

    #[inline]
    pub fn critical_pressure(&self, step: &TimeStep) -> f32 {
        self.config.density * self.critical_velocity_squared(step)
    }

    // ---------- broad-phase ----------

    pub(crate) fn refresh_proxies(&mut self) {
        refresh_proxies(&mut self.proxies, self.particles.position.data(), self.inverse_diameter);
        self.proxies_sorted = true;
    }

    /// Re-sort proxies if particles were created, moved or reordered since
    /// the last refresh.
    pub(crate) fn ensure_proxies_sorted(&mut self) {
        if !self.proxies_sorted {
            self.refresh_proxies();
        }
    }

    // ---------- particles ----------

    /// Create one particle and return its index, or `None` if the capacity
    /// limit (max count or caller-supplied storage) is reached.
    pub fn create_particle(&mut self, def: &ParticleDef) -> Option<usize> {
        let count = self.particles.count;
        if self.config.max_count != 0 && count >= self.config.max_count {
            debug!("particle limit {} reached", self.config.max_count);
            return None;
        }
        if count >= self.particles.capacity() {
            let capacity = if count != 0 { 2 * count } else { settings::MIN_BUFFER_CAPACITY };
            let capacity = limit_capacity(capacity, self.config.max_count);
            let capacity = self.particles.limit_capacity(capacity);
            self.particles.reallocate(capacity);
        }
        if count >= self.particles.capacity() {
            debug!("particle buffer full at {} particles", count);
            return None;
        }
        self.particles.count += 1;
        self.particles.write_row(count, def);
        reserve_doubling(&mut self.proxies);
        self.proxies.push(Proxy { index: count, tag: 0 });
        self.proxies_sorted = false;
        Some(count)
    }

    /// Mark a particle for removal at the next compaction.
    pub fn destroy_particle(&mut self, index: usize, notify: bool) {
        assert!(index < self.particles.count, "particle index {} out of range", index);
        let mut flags = ParticleFlags::ZOMBIE;
        if notify {
            flags |= ParticleFlags::DESTRUCTION_LISTENER;
        }
        self.particles.flags.data_mut()[index] |= flags;
    }

    pub fn destroy_particles_in_group(&mut self, id: GroupId, notify: bool) {
        let (first, last) = self.group_range(id);
        for i in first..last {
            self.destroy_particle(i, notify);
        }
    }

    /// Mark every particle inside `shape` for removal. Returns how many were marked.
    pub fn destroy_particles_in_shape(&mut self, shape: &dyn Shape, xf: &Transform, notify: bool) -> usize {
        let aabb = shape.compute_full_aabb(xf);
        let mut candidates = Vec::new();
        self.query_aabb(&aabb, &mut |i: usize| {
            candidates.push(i);
            true
        });
        let mut destroyed = 0;
        for i in candidates {
            if shape.test_point(xf, self.particles.position.data()[i]) {
                self.destroy_particle(i, notify);
                destroyed += 1;
            }
        }
        destroyed
    }

    // ---------- groups ----------

    fn group_ref(&self, id: GroupId) -> &ParticleGroup {
        match self.groups.get(id) {
            Some(group) => group,
            None => panic!("stale particle group handle {:?}", id),
        }
    }

    fn group_mut_ref(&mut self, id: GroupId) -> &mut ParticleGroup {
        match self.groups.get_mut(id) {
            Some(group) => group,
            None => panic!("stale particle group handle {:?}", id),
        }
    }

    fn group_range(&self, id: GroupId) -> (usize, usize) {
        let group = self.group_ref(id);
        (group.first_index, group.last_index)
    }

    /// Fill `def.shape` with particles on a stride grid and group them.
    ///
    /// Spring materials get a pair per touching couple, elastic materials a
    /// triad per short triangle of the triangulation, and solid groups get
    /// surface depths.
    pub fn create_particle_group(&mut self, def: &ParticleGroupDef<'_>) -> GroupId {
        let stride = self.particle_stride();
        let transform = Transform::new(def.position, def.angle);
        let first_index = self.particles.count;
        if let Some(shape) = def.shape {
            let template = ParticleDef {
                flags: def.flags,
                color: def.color,
                user_data: def.user_data,
                ..Default::default()
            };
            let aabb = shape.compute_full_aabb(&Transform::IDENTITY);
            let mut y = (aabb.lower.y / stride).floor() * stride;
            'fill: while y < aabb.upper.y {
                let mut x = (aabb.lower.x / stride).floor() * stride;
                while x < aabb.upper.x {
                    let local = Vec2::new(x, y);
                    if shape.test_point(&Transform::IDENTITY, local) {
                        let position = transform.mul_vec(local);
                        let particle = ParticleDef {
                            position,
                            velocity: def.linear_velocity + cross_sv(def.angular_velocity, position - def.position),
                            ..template
                        };
                        if self.create_particle(&particle).is_none() {
                            break 'fill;
                        }
                    }
                    x += stride;
                }
                y += stride;
            }
        }
        let last_index = self.particles.count;

        let id = self.groups.insert(ParticleGroup::new(first_index, last_index, def, transform));
        for slot in &mut self.particles.group[first_index..last_index] {
            *slot = Some(id);
        }

        self.update_contacts(true);
        if def.flags.intersects(ParticleFlags::PAIR_FLAGS) {
            let positions = self.particles.position.data();
            for contact in &self.contacts {
                let (a, b) = ordered(contact.index_a, contact.index_b);
                if first_index <= a && b < last_index {
                    reserve_doubling(&mut self.pairs);
                    self.pairs.push(Pair {
                        index_a: a,
                        index_b: b,
                        flags: contact.flags,
                        strength: def.strength,
                        distance: positions[a].distance(positions[b]),
                    });
                }
            }
        }
        if def.flags.intersects(ParticleFlags::TRIAD_FLAGS) {
            self.triangulator.clear();
            for i in first_index..last_index {
                self.triangulator.add_generator(self.particles.position.data()[i], i);
            }
            self.triangulator.generate(stride / 2.0);
            let max_distance_squared = settings::MAX_TRIAD_DISTANCE_SQUARED * self.squared_diameter;
            for (a, b, c) in self.collect_triangles() {
                let positions = self.particles.position.data();
                let flags = self.particles.flags.data();
                let (pa, pb, pc) = (positions[a], positions[b], positions[c]);
                if triangle_within(pa, pb, pc, max_distance_squared) {
                    reserve_doubling(&mut self.triads);
                    self.triads.push(Triad::new(
                        (a, b, c),
                        (pa, pb, pc),
                        flags[a] | flags[b] | flags[c],
                        def.strength,
                    ));
                }
            }
        }
        if def.group_flags.contains(GroupFlags::SOLID) {
            self.compute_depth_for_group(id);
        }
        debug!(
            "created particle group {:?} with {} particles",
            id,
            last_index - first_index
        );
        id
    }

    fn collect_triangles(&self) -> Vec<(usize, usize, usize)> {
        let mut triangles = Vec::new();
        self.triangulator
            .for_each_triangle(&mut |a, b, c| triangles.push((a, b, c)));
        triangles
    }

    /// Merge `b` into `a`.
    ///
    /// Both ranges are rotated to the tail of the buffers so they become
    /// contiguous, new pairs and triads are built across the seam, and `b`
    /// is destroyed.
    pub fn join_particle_groups(&mut self, a: GroupId, b: GroupId) {
        assert_ne!(a, b, "cannot join a particle group with itself");
        let count = self.particles.count;
        let (b_first, b_last) = self.group_range(b);
        if b_first == b_last {
            let b_flags = self.group_ref(b).group_flags;
            self.group_mut_ref(a).group_flags |= b_flags;
            self.destroy_particle_group(b);
            if b_flags.contains(GroupFlags::SOLID) {
                self.compute_depth_for_group(a);
            }
            self.timestamp = self.timestamp.wrapping_add(1);
            debug!("joined empty particle group {:?} into {:?}", b, a);
            return;
        }
        self.rotate_buffer(b_first, b_last, count);
        let (b_first, b_last) = self.group_range(b);
        let (a_first, a_last) = self.group_range(a);
        if a_first == a_last {
            // An empty group takes its place right before the other range.
            let group_a = self.group_mut_ref(a);
            group_a.first_index = b_first;
            group_a.last_index = b_first;
        }
        let (a_first, a_last) = self.group_range(a);
        debug_assert_eq!(b_last, count);
        self.rotate_buffer(a_first, a_last, b_first);
        let (a_first, a_last) = self.group_range(a);
        let (b_first, b_last) = self.group_range(b);
        debug_assert_eq!(a_last, b_first);

        let particle_flags = self.particles.flags.data()[a_first..b_last]
            .iter()
            .fold(ParticleFlags::empty(), |acc, &f| acc | f);
        let strength = self.group_ref(a).strength.min(self.group_ref(b).strength);

        self.update_contacts(true);
        if particle_flags.intersects(ParticleFlags::PAIR_FLAGS) {
            let positions = self.particles.position.data();
            for contact in &self.contacts {
                let (i, j) = ordered(contact.index_a, contact.index_b);
                if a_first <= i && i < a_last && b_first <= j && j < b_last {
                    reserve_doubling(&mut self.pairs);
                    self.pairs.push(Pair {
                        index_a: i,
                        index_b: j,
                        flags: contact.flags,
                        strength,
                        distance: positions[i].distance(positions[j]),
                    });
                }
            }
        }
        if particle_flags.intersects(ParticleFlags::TRIAD_FLAGS) {
            self.triangulator.clear();
            for i in a_first..b_last {
                let flags = self.particles.flags.data()[i];
                if !flags.contains(ParticleFlags::ZOMBIE) {
                    self.triangulator.add_generator(self.particles.position.data()[i], i);
                }
            }
            self.triangulator.generate(self.particle_stride() / 2.0);
            let max_distance_squared = settings::MAX_TRIAD_DISTANCE_SQUARED * self.squared_diameter;
            for (i, j, k) in self.collect_triangles() {
                let from_a = [i, j, k].iter().filter(|&&n| n < b_first).count();
                if from_a == 0 || from_a == 3 {
                    continue;
                }
                let flags = self.particles.flags.data();
                let (fi, fj, fk) = (flags[i], flags[j], flags[k]);
                if !(fi & fj & fk).intersects(ParticleFlags::TRIAD_FLAGS) {
                    continue;
                }
                let positions = self.particles.position.data();
                let (pi, pj, pk) = (positions[i], positions[j], positions[k]);
                if triangle_within(pi, pj, pk, max_distance_squared) {
                    reserve_doubling(&mut self.triads);
                    self.triads
                        .push(Triad::new((i, j, k), (pi, pj, pk), fi | fj | fk, strength));
                }
            }
        }

        for slot in &mut self.particles.group[b_first..b_last] {
            *slot = Some(a);
        }
        let b_flags = self.group_ref(b).group_flags;
        let group_a = self.group_mut_ref(a);
        group_a.group_flags |= b_flags;
        group_a.last_index = b_last;
        let group_flags = group_a.group_flags;
        let group_b = self.group_mut_ref(b);
        group_b.first_index = b_last;
        self.destroy_particle_group(b);

        if group_flags.contains(GroupFlags::SOLID) {
            self.compute_depth_for_group(a);
        }
        // Membership changed; cached group statistics are stale.
        self.timestamp = self.timestamp.wrapping_add(1);
        debug!("joined particle group {:?} into {:?}", b, a);
    }

    /// Remove a group from the list. Its particles survive and become ungrouped.
    pub fn destroy_particle_group(&mut self, id: GroupId) {
        let (first, last) = self.group_range(id);
        if let Some(listener) = self.destruction_listener.as_mut() {
            listener.on_group_destroyed(id);
        }
        for slot in &mut self.particles.group[first..last] {
            *slot = None;
        }
        self.groups.remove(id);
        debug!("destroyed particle group {:?}", id);
    }

    /// Estimate each member's distance to the group surface.
    ///
    /// Members whose in-group contact weights sum below
    /// [`settings::SURFACE_DEPTH_WEIGHT`] are surface particles at depth 0;
    /// the rest are relaxed along contacts with edge cost `1 - weight`, for
    /// at most one pass per member. Unreached members get depth 0.
    pub fn compute_depth_for_group(&mut self, id: GroupId) {
        let (first, last) = self.group_range(id);
        let in_group = |i: usize| first <= i && i < last;
        let accumulation = &mut self.particles.accumulation;
        for w in &mut accumulation[first..last] {
            *w = 0.0;
        }
        for contact in &self.contacts {
            if in_group(contact.index_a) && in_group(contact.index_b) {
                accumulation[contact.index_a] += contact.weight;
                accumulation[contact.index_b] += contact.weight;
            }
        }
        let capacity = self.particles.capacity;
        let depth = self.particles.depth.request(capacity);
        for i in first..last {
            depth[i] = if accumulation[i] < settings::SURFACE_DEPTH_WEIGHT {
                0.0
            } else {
                f32::MAX
            };
        }
        for _ in 0..last - first {
            let mut updated = false;
            for contact in &self.contacts {
                let (a, b) = (contact.index_a, contact.index_b);
                if in_group(a) && in_group(b) {
                    let r = 1.0 - contact.weight;
                    let (ap0, bp0) = (depth[a], depth[b]);
                    let ap1 = bp0 + r;
                    let bp1 = ap0 + r;
                    if ap0 > ap1 {
                        depth[a] = ap1;
                        updated = true;
                    }
                    if bp0 > bp1 {
                        depth[b] = bp1;
                        updated = true;
                    }
                }
            }
            if !updated {
                break;
            }
        }
        for d in &mut depth[first..last] {
            *d = if *d < f32::MAX { *d * self.particle_diameter } else { 0.0 };
        }
    }

    pub fn group(&self, id: GroupId) -> Option<&ParticleGroup> {
        self.groups.get(id)
    }

    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut ParticleGroup> {
        self.groups.get_mut(id)
    }

    /// Groups in list order, newest first.
    pub fn groups(&self) -> GroupIter<'_> {
        self.groups.iter()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn group_of(&self, index: usize) -> Option<GroupId> {
        self.particles.group.get(index).copied().flatten()
    }

    /// Mass, centre and motion of a group, cached until the next step.
    pub fn group_statistics(&mut self, id: GroupId) -> GroupStatistics {
        let particle_mass = self.particle_mass();
        let timestamp = self.timestamp;
        let positions = self.particles.position.data();
        let velocities = self.particles.velocity.data();
        let group = match self.groups.get_mut(id) {
            Some(group) => group,
            None => panic!("stale particle group handle {:?}", id),
        };
        group.update_statistics(positions, velocities, particle_mass, timestamp)
    }

    // ---------- listeners ----------

    pub fn set_destruction_listener(&mut self, listener: Box<dyn DestructionListener>) {
        self.destruction_listener = Some(listener);
    }

    pub fn clear_destruction_listener(&mut self) -> Option<Box<dyn DestructionListener>> {
        self.destruction_listener.take()
    }

    pub fn set_triangulator(&mut self, triangulator: Box<dyn Triangulator>) {
        self.triangulator = triangulator;
    }

    // ---------- buffers ----------

    pub fn particle_count(&self) -> usize {
        self.particles.count
    }

    pub fn capacity(&self) -> usize {
        self.particles.capacity()
    }

    pub fn flags(&self) -> &[ParticleFlags] {
        &self.particles.flags.data()[..self.particles.count]
    }

    pub fn flags_mut(&mut self) -> &mut [ParticleFlags] {
        let count = self.particles.count;
        &mut self.particles.flags.data_mut()[..count]
    }

    pub fn positions(&self) -> &[Vec2] {
        &self.particles.position.data()[..self.particles.count]
    }

    /// Moving particles invalidates the broad-phase until the next refresh.
    pub fn positions_mut(&mut self) -> &mut [Vec2] {
        self.proxies_sorted = false;
        let count = self.particles.count;
        &mut self.particles.position.data_mut()[..count]
    }

    pub fn velocities(&self) -> &[Vec2] {
        &self.particles.velocity.data()[..self.particles.count]
    }

    pub fn velocities_mut(&mut self) -> &mut [Vec2] {
        let count = self.particles.count;
        &mut self.particles.velocity.data_mut()[..count]
    }

    /// `None` until a particle with a colour is created or colours are requested.
    pub fn colors(&self) -> Option<&[ParticleColor]> {
        self.particles
            .color
            .is_allocated()
            .then(|| &self.particles.color.data()[..self.particles.count])
    }

    pub fn colors_mut(&mut self) -> &mut [ParticleColor] {
        let count = self.particles.count;
        &mut self.particles.request_color()[..count]
    }

    pub fn user_data(&self) -> Option<&[u64]> {
        self.particles
            .user_data
            .is_allocated()
            .then(|| &self.particles.user_data.data()[..self.particles.count])
    }

    pub fn user_data_mut(&mut self) -> &mut [u64] {
        let count = self.particles.count;
        &mut self.particles.request_user_data()[..count]
    }

    /// Surface depths; `None` until a solid group exists.
    pub fn depths(&self) -> Option<&[f32]> {
        self.particles
            .depth
            .is_allocated()
            .then(|| &self.particles.depth.data()[..self.particles.count])
    }

    pub fn group_buffer(&self) -> &[Option<GroupId>] {
        &self.particles.group[..self.particles.count]
    }

    pub fn set_flags_buffer(&mut self, buffer: Vec<ParticleFlags>) -> Result<(), ParticleError> {
        self.particles.flags.set_user_buffer(buffer, self.particles.count)?;
        self.particles.fit_capacity_to_user_buffers();
        Ok(())
    }

    pub fn set_position_buffer(&mut self, buffer: Vec<Vec2>) -> Result<(), ParticleError> {
        self.particles.position.set_user_buffer(buffer, self.particles.count)?;
        self.particles.fit_capacity_to_user_buffers();
        Ok(())
    }

    pub fn set_velocity_buffer(&mut self, buffer: Vec<Vec2>) -> Result<(), ParticleError> {
        self.particles.velocity.set_user_buffer(buffer, self.particles.count)?;
        self.particles.fit_capacity_to_user_buffers();
        Ok(())
    }

    pub fn set_color_buffer(&mut self, buffer: Vec<ParticleColor>) -> Result<(), ParticleError> {
        self.particles.color.set_user_buffer(buffer, self.particles.count)?;
        self.particles.fit_capacity_to_user_buffers();
        Ok(())
    }

    pub fn set_user_data_buffer(&mut self, buffer: Vec<u64>) -> Result<(), ParticleError> {
        self.particles.user_data.set_user_buffer(buffer, self.particles.count)?;
        self.particles.fit_capacity_to_user_buffers();
        Ok(())
    }

    /// Live positions as raw bytes (`[f32; 2]` per particle).
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.positions())
    }

    pub fn velocity_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.velocities())
    }

    pub fn flag_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.flags())
    }

    /// Live colours as RGBA8 bytes.
    pub fn color_bytes(&self) -> Option<&[u8]> {
        self.colors().map(bytemuck::cast_slice)
    }

    pub fn contacts(&self) -> &[ParticleContact] {
        &self.contacts
    }

    pub fn body_contacts(&self) -> &[ParticleBodyContact] {
        &self.body_contacts
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn triads(&self) -> &[Triad] {
        &self.triads
    }

    pub fn proxies(&self) -> &[Proxy] {
        &self.proxies
    }

    /// Bounds of all live particles, `None` when empty.
    pub fn bounds(&self) -> Option<Aabb> {
        let positions = self.positions();
        if positions.is_empty() {
            return None;
        }
        let mut aabb = Aabb::empty();
        for &p in positions {
            aabb.include(p);
        }
        Some(aabb)
    }

    // ---------- tunables ----------

    pub fn config(&self) -> &ParticleSystemDef {
        &self.config
    }

    pub fn radius(&self) -> f32 {
        self.particle_diameter / 2.0
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.config.radius = radius;
        self.particle_diameter = 2.0 * radius;
        self.squared_diameter = self.particle_diameter * self.particle_diameter;
        self.inverse_diameter = 1.0 / self.particle_diameter;
        self.proxies_sorted = false;
    }

    pub fn density(&self) -> f32 {
        self.config.density
    }

    pub fn set_density(&mut self, density: f32) {
        self.config.density = density;
        self.inverse_density = 1.0 / density;
    }

    pub fn gravity_scale(&self) -> f32 {
        self.config.gravity_scale
    }

    pub fn set_gravity_scale(&mut self, gravity_scale: f32) {
        self.config.gravity_scale = gravity_scale;
    }

    pub fn damping(&self) -> f32 {
        self.config.damping_strength
    }

    pub fn set_damping(&mut self, damping: f32) {
        self.config.damping_strength = damping;
    }

    pub fn max_count(&self) -> usize {
        self.config.max_count
    }

    /// `0` removes the limit. The limit may not drop below the live count.
    pub fn set_max_count(&mut self, max_count: usize) {
        assert!(
            max_count == 0 || self.particles.count <= max_count,
            "max count {} below live count {}",
            max_count,
            self.particles.count
        );
        self.config.max_count = max_count;
    }

    pub fn set_pressure_strength(&mut self, strength: f32) {
        self.config.pressure_strength = strength;
    }

    pub fn set_elastic_strength(&mut self, strength: f32) {
        self.config.elastic_strength = strength;
    }

    pub fn set_spring_strength(&mut self, strength: f32) {
        self.config.spring_strength = strength;
    }

    pub fn set_viscous_strength(&mut self, strength: f32) {
        self.config.viscous_strength = strength;
    }

    pub fn set_surface_tension_strength_a(&mut self, strength: f32) {
        self.config.surface_tension_strength_a = strength;
    }

    pub fn set_surface_tension_strength_b(&mut self, strength: f32) {
        self.config.surface_tension_strength_b = strength;
    }

    pub fn set_powder_strength(&mut self, strength: f32) {
        self.config.powder_strength = strength;
    }

    pub fn set_ejection_strength(&mut self, strength: f32) {
        self.config.ejection_strength = strength;
    }

    pub fn set_color_mixing_strength(&mut self, strength: f32) {
        self.config.color_mixing_strength = strength;
    }
}

#[inline]
fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}
