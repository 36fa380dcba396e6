use log::debug;

use crate::group::GroupFlags;
use crate::particle::ParticleFlags;
use crate::system::ParticleSystem;

impl ParticleSystem {
    /// Remove every particle flagged [`ParticleFlags::ZOMBIE`].
    ///
    /// Survivors keep their relative order and slide down to close the gaps.
    /// Proxies, contacts, body contacts, pairs and triads are rewritten to the
    /// new indices; entries that referenced a removed particle are dropped.
    /// Group ranges shrink to their surviving members. Returns the number of
    /// particles removed.
    pub(crate) fn solve_zombie(&mut self) -> usize {
        let count = self.particles.count;
        let mut new_indices: Vec<Option<usize>> = Vec::with_capacity(count);
        let mut new_count = 0;
        for i in 0..count {
            let flags = self.particles.flags.data()[i];
            if flags.contains(ParticleFlags::ZOMBIE) {
                if flags.contains(ParticleFlags::DESTRUCTION_LISTENER) {
                    if let Some(listener) = self.destruction_listener.as_mut() {
                        listener.on_particle_destroyed(i);
                    }
                }
                new_indices.push(None);
            } else {
                new_indices.push(Some(new_count));
                if i != new_count {
                    self.particles.move_row(i, new_count);
                }
                new_count += 1;
            }
        }

        self.proxies.retain_mut(|proxy| match new_indices[proxy.index] {
            Some(index) => {
                proxy.index = index;
                true
            }
            None => false,
        });
        self.contacts.retain_mut(|contact| {
            match (new_indices[contact.index_a], new_indices[contact.index_b]) {
                (Some(a), Some(b)) => {
                    contact.index_a = a;
                    contact.index_b = b;
                    true
                }
                _ => false,
            }
        });
        self.body_contacts.retain_mut(|contact| match new_indices[contact.index] {
            Some(index) => {
                contact.index = index;
                true
            }
            None => false,
        });
        self.pairs.retain_mut(|pair| match (new_indices[pair.index_a], new_indices[pair.index_b]) {
            (Some(a), Some(b)) => {
                pair.index_a = a;
                pair.index_b = b;
                true
            }
            _ => false,
        });
        self.triads.retain_mut(|triad| {
            match (
                new_indices[triad.index_a],
                new_indices[triad.index_b],
                new_indices[triad.index_c],
            ) {
                (Some(a), Some(b), Some(c)) => {
                    triad.index_a = a;
                    triad.index_b = b;
                    triad.index_c = c;
                    true
                }
                _ => false,
            }
        });

        let mut to_destroy = Vec::new();
        for id in self.groups.ids() {
            let Some(group) = self.groups.get_mut(id) else {
                continue;
            };
            let mut first = new_count;
            let mut last = 0;
            let mut modified = false;
            for i in group.first_index..group.last_index {
                match new_indices[i] {
                    Some(j) => {
                        first = first.min(j);
                        last = last.max(j + 1);
                    }
                    None => modified = true,
                }
            }
            if first < last {
                group.first_index = first;
                group.last_index = last;
                if modified && group.group_flags.contains(GroupFlags::RIGID) {
                    group.to_be_split = true;
                }
            } else {
                group.first_index = 0;
                group.last_index = 0;
                if group.destroy_automatically {
                    to_destroy.push(id);
                }
            }
        }

        self.particles.count = new_count;
        for id in to_destroy {
            self.destroy_particle_group(id);
        }
        self.all_particle_flags = self.particles.flag_union();
        self.all_group_flags = self.groups.flag_union();

        let destroyed = count - new_count;
        debug!("compacted {} destroyed particles, {} remain", destroyed, new_count);
        destroyed
    }

    /// Rotate particle rows `[start, end)` so that `mid` moves to `start`,
    /// and rewrite every stored index to follow.
    pub(crate) fn rotate_buffer(&mut self, start: usize, mid: usize, end: usize) {
        if start == mid || mid == end {
            return;
        }
        let map = |i: usize| {
            if i < start {
                i
            } else if i < mid {
                i + end - mid
            } else if i < end {
                i + start - mid
            } else {
                i
            }
        };
        self.particles.rotate(start, mid, end);
        for proxy in &mut self.proxies {
            proxy.index = map(proxy.index);
        }
        for contact in &mut self.contacts {
            contact.index_a = map(contact.index_a);
            contact.index_b = map(contact.index_b);
        }
        for contact in &mut self.body_contacts {
            contact.index = map(contact.index);
        }
        for pair in &mut self.pairs {
            pair.index_a = map(pair.index_a);
            pair.index_b = map(pair.index_b);
        }
        for triad in &mut self.triads {
            triad.index_a = map(triad.index_a);
            triad.index_b = map(triad.index_b);
            triad.index_c = map(triad.index_c);
        }
        for id in self.groups.ids() {
            let Some(group) = self.groups.get_mut(id) else {
                continue;
            };
            if group.first_index < group.last_index {
                group.first_index = map(group.first_index);
                group.last_index = map(group.last_index - 1) + 1;
            } else {
                group.first_index = map(group.first_index);
                group.last_index = group.first_index;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use crate::particle::{ParticleDef, ParticleFlags};
    use crate::system::ParticleSystem;

    fn line(system: &mut ParticleSystem, n: usize) {
        for i in 0..n {
            system.create_particle(&ParticleDef {
                position: Vec2::new(i as f32 * 0.5, 0.0),
                user_data: Some(i as u64),
                ..Default::default()
            });
        }
    }

    #[test]
    fn test_rotate_buffer_remaps_contacts() {
        let mut system = ParticleSystem::default();
        line(&mut system, 5);
        system.update_contacts(false);
        let before: Vec<(u64, u64)> = system
            .contacts()
            .iter()
            .map(|c| (system.user_data().unwrap()[c.index_a], system.user_data().unwrap()[c.index_b]))
            .collect();
        system.rotate_buffer(1, 3, 5);
        let user_data = system.user_data().unwrap();
        assert_eq!(user_data, &[0, 3, 4, 1, 2]);
        let after: Vec<(u64, u64)> = system
            .contacts()
            .iter()
            .map(|c| (user_data[c.index_a], user_data[c.index_b]))
            .collect();
        assert_eq!(before, after, "contacts must follow their particles");
    }

    #[test]
    fn test_zombie_removal_keeps_order() {
        let mut system = ParticleSystem::default();
        line(&mut system, 6);
        system.destroy_particle(1, false);
        system.destroy_particle(4, false);
        assert_eq!(system.solve_zombie(), 2);
        assert_eq!(system.particle_count(), 4);
        assert_eq!(system.user_data().unwrap(), &[0, 2, 3, 5]);
        assert!(!system.flags().iter().any(|f| f.contains(ParticleFlags::ZOMBIE)));
        assert_eq!(system.proxies().len(), 4);
    }
}
