mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{BoxShape, CircleShape, DT};
use glam::Vec2;
use particle_core::{
    settings, DestructionListener, EmptyWorld, GroupFlags, GroupId, ParticleFlags, ParticleGroupDef, ParticleSystem,
    ParticleSystemDef, TimeStep, Transform,
};

#[derive(Default)]
struct Recorder {
    particles: Rc<RefCell<Vec<usize>>>,
    groups: Rc<RefCell<Vec<GroupId>>>,
}

impl DestructionListener for Recorder {
    fn on_particle_destroyed(&mut self, index: usize) {
        self.particles.borrow_mut().push(index);
    }

    fn on_group_destroyed(&mut self, group: GroupId) {
        self.groups.borrow_mut().push(group);
    }
}

fn box_group(system: &mut ParticleSystem, shape: &BoxShape, position: Vec2, flags: ParticleFlags) -> GroupId {
    system.create_particle_group(&ParticleGroupDef {
        flags,
        position,
        shape: Some(shape),
        ..Default::default()
    })
}

#[test]
fn test_box_fill_on_stride_lattice() {
    let mut system = ParticleSystem::default();
    let shape = BoxShape::new(1.0, 1.0);
    let id = box_group(&mut system, &shape, Vec2::new(10.0, -4.0), ParticleFlags::WATER);
    let group = system.group(id).expect("group exists");
    assert_eq!(group.particle_count(), 9, "2x2 box at stride 0.75 holds a 3x3 lattice");
    assert_eq!((group.first_index(), group.last_index()), (0, 9));
    assert!(system.group_buffer().iter().all(|g| *g == Some(id)));
    for p in system.positions() {
        assert!((p.x - 10.0).abs() <= 0.75 + 1e-5 && (p.y + 4.0).abs() <= 0.75 + 1e-5, "{:?} outside box", p);
    }
}

#[test]
fn test_group_velocity_includes_spin() {
    let mut system = ParticleSystem::default();
    let shape = BoxShape::new(1.0, 1.0);
    system.create_particle_group(&ParticleGroupDef {
        position: Vec2::new(1.0, 1.0),
        linear_velocity: Vec2::new(2.0, 0.0),
        angular_velocity: 1.0,
        shape: Some(&shape),
        ..Default::default()
    });
    for (p, v) in system.positions().iter().zip(system.velocities()) {
        let r = *p - Vec2::new(1.0, 1.0);
        let expected = Vec2::new(2.0, 0.0) + Vec2::new(-r.y, r.x);
        assert!((*v - expected).length() < 1e-5, "velocity {:?} expected {:?}", v, expected);
    }
}

#[test]
fn test_spring_group_gets_pairs() {
    let mut system = ParticleSystem::default();
    let shape = BoxShape::new(1.0, 1.0);
    box_group(&mut system, &shape, Vec2::ZERO, ParticleFlags::SPRING);
    assert_eq!(system.pairs().len(), 12, "axis neighbours at 0.75 touch, diagonals at 1.06 do not");
    for pair in system.pairs() {
        assert!((pair.distance - 0.75).abs() < 1e-5);
        assert!(pair.index_a < pair.index_b);
        assert!(pair.flags.contains(ParticleFlags::SPRING));
    }
    assert!(system.triads().is_empty(), "spring material builds no triads");
}

#[test]
fn test_elastic_group_gets_short_triads() {
    let mut system = ParticleSystem::default();
    let shape = BoxShape::new(2.0, 2.0);
    box_group(&mut system, &shape, Vec2::ZERO, ParticleFlags::ELASTIC);
    assert!(!system.triads().is_empty(), "elastic group must be triangulated");
    let limit = settings::MAX_TRIAD_DISTANCE_SQUARED;
    let positions = system.positions();
    for t in system.triads() {
        let (a, b, c) = (positions[t.index_a], positions[t.index_b], positions[t.index_c]);
        assert!(a.distance_squared(b) < limit && b.distance_squared(c) < limit && c.distance_squared(a) < limit);
        assert!(t.index_a != t.index_b && t.index_b != t.index_c && t.index_a != t.index_c);
    }
}

#[test]
fn test_solid_group_depth() {
    let mut system = ParticleSystem::default();
    let shape = BoxShape::new(1.0, 1.0);
    system.create_particle_group(&ParticleGroupDef {
        group_flags: GroupFlags::SOLID,
        shape: Some(&shape),
        ..Default::default()
    });
    let depths = system.depths().expect("solid group allocates depths");
    assert!((depths[4] - 0.75).abs() < 1e-5, "centre sits one relaxed edge deep, got {}", depths[4]);
    for (i, d) in depths.iter().enumerate() {
        if i != 4 {
            assert_eq!(*d, 0.0, "particle {} is on the surface", i);
        }
    }
}

#[test]
fn test_join_groups_makes_contiguous_range_and_seam_pairs() {
    let mut system = ParticleSystem::default();
    let shape = BoxShape::new(1.0, 1.0);
    let recorder = Recorder::default();
    let destroyed_groups = recorder.groups.clone();
    system.set_destruction_listener(Box::new(recorder));

    let b = box_group(&mut system, &shape, Vec2::new(0.75, 0.0), ParticleFlags::SPRING);
    let a = box_group(&mut system, &shape, Vec2::new(-1.5, 0.0), ParticleFlags::SPRING);
    assert_eq!(system.pairs().len(), 24);

    system.join_particle_groups(a, b);

    assert_eq!(system.group_count(), 1);
    assert!(system.group(b).is_none(), "absorbed group is destroyed");
    assert_eq!(*destroyed_groups.borrow(), vec![b]);
    let group = system.group(a).expect("surviving group");
    assert_eq!((group.first_index(), group.last_index()), (0, 18));
    assert!(system.group_buffer().iter().all(|g| *g == Some(a)));

    let positions = system.positions();
    assert!(positions[..9].iter().all(|p| p.x < -0.5), "A's members come first after rotation");
    assert!(positions[9..].iter().all(|p| p.x > -0.1), "B's members follow");

    assert_eq!(system.pairs().len(), 27, "three new pairs across the seam");
    let seam = system
        .pairs()
        .iter()
        .filter(|p| (positions[p.index_a].x < -0.5) != (positions[p.index_b].x < -0.5))
        .count();
    assert_eq!(seam, 3);
}

#[test]
fn test_join_merges_flags_and_survives_compaction() {
    let mut system = ParticleSystem::default();
    let shape = BoxShape::new(1.0, 1.0);
    let a = system.create_particle_group(&ParticleGroupDef {
        group_flags: GroupFlags::SOLID,
        shape: Some(&shape),
        ..Default::default()
    });
    let b = system.create_particle_group(&ParticleGroupDef {
        group_flags: GroupFlags::RIGID,
        position: Vec2::new(5.0, 0.0),
        shape: Some(&shape),
        ..Default::default()
    });
    system.join_particle_groups(a, b);
    system.destroy_particle(0, false);
    system.step(&TimeStep::new(DT), &mut EmptyWorld::default());

    let group = system.group(a).expect("joined group survives");
    assert_eq!(group.group_flags(), GroupFlags::SOLID | GroupFlags::RIGID);
    assert_eq!(group.particle_count(), 17);
    assert!(group.needs_split(), "a rigid group that lost members is flagged for splitting");
}

#[test]
fn test_join_filled_group_into_empty_group() {
    let mut system = ParticleSystem::default();
    let shape = BoxShape::new(1.0, 1.0);
    let a = box_group(&mut system, &shape, Vec2::ZERO, ParticleFlags::WATER);
    let c = box_group(&mut system, &shape, Vec2::new(5.0, 0.0), ParticleFlags::WATER);
    let empty = system.create_particle_group(&ParticleGroupDef::default());

    system.join_particle_groups(empty, a);

    assert!(system.group(a).is_none());
    let merged = system.group(empty).expect("empty group absorbs the other");
    let other = system.group(c).expect("untouched group survives");
    assert_eq!(merged.particle_count(), 9);
    assert_eq!(other.particle_count(), 9);
    assert!(
        merged.last_index() <= other.first_index() || other.last_index() <= merged.first_index(),
        "ranges must not overlap: {:?} vs {:?}",
        (merged.first_index(), merged.last_index()),
        (other.first_index(), other.last_index())
    );
    let members = (merged.first_index(), merged.last_index());
    for (i, g) in system.group_buffer().iter().enumerate() {
        let expected = if members.0 <= i && i < members.1 { empty } else { c };
        assert_eq!(*g, Some(expected), "particle {} tagged with the wrong group", i);
    }
    assert!(
        system.positions()[members.0..members.1].iter().all(|p| p.x.abs() < 1.0),
        "absorbed particles keep their positions"
    );
}

#[test]
fn test_join_empty_group_into_filled_group() {
    let mut system = ParticleSystem::default();
    let shape = BoxShape::new(1.0, 1.0);
    let a = box_group(&mut system, &shape, Vec2::ZERO, ParticleFlags::WATER);
    let c = box_group(&mut system, &shape, Vec2::new(5.0, 0.0), ParticleFlags::WATER);
    let empty = system.create_particle_group(&ParticleGroupDef {
        group_flags: GroupFlags::RIGID,
        ..Default::default()
    });

    system.join_particle_groups(a, empty);

    assert!(system.group(empty).is_none());
    let group = system.group(a).expect("filled group survives");
    assert_eq!((group.first_index(), group.last_index()), (0, 9), "range is unchanged");
    assert_eq!(group.group_flags(), GroupFlags::RIGID, "flags of the empty group are merged");
    assert_eq!(system.group(c).map(|g| (g.first_index(), g.last_index())), Some((9, 18)));
}

#[test]
#[should_panic]
fn test_join_with_self_panics() {
    let mut system = ParticleSystem::default();
    let shape = BoxShape::new(1.0, 1.0);
    let a = box_group(&mut system, &shape, Vec2::ZERO, ParticleFlags::WATER);
    system.join_particle_groups(a, a);
}

#[test]
fn test_destroy_group_keeps_particles() {
    let mut system = ParticleSystem::default();
    let shape = BoxShape::new(1.0, 1.0);
    let id = box_group(&mut system, &shape, Vec2::ZERO, ParticleFlags::WATER);
    system.destroy_particle_group(id);
    assert_eq!(system.group_count(), 0);
    assert_eq!(system.particle_count(), 9);
    assert!(system.group_buffer().iter().all(|g| g.is_none()));
}

#[test]
fn test_destroy_particles_in_group_and_auto_destroy() {
    let mut system = ParticleSystem::default();
    let shape = BoxShape::new(1.0, 1.0);
    let keep = system.create_particle_group(&ParticleGroupDef {
        shape: Some(&shape),
        destroy_automatically: false,
        ..Default::default()
    });
    let drop = box_group(&mut system, &shape, Vec2::new(5.0, 0.0), ParticleFlags::WATER);
    system.destroy_particles_in_group(keep, false);
    system.destroy_particles_in_group(drop, false);
    system.step(&TimeStep::new(DT), &mut EmptyWorld::default());

    assert_eq!(system.particle_count(), 0);
    assert!(system.group(drop).is_none(), "emptied auto-destroy group is removed");
    let kept = system.group(keep).expect("group without auto-destroy survives empty");
    assert_eq!(kept.particle_count(), 0);
}

#[test]
fn test_destroy_particles_in_shape() {
    let mut system = ParticleSystem::default();
    let shape = BoxShape::new(3.0, 3.0);
    box_group(&mut system, &shape, Vec2::ZERO, ParticleFlags::WATER);
    let before = system.particle_count();
    let circle = CircleShape {
        center: Vec2::ZERO,
        radius: 1.0,
    };
    let marked = system.destroy_particles_in_shape(&circle, &Transform::IDENTITY, false);
    let inside = system.positions().iter().filter(|p| p.length() <= 1.0).count();
    assert_eq!(marked, inside);
    assert!(marked > 0);
    system.step(&TimeStep::new(DT), &mut EmptyWorld::default());
    assert_eq!(system.particle_count(), before - marked);
}

#[test]
fn test_group_statistics() {
    let mut system = ParticleSystem::default();
    let shape = BoxShape::new(1.0, 1.0);
    let id = system.create_particle_group(&ParticleGroupDef {
        position: Vec2::new(2.0, 3.0),
        linear_velocity: Vec2::new(1.0, 0.0),
        shape: Some(&shape),
        ..Default::default()
    });
    let stats = system.group_statistics(id);
    assert!((stats.mass - 9.0 * system.particle_mass()).abs() < 1e-5);
    assert!((stats.center - Vec2::new(2.0, 3.0)).length() < 1e-4);
    assert!((stats.linear_velocity - Vec2::new(1.0, 0.0)).length() < 1e-5);
    assert!(stats.angular_velocity.abs() < 1e-5);
}

#[test]
fn test_group_fill_stops_at_max_count() {
    let mut system = ParticleSystem::new(&ParticleSystemDef {
        max_count: 5,
        ..Default::default()
    });
    let shape = BoxShape::new(1.0, 1.0);
    let id = box_group(&mut system, &shape, Vec2::ZERO, ParticleFlags::WATER);
    assert_eq!(system.particle_count(), 5);
    assert_eq!(system.group(id).map(|g| g.particle_count()), Some(5));
}

#[test]
fn test_empty_group() {
    let mut system = ParticleSystem::default();
    let id = system.create_particle_group(&ParticleGroupDef::default());
    assert_eq!(system.group(id).map(|g| g.particle_count()), Some(0));
    assert_eq!(system.groups().count(), 1);
}
