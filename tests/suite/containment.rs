//! Occupants end up inside the boundary after every step.

use shrinkborder_core::{Boundary, GridWorld, World, find_safe_position};
use shrinkborder_types::{BlockPos, Position, Setting};

use crate::common::{Event, Harness, flat_world, settings};

fn scattered_world() -> GridWorld {
    let mut world = flat_world();
    for x in (-600..=600).step_by(97) {
        for z in (-600..=600).step_by(131) {
            world.spawn(Position::new(f64::from(x) + 0.5, 64.0, f64::from(z) - 0.25));
        }
    }
    world
}

fn all_inside(world: &GridWorld, boundary: &Boundary) -> bool {
    world.occupants().into_iter().all(|id| {
        world
            .occupant_position(id)
            .is_some_and(|p| boundary.contains(p.x, p.z))
    })
}

#[test]
fn every_step_leaves_all_occupants_inside() {
    let mut h = Harness::new(settings(1000.0, 100.0, 150.0, 1, 0), scattered_world());
    h.scheduler.start();

    for _ in 0..20 {
        h.scheduler.on_tick();
        assert!(all_inside(h.scheduler.world(), h.scheduler.boundary()));
    }
    assert_eq!(h.size(), 100.0);
}

#[test]
fn off_center_boundary_contains_occupants() {
    let settings = settings(400.0, 40.0, 60.0, 0, 0)
        .with(Setting::Center { x: -250.0, z: 310.0 })
        .unwrap();
    let mut h = Harness::new(settings, scattered_world());
    h.scheduler.start();
    h.advance(10);

    let boundary = h.scheduler.boundary();
    assert_eq!(boundary.center(), (-250.0, 310.0));
    assert!(all_inside(h.scheduler.world(), boundary));
}

#[test]
fn relocations_are_reported_with_landing_spot() {
    let mut world = flat_world();
    let id = world.spawn(Position::new(700.0, 64.0, 0.0));
    let mut h = Harness::new(settings(1000.0, 100.0, 500.0, 0, 0), world);
    h.scheduler.start();
    h.scheduler.on_tick();

    let landing = Position::new(249.0, 64.0, 0.0);
    assert_eq!(h.scheduler.world().occupant_position(id), Some(landing));
    assert!(h.observer.events().contains(&Event::Relocated(id, landing)));
}

#[test]
fn disabled_teleport_leaves_occupants_outside() {
    let settings = settings(1000.0, 100.0, 500.0, 0, 0)
        .with(Setting::Teleport(false))
        .unwrap();
    let mut world = flat_world();
    let id = world.spawn(Position::new(700.0, 64.0, 0.0));
    let mut h = Harness::new(settings, world);
    h.scheduler.start();
    h.scheduler.on_tick();

    assert_eq!(
        h.scheduler.world().occupant_position(id),
        Some(Position::new(700.0, 64.0, 0.0))
    );
    assert_eq!(h.observer.count(|e| matches!(e, Event::Relocated(..))), 0);
}

#[test]
fn occupant_on_a_ridge_lands_on_the_ridge() {
    let mut world = flat_world();
    // Wall of stone y=64..=67 along x=49.
    for y in 64..=67 {
        world.set_solid(BlockPos::new(49, y, 0), true);
    }
    let id = world.spawn(Position::new(90.0, 67.0, 0.5));
    let mut h = Harness::new(settings(200.0, 100.0, 100.0, 0, 0), world);
    h.scheduler.start();
    h.scheduler.on_tick();

    let landed = h.scheduler.world().occupant_position(id).unwrap();
    assert_eq!((landed.x, landed.y), (49.0, 68.0));
}

#[test]
fn buried_hint_falls_back_to_column_surface() {
    let world = GridWorld::flat(0, 256, 120);
    let found = find_safe_position(&world, 3.0, 10.0, 3.0);
    assert!(found.is_fallback());
    assert_eq!(found.position(), Position::new(3.0, 121.0, 3.0));
}
