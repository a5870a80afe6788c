use glam::IVec2;
use pistonworks_core::{
    ActuatorId, Axis, Command, EntityId, Event, PartSet, StructureId, TileGrid, TILE_SIZE,
};
use pistonworks_system_collision::{collides_if_moved, Colliders};
use pistonworks_world::{self as world, World};

fn spawn(world: &mut World, position: IVec2, rows: &[&str]) -> StructureId {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnStructure {
            position,
            grid: TileGrid::from_rows(rows).expect("valid layout"),
        },
        &mut events,
    );
    match events.as_slice() {
        [Event::StructureSpawned { structure }] => *structure,
        other => panic!("unexpected events: {other:?}"),
    }
}

/// Two blocks one tile apart joined by a vertical actuator covering
/// pixels `(0, 16)..(16, 32)`.
fn linked_pair(world: &mut World) -> ActuatorId {
    let top = spawn(world, IVec2::ZERO, &["@"]);
    let bottom = spawn(world, IVec2::new(0, 2 * TILE_SIZE), &["@"]);
    let mut events = Vec::new();
    world::apply(
        world,
        Command::LinkActuator {
            a: top,
            b: bottom,
            axis: Axis::Vertical,
            offset_a: IVec2::new(0, TILE_SIZE),
            offset_b: IVec2::ZERO,
        },
        &mut events,
    );
    match events.as_slice() {
        [Event::ActuatorLinked { actuator, .. }] => *actuator,
        other => panic!("unexpected events: {other:?}"),
    }
}

fn only_actuator(actuator: ActuatorId) -> PartSet {
    let mut parts = PartSet::new();
    let _ = parts.insert_actuator(actuator);
    parts
}

fn single(structure: StructureId) -> PartSet {
    let mut parts = PartSet::new();
    let _ = parts.insert_structure(structure);
    parts
}

#[test]
fn empty_set_never_collides() {
    let mut world = World::new();
    let _ = spawn(&mut world, IVec2::ZERO, &["##"]);

    assert!(!collides_if_moved(
        &world,
        &PartSet::new(),
        IVec2::ZERO,
        Colliders::of(&world),
        None,
    ));
}

#[test]
fn own_members_are_ignored_when_filtered() {
    let mut world = World::new();
    let block = spawn(&mut world, IVec2::ZERO, &["@"]);
    let parts = single(block);
    let foreign = |entity: EntityId| parts.is_foreign(entity);

    assert!(collides_if_moved(
        &world,
        &parts,
        IVec2::new(1, 0),
        Colliders::of(&world),
        None,
    ));
    assert!(!collides_if_moved(
        &world,
        &parts,
        IVec2::new(1, 0),
        Colliders::of(&world),
        Some(&foreign),
    ));
}

#[test]
fn neighbour_blocks_only_when_tiles_overlap() {
    let mut world = World::new();
    let block = spawn(&mut world, IVec2::ZERO, &["@"]);
    let _ = spawn(&mut world, IVec2::new(TILE_SIZE, TILE_SIZE), &["@"]);
    let parts = single(block);
    let foreign = |entity: EntityId| parts.is_foreign(entity);

    // Touching edges do not count as overlap.
    assert!(!collides_if_moved(
        &world,
        &parts,
        IVec2::new(0, TILE_SIZE),
        Colliders::of(&world),
        Some(&foreign),
    ));
    assert!(collides_if_moved(
        &world,
        &parts,
        IVec2::new(1, TILE_SIZE),
        Colliders::of(&world),
        Some(&foreign),
    ));
}

#[test]
fn terrain_only_ignores_dynamic_bodies() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureTerrain {
            origin: IVec2::new(0, 2 * TILE_SIZE),
            grid: TileGrid::from_rows(&["###"]).expect("valid layout"),
        },
        &mut events,
    );
    let block = spawn(&mut world, IVec2::new(0, TILE_SIZE), &["@"]);
    let _ = spawn(&mut world, IVec2::new(TILE_SIZE, TILE_SIZE), &["@"]);
    let parts = single(block);

    assert!(!collides_if_moved(
        &world,
        &parts,
        IVec2::new(1, 0),
        Colliders::terrain_only(&world),
        None,
    ));
    assert!(collides_if_moved(
        &world,
        &parts,
        IVec2::new(0, 1),
        Colliders::terrain_only(&world),
        None,
    ));
    assert!(!collides_if_moved(
        &world,
        &parts,
        IVec2::new(0, 1),
        Colliders {
            terrain: None,
            bodies: None,
        },
        None,
    ));
}

#[test]
fn actuator_rectangle_hits_terrain() {
    let mut world = World::new();
    let actuator = linked_pair(&mut world);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureTerrain {
            origin: IVec2::new(TILE_SIZE, TILE_SIZE),
            grid: TileGrid::from_rows(&["#"]).expect("valid layout"),
        },
        &mut events,
    );
    let parts = only_actuator(actuator);

    assert!(!collides_if_moved(
        &world,
        &parts,
        IVec2::ZERO,
        Colliders::terrain_only(&world),
        None,
    ));
    assert!(collides_if_moved(
        &world,
        &parts,
        IVec2::new(1, 0),
        Colliders::terrain_only(&world),
        None,
    ));
}

#[test]
fn actuator_rectangle_hits_foreign_body() {
    let mut world = World::new();
    let actuator = linked_pair(&mut world);
    let _ = spawn(&mut world, IVec2::new(-TILE_SIZE, TILE_SIZE), &["#"]);
    let parts = only_actuator(actuator);
    let foreign = |entity: EntityId| parts.is_foreign(entity);

    assert!(!collides_if_moved(
        &world,
        &parts,
        IVec2::ZERO,
        Colliders::of(&world),
        Some(&foreign),
    ));
    assert!(collides_if_moved(
        &world,
        &parts,
        IVec2::new(-1, 0),
        Colliders::of(&world),
        Some(&foreign),
    ));
}

#[test]
fn actuator_skipped_by_filter_does_not_hit_itself() {
    let mut world = World::new();
    let actuator = linked_pair(&mut world);
    let parts = only_actuator(actuator);
    let foreign = |entity: EntityId| parts.is_foreign(entity);

    // Unfiltered, the actuator overlaps its own index entry.
    assert!(collides_if_moved(
        &world,
        &parts,
        IVec2::ZERO,
        Colliders::of(&world),
        None,
    ));
    assert!(!collides_if_moved(
        &world,
        &parts,
        IVec2::ZERO,
        Colliders::of(&world),
        Some(&foreign),
    ));
}
