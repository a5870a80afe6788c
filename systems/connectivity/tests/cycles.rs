use glam::IVec2;
use pistonworks_core::{ActuatorId, Axis, Command, Endpoint, Event, StructureId, TileGrid, TILE_SIZE};
use pistonworks_system_connectivity::{resolve, side, ResolveStart};
use pistonworks_world::{self as world, World};

fn spawn(world: &mut World, position: IVec2) -> StructureId {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnStructure {
            position,
            grid: TileGrid::from_rows(&["@"]).expect("valid layout"),
        },
        &mut events,
    );
    match events.as_slice() {
        [Event::StructureSpawned { structure }] => *structure,
        other => panic!("unexpected events: {other:?}"),
    }
}

fn link(world: &mut World, a: StructureId, b: StructureId, axis: Axis) -> ActuatorId {
    let mut events = Vec::new();
    let offset_a = axis.unit() * TILE_SIZE;
    world::apply(
        world,
        Command::LinkActuator {
            a,
            b,
            axis,
            offset_a,
            offset_b: IVec2::ZERO,
        },
        &mut events,
    );
    match events.as_slice() {
        [Event::ActuatorLinked { actuator, .. }] => *actuator,
        other => panic!("unexpected events: {other:?}"),
    }
}

/// Three blocks in an L joined by three actuators.
fn triangle() -> (World, [StructureId; 3], [ActuatorId; 3]) {
    let mut world = World::new();
    let corner = spawn(&mut world, IVec2::ZERO);
    let right = spawn(&mut world, IVec2::new(3 * TILE_SIZE, 0));
    let below = spawn(&mut world, IVec2::new(0, 3 * TILE_SIZE));
    let top = link(&mut world, corner, right, Axis::Horizontal);
    let left = link(&mut world, corner, below, Axis::Vertical);
    let diagonal = link(&mut world, below, right, Axis::Horizontal);
    (world, [corner, right, below], [top, left, diagonal])
}

#[test]
fn skipping_an_end_of_a_loop_reports_conflict() {
    let (world, _, actuators) = triangle();

    for actuator in actuators {
        for end in [Endpoint::A, Endpoint::B] {
            let parts = side(&world, actuator, end);
            assert!(
                parts.cycle_conflict(),
                "side {end:?} of looped actuator {actuator:?} must report a conflict"
            );
        }
    }
}

#[test]
fn unrestricted_traversal_of_a_loop_is_conflict_free() {
    let (world, structures, actuators) = triangle();

    let from_actuator = resolve(
        &world,
        ResolveStart::Actuator {
            id: actuators[0],
            skip: None,
        },
    );
    let from_structure = resolve(&world, ResolveStart::Structure(structures[2]));

    assert!(!from_actuator.cycle_conflict());
    assert_eq!(from_actuator, from_structure);
    assert_eq!(from_structure.structures().len(), 3);
    assert_eq!(from_structure.actuators().len(), 3);
}

#[test]
fn sides_of_a_bridge_are_disjoint_apart_from_the_bridge() {
    let mut world = World::new();
    let first = spawn(&mut world, IVec2::ZERO);
    let second = spawn(&mut world, IVec2::new(3 * TILE_SIZE, 0));
    let third = spawn(&mut world, IVec2::new(6 * TILE_SIZE, 0));
    let bridge = link(&mut world, first, second, Axis::Horizontal);
    let tail = link(&mut world, second, third, Axis::Horizontal);

    let a_side = side(&world, bridge, Endpoint::A);
    let b_side = side(&world, bridge, Endpoint::B);

    let shared: Vec<_> = a_side
        .members()
        .intersection(b_side.members())
        .copied()
        .collect();
    assert_eq!(shared, vec![bridge.into()]);
    assert!(b_side.actuators().contains(&tail));
    assert!(!a_side.contains(tail.into()));
}
