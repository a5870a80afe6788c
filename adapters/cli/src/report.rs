//! Plain-text rendering of world state for terminal output.

use std::fmt::Write as _;

use pistonworks_core::{StructureId, TILE_SIZE};
use pistonworks_system_connectivity::{resolve, ResolveStart};
use pistonworks_world::{query, World};

/// Describes the terrain and every ship, its structures and its actuators.
///
/// A ship is one connected group of structures and actuators. Ships are
/// listed in order of their lowest structure identifier.
pub(crate) fn describe(world: &World) -> String {
    let mut output = String::new();
    let mut seen: Vec<StructureId> = Vec::new();

    if let Some(terrain) = query::terrain(world) {
        let _ = writeln!(
            output,
            "terrain at {} with {} solid tiles",
            terrain.origin(),
            terrain.grid().solid_count()
        );
    }

    for id in query::structure_ids(world) {
        if seen.contains(&id) {
            continue;
        }
        let parts = resolve(world, ResolveStart::Structure(id));
        seen.extend(parts.structures().iter().copied());

        let _ = writeln!(
            output,
            "ship of {} structures and {} actuators",
            parts.structures().len(),
            parts.actuators().len()
        );
        for structure_id in parts.structures() {
            let structure = query::expect_structure(world, *structure_id);
            let tile = structure.position() / TILE_SIZE;
            let _ = writeln!(
                output,
                "  structure {} at {} (tile {})",
                structure_id.get(),
                structure.position(),
                tile
            );
            for row in structure.grid().to_rows() {
                let _ = writeln!(output, "    {row}");
            }
        }
        for actuator_id in parts.actuators() {
            let actuator = query::expect_actuator(world, *actuator_id);
            let length = query::actuator_length(world, *actuator_id).unwrap_or_default();
            let _ = writeln!(
                output,
                "  actuator {} {:?} {} -> {} length {} px",
                actuator_id.get(),
                actuator.axis(),
                actuator.a().get(),
                actuator.b().get(),
                length
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;
    use pistonworks_core::{Command, TileGrid};

    #[test]
    fn lists_each_ship_once() {
        let mut world = World::new();
        let mut events = Vec::new();
        for position in [IVec2::ZERO, IVec2::new(4 * TILE_SIZE, 0)] {
            pistonworks_world::apply(
                &mut world,
                Command::SpawnStructure {
                    position,
                    grid: TileGrid::from_rows(&["@#"]).expect("valid layout"),
                },
                &mut events,
            );
        }

        let text = describe(&world);

        assert!(!text.contains("terrain"));
        assert_eq!(text.matches("ship of 1 structures").count(), 2);
        assert!(text.contains("structure 1 at [64, 0] (tile [4, 0])"));
        assert!(text.contains("    @#"));
    }

    #[test]
    fn terrain_is_listed_until_cleared() {
        let mut world = World::new();
        let mut events = Vec::new();
        pistonworks_world::apply(
            &mut world,
            Command::ConfigureTerrain {
                origin: IVec2::new(0, 5 * TILE_SIZE),
                grid: TileGrid::from_rows(&["#.#"]).expect("valid layout"),
            },
            &mut events,
        );
        assert_eq!(describe(&world), "terrain at [0, 80] with 2 solid tiles\n");

        pistonworks_world::apply(&mut world, Command::ClearTerrain, &mut events);
        assert_eq!(describe(&world), "");
    }
}
