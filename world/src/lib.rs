#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Pistonworks.
//!
//! The world owns every structure and actuator, the links between them, the
//! spatial index of dynamic bodies and the optional static terrain. Only
//! [`apply`] mutates it; systems observe it through [`query`].

mod parts;
mod spatial;
mod terrain;

use std::collections::BTreeMap;

use glam::IVec2;
use log::{debug, warn};
use pistonworks_core::{
    canonical_ends, ActuatorId, Axis, Command, Event, Fragment, FragmentLink,
    LinkError, PartSet, StructureId, TileGrid,
};

pub use parts::{Actuator, ActuatorGeometry, Structure};
pub use spatial::DynamicBodies;
pub use terrain::Terrain;

use spatial::SpatialIndex;

/// Represents the authoritative Pistonworks world state.
#[derive(Debug, Default)]
pub struct World {
    structures: BTreeMap<StructureId, Structure>,
    actuators: BTreeMap<ActuatorId, Actuator>,
    terrain: Option<Terrain>,
    bodies: SpatialIndex,
    next_entity: u32,
}

impl World {
    /// Creates an empty world without terrain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_entity(&mut self) -> u32 {
        let value = self.next_entity;
        self.next_entity = self.next_entity.wrapping_add(1);
        value
    }

    fn spawn_structure(&mut self, position: IVec2, grid: TileGrid) -> StructureId {
        let id = StructureId::new(self.allocate_entity());
        let structure = Structure::new(position, grid);
        self.bodies.upsert(id.into(), structure.bounds());
        let _ = self.structures.insert(id, structure);
        id
    }

    fn link_actuator(
        &mut self,
        a: StructureId,
        b: StructureId,
        axis: Axis,
        offset_a: IVec2,
        offset_b: IVec2,
    ) -> Result<(ActuatorId, StructureId, StructureId), LinkError> {
        if a == b {
            return Err(LinkError::SelfLink);
        }
        let position_a = self
            .structures
            .get(&a)
            .map(Structure::position)
            .ok_or(LinkError::MissingStructure(a))?;
        let position_b = self
            .structures
            .get(&b)
            .map(Structure::position)
            .ok_or(LinkError::MissingStructure(b))?;

        let (((a, position_a), corner_a), ((b, position_b), corner_b)) = canonical_ends(
            axis,
            ((a, position_a), position_a + offset_a),
            ((b, position_b), position_b + offset_b),
        );

        let id = ActuatorId::new(self.allocate_entity());
        let actuator = Actuator::new(a, b, axis, corner_a - position_a, corner_b - position_b);
        let _ = self.actuators.insert(id, actuator);

        for end in [a, b] {
            if let Some(structure) = self.structures.get_mut(&end) {
                structure.attach(id);
            }
        }

        let _ = self.refresh_actuator(id);
        Ok((id, a, b))
    }

    fn despawn_structure(&mut self, id: StructureId, out_events: &mut Vec<Event>) -> bool {
        let Some(structure) = self.structures.remove(&id) else {
            return false;
        };
        self.bodies.remove(id.into());

        for actuator_id in structure.actuators() {
            let Some(actuator) = self.actuators.remove(actuator_id) else {
                continue;
            };
            let other = if actuator.a() == id {
                actuator.b()
            } else {
                actuator.a()
            };
            if let Some(other) = self.structures.get_mut(&other) {
                other.detach(*actuator_id);
            }
            self.bodies.remove((*actuator_id).into());
            out_events.push(Event::ActuatorUnlinked {
                actuator: *actuator_id,
            });
        }

        out_events.push(Event::StructureDespawned { structure: id });
        true
    }

    fn endpoint_position(&self, actuator: ActuatorId, structure: StructureId) -> IVec2 {
        match self.structures.get(&structure) {
            Some(structure) => structure.position(),
            None => panic!("actuator {actuator:?} is linked to missing structure {structure:?}"),
        }
    }

    fn geometry_of(&self, id: ActuatorId, actuator: &Actuator) -> ActuatorGeometry {
        actuator.geometry(
            self.endpoint_position(id, actuator.a()),
            self.endpoint_position(id, actuator.b()),
        )
    }

    fn refresh_actuator(&mut self, id: ActuatorId) -> bool {
        let Some(actuator) = self.actuators.get(&id) else {
            return false;
        };
        let rect = self.geometry_of(id, actuator).occupied_rect();
        if let Some(actuator) = self.actuators.get_mut(&id) {
            actuator.set_occupied(rect);
        }
        self.bodies.upsert(id.into(), rect);
        true
    }

    fn translate_parts(&mut self, parts: &PartSet, offset: IVec2) {
        for id in parts.structures() {
            let Some(structure) = self.structures.get_mut(id) else {
                panic!("part set refers to missing structure {id:?}");
            };
            structure.translate(offset);
            self.bodies.upsert((*id).into(), structure.bounds());
        }

        // Actuators carry no position of their own, only derived geometry.
        for id in parts.actuators() {
            if !self.refresh_actuator(*id) {
                panic!("part set refers to missing actuator {id:?}");
            }
        }
    }

    fn replace_structure(
        &mut self,
        original: StructureId,
        fragments: Vec<Fragment>,
        links: Vec<FragmentLink>,
        out_events: &mut Vec<Event>,
    ) {
        if !self.structures.contains_key(&original) {
            warn!("ignoring decomposition of missing structure {original:?}");
            out_events.push(Event::StructureMissing {
                structure: original,
            });
            return;
        }

        let mut spawned = Vec::with_capacity(fragments.len());
        for fragment in fragments {
            let id = self.spawn_structure(fragment.position, fragment.grid);
            out_events.push(Event::StructureSpawned { structure: id });
            spawned.push(id);
        }

        let mut linked = Vec::with_capacity(links.len());
        for link in links {
            let (Some(a), Some(b)) = (spawned.get(link.a), spawned.get(link.b)) else {
                panic!("fragment link {link:?} refers to a fragment outside the plan");
            };
            match self.link_actuator(*a, *b, link.axis, link.offset_a, link.offset_b) {
                Ok((actuator, a, b)) => {
                    out_events.push(Event::ActuatorLinked { actuator, a, b });
                    linked.push(actuator);
                }
                Err(reason) => {
                    warn!("decomposition produced an invalid link: {reason}");
                    out_events.push(Event::ActuatorRejected { reason });
                }
            }
        }

        let _ = self.despawn_structure(original, out_events);
        debug!(
            "structure {original:?} decomposed into {} fragments and {} actuators",
            spawned.len(),
            linked.len()
        );
        out_events.push(Event::StructureDecomposed {
            original,
            fragments: spawned,
            actuators: linked,
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureTerrain { origin, grid } => {
            world.terrain = Some(Terrain::new(origin, grid));
            out_events.push(Event::TerrainConfigured);
        }
        Command::ClearTerrain => {
            world.terrain = None;
            out_events.push(Event::TerrainCleared);
        }
        Command::SpawnStructure { position, grid } => {
            let structure = world.spawn_structure(position, grid);
            out_events.push(Event::StructureSpawned { structure });
        }
        Command::DespawnStructure { structure } => {
            if !world.despawn_structure(structure, out_events) {
                warn!("ignoring despawn of missing structure {structure:?}");
                out_events.push(Event::StructureMissing { structure });
            }
        }
        Command::LinkActuator {
            a,
            b,
            axis,
            offset_a,
            offset_b,
        } => match world.link_actuator(a, b, axis, offset_a, offset_b) {
            Ok((actuator, a, b)) => out_events.push(Event::ActuatorLinked { actuator, a, b }),
            Err(reason) => {
                warn!("rejected actuator link: {reason}");
                out_events.push(Event::ActuatorRejected { reason });
            }
        },
        Command::TranslateParts { parts, offset } => {
            world.translate_parts(&parts, offset);
            out_events.push(Event::PartsTranslated {
                structures: parts.structures().iter().copied().collect(),
                offset,
            });
        }
        Command::RefreshActuator { actuator } => {
            if !world.refresh_actuator(actuator) {
                out_events.push(Event::ActuatorMissing { actuator });
            }
        }
        Command::FlipTieBreak { actuator } => match world.actuators.get_mut(&actuator) {
            Some(state) => {
                let tie_break = state.flip_tie_break();
                out_events.push(Event::TieBreakFlipped {
                    actuator,
                    tie_break,
                });
            }
            None => out_events.push(Event::ActuatorMissing { actuator }),
        },
        Command::ReplaceStructure {
            structure,
            fragments,
            links,
        } => world.replace_structure(structure, fragments, links, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use glam::IVec2;
    use pistonworks_core::{ActuatorId, StructureId};

    use super::{Actuator, ActuatorGeometry, DynamicBodies, Structure, Terrain, World};

    /// Looks up a structure.
    #[must_use]
    pub fn structure(world: &World, id: StructureId) -> Option<&Structure> {
        world.structures.get(&id)
    }

    /// Looks up a structure that must exist.
    ///
    /// # Panics
    ///
    /// Panics if the structure is absent, which indicates a corrupted link.
    #[must_use]
    pub fn expect_structure(world: &World, id: StructureId) -> &Structure {
        match world.structures.get(&id) {
            Some(structure) => structure,
            None => panic!("structure {id:?} is required but missing"),
        }
    }

    /// Looks up an actuator.
    #[must_use]
    pub fn actuator(world: &World, id: ActuatorId) -> Option<&Actuator> {
        world.actuators.get(&id)
    }

    /// Looks up an actuator that must exist.
    ///
    /// # Panics
    ///
    /// Panics if the actuator is absent, which indicates a corrupted link.
    #[must_use]
    pub fn expect_actuator(world: &World, id: ActuatorId) -> &Actuator {
        match world.actuators.get(&id) {
            Some(actuator) => actuator,
            None => panic!("actuator {id:?} is required but missing"),
        }
    }

    /// Actuators linked to a structure, in insertion order.
    #[must_use]
    pub fn actuators_of(world: &World, id: StructureId) -> &[ActuatorId] {
        world
            .structures
            .get(&id)
            .map_or(&[], |structure| structure.actuators())
    }

    /// Identifiers of every structure in ascending order.
    #[must_use]
    pub fn structure_ids(world: &World) -> Vec<StructureId> {
        world.structures.keys().copied().collect()
    }

    /// Identifiers of every actuator in ascending order.
    #[must_use]
    pub fn actuator_ids(world: &World) -> Vec<ActuatorId> {
        world.actuators.keys().copied().collect()
    }

    /// Static terrain, if configured.
    #[must_use]
    pub fn terrain(world: &World) -> Option<&Terrain> {
        world.terrain.as_ref()
    }

    /// Dynamic bodies tracked by the spatial index.
    #[must_use]
    pub fn dynamic_bodies(world: &World) -> DynamicBodies<'_> {
        DynamicBodies::new(world)
    }

    /// Current absolute geometry of an actuator.
    #[must_use]
    pub fn actuator_geometry(world: &World, id: ActuatorId) -> Option<ActuatorGeometry> {
        world
            .actuators
            .get(&id)
            .map(|actuator| world.geometry_of(id, actuator))
    }

    /// Current length of an actuator in pixels.
    #[must_use]
    pub fn actuator_length(world: &World, id: ActuatorId) -> Option<i32> {
        actuator_geometry(world, id).map(|geometry| geometry.length())
    }

    /// Distance from `point` to an actuator's centre line.
    #[must_use]
    pub fn actuator_distance_to_point(world: &World, id: ActuatorId, point: IVec2) -> Option<i32> {
        actuator_geometry(world, id).map(|geometry| geometry.distance_to_point(point))
    }

    /// Actuator closest to `point` within `max_distance`, ties broken by identifier.
    #[must_use]
    pub fn nearest_actuator(world: &World, point: IVec2, max_distance: i32) -> Option<ActuatorId> {
        world
            .actuators
            .iter()
            .map(|(id, actuator)| (world.geometry_of(*id, actuator).distance_to_point(point), *id))
            .filter(|(distance, _)| *distance <= max_distance)
            .min()
            .map(|(_, id)| id)
    }
}
