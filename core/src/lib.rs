#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Pistonworks engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems read an immutable world
//! snapshot and describe every mutation as a [`Command`]. The world executes
//! those commands via its `apply` entry point and reports the outcome as
//! [`Event`] values. Ships are modelled as rigid tile structures joined by
//! pistons; the types here name those parts and the sets they form.

mod geometry;
mod grid;

use std::collections::BTreeSet;

use glam::IVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use geometry::{canonical_ends, tile_containing, Axis, PixelRect, TILE_SIZE};
pub use grid::{GridParseError, Tile, TileGrid};

/// Unique identifier assigned to a rigid tile structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StructureId(u32);

impl StructureId {
    /// Creates a new structure identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a piston joining two structures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActuatorId(u32);

impl ActuatorId {
    /// Creates a new actuator identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of any dynamic body tracked by the spatial index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityId {
    /// A rigid tile structure.
    Structure(StructureId),
    /// A piston.
    Actuator(ActuatorId),
}

impl From<StructureId> for EntityId {
    fn from(value: StructureId) -> Self {
        Self::Structure(value)
    }
}

impl From<ActuatorId> for EntityId {
    fn from(value: ActuatorId) -> Self {
        Self::Actuator(value)
    }
}

/// Names one of the two ends of an actuator.
///
/// End `A` always has the smaller coordinate along the actuator's axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endpoint {
    /// The top or left end.
    A,
    /// The bottom or right end.
    B,
}

impl Endpoint {
    /// Returns the opposite end.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// Direction of a single actuation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stroke {
    /// Push the two ends apart by one tile.
    Extend,
    /// Pull the two ends together by one tile.
    Retract,
}

/// Result of asking an actuator to extend or retract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActuationOutcome {
    /// The actuator is already at its minimum length and cannot retract.
    AtMinLength,
    /// Neither side can move without colliding.
    Stuck,
    /// One side moved by one tile.
    Ok,
}

/// Connected component of structures and actuators computed for one query.
///
/// `members` tracks every entity the traversal touched. It usually mirrors
/// `structures` and `actuators`, but an actuator detached from the set with
/// [`PartSet::detach_actuator`] stays a member so that the set keeps ignoring
/// it during collision tests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PartSet {
    structures: BTreeSet<StructureId>,
    actuators: BTreeSet<ActuatorId>,
    members: BTreeSet<EntityId>,
    cycle_conflict: bool,
}

impl PartSet {
    /// Creates an empty part set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a structure. Returns `false` if it was already present.
    pub fn insert_structure(&mut self, structure: StructureId) -> bool {
        let _ = self.members.insert(structure.into());
        self.structures.insert(structure)
    }

    /// Adds an actuator. Returns `false` if it was already present.
    pub fn insert_actuator(&mut self, actuator: ActuatorId) -> bool {
        let _ = self.members.insert(actuator.into());
        self.actuators.insert(actuator)
    }

    /// Removes an actuator from the moving parts while keeping it a member.
    pub fn detach_actuator(&mut self, actuator: ActuatorId) -> bool {
        self.actuators.remove(&actuator)
    }

    /// Records that directional exclusion looped back onto its own start.
    pub fn mark_cycle_conflict(&mut self) {
        self.cycle_conflict = true;
    }

    /// Structures contained in the set.
    #[must_use]
    pub fn structures(&self) -> &BTreeSet<StructureId> {
        &self.structures
    }

    /// Actuators contained in the set.
    #[must_use]
    pub fn actuators(&self) -> &BTreeSet<ActuatorId> {
        &self.actuators
    }

    /// Every entity the traversal touched.
    #[must_use]
    pub fn members(&self) -> &BTreeSet<EntityId> {
        &self.members
    }

    /// Indicates that the two sides of the start actuator are joined by a cycle.
    #[must_use]
    pub const fn cycle_conflict(&self) -> bool {
        self.cycle_conflict
    }

    /// Reports whether the entity was touched while building the set.
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.members.contains(&entity)
    }

    /// Collision filter accepting only entities outside the set.
    #[must_use]
    pub fn is_foreign(&self, entity: EntityId) -> bool {
        !self.contains(entity)
    }

    /// Reports whether the set has nothing to move.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.structures.is_empty() && self.actuators.is_empty()
    }
}

/// New structure described by a decomposition plan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragment {
    /// Pixel position of the fragment's tile `(0, 0)`.
    pub position: IVec2,
    /// Tiles owned by the fragment.
    pub grid: TileGrid,
}

/// Actuator to create between two fragments of a decomposition plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FragmentLink {
    /// Axis the actuator travels along.
    pub axis: Axis,
    /// Index of the fragment at end `A`.
    pub a: usize,
    /// Index of the fragment at end `B`.
    pub b: usize,
    /// Pixel offset from fragment `a`'s position to the actuator's `A` corner.
    pub offset_a: IVec2,
    /// Pixel offset from fragment `b`'s position to the actuator's `B` corner.
    pub offset_b: IVec2,
}

/// Reasons a request to link an actuator may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum LinkError {
    /// Both ends referred to the same structure.
    #[error("an actuator cannot join a structure to itself")]
    SelfLink,
    /// One of the ends does not exist.
    #[error("structure {0:?} does not exist")]
    MissingStructure(StructureId),
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Installs static terrain, replacing any previous terrain.
    ConfigureTerrain {
        /// Pixel position of the terrain's tile `(0, 0)`.
        origin: IVec2,
        /// Terrain tiles; solid tiles block movement.
        grid: TileGrid,
    },
    /// Removes the static terrain.
    ClearTerrain,
    /// Creates a new structure.
    SpawnStructure {
        /// Pixel position of the structure's tile `(0, 0)`.
        position: IVec2,
        /// Tiles owned by the structure.
        grid: TileGrid,
    },
    /// Removes a structure along with every actuator attached to it.
    DespawnStructure {
        /// Structure to remove.
        structure: StructureId,
    },
    /// Joins two structures with an actuator.
    LinkActuator {
        /// First endpoint.
        a: StructureId,
        /// Second endpoint.
        b: StructureId,
        /// Axis the actuator travels along.
        axis: Axis,
        /// Pixel offset from `a`'s position to the actuator corner at `a`.
        offset_a: IVec2,
        /// Pixel offset from `b`'s position to the actuator corner at `b`.
        offset_b: IVec2,
    },
    /// Moves every part of the set by `offset` without collision checks.
    TranslateParts {
        /// Parts to move.
        parts: PartSet,
        /// Pixel translation applied to each structure.
        offset: IVec2,
    },
    /// Recomputes the cached rectangle of a single actuator.
    RefreshActuator {
        /// Actuator to refresh.
        actuator: ActuatorId,
    },
    /// Toggles the flag that alternates which side moves on ties.
    FlipTieBreak {
        /// Actuator whose flag flips.
        actuator: ActuatorId,
    },
    /// Replaces a structure with fragments and the actuators joining them.
    ReplaceStructure {
        /// Structure consumed by the replacement.
        structure: StructureId,
        /// New structures, in plan order.
        fragments: Vec<Fragment>,
        /// Actuators to create, referencing `fragments` by index.
        links: Vec<FragmentLink>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Static terrain was installed or replaced.
    TerrainConfigured,
    /// Static terrain was removed.
    TerrainCleared,
    /// A structure was created.
    StructureSpawned {
        /// Identifier assigned to the structure.
        structure: StructureId,
    },
    /// A structure was removed.
    StructureDespawned {
        /// Identifier of the removed structure.
        structure: StructureId,
    },
    /// A command referred to a structure that does not exist.
    StructureMissing {
        /// Identifier that could not be resolved.
        structure: StructureId,
    },
    /// An actuator was created.
    ActuatorLinked {
        /// Identifier assigned to the actuator.
        actuator: ActuatorId,
        /// Structure at end `A`.
        a: StructureId,
        /// Structure at end `B`.
        b: StructureId,
    },
    /// An actuator was removed.
    ActuatorUnlinked {
        /// Identifier of the removed actuator.
        actuator: ActuatorId,
    },
    /// A request to link an actuator was rejected.
    ActuatorRejected {
        /// Specific reason the link failed.
        reason: LinkError,
    },
    /// A command referred to an actuator that does not exist.
    ActuatorMissing {
        /// Identifier that could not be resolved.
        actuator: ActuatorId,
    },
    /// A set of parts moved.
    PartsTranslated {
        /// Structures that moved.
        structures: Vec<StructureId>,
        /// Pixel translation that was applied.
        offset: IVec2,
    },
    /// An actuator's tie-break flag changed.
    TieBreakFlipped {
        /// Actuator whose flag flipped.
        actuator: ActuatorId,
        /// New flag value.
        tie_break: bool,
    },
    /// A structure was split into fragments.
    StructureDecomposed {
        /// Structure that no longer exists.
        original: StructureId,
        /// Structures created from the fragments, in plan order.
        fragments: Vec<StructureId>,
        /// Actuators created between the fragments, in plan order.
        actuators: Vec<ActuatorId>,
    },
}
