#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves the structures and actuators connected to a part.
//!
//! Traversal alternates between structures and actuators. When started from an
//! actuator, one of its ends may be excluded so the result describes only the
//! side that stays attached to the other end.

use log::trace;
use pistonworks_core::{ActuatorId, Endpoint, PartSet, StructureId};
use pistonworks_world::{query, World};

/// Part from which a traversal begins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolveStart {
    /// Start from a structure and follow every attached actuator.
    Structure(StructureId),
    /// Start from an actuator.
    Actuator {
        /// Actuator to start from.
        id: ActuatorId,
        /// End whose structure is not entered directly from the start.
        skip: Option<Endpoint>,
    },
}

#[derive(Clone, Copy, Debug)]
enum Visit {
    Structure {
        id: StructureId,
        via: Option<ActuatorId>,
    },
    Actuator {
        id: ActuatorId,
        via: StructureId,
    },
}

/// Collects every part reachable from `start`.
///
/// With a skipped end, reaching the start actuator again through any other
/// structure means both of its ends belong to one rigid loop. The traversal
/// then stops early and the returned set reports
/// [`PartSet::cycle_conflict`].
///
/// # Panics
///
/// Panics if the start or any reached part refers to a missing entity.
#[must_use]
pub fn resolve(world: &World, start: ResolveStart) -> PartSet {
    let mut parts = PartSet::new();
    let mut pending = Vec::new();

    let skipping = match start {
        ResolveStart::Structure(id) => {
            pending.push(Visit::Structure { id, via: None });
            None
        }
        ResolveStart::Actuator { id, skip } => {
            let actuator = query::expect_actuator(world, id);
            let _ = parts.insert_actuator(id);
            for end in [Endpoint::B, Endpoint::A] {
                if skip != Some(end) {
                    pending.push(Visit::Structure {
                        id: actuator.endpoint(end),
                        via: Some(id),
                    });
                }
            }
            skip.map(|_| id)
        }
    };

    while let Some(visit) = pending.pop() {
        match visit {
            Visit::Structure { id, via } => {
                if !parts.insert_structure(id) {
                    continue;
                }
                trace!("reached structure {id:?} via {via:?}");

                let attached = query::actuators_of(world, id);
                for actuator in attached.iter().rev() {
                    if Some(*actuator) != via {
                        pending.push(Visit::Actuator {
                            id: *actuator,
                            via: id,
                        });
                    }
                }
            }
            Visit::Actuator { id, via } => {
                if skipping == Some(id) {
                    trace!("start actuator {id:?} re-entered from {via:?}");
                    parts.mark_cycle_conflict();
                    return parts;
                }
                if !parts.insert_actuator(id) {
                    continue;
                }

                let actuator = query::expect_actuator(world, id);
                for end in [Endpoint::B, Endpoint::A] {
                    let structure = actuator.endpoint(end);
                    if structure != via {
                        pending.push(Visit::Structure {
                            id: structure,
                            via: Some(id),
                        });
                    }
                }
            }
        }
    }

    parts
}

/// Resolves the side of `actuator` that stays attached to `end`.
///
/// This is the set that moves when the actuator pushes or pulls that end.
#[must_use]
pub fn side(world: &World, actuator: ActuatorId, end: Endpoint) -> PartSet {
    resolve(
        world,
        ResolveStart::Actuator {
            id: actuator,
            skip: Some(end.other()),
        },
    )
}
