#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system answering whether a set of parts would collide after moving.

use glam::IVec2;
use pistonworks_core::{EntityId, PartSet};
use pistonworks_world::{query, DynamicBodies, Terrain, World};

/// Obstacles considered by a collision test.
///
/// Either source may be left out; a test with neither never collides.
#[derive(Clone, Copy, Debug)]
pub struct Colliders<'a> {
    /// Static terrain.
    pub terrain: Option<&'a Terrain>,
    /// Dynamic structures and actuators.
    pub bodies: Option<DynamicBodies<'a>>,
}

impl<'a> Colliders<'a> {
    /// Every obstacle present in `world`.
    #[must_use]
    pub fn of(world: &'a World) -> Self {
        Self {
            terrain: query::terrain(world),
            bodies: Some(query::dynamic_bodies(world)),
        }
    }

    /// Only the static terrain of `world`.
    #[must_use]
    pub fn terrain_only(world: &'a World) -> Self {
        Self {
            terrain: query::terrain(world),
            bodies: None,
        }
    }
}

/// Reports whether any part of `parts`, shifted by `offset`, would overlap an obstacle.
///
/// Structures are tested tile by tile against terrain and against dynamic
/// bodies accepted by `filter`. Actuators are tested by their occupied
/// rectangle. The test stops at the first hit.
///
/// # Panics
///
/// Panics if `parts` refers to a missing entity.
#[must_use]
pub fn collides_if_moved(
    world: &World,
    parts: &PartSet,
    offset: IVec2,
    colliders: Colliders<'_>,
    filter: Option<&dyn Fn(EntityId) -> bool>,
) -> bool {
    let structures = parts.structures().iter().any(|id| {
        let structure = query::expect_structure(world, *id);
        let position = structure.position() + offset;

        colliders
            .terrain
            .is_some_and(|terrain| terrain.collides_with_grid(structure.grid(), position))
            || colliders
                .bodies
                .is_some_and(|bodies| bodies.grid_collides(structure.grid(), position, filter))
    });
    if structures {
        return true;
    }

    parts.actuators().iter().any(|id| {
        let rect = query::expect_actuator(world, *id)
            .occupied_rect()
            .translated(offset);

        colliders
            .terrain
            .is_some_and(|terrain| terrain.collides_with_rect(&rect))
            || colliders
                .bodies
                .is_some_and(|bodies| bodies.box_collides(&rect, filter))
    })
}
