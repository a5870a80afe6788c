//! Bounding-box index over every dynamic body in the world.

use std::collections::BTreeMap;

use glam::IVec2;
use pistonworks_core::{EntityId, PixelRect, TileGrid};

use crate::World;

/// Bounding boxes keyed by entity.
///
/// Queries walk the entries in identifier order so results never depend on
/// insertion history.
#[derive(Clone, Debug, Default)]
pub(crate) struct SpatialIndex {
    entries: BTreeMap<EntityId, PixelRect>,
}

impl SpatialIndex {
    /// Inserts or replaces the bounding box stored for `entity`.
    pub(crate) fn upsert(&mut self, entity: EntityId, rect: PixelRect) {
        let _ = self.entries.insert(entity, rect);
    }

    /// Drops the entry for `entity`, if any.
    pub(crate) fn remove(&mut self, entity: EntityId) {
        let _ = self.entries.remove(&entity);
    }

    pub(crate) fn get(&self, entity: EntityId) -> Option<PixelRect> {
        self.entries.get(&entity).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Visits every entry intersecting `rect` until `visitor` accepts one.
    pub(crate) fn query<F>(&self, rect: &PixelRect, mut visitor: F) -> bool
    where
        F: FnMut(EntityId) -> bool,
    {
        self.entries
            .iter()
            .filter(|(_, bounds)| bounds.intersects(rect))
            .any(|(entity, _)| visitor(*entity))
    }
}

/// Read-only view combining the spatial index with each body's own shape.
///
/// The index narrows candidates by bounding box; the candidate's shape then
/// decides. Structures test per tile, actuators test their occupied rectangle.
#[derive(Clone, Copy, Debug)]
pub struct DynamicBodies<'a> {
    world: &'a World,
}

impl<'a> DynamicBodies<'a> {
    pub(crate) fn new(world: &'a World) -> Self {
        Self { world }
    }

    /// Reports whether any accepted body overlaps `rect`.
    ///
    /// Bodies for which `filter` returns `false` are ignored.
    #[must_use]
    pub fn box_collides(
        &self,
        rect: &PixelRect,
        filter: Option<&dyn Fn(EntityId) -> bool>,
    ) -> bool {
        self.world.bodies.query(rect, |entity| {
            if filter.is_some_and(|accept| !accept(entity)) {
                return false;
            }

            match entity {
                EntityId::Structure(id) => self
                    .world
                    .structures
                    .get(&id)
                    .is_some_and(|structure| structure.collides_with_rect(rect)),
                EntityId::Actuator(id) => self
                    .world
                    .actuators
                    .get(&id)
                    .is_some_and(|actuator| actuator.occupied_rect().intersects(rect)),
            }
        })
    }

    /// Reports whether any accepted body overlaps a solid tile of `grid`
    /// placed at `position`.
    #[must_use]
    pub fn grid_collides(
        &self,
        grid: &TileGrid,
        position: IVec2,
        filter: Option<&dyn Fn(EntityId) -> bool>,
    ) -> bool {
        self.world.bodies.query(&grid.bounds(position), |entity| {
            if filter.is_some_and(|accept| !accept(entity)) {
                return false;
            }

            match entity {
                EntityId::Structure(id) => self
                    .world
                    .structures
                    .get(&id)
                    .is_some_and(|structure| structure.collides_with_grid(grid, position)),
                EntityId::Actuator(id) => self
                    .world
                    .actuators
                    .get(&id)
                    .is_some_and(|actuator| {
                        grid.collides_with_rect(position, &actuator.occupied_rect())
                    }),
            }
        })
    }

    /// Bounding box currently indexed for `entity`.
    #[must_use]
    pub fn bounds_of(&self, entity: EntityId) -> Option<PixelRect> {
        self.world.bodies.get(entity)
    }

    /// Number of indexed bodies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.world.bodies.len()
    }

    /// Reports whether no bodies are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
