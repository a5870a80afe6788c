//! Authoritative structure and actuator state.

use glam::IVec2;
use pistonworks_core::{ActuatorId, Axis, Endpoint, PixelRect, StructureId, TileGrid, TILE_SIZE};

/// Rigid group of tiles sharing one pixel position.
#[derive(Clone, Debug)]
pub struct Structure {
    position: IVec2,
    grid: TileGrid,
    actuators: Vec<ActuatorId>,
}

impl Structure {
    pub(crate) fn new(position: IVec2, grid: TileGrid) -> Self {
        Self {
            position,
            grid,
            actuators: Vec::new(),
        }
    }

    /// Pixel position of tile `(0, 0)`.
    #[must_use]
    pub const fn position(&self) -> IVec2 {
        self.position
    }

    /// Tiles owned by the structure.
    #[must_use]
    pub const fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Actuators attached to the structure, in the order they were linked.
    #[must_use]
    pub fn actuators(&self) -> &[ActuatorId] {
        &self.actuators
    }

    /// Pixel bounding box of the structure's grid.
    #[must_use]
    pub fn bounds(&self) -> PixelRect {
        self.grid.bounds(self.position)
    }

    /// Reports whether any solid tile overlaps `rect`.
    #[must_use]
    pub fn collides_with_rect(&self, rect: &PixelRect) -> bool {
        self.grid.collides_with_rect(self.position, rect)
    }

    /// Reports whether any solid tile overlaps a solid tile of `grid` placed at `position`.
    #[must_use]
    pub fn collides_with_grid(&self, grid: &TileGrid, position: IVec2) -> bool {
        self.grid.collides_with_grid(self.position, grid, position)
    }

    pub(crate) fn attach(&mut self, actuator: ActuatorId) {
        self.actuators.push(actuator);
    }

    pub(crate) fn detach(&mut self, actuator: ActuatorId) {
        self.actuators.retain(|attached| *attached != actuator);
    }

    pub(crate) fn translate(&mut self, offset: IVec2) {
        self.position += offset;
    }
}

/// Piston joining two distinct structures.
///
/// The actuator stores no position of its own. Its corners are derived from
/// the endpoint positions plus the per-end offsets, and the occupied rectangle
/// is cached until the world refreshes it after an endpoint moves.
#[derive(Clone, Debug)]
pub struct Actuator {
    a: StructureId,
    b: StructureId,
    axis: Axis,
    offset_a: IVec2,
    offset_b: IVec2,
    occupied: PixelRect,
    tie_break: bool,
}

impl Actuator {
    pub(crate) fn new(
        a: StructureId,
        b: StructureId,
        axis: Axis,
        offset_a: IVec2,
        offset_b: IVec2,
    ) -> Self {
        Self {
            a,
            b,
            axis,
            offset_a,
            offset_b,
            occupied: PixelRect::default(),
            tie_break: false,
        }
    }

    /// Structure at the top or left end.
    #[must_use]
    pub const fn a(&self) -> StructureId {
        self.a
    }

    /// Structure at the bottom or right end.
    #[must_use]
    pub const fn b(&self) -> StructureId {
        self.b
    }

    /// Structure attached at the requested end.
    #[must_use]
    pub const fn endpoint(&self, end: Endpoint) -> StructureId {
        match end {
            Endpoint::A => self.a,
            Endpoint::B => self.b,
        }
    }

    /// Axis the actuator travels along.
    #[must_use]
    pub const fn axis(&self) -> Axis {
        self.axis
    }

    /// Pixel offset from structure `a`'s position to corner `A`.
    #[must_use]
    pub const fn offset_a(&self) -> IVec2 {
        self.offset_a
    }

    /// Pixel offset from structure `b`'s position to corner `B`.
    #[must_use]
    pub const fn offset_b(&self) -> IVec2 {
        self.offset_b
    }

    /// Rectangle occupied as of the last refresh.
    #[must_use]
    pub const fn occupied_rect(&self) -> PixelRect {
        self.occupied
    }

    /// Flag alternating which side moves when both are equally free.
    #[must_use]
    pub const fn tie_break(&self) -> bool {
        self.tie_break
    }

    /// Computes corner positions given the current endpoint positions.
    #[must_use]
    pub fn geometry(&self, position_a: IVec2, position_b: IVec2) -> ActuatorGeometry {
        ActuatorGeometry {
            axis: self.axis,
            corner_a: position_a + self.offset_a,
            corner_b: position_b + self.offset_b,
        }
    }

    pub(crate) fn set_occupied(&mut self, rect: PixelRect) {
        self.occupied = rect;
    }

    pub(crate) fn flip_tie_break(&mut self) -> bool {
        self.tie_break = !self.tie_break;
        self.tie_break
    }
}

/// Absolute placement of an actuator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActuatorGeometry {
    /// Axis the actuator travels along.
    pub axis: Axis,
    /// Top-left pixel of the track span at end `A`.
    pub corner_a: IVec2,
    /// Top-left pixel of the anchor tile at end `B`.
    pub corner_b: IVec2,
}

impl ActuatorGeometry {
    /// Distance between the two corners along the axis.
    #[must_use]
    pub fn length(&self) -> i32 {
        self.axis.component(self.corner_b) - self.axis.component(self.corner_a)
    }

    /// Rectangle spanning the track, one tile wide across the axis.
    #[must_use]
    pub fn occupied_rect(&self) -> PixelRect {
        let across = self.axis.perpendicular().unit() * TILE_SIZE;
        PixelRect::from_corners(self.corner_a, self.corner_b + across)
    }

    /// Distance from `point` to the actuator's centre line. Zero on the track.
    #[must_use]
    pub fn distance_to_point(&self, point: IVec2) -> i32 {
        let across = self.axis.perpendicular();
        let half = TILE_SIZE / 2;
        let start = self.corner_a + across.unit() * half;

        let along = self.axis.component(point) - self.axis.component(start);
        let length = self.length();

        let mut distance = ((across.component(point) - across.component(start)).abs() - half).max(0);
        if along < 0 {
            distance = distance.max(-along);
        }
        if along > length {
            distance = distance.max(along - length);
        }
        distance
    }
}
