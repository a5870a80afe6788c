//! Static terrain that dynamic bodies may not enter.

use glam::IVec2;
use pistonworks_core::{PixelRect, TileGrid};

/// Immovable tile map anchored at a pixel origin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Terrain {
    origin: IVec2,
    grid: TileGrid,
}

impl Terrain {
    /// Creates terrain whose tile `(0, 0)` sits at `origin`.
    #[must_use]
    pub fn new(origin: IVec2, grid: TileGrid) -> Self {
        Self { origin, grid }
    }

    /// Pixel position of tile `(0, 0)`.
    #[must_use]
    pub const fn origin(&self) -> IVec2 {
        self.origin
    }

    /// Terrain tiles.
    #[must_use]
    pub const fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Reports whether `rect` overlaps solid terrain.
    #[must_use]
    pub fn collides_with_rect(&self, rect: &PixelRect) -> bool {
        self.grid.collides_with_rect(self.origin, rect)
    }

    /// Reports whether `grid`, placed at `position`, overlaps solid terrain.
    #[must_use]
    pub fn collides_with_grid(&self, grid: &TileGrid, position: IVec2) -> bool {
        self.grid.collides_with_grid(self.origin, grid, position)
    }
}
