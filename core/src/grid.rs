//! Tile classification and the resizable tile grid owned by structures and terrain.

use glam::IVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{tile_containing, Axis, PixelRect, TILE_SIZE};

/// Contents of a single grid tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Nothing occupies the tile.
    #[default]
    Empty,
    /// Solid tile that joins neighbours by adjacency but cannot anchor an actuator.
    Solid,
    /// Solid tile that may serve as an actuator endpoint.
    Anchor,
    /// Piston track running along the horizontal axis.
    TrackHorizontal,
    /// Piston track running along the vertical axis.
    TrackVertical,
}

impl Tile {
    /// Reports whether the tile takes part in collision and adjacency.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        matches!(self, Self::Solid | Self::Anchor)
    }

    /// Reports whether an actuator may attach to the tile.
    #[must_use]
    pub const fn is_attachable(self) -> bool {
        matches!(self, Self::Anchor)
    }

    /// Axis of the piston track occupying the tile, if any.
    #[must_use]
    pub const fn track(self) -> Option<Axis> {
        match self {
            Self::TrackHorizontal => Some(Axis::Horizontal),
            Self::TrackVertical => Some(Axis::Vertical),
            _ => None,
        }
    }

    /// Parses the ASCII glyph used by layout files.
    #[must_use]
    pub const fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '.' | ' ' => Some(Self::Empty),
            '#' => Some(Self::Solid),
            '@' => Some(Self::Anchor),
            '-' => Some(Self::TrackHorizontal),
            '|' => Some(Self::TrackVertical),
            _ => None,
        }
    }

    /// ASCII glyph representing the tile in layout files.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Solid => '#',
            Self::Anchor => '@',
            Self::TrackHorizontal => '-',
            Self::TrackVertical => '|',
        }
    }
}

/// Reasons an ASCII layout could not be turned into a [`TileGrid`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridParseError {
    /// A row had a different width than the first row.
    #[error("row {row} has {found} tiles but the first row has {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width established by the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A glyph outside the tile legend was encountered.
    #[error("unknown tile glyph '{glyph}' at column {column}, row {row}")]
    UnknownGlyph {
        /// Character that could not be classified.
        glyph: char,
        /// Zero-based column of the glyph.
        column: usize,
        /// Zero-based row of the glyph.
        row: usize,
    },
    /// The layout is too large to address with pixel coordinates.
    #[error("layout dimensions exceed the addressable range")]
    TooLarge,
}

/// Dense, origin-relative grid of tiles.
///
/// Tiles are stored row-major. Tile `(0, 0)` sits at the owner's pixel
/// position and tile `(x, y)` covers `position + (x, y) * TILE_SIZE`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileGrid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Creates an empty grid with the provided dimensions.
    ///
    /// Negative dimensions are treated as zero.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let capacity = usize::try_from(i64::from(width) * i64::from(height)).unwrap_or(0);
        Self {
            width,
            height,
            tiles: vec![Tile::Empty; capacity],
        }
    }

    /// Builds a grid from ASCII rows using the [`Tile::from_glyph`] legend.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, GridParseError> {
        let expected = rows.first().map_or(0, |row| row.as_ref().chars().count());
        let width = i32::try_from(expected).map_err(|_| GridParseError::TooLarge)?;
        let height = i32::try_from(rows.len()).map_err(|_| GridParseError::TooLarge)?;
        let mut grid = Self::new(width, height);

        for (row_index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != expected {
                return Err(GridParseError::RaggedRow {
                    row: row_index,
                    expected,
                    found,
                });
            }

            for (column, glyph) in row.chars().enumerate() {
                let tile = Tile::from_glyph(glyph).ok_or(GridParseError::UnknownGlyph {
                    glyph,
                    column,
                    row: row_index,
                })?;
                // Both indices are bounded by `width`/`height`, which fit in i32.
                grid.set(IVec2::new(column as i32, row_index as i32), tile);
            }
        }

        Ok(grid)
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Dimensions measured in tiles.
    #[must_use]
    pub const fn size(&self) -> IVec2 {
        IVec2::new(self.width, self.height)
    }

    /// Reports whether the tile coordinate lies inside the grid.
    #[must_use]
    pub fn contains(&self, tile: IVec2) -> bool {
        tile.x >= 0 && tile.y >= 0 && tile.x < self.width && tile.y < self.height
    }

    /// Reads a tile. Returns `None` outside the grid.
    #[must_use]
    pub fn get(&self, tile: IVec2) -> Option<Tile> {
        self.index(tile).map(|index| self.tiles[index])
    }

    /// Writes a tile. Writes outside the grid are ignored.
    pub fn set(&mut self, tile: IVec2, value: Tile) {
        if let Some(index) = self.index(tile) {
            self.tiles[index] = value;
        }
    }

    /// Iterates over every tile in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, Tile)> + '_ {
        let width = self.width.max(1);
        self.tiles.iter().enumerate().map(move |(index, tile)| {
            let index = index as i32;
            (IVec2::new(index % width, index / width), *tile)
        })
    }

    /// Iterates over the coordinates of solid tiles in row-major order.
    pub fn solid_tiles(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.iter()
            .filter(|(_, tile)| tile.is_solid())
            .map(|(position, _)| position)
    }

    /// Counts the solid tiles in the grid.
    #[must_use]
    pub fn solid_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.is_solid()).count()
    }

    /// Grows the grid so that `tile` becomes addressable.
    ///
    /// Returns the origin-shift delta (never positive on either axis). Existing
    /// tiles move by `-delta`, so a caller tracking the grid's origin must add
    /// `delta` to it and subtract `delta` from any coordinate it still holds.
    pub fn grow_to_include(&mut self, tile: IVec2) -> IVec2 {
        if self.contains(tile) {
            return IVec2::ZERO;
        }

        let delta = tile.min(IVec2::ZERO);
        let max = self.size().max(tile + IVec2::ONE);
        let size = max - delta;

        let mut grown = Self::new(size.x, size.y);
        for (position, value) in self.iter() {
            grown.set(position - delta, value);
        }
        *self = grown;

        delta
    }

    /// Pixel bounding box of the whole grid when placed at `position`.
    #[must_use]
    pub fn bounds(&self, position: IVec2) -> PixelRect {
        PixelRect::from_min_size(position, self.size() * TILE_SIZE)
    }

    /// Pixel rectangle covered by `tile` when the grid sits at `position`.
    #[must_use]
    pub fn tile_rect(position: IVec2, tile: IVec2) -> PixelRect {
        PixelRect::from_min_size(position + tile * TILE_SIZE, IVec2::splat(TILE_SIZE))
    }

    /// Reports whether any solid tile of the grid, placed at `position`,
    /// overlaps `rect`.
    #[must_use]
    pub fn collides_with_rect(&self, position: IVec2, rect: &PixelRect) -> bool {
        if !self.bounds(position).intersects(rect) {
            return false;
        }

        let first = tile_containing(position, rect.min()).max(IVec2::ZERO);
        let last = tile_containing(position, rect.max() - IVec2::ONE).min(self.size() - IVec2::ONE);

        for y in first.y..=last.y {
            for x in first.x..=last.x {
                if self
                    .get(IVec2::new(x, y))
                    .is_some_and(|tile| tile.is_solid())
                {
                    return true;
                }
            }
        }

        false
    }

    /// Reports whether any solid tile of this grid at `position` overlaps any
    /// solid tile of `other` at `other_position`.
    #[must_use]
    pub fn collides_with_grid(
        &self,
        position: IVec2,
        other: &TileGrid,
        other_position: IVec2,
    ) -> bool {
        if !self.bounds(position).intersects(&other.bounds(other_position)) {
            return false;
        }

        other.solid_tiles().any(|tile| {
            self.collides_with_rect(position, &Self::tile_rect(other_position, tile))
        })
    }

    /// Renders the grid back into ASCII rows.
    #[must_use]
    pub fn to_rows(&self) -> Vec<String> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| self.get(IVec2::new(x, y)).unwrap_or_default().glyph())
                    .collect()
            })
            .collect()
    }

    fn index(&self, tile: IVec2) -> Option<usize> {
        if self.contains(tile) {
            usize::try_from(tile.y * self.width + tile.x).ok()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_with_full_legend() {
        let grid = TileGrid::from_rows(&["@-@", "#|.", "..."]).expect("valid layout");
        assert_eq!(grid.size(), IVec2::new(3, 3));
        assert_eq!(grid.get(IVec2::new(0, 0)), Some(Tile::Anchor));
        assert_eq!(grid.get(IVec2::new(1, 0)), Some(Tile::TrackHorizontal));
        assert_eq!(grid.get(IVec2::new(0, 1)), Some(Tile::Solid));
        assert_eq!(grid.get(IVec2::new(1, 1)), Some(Tile::TrackVertical));
        assert_eq!(grid.get(IVec2::new(3, 0)), None);
        assert_eq!(grid.solid_count(), 3);
        assert_eq!(grid.to_rows(), vec!["@-@", "#|.", "..."]);
    }

    #[test]
    fn rejects_ragged_rows_and_unknown_glyphs() {
        assert_eq!(
            TileGrid::from_rows(&["##", "#"]),
            Err(GridParseError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1,
            })
        );
        assert_eq!(
            TileGrid::from_rows(&["#x"]),
            Err(GridParseError::UnknownGlyph {
                glyph: 'x',
                column: 1,
                row: 0,
            })
        );
    }

    #[test]
    fn growing_toward_negative_coordinates_shifts_content() {
        let mut grid = TileGrid::new(0, 0);
        assert_eq!(grid.grow_to_include(IVec2::ZERO), IVec2::ZERO);
        grid.set(IVec2::ZERO, Tile::Anchor);

        let delta = grid.grow_to_include(IVec2::new(-2, 1));
        assert_eq!(delta, IVec2::new(-2, 0));
        assert_eq!(grid.size(), IVec2::new(3, 2));
        assert_eq!(grid.get(IVec2::new(2, 0)), Some(Tile::Anchor));

        let delta = grid.grow_to_include(IVec2::new(4, 0));
        assert_eq!(delta, IVec2::ZERO);
        assert_eq!(grid.size(), IVec2::new(5, 2));
        assert_eq!(grid.get(IVec2::new(2, 0)), Some(Tile::Anchor));
    }

    #[test]
    fn rect_collision_only_counts_solid_tiles() {
        let grid = TileGrid::from_rows(&["#|", ".."]).expect("valid layout");
        let position = IVec2::new(100, 100);

        let over_solid = PixelRect::from_min_size(IVec2::new(110, 110), IVec2::splat(2));
        let over_track = PixelRect::from_min_size(IVec2::new(120, 100), IVec2::splat(4));
        let over_empty = PixelRect::from_min_size(IVec2::new(100, 120), IVec2::splat(4));
        let outside = PixelRect::from_min_size(IVec2::new(0, 0), IVec2::splat(100));

        assert!(grid.collides_with_rect(position, &over_solid));
        assert!(!grid.collides_with_rect(position, &over_track));
        assert!(!grid.collides_with_rect(position, &over_empty));
        assert!(!grid.collides_with_rect(position, &outside));
    }

    #[test]
    fn grid_collision_respects_pixel_offsets() {
        let block = TileGrid::from_rows(&["#"]).expect("valid layout");
        let origin = IVec2::ZERO;
        let beside = IVec2::new(TILE_SIZE, 0);

        assert!(!block.collides_with_grid(origin, &block, beside));
        assert!(block.collides_with_grid(origin, &block, beside - IVec2::X));
    }
}
