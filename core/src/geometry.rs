//! Pixel-space geometry shared by every crate in the workspace.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Edge length of a single square tile measured in pixels.
pub const TILE_SIZE: i32 = 16;

/// Axis along which an actuator extends and retracts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    /// Extends along increasing and decreasing x.
    Horizontal,
    /// Extends along increasing and decreasing y. Positive y points down.
    Vertical,
}

impl Axis {
    /// Both axes in the canonical scan order.
    pub const ALL: [Axis; 2] = [Axis::Horizontal, Axis::Vertical];

    /// Unit vector pointing toward increasing coordinates along the axis.
    #[must_use]
    pub const fn unit(self) -> IVec2 {
        match self {
            Self::Horizontal => IVec2::X,
            Self::Vertical => IVec2::Y,
        }
    }

    /// Returns the axis orthogonal to this one.
    #[must_use]
    pub const fn perpendicular(self) -> Axis {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    /// Extracts the component of `vector` that lies along the axis.
    #[must_use]
    pub const fn component(self, vector: IVec2) -> i32 {
        match self {
            Self::Horizontal => vector.x,
            Self::Vertical => vector.y,
        }
    }
}

/// Axis-aligned rectangle in pixel space.
///
/// The rectangle is half-open: `min` is inside, `max` is outside, so two
/// rectangles that merely share an edge do not intersect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    min: IVec2,
    max: IVec2,
}

impl PixelRect {
    /// Creates a rectangle from its top-left corner and its size.
    ///
    /// Negative sizes collapse to an empty rectangle anchored at `min`.
    #[must_use]
    pub fn from_min_size(min: IVec2, size: IVec2) -> Self {
        Self {
            min,
            max: min + size.max(IVec2::ZERO),
        }
    }

    /// Creates the smallest rectangle spanning two arbitrary corners.
    #[must_use]
    pub fn from_corners(first: IVec2, second: IVec2) -> Self {
        Self {
            min: first.min(second),
            max: first.max(second),
        }
    }

    /// Inclusive top-left corner.
    #[must_use]
    pub const fn min(&self) -> IVec2 {
        self.min
    }

    /// Exclusive bottom-right corner.
    #[must_use]
    pub const fn max(&self) -> IVec2 {
        self.max
    }

    /// Width and height of the rectangle.
    #[must_use]
    pub fn size(&self) -> IVec2 {
        self.max - self.min
    }

    /// Reports whether the rectangle covers no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y
    }

    /// Returns the rectangle shifted by `offset`.
    #[must_use]
    pub fn translated(&self, offset: IVec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Reports whether both rectangles share at least one pixel.
    #[must_use]
    pub fn intersects(&self, other: &PixelRect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

/// Converts a pixel coordinate into the index of the tile containing it.
///
/// `origin` is the pixel position of tile `(0, 0)`.
#[must_use]
pub fn tile_containing(origin: IVec2, pixel: IVec2) -> IVec2 {
    let relative = pixel - origin;
    IVec2::new(
        relative.x.div_euclid(TILE_SIZE),
        relative.y.div_euclid(TILE_SIZE),
    )
}

/// Orders two actuator ends so the first has the smaller coordinate along `axis`.
///
/// Each end carries an owner and the absolute pixel corner of the actuator at
/// that end. End A's corner is the first track tile past its anchor while end
/// B's corner is its anchor tile, so swapping the ends shifts both corners by
/// one tile along the axis.
pub fn canonical_ends<T>(
    axis: Axis,
    first: (T, IVec2),
    second: (T, IVec2),
) -> ((T, IVec2), (T, IVec2)) {
    if axis.component(first.1) > axis.component(second.1) {
        let shift = axis.unit() * TILE_SIZE;
        ((second.0, second.1 + shift), (first.0, first.1 + shift))
    } else {
        (first, second)
    }
}
