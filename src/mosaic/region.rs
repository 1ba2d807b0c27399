//! Rectangular regions and the fan-out partition.
//!
//! The source image is split into a `columns x rows` grid. Column `i` spans
//! `[i * width / columns, (i + 1) * width / columns)` and rows are split the
//! same way, so the boundaries are integer midpoints for the default 2 x 2
//! grid. The regions cover every pixel exactly once for any image size.
//!
//! With odd dimensions the regions differ in size: a 5 x 4 image becomes
//!
//! ```text
//! (0,0) 2x2 | (2,0) 3x2
//! ----------+----------
//! (0,2) 2x2 | (2,2) 3x2
//! ```
//!
//! Each region restarts the cell grid at its own corner, so cells of the
//! right-hand regions are not aligned with a global grid when the midpoint is
//! not a multiple of the cell size.

/// Default number of region columns.
pub const DEFAULT_GRID_COLUMNS: u32 = 2;

/// Default number of region rows.
pub const DEFAULT_GRID_ROWS: u32 = 2;

/// Axis-aligned rectangle in source-image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u64 {
        u64::from(self.x) + u64::from(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u64 {
        u64::from(self.y) + u64::from(self.height)
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the two rectangles share at least one pixel.
    pub fn overlaps(&self, other: &Region) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && u64::from(self.x) < other.right()
            && u64::from(other.x) < self.right()
            && u64::from(self.y) < other.bottom()
            && u64::from(other.y) < self.bottom()
    }

    /// Whether the region lies inside a `width x height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= u64::from(width) && self.bottom() <= u64::from(height)
    }
}

/// Split a `width x height` image into a `columns x rows` grid of regions.
///
/// Regions are returned in row-major order. Empty regions, which appear when
/// a dimension is smaller than the grid count, are dropped. A zero grid count
/// is treated as one.
pub fn partition(width: u32, height: u32, columns: u32, rows: u32) -> Vec<Region> {
    let xs = boundaries(width, columns.max(1));
    let ys = boundaries(height, rows.max(1));

    let mut regions = Vec::with_capacity((xs.len() - 1) * (ys.len() - 1));
    for row in ys.windows(2) {
        for column in xs.windows(2) {
            let region = Region::new(column[0], row[0], column[1] - column[0], row[1] - row[0]);
            if !region.is_empty() {
                regions.push(region);
            }
        }
    }
    regions
}

/// The classic four-quadrant split, bisecting at the integer midpoints.
pub fn quadrants(width: u32, height: u32) -> Vec<Region> {
    partition(width, height, DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS)
}

/// Whether no two regions share a pixel.
pub fn are_disjoint(regions: &[Region]) -> bool {
    regions
        .iter()
        .enumerate()
        .all(|(i, a)| regions[i + 1..].iter().all(|b| !a.overlaps(b)))
}

fn boundaries(length: u32, parts: u32) -> Vec<u32> {
    (0..=parts)
        .map(|i| (u64::from(i) * u64::from(length) / u64::from(parts)) as u32)
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
