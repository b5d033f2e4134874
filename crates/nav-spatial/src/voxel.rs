//! Integer lattice coordinates.

use std::ops::{Add, Sub};

use nalgebra::Vector3;

/// A cell position on a planning lattice, or the step between two of them.
///
/// Grids only hand out non-negative coordinates, but the components are
/// signed so that subtracting one coordinate from another stays in the type.
///
/// ```
/// use nav_spatial::VoxelCoord;
///
/// let from = VoxelCoord::new(1, 2, 3);
/// let to = VoxelCoord::new(4, 2, 3);
/// assert_eq!(to - from, VoxelCoord::new(3, 0, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoxelCoord {
    /// Index along X.
    pub x: i32,
    /// Index along Y.
    pub y: i32,
    /// Index along Z (up).
    pub z: i32,
}

/// Steps to the 26 surrounding cells, X varying slowest and Z fastest.
const NEIGHBOR_OFFSETS: [VoxelCoord; 26] = {
    let mut table = [VoxelCoord::new(0, 0, 0); 26];
    let mut slot = 0;
    let mut code = 0;
    while code < 27 {
        // code 13 is the cell itself
        if code != 13 {
            table[slot] = VoxelCoord::new(code / 9 - 1, code / 3 % 3 - 1, code % 3 - 1);
            slot += 1;
        }
        code += 1;
    }
    table
};

impl VoxelCoord {
    /// Creates a coordinate from its components.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The components as `f64`.
    #[must_use]
    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.x.into(), self.y.into(), self.z.into())
    }

    /// Every cell sharing a face, edge or corner with this one.
    ///
    /// The order never changes: offsets run from `(-1, -1, -1)` to
    /// `(1, 1, 1)` with Z varying fastest. Searches break ties by it.
    ///
    /// ```
    /// use nav_spatial::VoxelCoord;
    ///
    /// let around = VoxelCoord::new(5, 5, 1).all_neighbors();
    /// assert_eq!(around[0], VoxelCoord::new(4, 4, 0));
    /// assert_eq!(around[1], VoxelCoord::new(4, 4, 1));
    /// assert_eq!(around[25], VoxelCoord::new(6, 6, 2));
    /// ```
    #[must_use]
    pub fn all_neighbors(self) -> [Self; 26] {
        NEIGHBOR_OFFSETS.map(|offset| self + offset)
    }

    /// Straight-line distance in cell units.
    #[must_use]
    pub fn euclidean_distance(self, other: Self) -> f64 {
        (self - other).to_vector().norm()
    }

    /// Largest per-axis difference. Neighbors are exactly the cells at
    /// distance 1.
    #[must_use]
    pub fn chebyshev_distance(self, other: Self) -> u32 {
        [
            self.x.abs_diff(other.x),
            self.y.abs_diff(other.y),
            self.z.abs_diff(other.z),
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    /// Reads the coordinate as a step and divides out the common factor of
    /// its components.
    ///
    /// Two steps point the same way exactly when their directions are equal.
    ///
    /// ```
    /// use nav_spatial::VoxelCoord;
    ///
    /// assert_eq!(VoxelCoord::new(4, 2, 0).direction(), VoxelCoord::new(2, 1, 0));
    /// assert_eq!(VoxelCoord::new(0, 0, -3).direction(), VoxelCoord::new(0, 0, -1));
    /// ```
    #[must_use]
    pub fn direction(self) -> Self {
        let factor = [self.x, self.y, self.z]
            .into_iter()
            .map(i32::unsigned_abs)
            .fold(0, gcd);
        match i32::try_from(factor) {
            Ok(factor) if factor > 1 => Self::new(self.x / factor, self.y / factor, self.z / factor),
            _ => self,
        }
    }
}

const fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 { a } else { gcd(b, a % b) }
}

impl From<(i32, i32, i32)> for VoxelCoord {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}

impl Add for VoxelCoord {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.x.wrapping_add(rhs.x),
            self.y.wrapping_add(rhs.y),
            self.z.wrapping_add(rhs.z),
        )
    }
}

impl Sub for VoxelCoord {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.x.wrapping_sub(rhs.x),
            self.y.wrapping_sub(rhs.y),
            self.z.wrapping_sub(rhs.z),
        )
    }
}
