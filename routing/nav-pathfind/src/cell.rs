//! Grid cells.

use nalgebra::Point3;
use nav_spatial::VoxelCoord;

/// One lattice point of a [`VoxelGrid`](crate::VoxelGrid).
///
/// Classification (`traversable`, `spawnable`) is fixed when the grid is
/// built. The cost and parent fields are scratch space owned by whichever
/// search is currently running; they are reset at the start of every search
/// and carry no meaning between searches.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    coord: VoxelCoord,
    position: Point3<f64>,
    traversable: bool,
    spawnable: bool,
    g_cost: f64,
    h_cost: f64,
    /// Flat index of the parent cell in the same grid.
    parent: Option<usize>,
}

impl Cell {
    pub(crate) const fn new(
        coord: VoxelCoord,
        position: Point3<f64>,
        traversable: bool,
        spawnable: bool,
    ) -> Self {
        Self {
            coord,
            position,
            traversable,
            spawnable,
            g_cost: f64::INFINITY,
            h_cost: 0.0,
            parent: None,
        }
    }

    /// Lattice coordinate of this cell.
    #[must_use]
    pub const fn coord(&self) -> VoxelCoord {
        self.coord
    }

    /// World-space center of this cell.
    #[must_use]
    pub const fn position(&self) -> &Point3<f64> {
        &self.position
    }

    /// Returns `true` if the cell center lies outside every obstacle.
    #[must_use]
    pub const fn is_traversable(&self) -> bool {
        self.traversable
    }

    /// Returns `true` if agents may be placed here.
    #[must_use]
    pub const fn is_spawnable(&self) -> bool {
        self.spawnable
    }

    /// Best known path cost from the search start.
    #[must_use]
    pub const fn g_cost(&self) -> f64 {
        self.g_cost
    }

    /// Heuristic estimate of the remaining cost to the target.
    #[must_use]
    pub const fn h_cost(&self) -> f64 {
        self.h_cost
    }

    /// `g_cost + h_cost`.
    #[must_use]
    pub fn f_cost(&self) -> f64 {
        self.g_cost + self.h_cost
    }

    /// Flat index of the parent cell, if the current search has set one.
    #[must_use]
    pub const fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub(crate) const fn set_scratch(&mut self, g_cost: f64, h_cost: f64, parent: Option<usize>) {
        self.g_cost = g_cost;
        self.h_cost = h_cost;
        self.parent = parent;
    }

    pub(crate) const fn reset_scratch(&mut self) {
        self.set_scratch(f64::INFINITY, 0.0, None);
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cell_has_clean_scratch() {
        let cell = Cell::new(VoxelCoord::new(1, 2, 3), Point3::new(1.5, 2.5, 3.5), true, false);
        assert_eq!(cell.coord(), VoxelCoord::new(1, 2, 3));
        assert!(cell.is_traversable());
        assert!(!cell.is_spawnable());
        assert_eq!(cell.g_cost(), f64::INFINITY);
        assert_eq!(cell.parent(), None);
    }

    #[test]
    fn test_scratch_round_trip() {
        let mut cell = Cell::new(VoxelCoord::default(), Point3::origin(), true, true);
        cell.set_scratch(2.0, 3.0, Some(7));
        assert_eq!(cell.f_cost(), 5.0);
        assert_eq!(cell.parent(), Some(7));

        cell.reset_scratch();
        assert_eq!(cell.h_cost(), 0.0);
        assert_eq!(cell.parent(), None);
        assert_eq!(cell.f_cost(), f64::INFINITY);
    }
}
