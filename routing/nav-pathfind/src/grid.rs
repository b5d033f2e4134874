//! The planning grid.
//!
//! A [`VoxelGrid`] discretizes a bounded region into a regular lattice of
//! [`Cell`]s and classifies each one through an [`OccupancyOracle`]. After
//! construction the classification never changes; only the per-search
//! scratch fields on the cells are written.
//!
//! # Example
//!
//! ```
//! use nav_pathfind::VoxelGrid;
//! use nav_spatial::{Aabb, ObstacleField, VoxelCoord};
//! use nav_types::GridConfig;
//! use nalgebra::{Point3, Vector3};
//!
//! let field = ObstacleField::new()
//!     .with_aabb(Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0)));
//! let config = GridConfig::new(Point3::origin(), Vector3::new(8.0, 8.0, 8.0));
//!
//! let grid = VoxelGrid::build(config, &field).unwrap();
//! assert_eq!(grid.dimensions(), [8, 8, 8]);
//!
//! // The cell containing the world origin is inside the box
//! assert!(!grid.cell_at(&Point3::origin()).is_traversable());
//! assert_eq!(grid.cell_at(&Point3::origin()).coord(), VoxelCoord::new(4, 4, 4));
//! ```

use nalgebra::Point3;
use nav_spatial::{OccupancyOracle, VoxelCoord};
use nav_types::{GridConfig, PlanningError};
use tracing::{debug, info};

use crate::cell::Cell;

/// A regular 3D lattice of cells covering a bounded region.
///
/// Cells are stored flat with Z varying fastest, then Y, then X.
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    config: GridConfig,
    dims: [usize; 3],
    cells: Vec<Cell>,
}

impl VoxelGrid {
    /// Builds a grid from a configuration, classifying every cell.
    ///
    /// A cell is traversable when the oracle reports its center unoccupied.
    /// It is spawnable when it is traversable, lies on the vertical midplane
    /// (`z == nz / 2`) and the oracle accepts its center as a spawn surface.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an invalid cell diameter or region,
    /// or [`PlanningError::Oracle`] if any occupancy query fails. No partial
    /// grid is ever returned.
    pub fn build<O>(config: GridConfig, oracle: &O) -> Result<Self, PlanningError>
    where
        O: OccupancyOracle + ?Sized,
    {
        let dims = config.axis_counts()?;
        let [nx, ny, nz] = dims.map(lattice_extent);
        let diameter = config.cell_diameter();
        let min_corner = config.min_corner();
        let midplane = nz / 2;

        let mut cells = Vec::with_capacity(dims.iter().product());
        for x in 0..nx {
            for y in 0..ny {
                for z in 0..nz {
                    let coord = VoxelCoord::new(x, y, z);
                    let center = cell_center(&min_corner, diameter, coord);
                    let traversable = !oracle.is_occupied(&center)?;
                    let spawnable =
                        traversable && z == midplane && oracle.is_spawn_surface(&center)?;
                    cells.push(Cell::new(coord, center, traversable, spawnable));
                }
            }
        }

        let grid = Self {
            config,
            dims,
            cells,
        };
        info!(
            x = dims[0],
            y = dims[1],
            z = dims[2],
            blocked = grid.blocked_count(),
            "Built planning grid"
        );
        Ok(grid)
    }

    /// Rebuilds every cell from the same configuration with a new oracle.
    ///
    /// The grid is only replaced once the new one is complete; on error the
    /// existing grid is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::Oracle`] if any occupancy query fails.
    pub fn rebuild<O>(&mut self, oracle: &O) -> Result<(), PlanningError>
    where
        O: OccupancyOracle + ?Sized,
    {
        debug!("Rebuilding planning grid");
        *self = Self::build(self.config, oracle)?;
        Ok(())
    }

    /// Returns the configuration the grid was built from.
    #[must_use]
    pub const fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Cell counts along X, Y and Z.
    #[must_use]
    pub const fn dimensions(&self) -> [usize; 3] {
        self.dims
    }

    /// Total number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`: a successfully built grid has at least one cell.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cells in storage order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Returns the cell at a lattice coordinate, if it is inside the grid.
    #[must_use]
    pub fn cell(&self, coord: VoxelCoord) -> Option<&Cell> {
        self.index_of(coord).map(|index| &self.cells[index])
    }

    /// Returns the cell at a flat storage index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub(crate) fn cell_mut(&mut self, index: usize) -> &mut Cell {
        &mut self.cells[index]
    }

    /// Flat storage index of a lattice coordinate, if it is inside the grid.
    #[must_use]
    pub fn index_of(&self, coord: VoxelCoord) -> Option<usize> {
        let [nx, ny, nz] = self.dims;
        let x = usize::try_from(coord.x).ok().filter(|&x| x < nx)?;
        let y = usize::try_from(coord.y).ok().filter(|&y| y < ny)?;
        let z = usize::try_from(coord.z).ok().filter(|&z| z < nz)?;
        Some((x * ny + y) * nz + z)
    }

    /// World-space center of a lattice coordinate.
    ///
    /// Coordinates outside the grid are extrapolated along the lattice.
    #[must_use]
    pub fn world_position(&self, coord: VoxelCoord) -> Point3<f64> {
        cell_center(
            &self.config.min_corner(),
            self.config.cell_diameter(),
            coord,
        )
    }

    /// Returns the cell containing a world position.
    ///
    /// Positions outside the region resolve to the nearest edge cell.
    #[must_use]
    pub fn cell_at(&self, position: &Point3<f64>) -> &Cell {
        &self.cells[self.index_at(position)]
    }

    /// Flat storage index of the cell containing a world position.
    ///
    /// Each axis is mapped to a fraction of the region, clamped to `[0, 1]`,
    /// scaled by the axis cell count and truncated. A NaN component resolves
    /// to index 0 on that axis.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn index_at(&self, position: &Point3<f64>) -> usize {
        let min_corner = self.config.min_corner();
        let size = self.config.size();
        let [nx, ny, nz] = self.dims;

        let axis = |value: f64, lo: f64, extent: f64, count: usize| {
            let fraction = ((value - lo) / extent).clamp(0.0, 1.0);
            ((count as f64 * fraction) as usize).min(count - 1)
        };

        let x = axis(position.x, min_corner.x, size.x, nx);
        let y = axis(position.y, min_corner.y, size.y, ny);
        let z = axis(position.z, min_corner.z, size.z, nz);
        (x * ny + y) * nz + z
    }

    /// Iterates over the in-bounds cells of the 3x3x3 block around `coord`,
    /// excluding `coord` itself.
    ///
    /// Order is fixed: X outermost, then Y, then Z, each from -1 to +1.
    ///
    /// # Example
    ///
    /// ```
    /// use nav_pathfind::VoxelGrid;
    /// use nav_spatial::{ObstacleField, VoxelCoord};
    /// use nav_types::GridConfig;
    /// use nalgebra::{Point3, Vector3};
    ///
    /// let config = GridConfig::new(Point3::origin(), Vector3::new(4.0, 4.0, 4.0));
    /// let grid = VoxelGrid::build(config, &ObstacleField::new()).unwrap();
    ///
    /// assert_eq!(grid.neighbors(VoxelCoord::new(1, 1, 1)).count(), 26);
    /// assert_eq!(grid.neighbors(VoxelCoord::new(0, 0, 0)).count(), 7);
    /// ```
    pub fn neighbors(&self, coord: VoxelCoord) -> impl Iterator<Item = &Cell> + '_ {
        coord
            .all_neighbors()
            .into_iter()
            .filter_map(move |neighbor| self.cell(neighbor))
    }

    /// Flat indices of the neighbors of the cell at `index`, with `None` for
    /// positions outside the grid. Same order as [`neighbors`](Self::neighbors).
    pub(crate) fn neighbor_slots(&self, index: usize) -> [Option<usize>; 26] {
        self.cells[index]
            .coord()
            .all_neighbors()
            .map(|neighbor| self.index_of(neighbor))
    }

    /// Number of non-traversable cells.
    #[must_use]
    pub fn blocked_count(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_traversable()).count()
    }

    /// Iterates over the cells flagged as spawnable.
    pub fn spawnable_cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.iter().filter(|cell| cell.is_spawnable())
    }

    /// Clears the search scratch fields of every cell.
    pub(crate) fn reset_scratch(&mut self) {
        for cell in &mut self.cells {
            cell.reset_scratch();
        }
    }
}

/// Axis counts are validated to fit in `i32` by [`GridConfig::axis_counts`].
fn lattice_extent(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

fn cell_center(min_corner: &Point3<f64>, diameter: f64, coord: VoxelCoord) -> Point3<f64> {
    min_corner + (coord.to_vector() * diameter).add_scalar(diameter / 2.0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use nav_spatial::{Aabb, ObstacleField, Sphere};

    fn open_config() -> GridConfig {
        GridConfig::new(Point3::new(8.0, 8.0, 2.0), Vector3::new(16.0, 16.0, 4.0))
    }

    fn open_grid() -> VoxelGrid {
        VoxelGrid::build(open_config(), &ObstacleField::new()).unwrap()
    }

    #[test]
    fn test_build_dimensions() {
        let grid = open_grid();
        assert_eq!(grid.dimensions(), [16, 16, 4]);
        assert_eq!(grid.len(), 16 * 16 * 4);
        assert!(!grid.is_empty());
        assert_eq!(grid.blocked_count(), 0);
    }

    #[test]
    fn test_cell_centers() {
        let grid = open_grid();
        let cell = grid.cell(VoxelCoord::new(0, 0, 0)).unwrap();
        assert_eq!(*cell.position(), Point3::new(0.5, 0.5, 0.5));

        let cell = grid.cell(VoxelCoord::new(15, 3, 2)).unwrap();
        assert_eq!(*cell.position(), Point3::new(15.5, 3.5, 2.5));
        assert_eq!(
            grid.world_position(VoxelCoord::new(15, 3, 2)),
            *cell.position()
        );
    }

    #[test]
    fn test_centers_with_coarse_cells() {
        let config = GridConfig::new(Point3::origin(), Vector3::new(10.0, 10.0, 10.0))
            .with_cell_diameter(2.5);
        let grid = VoxelGrid::build(config, &ObstacleField::new()).unwrap();
        assert_eq!(grid.dimensions(), [4, 4, 4]);
        let cell = grid.cell(VoxelCoord::new(0, 1, 3)).unwrap();
        assert_relative_eq!(cell.position().x, -3.75);
        assert_relative_eq!(cell.position().y, -1.25);
        assert_relative_eq!(cell.position().z, 3.75);
    }

    #[test]
    fn test_storage_order_matches_index_of() {
        let grid = open_grid();
        for (index, cell) in grid.cells().iter().enumerate() {
            assert_eq!(grid.index_of(cell.coord()), Some(index));
        }
    }

    #[test]
    fn test_index_of_out_of_bounds() {
        let grid = open_grid();
        assert_eq!(grid.index_of(VoxelCoord::new(-1, 0, 0)), None);
        assert_eq!(grid.index_of(VoxelCoord::new(16, 0, 0)), None);
        assert_eq!(grid.index_of(VoxelCoord::new(0, 0, 4)), None);
        assert!(grid.cell(VoxelCoord::new(0, 16, 0)).is_none());
    }

    #[test]
    fn test_invalid_cell_diameter_fails() {
        let result = VoxelGrid::build(open_config().with_cell_diameter(0.0), &ObstacleField::new());
        assert!(matches!(result, Err(PlanningError::InvalidCellDiameter(_))));
    }

    #[test]
    fn test_region_smaller_than_a_cell_fails() {
        let config = GridConfig::new(Point3::origin(), Vector3::new(4.0, 4.0, 0.5));
        let result = VoxelGrid::build(config, &ObstacleField::new());
        assert!(matches!(result, Err(PlanningError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_obstacles_block_cells() {
        // Covers the centers of x in 4..=5, every y, z in 0..=1
        let wall = Aabb::new(Point3::new(4.2, -1.0, -1.0), Point3::new(5.8, 17.0, 1.8));
        let grid = VoxelGrid::build(open_config(), &ObstacleField::new().with_aabb(wall)).unwrap();
        assert_eq!(grid.blocked_count(), 2 * 16 * 2);
        assert!(!grid.cell(VoxelCoord::new(4, 7, 0)).unwrap().is_traversable());
        assert!(grid.cell(VoxelCoord::new(4, 7, 2)).unwrap().is_traversable());
        assert!(grid.cell(VoxelCoord::new(3, 7, 0)).unwrap().is_traversable());
    }

    #[test]
    fn test_oracle_failure_aborts_build() {
        let mut field = ObstacleField::new();
        field.push(Sphere::new(Point3::new(f64::NAN, 0.0, 0.0), 1.0));
        let result = VoxelGrid::build(open_config(), &field);
        assert!(matches!(result, Err(PlanningError::Oracle(_))));
    }

    #[test]
    fn test_spawnable_only_on_midplane() {
        let floor = Aabb::new(Point3::new(0.0, 0.0, 1.9), Point3::new(16.0, 16.0, 2.0));
        let field = ObstacleField::new()
            .with_spawn_surface(floor)
            .with_surface_reach(1.0);
        let grid = VoxelGrid::build(open_config(), &field).unwrap();

        // nz = 4, so the midplane is z = 2; z = 1 is also near the surface
        assert_eq!(grid.spawnable_cells().count(), 16 * 16);
        assert!(grid.spawnable_cells().all(|cell| cell.coord().z == 2));
        assert!(!grid.cell(VoxelCoord::new(3, 3, 1)).unwrap().is_spawnable());
    }

    #[test]
    fn test_blocked_cells_are_never_spawnable() {
        let floor = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(16.0, 16.0, 4.0));
        let block = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(16.0, 16.0, 4.0));
        let field = ObstacleField::new().with_spawn_surface(floor).with_aabb(block);
        let grid = VoxelGrid::build(open_config(), &field).unwrap();
        assert_eq!(grid.spawnable_cells().count(), 0);
    }

    #[test]
    fn test_cell_at_inside() {
        let grid = open_grid();
        assert_eq!(
            grid.cell_at(&Point3::new(2.5, 8.5, 2.5)).coord(),
            VoxelCoord::new(2, 8, 2)
        );
        assert_eq!(
            grid.cell_at(&Point3::new(2.01, 8.99, 0.0)).coord(),
            VoxelCoord::new(2, 8, 0)
        );
    }

    #[test]
    fn test_cell_at_clamps_out_of_bounds() {
        let grid = open_grid();
        assert_eq!(
            grid.cell_at(&Point3::new(-100.0, 8.5, 2.5)).coord(),
            VoxelCoord::new(0, 8, 2)
        );
        assert_eq!(
            grid.cell_at(&Point3::new(100.0, 100.0, 100.0)).coord(),
            VoxelCoord::new(15, 15, 3)
        );
        // Exactly on the far face
        assert_eq!(
            grid.cell_at(&Point3::new(16.0, 16.0, 4.0)).coord(),
            VoxelCoord::new(15, 15, 3)
        );
    }

    #[test]
    fn test_cell_at_nan_is_deterministic() {
        let grid = open_grid();
        let a = grid.index_at(&Point3::new(f64::NAN, 3.5, 1.5));
        let b = grid.index_at(&Point3::new(f64::NAN, 3.5, 1.5));
        assert_eq!(a, b);
        assert_eq!(grid.cells()[a].coord(), VoxelCoord::new(0, 3, 1));
    }

    #[test]
    fn test_neighbors_interior_and_corner() {
        let grid = open_grid();
        assert_eq!(grid.neighbors(VoxelCoord::new(5, 5, 1)).count(), 26);
        assert_eq!(grid.neighbors(VoxelCoord::new(0, 0, 0)).count(), 7);
        assert_eq!(grid.neighbors(VoxelCoord::new(15, 7, 3)).count(), 11);
    }

    #[test]
    fn test_neighbors_order_is_fixed() {
        let grid = open_grid();
        let coords: Vec<_> = grid
            .neighbors(VoxelCoord::new(5, 5, 1))
            .map(Cell::coord)
            .collect();
        assert_eq!(coords[0], VoxelCoord::new(4, 4, 0));
        assert_eq!(coords[1], VoxelCoord::new(4, 4, 1));
        assert_eq!(coords[25], VoxelCoord::new(6, 6, 2));
        assert!(!coords.contains(&VoxelCoord::new(5, 5, 1)));

        let index = grid.index_of(VoxelCoord::new(5, 5, 1)).unwrap();
        let slots: Vec<_> = grid.neighbor_slots(index).into_iter().flatten().collect();
        let expected: Vec<_> = coords.iter().map(|&c| grid.index_of(c).unwrap()).collect();
        assert_eq!(slots, expected);
    }

    #[test]
    fn test_rebuild_replaces_classification() {
        let mut grid = open_grid();
        let wall = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(16.0, 16.0, 0.9));
        grid.rebuild(&ObstacleField::new().with_aabb(wall)).unwrap();
        assert_eq!(grid.blocked_count(), 16 * 16);
    }

    #[test]
    fn test_failed_rebuild_keeps_grid() {
        let mut grid = open_grid();
        let mut field = ObstacleField::new();
        field.push(Sphere::new(Point3::origin(), f64::NAN));
        assert!(grid.rebuild(&field).is_err());
        assert_eq!(grid.len(), 16 * 16 * 4);
        assert_eq!(grid.blocked_count(), 0);
    }
}
