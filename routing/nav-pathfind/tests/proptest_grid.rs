//! Property-based tests for grid mapping, search and scheduling.
//!
//! These tests use proptest to generate random obstacle layouts and request
//! sequences and verify invariants that must hold for all of them.
//!
//! Run with: cargo test -p nav-pathfind -- proptest

#![allow(clippy::unwrap_used, missing_docs)]

use nalgebra::{Point3, Vector3};
use nav_pathfind::simplify::compress_collinear;
use nav_pathfind::{PathRequestScheduler, PathSearchEngine, VoxelGrid};
use nav_spatial::{Aabb, ObstacleField, VoxelCoord};
use nav_types::{GridConfig, PathResult, PlannerConfig, SearchConfig, SearchMode};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// 16 x 16 x 4 region with its minimum corner at the world origin.
fn region() -> GridConfig {
    GridConfig::new(Point3::new(8.0, 8.0, 2.0), Vector3::new(16.0, 16.0, 4.0))
}

fn arb_point() -> impl Strategy<Value = Point3<f64>> {
    prop::array::uniform3(-1000.0..1000.0f64).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

fn arb_cell() -> impl Strategy<Value = VoxelCoord> {
    (0..16i32, 0..16i32, 0..4i32).prop_map(|(x, y, z)| VoxelCoord::new(x, y, z))
}

/// Axis-aligned boxes inside the region, up to 4 cells on a side.
fn arb_box() -> impl Strategy<Value = Aabb> {
    (
        prop::array::uniform3(0.0..14.0f64),
        prop::array::uniform3(0.5..4.0f64),
    )
        .prop_map(|([x, y, z], [w, d, h])| {
            Aabb::new(Point3::new(x, y, z * 0.25), Point3::new(x + w, y + d, z * 0.25 + h))
        })
}

fn arb_field() -> impl Strategy<Value = ObstacleField> {
    prop::collection::vec(arb_box(), 0..8).prop_map(|boxes| {
        boxes
            .into_iter()
            .fold(ObstacleField::new(), ObstacleField::with_aabb)
    })
}

fn center_of(coord: VoxelCoord) -> Point3<f64> {
    Point3::new(
        f64::from(coord.x) + 0.5,
        f64::from(coord.y) + 0.5,
        f64::from(coord.z) + 0.5,
    )
}

fn search(
    grid: &mut VoxelGrid,
    field: &ObstacleField,
    mode: SearchMode,
    start: VoxelCoord,
    target: VoxelCoord,
) -> PathResult {
    PathSearchEngine::new(SearchConfig::default().with_mode(mode))
        .search(grid, field, &center_of(start), &center_of(target))
        .unwrap()
}

// =============================================================================
// Property Tests: World/Lattice Mapping
// =============================================================================

proptest! {
    /// Every finite point maps to some cell, however far outside the region.
    #[test]
    fn proptest_points_clamp_into_grid(point in arb_point()) {
        let grid = VoxelGrid::build(region(), &ObstacleField::new()).unwrap();
        let index = grid.index_at(&point);
        prop_assert!(index < grid.len());

        let coord = grid.cell_at(&point).coord();
        prop_assert!((0..16).contains(&coord.x));
        prop_assert!((0..16).contains(&coord.y));
        prop_assert!((0..4).contains(&coord.z));
    }

    /// A cell center maps back to its own cell.
    #[test]
    fn proptest_center_maps_to_own_cell(coord in arb_cell()) {
        let grid = VoxelGrid::build(region(), &ObstacleField::new()).unwrap();
        let center = grid.world_position(coord);
        prop_assert_eq!(grid.cell_at(&center).coord(), coord);
        prop_assert_eq!(grid.index_at(&center), grid.index_of(coord).unwrap());
    }

    /// Neighbors are in-bounds, distinct from the cell, and adjacent.
    #[test]
    fn proptest_neighbors_are_adjacent(coord in arb_cell()) {
        let grid = VoxelGrid::build(region(), &ObstacleField::new()).unwrap();
        let neighbors: Vec<VoxelCoord> = grid.neighbors(coord).map(|cell| cell.coord()).collect();

        prop_assert!(!neighbors.is_empty());
        prop_assert!(neighbors.len() <= 26);
        for neighbor in &neighbors {
            prop_assert_ne!(*neighbor, coord);
            prop_assert_eq!(neighbor.chebyshev_distance(coord), 1);
            prop_assert!(grid.index_of(*neighbor).is_some());
        }
    }
}

// =============================================================================
// Property Tests: Search
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// The same grid and endpoints always give the same result.
    #[test]
    fn proptest_search_is_deterministic(
        field in arb_field(),
        start in arb_cell(),
        target in arb_cell(),
    ) {
        let mut grid = VoxelGrid::build(region(), &field).unwrap();
        let first = search(&mut grid, &field, SearchMode::ThetaStar, start, target);
        let second = search(&mut grid, &field, SearchMode::ThetaStar, start, target);
        prop_assert_eq!(first, second);
    }

    /// Both modes explore the same cell graph, so they agree on reachability.
    #[test]
    fn proptest_modes_agree_on_reachability(
        field in arb_field(),
        start in arb_cell(),
        target in arb_cell(),
    ) {
        let mut grid = VoxelGrid::build(region(), &field).unwrap();
        let theta = search(&mut grid, &field, SearchMode::ThetaStar, start, target);
        let astar = search(&mut grid, &field, SearchMode::AStarOnly, start, target);

        prop_assert_eq!(theta.is_success(), astar.is_success());
        prop_assert_eq!(theta.failure(), astar.failure());
        prop_assert_eq!(astar.stats().los_checks, 0);
    }

    /// Shortcutting through line of sight never makes a path longer.
    #[test]
    fn proptest_theta_star_never_longer_than_astar(
        field in arb_field(),
        start in arb_cell(),
        target in arb_cell(),
    ) {
        let mut grid = VoxelGrid::build(region(), &field).unwrap();
        let theta = search(&mut grid, &field, SearchMode::ThetaStar, start, target);
        let astar = search(&mut grid, &field, SearchMode::AStarOnly, start, target);
        prop_assume!(theta.is_success() && astar.is_success());

        let from = center_of(start);
        prop_assert!(theta.length_from(&from) <= astar.length_from(&from) + 1e-9);
    }

    /// Successful paths end on the target center and only visit open cells.
    #[test]
    fn proptest_waypoints_are_open_cell_centers(
        field in arb_field(),
        start in arb_cell(),
        target in arb_cell(),
    ) {
        let mut grid = VoxelGrid::build(region(), &field).unwrap();
        let result = search(&mut grid, &field, SearchMode::ThetaStar, start, target);
        prop_assume!(result.is_success());

        prop_assert_eq!(result.waypoints().last(), Some(&center_of(target)));
        for waypoint in result.waypoints() {
            let cell = grid.cell_at(waypoint);
            prop_assert_eq!(cell.position(), waypoint);
            prop_assert!(cell.is_traversable() || cell.coord() == start);
        }
    }

    /// Failed results carry no waypoints.
    #[test]
    fn proptest_failures_are_empty(
        field in arb_field(),
        start in arb_cell(),
        target in arb_cell(),
    ) {
        let mut grid = VoxelGrid::build(region(), &field).unwrap();
        let result = search(&mut grid, &field, SearchMode::AStarOnly, start, target);
        prop_assert_eq!(result.is_success(), result.failure().is_none());
        if !result.is_success() {
            prop_assert!(result.waypoints().is_empty());
        }
    }
}

// =============================================================================
// Property Tests: Simplification and Scheduling
// =============================================================================

proptest! {
    /// Compression keeps an ordered subset of the path ending at the target.
    #[test]
    fn proptest_compression_is_a_subsequence(
        path in prop::collection::vec(arb_cell(), 2..40),
    ) {
        let compressed = compress_collinear(&path);
        prop_assert_eq!(compressed.last(), path.last());

        let mut rest = path[1..].iter();
        for kept in &compressed {
            prop_assert!(rest.any(|coord| coord == kept));
        }
    }

    /// Every request is answered exactly once, in submission order.
    #[test]
    fn proptest_scheduler_is_fifo(
        requests in prop::collection::vec((arb_cell(), arb_cell()), 1..12),
        steps in 1..64usize,
    ) {
        let config = PlannerConfig::new(region(), SearchConfig::default());
        let mut scheduler = PathRequestScheduler::new(config, ObstacleField::new()).unwrap();
        let (tx, rx) = crossbeam_channel::unbounded();

        for (tag, (start, target)) in requests.iter().enumerate() {
            let tx = tx.clone();
            scheduler.enqueue(center_of(*start), center_of(*target), move |_, success| {
                tx.send((tag, success)).unwrap();
            });
        }
        drop(tx);

        while scheduler.is_busy() {
            scheduler.update(steps).unwrap();
        }
        drop(scheduler);

        let delivered: Vec<(usize, bool)> = rx.iter().collect();
        let expected: Vec<(usize, bool)> = (0..requests.len()).map(|tag| (tag, true)).collect();
        prop_assert_eq!(delivered, expected);
    }
}
