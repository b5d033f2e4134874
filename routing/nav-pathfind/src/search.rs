//! Theta* and A* search over a [`VoxelGrid`].
//!
//! A search is an explicit state object. [`SearchState::begin`] resolves the
//! endpoints and seeds the open set; each [`SearchState::step`] closes one
//! cell and relaxes its neighbors; [`SearchState::finish`] turns a terminal
//! state into a [`PathResult`]. Hosts that need to interleave planning with
//! other work call `step` from their own loop. [`PathSearchEngine`] runs the
//! whole thing in one call.
//!
//! # Relaxation
//!
//! In [`SearchMode::ThetaStar`], a neighbor of the current cell is first
//! offered the current cell's parent as its own parent, provided the oracle
//! reports line of sight between the two. Otherwise, and always in
//! [`SearchMode::AStarOnly`], the neighbor is relaxed through the current
//! cell as in grid A*. Costs are Euclidean distances between lattice
//! coordinates.
//!
//! # Ordering
//!
//! The open cell with the lowest `f` cost is expanded next. Ties go to the
//! lowest `h` cost, then to the cell that entered the open set first, so the
//! same grid and endpoints always yield the same path.
//!
//! # Example
//!
//! ```
//! use nav_pathfind::{PathSearchEngine, VoxelGrid};
//! use nav_spatial::ObstacleField;
//! use nav_types::{GridConfig, SearchConfig};
//! use nalgebra::{Point3, Vector3};
//!
//! let field = ObstacleField::new();
//! let config = GridConfig::new(Point3::new(8.0, 8.0, 2.0), Vector3::new(16.0, 16.0, 4.0));
//! let mut grid = VoxelGrid::build(config, &field).unwrap();
//!
//! let engine = PathSearchEngine::new(SearchConfig::default());
//! let result = engine
//!     .search(&mut grid, &field, &Point3::new(2.5, 8.5, 2.5), &Point3::new(12.5, 8.5, 2.5))
//!     .unwrap();
//!
//! assert!(result.is_success());
//! assert_eq!(result.waypoints(), &[Point3::new(12.5, 8.5, 2.5)]);
//! ```

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use nalgebra::Point3;
use nav_spatial::{OccupancyOracle, VoxelCoord};
use nav_types::{PathFailure, PathResult, PlanningError, SearchConfig, SearchMode, SearchStats};
use tracing::debug;

use crate::grid::VoxelGrid;
use crate::simplify::compress_collinear;

/// Where a search is in its lifecycle.
///
/// A search leaves its initial state inside [`SearchState::begin`], so the
/// first observable status is either `Searching` or an immediate failure.
/// `Succeeded` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// The open set still has candidates.
    Searching,
    /// The target cell was reached.
    Succeeded,
    /// The search ended without a path.
    Failed(PathFailure),
}

impl SearchStatus {
    /// Returns `true` for `Succeeded` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Searching)
    }
}

/// Per-search membership of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Membership {
    Unvisited,
    /// In the open set; carries the order of first insertion.
    Open(u64),
    Closed,
}

/// Open set entry. Improved cells are pushed again and stale entries are
/// skipped when popped.
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f_cost: f64,
    h_cost: f64,
    g_cost: f64,
    sequence: u64,
    index: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .f_cost
            .total_cmp(&self.f_cost)
            .then_with(|| other.h_cost.total_cmp(&self.h_cost))
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// The resumable state of one search.
///
/// Cost and parent fields live on the grid's cells, so a grid must only
/// ever have one unfinished search stepping over it. Membership in the open
/// and closed sets, and the traversability override for the start cell, are
/// held here.
#[derive(Debug, Clone)]
pub struct SearchState {
    config: SearchConfig,
    start: usize,
    target: usize,
    status: SearchStatus,
    open: BinaryHeap<OpenEntry>,
    membership: Vec<Membership>,
    next_sequence: u64,
    stats: SearchStats,
}

impl SearchState {
    /// Starts a search between two world positions.
    ///
    /// Resets every cell's scratch fields, resolves both endpoints with
    /// [`VoxelGrid::cell_at`], and either seeds the open set with the start
    /// cell or fails immediately with [`PathFailure::TargetUnreachable`].
    /// No oracle queries are made here.
    #[must_use]
    pub fn begin(
        grid: &mut VoxelGrid,
        start: &Point3<f64>,
        target: &Point3<f64>,
        config: SearchConfig,
    ) -> Self {
        grid.reset_scratch();

        let start = grid.index_at(start);
        let target = grid.index_at(target);
        let mut state = Self {
            config,
            start,
            target,
            status: SearchStatus::Searching,
            open: BinaryHeap::new(),
            membership: vec![Membership::Unvisited; grid.len()],
            next_sequence: 0,
            stats: SearchStats::default(),
        };

        debug!(
            start = ?grid.cells()[start].coord(),
            target = ?grid.cells()[target].coord(),
            mode = config.mode().name(),
            "Starting path search"
        );

        if !grid.cells()[target].is_traversable() {
            state.terminate(SearchStatus::Failed(PathFailure::TargetUnreachable));
            return state;
        }

        let h_cost = lattice_distance(grid, start, target);
        grid.cell_mut(start).set_scratch(0.0, h_cost, None);
        state.push_open(grid, start);
        state
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> SearchStatus {
        self.status
    }

    /// Returns `true` once the search has succeeded or failed.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Returns the counters collected so far.
    #[must_use]
    pub const fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Returns the configuration captured at [`begin`](Self::begin).
    #[must_use]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Flat index of the start cell.
    #[must_use]
    pub const fn start_index(&self) -> usize {
        self.start
    }

    /// Flat index of the target cell.
    #[must_use]
    pub const fn target_index(&self) -> usize {
        self.target
    }

    /// Number of cells currently in the open set.
    #[must_use]
    pub fn open_len(&self) -> usize {
        self.membership
            .iter()
            .filter(|m| matches!(m, Membership::Open(_)))
            .count()
    }

    /// Returns `true` if the cell at `index` has been closed.
    #[must_use]
    pub fn is_closed(&self, index: usize) -> bool {
        matches!(self.membership.get(index), Some(Membership::Closed))
    }

    /// Closes the best open cell and relaxes its neighbors.
    ///
    /// Calling this on a terminal state returns the terminal status without
    /// doing anything.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::Oracle`] if a line-of-sight query fails. The
    /// search is then terminal with [`PathFailure::Aborted`].
    pub fn step<O>(
        &mut self,
        grid: &mut VoxelGrid,
        oracle: &O,
    ) -> Result<SearchStatus, PlanningError>
    where
        O: OccupancyOracle + ?Sized,
    {
        if self.is_terminal() {
            return Ok(self.status);
        }
        self.stats.steps += 1;

        let Some(current) = self.pop_open(grid) else {
            self.terminate(SearchStatus::Failed(PathFailure::NoPathFound));
            return Ok(self.status);
        };
        self.membership[current] = Membership::Closed;

        if current == self.target {
            self.stats.expansions += 1;
            self.terminate(SearchStatus::Succeeded);
            return Ok(self.status);
        }

        // Unreachable while only traversable cells are opened; skip rather
        // than abandon the remaining candidates.
        if !self.is_traversable(grid, current) {
            return Ok(self.status);
        }

        // Counts only cells whose neighbors were actually relaxed
        if let Some(limit) = self.config.max_expansions() {
            if self.stats.expansions >= limit {
                self.terminate(SearchStatus::Failed(PathFailure::ExpansionLimit(limit)));
                return Ok(self.status);
            }
        }
        self.stats.expansions += 1;

        if let Err(error) = self.expand(grid, oracle, current) {
            self.terminate(SearchStatus::Failed(PathFailure::Aborted));
            return Err(error);
        }
        Ok(self.status)
    }

    /// Steps until the search is terminal.
    ///
    /// # Errors
    ///
    /// Returns the first oracle failure, as [`step`](Self::step) does.
    pub fn run<O>(&mut self, grid: &mut VoxelGrid, oracle: &O) -> Result<SearchStatus, PlanningError>
    where
        O: OccupancyOracle + ?Sized,
    {
        while !self.is_terminal() {
            self.step(grid, oracle)?;
        }
        Ok(self.status)
    }

    /// Builds the result of a terminal search.
    ///
    /// On success the parent chain is traced from the target back to the
    /// start, reversed and compressed into world-space waypoints. A search
    /// that is not terminal yet reports [`PathFailure::NoPathFound`].
    #[must_use]
    pub fn finish(&self, grid: &VoxelGrid) -> PathResult {
        match self.status {
            SearchStatus::Succeeded => match self.trace(grid) {
                Some(cells) => {
                    let waypoints = compress_collinear(&cells)
                        .into_iter()
                        .map(|coord| grid.world_position(coord))
                        .collect();
                    PathResult::found(waypoints, self.stats)
                }
                None => PathResult::failed(PathFailure::NoPathFound, self.stats),
            },
            SearchStatus::Failed(failure) => PathResult::failed(failure, self.stats),
            SearchStatus::Searching => PathResult::failed(PathFailure::NoPathFound, self.stats),
        }
    }

    fn expand<O>(
        &mut self,
        grid: &mut VoxelGrid,
        oracle: &O,
        current: usize,
    ) -> Result<(), PlanningError>
    where
        O: OccupancyOracle + ?Sized,
    {
        let current_g = grid.cells()[current].g_cost();
        let current_parent = grid.cells()[current].parent();
        let theta = self.config.mode() == SearchMode::ThetaStar;

        for neighbor in grid.neighbor_slots(current).into_iter().flatten() {
            if self.membership[neighbor] == Membership::Closed
                || !self.is_traversable(grid, neighbor)
            {
                continue;
            }

            let mut source = (current, current_g);
            if let Some(parent) = current_parent.filter(|_| theta) {
                if self.line_of_sight(grid, oracle, parent, neighbor)? {
                    source = (parent, grid.cells()[parent].g_cost());
                }
            }

            let (from, from_g) = source;
            let tentative = from_g + lattice_distance(grid, from, neighbor);
            let in_open = matches!(self.membership[neighbor], Membership::Open(_));
            if !in_open || tentative < grid.cells()[neighbor].g_cost() {
                let h_cost = lattice_distance(grid, neighbor, self.target);
                grid.cell_mut(neighbor).set_scratch(tentative, h_cost, Some(from));
                self.push_open(grid, neighbor);
            }
        }
        Ok(())
    }

    fn line_of_sight<O>(
        &mut self,
        grid: &VoxelGrid,
        oracle: &O,
        from: usize,
        to: usize,
    ) -> Result<bool, PlanningError>
    where
        O: OccupancyOracle + ?Sized,
    {
        self.stats.los_checks += 1;
        let visible = oracle.is_unobstructed(
            grid.cells()[from].position(),
            grid.cells()[to].position(),
            self.config.los_max_distance(),
        )?;
        Ok(visible)
    }

    fn is_traversable(&self, grid: &VoxelGrid, index: usize) -> bool {
        index == self.start || grid.cells()[index].is_traversable()
    }

    fn push_open(&mut self, grid: &VoxelGrid, index: usize) {
        let sequence = match self.membership[index] {
            Membership::Open(sequence) => sequence,
            _ => {
                let sequence = self.next_sequence;
                self.next_sequence += 1;
                sequence
            }
        };
        self.membership[index] = Membership::Open(sequence);

        let cell = &grid.cells()[index];
        self.open.push(OpenEntry {
            f_cost: cell.f_cost(),
            h_cost: cell.h_cost(),
            g_cost: cell.g_cost(),
            sequence,
            index,
        });
    }

    fn pop_open(&mut self, grid: &VoxelGrid) -> Option<usize> {
        while let Some(entry) = self.open.pop() {
            let current = matches!(
                self.membership[entry.index],
                Membership::Open(sequence) if sequence == entry.sequence
            );
            // An improved cell leaves its older, costlier entries behind
            let fresh = grid.cells()[entry.index].g_cost().to_bits() == entry.g_cost.to_bits();
            if current && fresh {
                return Some(entry.index);
            }
        }
        None
    }

    fn trace(&self, grid: &VoxelGrid) -> Option<Vec<VoxelCoord>> {
        let mut cells = vec![grid.cells()[self.target].coord()];
        let mut index = self.target;
        while index != self.start {
            index = grid.cells()[index].parent()?;
            cells.push(grid.cells()[index].coord());
            if cells.len() > grid.len() {
                return None;
            }
        }
        cells.reverse();
        Some(cells)
    }

    fn terminate(&mut self, status: SearchStatus) {
        self.status = status;
        self.open.clear();
        debug!(
            status = ?status,
            expansions = self.stats.expansions,
            los_checks = self.stats.los_checks,
            "Path search finished"
        );
    }
}

/// Euclidean distance between two cells, in lattice units.
fn lattice_distance(grid: &VoxelGrid, a: usize, b: usize) -> f64 {
    grid.cells()[a]
        .coord()
        .euclidean_distance(grid.cells()[b].coord())
}

/// Runs complete searches with a fixed configuration.
///
/// # Example
///
/// ```
/// use nav_pathfind::{PathSearchEngine, VoxelGrid};
/// use nav_spatial::{Aabb, ObstacleField};
/// use nav_types::{GridConfig, PathFailure, SearchConfig};
/// use nalgebra::{Point3, Vector3};
///
/// // The target sits inside a box
/// let field = ObstacleField::new()
///     .with_aabb(Aabb::new(Point3::new(6.0, 6.0, 0.0), Point3::new(8.0, 8.0, 4.0)));
/// let config = GridConfig::new(Point3::new(8.0, 8.0, 2.0), Vector3::new(16.0, 16.0, 4.0));
/// let mut grid = VoxelGrid::build(config, &field).unwrap();
///
/// let result = PathSearchEngine::default()
///     .search(&mut grid, &field, &Point3::new(1.5, 1.5, 1.5), &Point3::new(7.0, 7.0, 2.0))
///     .unwrap();
/// assert_eq!(result.failure(), Some(PathFailure::TargetUnreachable));
/// assert!(result.waypoints().is_empty());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PathSearchEngine {
    config: SearchConfig,
}

impl PathSearchEngine {
    /// Creates an engine with the given search configuration.
    #[must_use]
    pub const fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    /// Returns the search configuration.
    #[must_use]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Searches from `start` to `target` and returns the finished result.
    ///
    /// Routine failures are reported inside the [`PathResult`].
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::Oracle`] if a line-of-sight query fails.
    pub fn search<O>(
        &self,
        grid: &mut VoxelGrid,
        oracle: &O,
        start: &Point3<f64>,
        target: &Point3<f64>,
    ) -> Result<PathResult, PlanningError>
    where
        O: OccupancyOracle + ?Sized,
    {
        let mut state = SearchState::begin(grid, start, target, self.config);
        state.run(grid, oracle)?;
        Ok(state.finish(grid))
    }
}
