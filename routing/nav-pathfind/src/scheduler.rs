//! FIFO scheduling of path requests over one shared grid.
//!
//! The grid's cells hold the scratch state of the running search, so at most
//! one search is in flight at a time. Further requests wait in a queue and are
//! started in submission order as earlier ones complete.
//!
//! The scheduler never runs on its own. The host drives it by calling
//! [`PathRequestScheduler::update`] with a step budget, typically once per
//! frame or simulation tick, and completion callbacks fire from inside that
//! call. Submitting a request never runs a callback.
//!
//! # Example
//!
//! ```
//! use nav_pathfind::PathRequestScheduler;
//! use nav_spatial::ObstacleField;
//! use nav_types::{GridConfig, PlannerConfig, SearchConfig};
//! use nalgebra::{Point3, Vector3};
//!
//! let grid = GridConfig::new(Point3::new(8.0, 8.0, 2.0), Vector3::new(16.0, 16.0, 4.0));
//! let config = PlannerConfig::new(grid, SearchConfig::default());
//! let mut scheduler = PathRequestScheduler::new(config, ObstacleField::new()).unwrap();
//!
//! let (tx, rx) = crossbeam_channel::unbounded();
//! scheduler.enqueue(
//!     Point3::new(2.5, 8.5, 2.5),
//!     Point3::new(12.5, 8.5, 2.5),
//!     move |waypoints, success| tx.send((waypoints, success)).unwrap(),
//! );
//! assert!(rx.try_recv().is_err());
//!
//! scheduler.run_until_idle().unwrap();
//! let (waypoints, success) = rx.recv().unwrap();
//! assert!(success);
//! assert_eq!(waypoints, vec![Point3::new(12.5, 8.5, 2.5)]);
//! ```

use std::collections::VecDeque;
use std::fmt;

use nalgebra::Point3;
use nav_spatial::OccupancyOracle;
use nav_types::{PathResult, PlannerConfig, PlanningError};
use tracing::{debug, error};

use crate::grid::VoxelGrid;
use crate::search::SearchState;

/// Completion callback for a path request.
pub type PathCallback = Box<dyn FnOnce(PathResult) + Send + 'static>;

/// Identifier assigned to a request when it is submitted.
///
/// Identifiers increase in submission order and are never reused by the same
/// scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A submitted path request.
pub struct PathRequest {
    id: RequestId,
    start: Point3<f64>,
    target: Point3<f64>,
    on_done: PathCallback,
}

impl PathRequest {
    /// Identifier assigned at submission.
    #[must_use]
    pub const fn id(&self) -> RequestId {
        self.id
    }

    /// Requested start position.
    #[must_use]
    pub const fn start(&self) -> &Point3<f64> {
        &self.start
    }

    /// Requested target position.
    #[must_use]
    pub const fn target(&self) -> &Point3<f64> {
        &self.target
    }
}

impl fmt::Debug for PathRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathRequest")
            .field("id", &self.id)
            .field("start", &self.start)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct ActiveSearch {
    request: PathRequest,
    state: SearchState,
}

/// Owns a grid and its oracle, and serves path requests one at a time.
#[derive(Debug)]
pub struct PathRequestScheduler<O> {
    grid: VoxelGrid,
    oracle: O,
    config: PlannerConfig,
    queue: VecDeque<PathRequest>,
    active: Option<ActiveSearch>,
    next_id: u64,
}

impl<O: OccupancyOracle> PathRequestScheduler<O> {
    /// Validates `config` and builds the grid from `oracle`.
    ///
    /// # Errors
    ///
    /// Returns the configuration error, or the oracle error raised while
    /// classifying cells.
    pub fn new(config: PlannerConfig, oracle: O) -> Result<Self, PlanningError> {
        config.validate()?;
        let grid = VoxelGrid::build(*config.grid(), &oracle)?;
        Ok(Self {
            grid,
            oracle,
            config,
            queue: VecDeque::new(),
            active: None,
            next_id: 0,
        })
    }

    /// Submits a request whose callback receives the waypoints and a success
    /// flag.
    ///
    /// On failure the waypoint list is empty.
    pub fn enqueue<F>(&mut self, start: Point3<f64>, target: Point3<f64>, on_done: F) -> RequestId
    where
        F: FnOnce(Vec<Point3<f64>>, bool) + Send + 'static,
    {
        self.submit(
            start,
            target,
            Box::new(move |result: PathResult| {
                let (waypoints, success) = result.into_parts();
                on_done(waypoints, success);
            }),
        )
    }

    /// Submits a request whose callback receives the full [`PathResult`],
    /// including the failure reason and search statistics.
    pub fn enqueue_detailed<F>(
        &mut self,
        start: Point3<f64>,
        target: Point3<f64>,
        on_done: F,
    ) -> RequestId
    where
        F: FnOnce(PathResult) + Send + 'static,
    {
        self.submit(start, target, Box::new(on_done))
    }

    pub(crate) fn submit(
        &mut self,
        start: Point3<f64>,
        target: Point3<f64>,
        on_done: PathCallback,
    ) -> RequestId {
        let id = RequestId(self.next_id);
        self.next_id += 1;

        self.queue.push_back(PathRequest {
            id,
            start,
            target,
            on_done,
        });
        debug!(%id, pending = self.queue.len(), "Path request queued");

        if self.active.is_none() {
            self.start_next();
        }
        id
    }

    /// Advances the scheduler by at most `max_steps` search steps.
    ///
    /// Every search that is terminal, including one that terminated while
    /// being started, has its callback invoked and the next queued request
    /// begun. Delivering a result does not consume budget. Returns the number
    /// of callbacks invoked.
    ///
    /// # Errors
    ///
    /// Returns the oracle error that aborted the active search. That
    /// request's callback has already received a failed result and the next
    /// request has been started, so the scheduler remains usable.
    pub fn update(&mut self, max_steps: usize) -> Result<usize, PlanningError> {
        let mut delivered = 0;
        let mut budget = max_steps;

        while let Some(active) = self.active.as_mut() {
            if !active.state.is_terminal() {
                if budget == 0 {
                    break;
                }
                budget -= 1;
                if let Err(fault) = active.state.step(&mut self.grid, &self.oracle) {
                    error!(id = %active.request.id, error = %fault, "Path search aborted");
                    self.complete_active();
                    return Err(fault);
                }
                continue;
            }
            self.complete_active();
            delivered += 1;
        }
        Ok(delivered)
    }

    /// Runs one update with the configured step budget.
    ///
    /// # Errors
    ///
    /// See [`update`](Self::update).
    pub fn tick(&mut self) -> Result<usize, PlanningError> {
        self.update(self.config.steps_per_update())
    }

    /// Updates until the queue is empty and no search is in flight.
    ///
    /// # Errors
    ///
    /// Stops at the first oracle failure. Calling again resumes with the
    /// next request.
    pub fn run_until_idle(&mut self) -> Result<usize, PlanningError> {
        let mut delivered = 0;
        while self.is_busy() {
            delivered += self.tick()?;
        }
        Ok(delivered)
    }

    /// Number of requests waiting behind the active one.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` while a search is in flight.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    /// Identifier of the request currently being searched.
    #[must_use]
    pub fn active_request(&self) -> Option<RequestId> {
        self.active.as_ref().map(|active| active.request.id)
    }

    /// Returns the grid.
    #[must_use]
    pub const fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    /// Returns the oracle.
    #[must_use]
    pub const fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Returns the planner configuration.
    #[must_use]
    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Replaces the oracle and reclassifies every cell.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::InvalidConfig`] while a search is in flight,
    /// or the oracle error raised while classifying. The scheduler is
    /// unchanged on error.
    pub fn rebuild(&mut self, oracle: O) -> Result<(), PlanningError> {
        if self.is_busy() {
            return Err(PlanningError::invalid_config(
                "cannot rebuild the grid while a search is in flight",
            ));
        }
        self.grid.rebuild(&oracle)?;
        self.oracle = oracle;
        Ok(())
    }

    fn start_next(&mut self) {
        if let Some(request) = self.queue.pop_front() {
            debug!(id = %request.id, pending = self.queue.len(), "Path request started");
            let state = SearchState::begin(
                &mut self.grid,
                &request.start,
                &request.target,
                *self.config.search(),
            );
            self.active = Some(ActiveSearch { request, state });
        }
    }

    fn complete_active(&mut self) {
        if let Some(ActiveSearch { request, state }) = self.active.take() {
            let result = state.finish(&self.grid);
            debug!(
                id = %request.id,
                success = result.is_success(),
                waypoints = result.waypoints().len(),
                expansions = result.stats().expansions,
                "Path request completed"
            );
            (request.on_done)(result);
        }
        self.start_next();
    }
}
