//! Any-angle path planning over 3D voxel grids.
//!
//! This crate plans flight paths through a box-shaped region of space that
//! is sampled into a regular lattice of cells. Obstacles are never stored
//! directly; an [`OccupancyOracle`](nav_spatial::OccupancyOracle) answers
//! point and segment queries when the grid is built and while searching.
//!
//! # Overview
//!
//! - **Grid** ([`VoxelGrid`]): cell classification and world/lattice mapping
//! - **Search** ([`PathSearchEngine`], [`SearchState`]): Theta* with an A*
//!   fallback mode, resumable one step at a time
//! - **Scheduling** ([`PathRequestScheduler`]): FIFO request queue driven by
//!   the host with a step budget per update
//! - **Service** ([`PlannerService`]): the scheduler on a background thread
//! - **Following** ([`PathFollower`]): waypoint tracking for agents
//!
//! # Quick Start
//!
//! ```
//! use nav_pathfind::{PathSearchEngine, VoxelGrid};
//! use nav_spatial::{Aabb, ObstacleField};
//! use nav_types::{GridConfig, SearchConfig};
//! use nalgebra::{Point3, Vector3};
//!
//! // A pillar in the middle of a 16 x 16 x 4 region
//! let field = ObstacleField::new().with_aabb(Aabb::new(
//!     Point3::new(7.0, 6.0, -1.0),
//!     Point3::new(9.0, 10.0, 5.0),
//! ));
//! let config = GridConfig::new(Point3::new(8.0, 8.0, 2.0), Vector3::new(16.0, 16.0, 4.0));
//! let mut grid = VoxelGrid::build(config, &field).unwrap();
//!
//! let start = Point3::new(2.5, 8.5, 2.5);
//! let result = PathSearchEngine::new(SearchConfig::default())
//!     .search(&mut grid, &field, &start, &Point3::new(13.5, 8.5, 2.5))
//!     .unwrap();
//!
//! assert!(result.is_success());
//! assert!(result.waypoints().len() >= 2);
//! ```
//!
//! # Search Modes
//!
//! | Mode | Parent candidates | Line-of-sight queries |
//! |------|-------------------|-----------------------|
//! | Theta* | current cell or its parent | one per relaxed neighbor |
//! | A* | current cell only | none |
//!
//! Theta* paths bend only where an obstacle forces them to and are never
//! longer than the A* path through the same grid.

#![doc(html_root_url = "https://docs.rs/nav-pathfind/0.3.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]

mod cell;
mod follow;
mod grid;
mod scheduler;
mod search;
mod service;
pub mod simplify;

pub use cell::Cell;
pub use follow::{FollowStatus, PathFollower};
pub use grid::VoxelGrid;
pub use scheduler::{PathCallback, PathRequest, PathRequestScheduler, RequestId};
pub use search::{PathSearchEngine, SearchState, SearchStatus};
pub use service::{PlannerHandle, PlannerService};
