//! Spatial primitives for Skynav flight planning.
//!
//! This crate provides the geometry layer that planning grids are built on:
//!
//! - [`VoxelCoord`] - Integer lattice coordinates with 26-connected neighborhoods
//! - [`Aabb`] and [`Sphere`] - Obstacle volumes with containment tests
//! - [`Ray`] - Segment casting against obstacle primitives
//! - [`OccupancyOracle`] - The planner's interface to world geometry
//! - [`ObstacleField`] - A self-contained oracle over boxes and spheres
//!
//! Embedding applications implement [`OccupancyOracle`] on top of their own
//! collision system; tests and tools use [`ObstacleField`].
//!
//! Z is up. World positions are `f64`, lattice coordinates are `i32`.
//!
//! # Example
//!
//! ```
//! use nav_spatial::{Aabb, ObstacleField, OccupancyOracle, VoxelCoord};
//! use nalgebra::Point3;
//!
//! let field = ObstacleField::new()
//!     .with_aabb(Aabb::new(Point3::new(2.0, -1.0, -1.0), Point3::new(3.0, 1.0, 1.0)))
//!     .with_clearance(0.25);
//!
//! let a = Point3::new(0.0, 0.0, 0.0);
//! let b = Point3::new(5.0, 0.0, 0.0);
//! assert!(!field.is_unobstructed(&a, &b, 60.0).unwrap());
//!
//! let neighbors = VoxelCoord::new(1, 1, 1).all_neighbors();
//! assert_eq!(neighbors.len(), 26);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod oracle;
mod raycast;
mod shape;
mod voxel;

pub use error::SpatialError;
pub use oracle::{Obstacle, ObstacleField, OccupancyOracle};
pub use raycast::{Ray, RaycastHit};
pub use shape::{Aabb, Sphere};
pub use voxel::VoxelCoord;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
