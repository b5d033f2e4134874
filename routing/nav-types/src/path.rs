//! Search results.
//!
//! A [`PathResult`] is what every planning request eventually produces. It
//! always carries a waypoint list and a success flag; failed results also
//! carry the [`PathFailure`] reason, and both kinds carry [`SearchStats`].
//!
//! # Example
//!
//! ```
//! use nav_types::{PathFailure, PathResult, SearchStats};
//! use nalgebra::Point3;
//!
//! let ok = PathResult::found(vec![Point3::new(3.0, 4.0, 0.0)], SearchStats::default());
//! assert!(ok.is_success());
//! assert!((ok.length_from(&Point3::origin()) - 5.0).abs() < 1e-12);
//!
//! let failed = PathResult::failed(PathFailure::NoPathFound, SearchStats::default());
//! let (waypoints, success) = failed.into_parts();
//! assert!(waypoints.is_empty());
//! assert!(!success);
//! ```

use nalgebra::Point3;

use crate::error::PathFailure;

/// Counters collected while a search runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchStats {
    /// Cells whose neighbors were relaxed, plus the target when reached.
    pub expansions: usize,
    /// Line-of-sight queries issued to the oracle.
    pub los_checks: usize,
    /// Resumable steps taken, including the terminal one.
    pub steps: usize,
}

/// The outcome of one path search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathResult {
    /// World-space waypoints, start excluded.
    waypoints: Vec<Point3<f64>>,
    /// Why the search failed, if it did.
    failure: Option<PathFailure>,
    /// Search counters.
    stats: SearchStats,
}

impl PathResult {
    /// Creates a successful result.
    #[must_use]
    pub const fn found(waypoints: Vec<Point3<f64>>, stats: SearchStats) -> Self {
        Self {
            waypoints,
            failure: None,
            stats,
        }
    }

    /// Creates a failed result with no waypoints.
    #[must_use]
    pub const fn failed(failure: PathFailure, stats: SearchStats) -> Self {
        Self {
            waypoints: Vec::new(),
            failure: Some(failure),
            stats,
        }
    }

    /// Returns `true` if a path was found.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Returns the waypoints in travel order. Empty on failure.
    #[must_use]
    pub fn waypoints(&self) -> &[Point3<f64>] {
        &self.waypoints
    }

    /// Returns the failure reason, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<PathFailure> {
        self.failure
    }

    /// Returns the search counters.
    #[must_use]
    pub const fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Splits into the `(waypoints, success)` pair delivered to callbacks.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Point3<f64>>, bool) {
        let success = self.is_success();
        (self.waypoints, success)
    }

    /// Total polyline length from `start` through every waypoint.
    ///
    /// Returns 0.0 for a failed result.
    #[must_use]
    pub fn length_from(&self, start: &Point3<f64>) -> f64 {
        let mut previous = start;
        let mut length = 0.0;
        for waypoint in &self.waypoints {
            length += (waypoint - previous).norm();
            previous = waypoint;
        }
        length
    }
}
