//! Core types for 3D flight planning: configuration, errors and results.
//!
//! This crate holds the vocabulary shared by the planning crates and by the
//! applications that embed them:
//!
//! - **Configuration**: grid region and resolution ([`GridConfig`]), search
//!   behavior ([`SearchConfig`], [`SearchMode`]) and the combined
//!   [`PlannerConfig`]
//! - **Errors**: construction and oracle faults ([`PlanningError`])
//! - **Results**: waypoint lists with success flags ([`PathResult`]), failure
//!   reasons ([`PathFailure`]) and counters ([`SearchStats`])
//!
//! # Example
//!
//! ```
//! use nav_types::{GridConfig, PlannerConfig, SearchConfig, SearchMode};
//! use nalgebra::{Point3, Vector3};
//!
//! let config = PlannerConfig::new(
//!     GridConfig::new(Point3::origin(), Vector3::new(32.0, 32.0, 8.0)),
//!     SearchConfig::default().with_mode(SearchMode::AStarOnly),
//! );
//! assert!(config.validate().is_ok());
//! ```
//!
//! # Feature Flags
//!
//! - `serde`: Enables serialization/deserialization for all types

#![doc(html_root_url = "https://docs.rs/nav-types/0.3.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod error;
pub mod path;

pub use config::{GridConfig, PlannerConfig, SearchConfig, SearchMode};
pub use error::{PathFailure, PlanningError};
pub use path::{PathResult, SearchStats};

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod integration_tests {
    use super::*;
    use nalgebra::{Point3, Vector3};
    use nav_spatial::SpatialError;

    /// Configuration errors and oracle errors share one type.
    #[test]
    fn test_error_taxonomy() {
        let config = GridConfig::new(Point3::origin(), Vector3::new(4.0, 4.0, 0.5));
        let error = config.validate().unwrap_err();
        assert!(error.is_configuration());

        let error: PlanningError = SpatialError::invalid_geometry("nan box").into();
        assert!(error.is_oracle());
        assert!(error.to_string().contains("nan box"));
    }

    /// Failed results are routine values, not errors.
    #[test]
    fn test_failure_is_a_result() {
        let result = PathResult::failed(PathFailure::ExpansionLimit(10), SearchStats::default());
        assert_eq!(result.failure(), Some(PathFailure::ExpansionLimit(10)));
        let (waypoints, success) = result.into_parts();
        assert!(waypoints.is_empty());
        assert!(!success);
    }
}
