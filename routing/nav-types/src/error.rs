//! Error and failure types for flight planning.
//!
//! Two different things can go wrong when planning:
//!
//! - [`PlanningError`] is a fault: a bad configuration, or an oracle that
//!   could not answer. These abort grid construction or the search step that
//!   hit them.
//! - [`PathFailure`] is a routine outcome: the search ran correctly and found
//!   no path. It travels inside a failed [`PathResult`](crate::PathResult)
//!   rather than as an error.

use nav_spatial::SpatialError;

/// Errors that abort grid construction or a search step.
///
/// # Example
///
/// ```
/// use nav_types::PlanningError;
///
/// let error = PlanningError::InvalidCellDiameter(0.0);
/// assert!(error.to_string().contains("cell diameter"));
/// assert!(error.is_configuration());
/// ```
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PlanningError {
    /// The cell diameter was zero, negative or not finite.
    #[error("cell diameter must be finite and positive, got {0}")]
    InvalidCellDiameter(f64),

    /// The region size had a NaN or infinite component.
    #[error("region size ({x}, {y}, {z}) is not finite")]
    InvalidRegionSize {
        /// Size along X.
        x: f64,
        /// Size along Y.
        y: f64,
        /// Size along Z.
        z: f64,
    },

    /// The region is smaller than one cell along at least one axis.
    #[error("grid would have {x}x{y}x{z} cells; every axis needs at least one")]
    InvalidDimensions {
        /// Cell count along X.
        x: i64,
        /// Cell count along Y.
        y: i64,
        /// Cell count along Z.
        z: i64,
    },

    /// Any other invalid configuration value or misuse.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The occupancy oracle failed to answer a query.
    #[error("occupancy oracle failed: {0}")]
    Oracle(#[from] SpatialError),

    /// The background planner thread could not be started or has stopped.
    #[error("planner service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl PlanningError {
    /// Creates an invalid configuration error with the given message.
    ///
    /// # Example
    ///
    /// ```
    /// use nav_types::PlanningError;
    ///
    /// let error = PlanningError::invalid_config("los_max_distance must be positive");
    /// assert!(error.to_string().contains("los_max_distance"));
    /// ```
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Returns `true` for construction-time configuration errors.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidCellDiameter(_)
                | Self::InvalidRegionSize { .. }
                | Self::InvalidDimensions { .. }
                | Self::InvalidConfig(_)
        )
    }

    /// Returns `true` if the oracle could not answer a query.
    #[must_use]
    pub const fn is_oracle(&self) -> bool {
        matches!(self, Self::Oracle(_))
    }
}

/// Why a search ended without a path.
///
/// # Example
///
/// ```
/// use nav_types::PathFailure;
///
/// assert_eq!(PathFailure::TargetUnreachable.to_string(), "target cell is not traversable");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum PathFailure {
    /// The target resolved to a cell that is not traversable.
    #[error("target cell is not traversable")]
    TargetUnreachable,

    /// The open set emptied before the target was reached.
    #[error("no path found")]
    NoPathFound,

    /// The configured expansion limit was reached first.
    #[error("expansion limit of {0} cells reached")]
    ExpansionLimit(usize),

    /// The search was cut short by an oracle fault.
    #[error("search aborted by an oracle fault")]
    Aborted,
}
