//! Configuration types for grid construction and search.
//!
//! # Example
//!
//! ```
//! use nav_types::{GridConfig, PlannerConfig, SearchConfig, SearchMode};
//! use nalgebra::{Point3, Vector3};
//!
//! let config = PlannerConfig::default()
//!     .with_grid(
//!         GridConfig::new(Point3::origin(), Vector3::new(64.0, 64.0, 16.0))
//!             .with_cell_diameter(2.0),
//!     )
//!     .with_search(
//!         SearchConfig::default()
//!             .with_mode(SearchMode::ThetaStar)
//!             .with_los_max_distance(40.0),
//!     );
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.grid().axis_counts().unwrap(), [32, 32, 8]);
//! ```

use nalgebra::{Point3, Vector3};

use crate::error::PlanningError;

/// Describes the region a planning grid covers and its resolution.
///
/// The grid is centered on `origin` and spans `origin - size / 2` to
/// `origin + size / 2`. Cell counts per axis are `floor(size / cell_diameter)`.
///
/// # Example
///
/// ```
/// use nav_types::GridConfig;
/// use nalgebra::{Point3, Vector3};
///
/// let config = GridConfig::new(Point3::origin(), Vector3::new(10.0, 10.0, 5.5));
/// assert_eq!(config.axis_counts().unwrap(), [10, 10, 5]);
///
/// let bad = config.with_cell_diameter(0.0);
/// assert!(bad.validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridConfig {
    /// Center of the covered region in world coordinates.
    origin: Point3<f64>,
    /// Full extent of the region along each axis.
    size: Vector3<f64>,
    /// Edge length of one cell.
    cell_diameter: f64,
}

impl GridConfig {
    /// Creates a configuration with a cell diameter of 1.0.
    #[must_use]
    pub const fn new(origin: Point3<f64>, size: Vector3<f64>) -> Self {
        Self {
            origin,
            size,
            cell_diameter: 1.0,
        }
    }

    /// Sets the region center.
    #[must_use]
    pub const fn with_origin(mut self, origin: Point3<f64>) -> Self {
        self.origin = origin;
        self
    }

    /// Sets the region size.
    #[must_use]
    pub const fn with_size(mut self, size: Vector3<f64>) -> Self {
        self.size = size;
        self
    }

    /// Sets the cell edge length.
    #[must_use]
    pub const fn with_cell_diameter(mut self, diameter: f64) -> Self {
        self.cell_diameter = diameter;
        self
    }

    /// Returns the region center.
    #[must_use]
    pub const fn origin(&self) -> &Point3<f64> {
        &self.origin
    }

    /// Returns the region size.
    #[must_use]
    pub const fn size(&self) -> &Vector3<f64> {
        &self.size
    }

    /// Returns the cell edge length.
    #[must_use]
    pub const fn cell_diameter(&self) -> f64 {
        self.cell_diameter
    }

    /// Returns the minimum corner of the covered region.
    #[must_use]
    pub fn min_corner(&self) -> Point3<f64> {
        self.origin - self.size / 2.0
    }

    /// Computes the number of cells along each axis.
    ///
    /// # Errors
    ///
    /// - [`PlanningError::InvalidCellDiameter`] if the diameter is not finite
    ///   and positive.
    /// - [`PlanningError::InvalidRegionSize`] if the size is not finite.
    /// - [`PlanningError::InvalidConfig`] if the origin is not finite or the
    ///   grid would be too large to index.
    /// - [`PlanningError::InvalidDimensions`] if any axis gets fewer than one cell.
    #[allow(clippy::cast_possible_truncation)]
    pub fn axis_counts(&self) -> Result<[usize; 3], PlanningError> {
        if !self.cell_diameter.is_finite() || self.cell_diameter <= 0.0 {
            return Err(PlanningError::InvalidCellDiameter(self.cell_diameter));
        }
        if !self.size.iter().all(|v| v.is_finite()) {
            return Err(PlanningError::InvalidRegionSize {
                x: self.size.x,
                y: self.size.y,
                z: self.size.z,
            });
        }
        if !self.origin.coords.iter().all(|v| v.is_finite()) {
            return Err(PlanningError::invalid_config(format!(
                "grid origin {:?} is not finite",
                self.origin
            )));
        }

        // Float-to-int `as` saturates, so huge regions surface below
        let count = |extent: f64| (extent / self.cell_diameter).floor() as i64;
        let (x, y, z) = (count(self.size.x), count(self.size.y), count(self.size.z));
        if x <= 0 || y <= 0 || z <= 0 {
            return Err(PlanningError::InvalidDimensions { x, y, z });
        }

        let too_large = || {
            PlanningError::invalid_config(format!(
                "grid of {x}x{y}x{z} cells is too large to index"
            ))
        };
        let axis = |n: i64| {
            i32::try_from(n)
                .ok()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(too_large)
        };
        let counts = [axis(x)?, axis(y)?, axis(z)?];
        counts
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .ok_or_else(too_large)?;

        Ok(counts)
    }

    /// Checks that a grid can be built from this configuration.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`axis_counts`](Self::axis_counts).
    pub fn validate(&self) -> Result<(), PlanningError> {
        self.axis_counts().map(|_| ())
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::new(Point3::origin(), Vector3::repeat(100.0))
    }
}

/// Selects the relaxation rule used during search.
///
/// # Example
///
/// ```
/// use nav_types::SearchMode;
///
/// assert_eq!(SearchMode::default(), SearchMode::ThetaStar);
/// assert!(!SearchMode::AStarOnly.uses_line_of_sight());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchMode {
    /// Any-angle search: a neighbor may take the current cell's parent as its
    /// own parent when the two can see each other.
    #[default]
    ThetaStar,

    /// Plain 26-connected grid A*.
    AStarOnly,
}

impl SearchMode {
    /// Returns `true` if this mode issues line-of-sight queries.
    #[must_use]
    pub const fn uses_line_of_sight(self) -> bool {
        matches!(self, Self::ThetaStar)
    }

    /// Human-readable algorithm name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ThetaStar => "Theta*",
            Self::AStarOnly => "A*",
        }
    }
}

/// Configuration for a single search.
///
/// # Example
///
/// ```
/// use nav_types::{SearchConfig, SearchMode};
///
/// let config = SearchConfig::default()
///     .with_mode(SearchMode::AStarOnly)
///     .with_max_expansions(10_000);
///
/// assert_eq!(config.mode(), SearchMode::AStarOnly);
/// assert_eq!(config.max_expansions(), Some(10_000));
/// assert!((config.los_max_distance() - 60.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchConfig {
    /// Relaxation rule.
    mode: SearchMode,
    /// Maximum reach of a line-of-sight cast, in world units.
    los_max_distance: f64,
    /// Cells to expand before giving up (`None` = unlimited).
    max_expansions: Option<usize>,
}

impl SearchConfig {
    /// Default maximum reach of a line-of-sight cast.
    pub const DEFAULT_LOS_MAX_DISTANCE: f64 = 60.0;

    /// Creates a Theta* configuration with the default cast reach and no
    /// expansion limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mode: SearchMode::ThetaStar,
            los_max_distance: Self::DEFAULT_LOS_MAX_DISTANCE,
            max_expansions: None,
        }
    }

    /// Sets the relaxation rule.
    #[must_use]
    pub const fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the maximum reach of a line-of-sight cast.
    ///
    /// Shorter casts are cheaper but let Theta* shortcut less often.
    #[must_use]
    pub const fn with_los_max_distance(mut self, distance: f64) -> Self {
        self.los_max_distance = distance;
        self
    }

    /// Sets the expansion limit.
    #[must_use]
    pub const fn with_max_expansions(mut self, max: usize) -> Self {
        self.max_expansions = Some(max);
        self
    }

    /// Removes the expansion limit.
    #[must_use]
    pub const fn without_max_expansions(mut self) -> Self {
        self.max_expansions = None;
        self
    }

    /// Returns the relaxation rule.
    #[must_use]
    pub const fn mode(&self) -> SearchMode {
        self.mode
    }

    /// Returns the maximum reach of a line-of-sight cast.
    #[must_use]
    pub const fn los_max_distance(&self) -> f64 {
        self.los_max_distance
    }

    /// Returns the expansion limit, if set.
    #[must_use]
    pub const fn max_expansions(&self) -> Option<usize> {
        self.max_expansions
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::InvalidConfig`] if the cast reach is not
    /// positive or the expansion limit is zero.
    pub fn validate(&self) -> Result<(), PlanningError> {
        if self.los_max_distance.is_nan() || self.los_max_distance <= 0.0 {
            return Err(PlanningError::invalid_config(format!(
                "los_max_distance must be positive, got {}",
                self.los_max_distance
            )));
        }
        if self.max_expansions == Some(0) {
            return Err(PlanningError::invalid_config(
                "max_expansions must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-level configuration for a planner.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlannerConfig {
    /// Grid region and resolution.
    grid: GridConfig,
    /// Search behavior.
    search: SearchConfig,
    /// Search steps a scheduler update may run when no budget is given.
    steps_per_update: usize,
}

impl PlannerConfig {
    /// Default step budget per scheduler update.
    pub const DEFAULT_STEPS_PER_UPDATE: usize = 256;

    /// Creates a planner configuration from its parts.
    #[must_use]
    pub const fn new(grid: GridConfig, search: SearchConfig) -> Self {
        Self {
            grid,
            search,
            steps_per_update: Self::DEFAULT_STEPS_PER_UPDATE,
        }
    }

    /// Sets the grid configuration.
    #[must_use]
    pub const fn with_grid(mut self, grid: GridConfig) -> Self {
        self.grid = grid;
        self
    }

    /// Sets the search configuration.
    #[must_use]
    pub const fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    /// Sets the default step budget per scheduler update.
    #[must_use]
    pub const fn with_steps_per_update(mut self, steps: usize) -> Self {
        self.steps_per_update = steps;
        self
    }

    /// Returns the grid configuration.
    #[must_use]
    pub const fn grid(&self) -> &GridConfig {
        &self.grid
    }

    /// Returns the search configuration.
    #[must_use]
    pub const fn search(&self) -> &SearchConfig {
        &self.search
    }

    /// Returns the default step budget per scheduler update.
    #[must_use]
    pub const fn steps_per_update(&self) -> usize {
        self.steps_per_update
    }

    /// Validates every part of the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first problem found in the grid or search configuration,
    /// or [`PlanningError::InvalidConfig`] for a zero step budget.
    pub fn validate(&self) -> Result<(), PlanningError> {
        self.grid.validate()?;
        self.search.validate()?;
        if self.steps_per_update == 0 {
            return Err(PlanningError::invalid_config(
                "steps_per_update must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::new(GridConfig::default(), SearchConfig::default())
    }
}
