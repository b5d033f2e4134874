//! Occupancy oracles: the planner's only view of world geometry.
//!
//! A planning grid never inspects obstacle geometry directly. It asks an
//! [`OccupancyOracle`] whether a point is occupied and whether a straight
//! segment is clear. Applications back the trait with their own collision
//! system; [`ObstacleField`] is a self-contained implementation over boxes and
//! spheres.
//!
//! # Example
//!
//! ```
//! use nav_spatial::{Aabb, ObstacleField, OccupancyOracle};
//! use nalgebra::Point3;
//!
//! let field = ObstacleField::new()
//!     .with_aabb(Aabb::new(Point3::new(4.0, -1.0, -1.0), Point3::new(5.0, 1.0, 1.0)));
//!
//! assert!(field.is_occupied(&Point3::new(4.5, 0.0, 0.0)).unwrap());
//!
//! let from = Point3::new(0.0, 0.0, 0.0);
//! let to = Point3::new(10.0, 0.0, 0.0);
//! assert!(!field.is_unobstructed(&from, &to, 60.0).unwrap());
//! ```

use nalgebra::Point3;

use crate::error::SpatialError;
use crate::shape::{Aabb, Sphere};
use crate::raycast::{Ray, RaycastHit};

/// Answers occupancy and visibility questions about static geometry.
///
/// Implementations report malformed geometry or invalid queries as
/// [`SpatialError`]s instead of guessing a safe answer.
pub trait OccupancyOracle {
    /// Returns `true` if `point` lies inside an obstacle volume.
    ///
    /// # Errors
    ///
    /// Returns an error if the query or the underlying geometry is invalid.
    fn is_occupied(&self, point: &Point3<f64>) -> Result<bool, SpatialError>;

    /// Returns `true` if nothing obstructs the segment from `from` toward `to`.
    ///
    /// The cast covers at most `max_distance` world units; obstacles past that
    /// reach are not considered.
    ///
    /// # Errors
    ///
    /// Returns an error if the query or the underlying geometry is invalid.
    fn is_unobstructed(
        &self,
        from: &Point3<f64>,
        to: &Point3<f64>,
        max_distance: f64,
    ) -> Result<bool, SpatialError>;

    /// Secondary placement check used to flag spawnable cells.
    ///
    /// Oracles with no notion of placement surfaces report `false`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query or the underlying geometry is invalid.
    fn is_spawn_surface(&self, point: &Point3<f64>) -> Result<bool, SpatialError> {
        let _ = point;
        Ok(false)
    }
}

impl<T: OccupancyOracle + ?Sized> OccupancyOracle for &T {
    fn is_occupied(&self, point: &Point3<f64>) -> Result<bool, SpatialError> {
        (**self).is_occupied(point)
    }

    fn is_unobstructed(
        &self,
        from: &Point3<f64>,
        to: &Point3<f64>,
        max_distance: f64,
    ) -> Result<bool, SpatialError> {
        (**self).is_unobstructed(from, to, max_distance)
    }

    fn is_spawn_surface(&self, point: &Point3<f64>) -> Result<bool, SpatialError> {
        (**self).is_spawn_surface(point)
    }
}

/// A single static obstacle volume.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Obstacle {
    /// Axis-aligned box.
    Box(Aabb),
    /// Sphere.
    Ball(Sphere),
}

impl Obstacle {
    fn inflated(&self, margin: f64) -> Self {
        match self {
            Self::Box(aabb) => Self::Box(aabb.expanded(margin)),
            Self::Ball(sphere) => Self::Ball(sphere.expanded(margin)),
        }
    }

    fn contains(&self, point: &Point3<f64>) -> bool {
        match self {
            Self::Box(aabb) => aabb.contains(point),
            Self::Ball(sphere) => sphere.contains(point),
        }
    }

    fn cast(&self, ray: &Ray, max_distance: f64) -> Option<f64> {
        match self {
            Self::Box(aabb) => ray.cast_aabb(aabb, max_distance),
            Self::Ball(sphere) => ray.cast_sphere(sphere, max_distance),
        }
    }

    fn validate(&self) -> Result<(), SpatialError> {
        match self {
            Self::Box(aabb) => aabb.validate(),
            Self::Ball(sphere) => sphere.validate(),
        }
    }
}

impl From<Aabb> for Obstacle {
    fn from(aabb: Aabb) -> Self {
        Self::Box(aabb)
    }
}

impl From<Sphere> for Obstacle {
    fn from(sphere: Sphere) -> Self {
        Self::Ball(sphere)
    }
}

/// A static field of box and sphere obstacles.
///
/// Every obstacle is inflated by `clearance` for both occupancy and casts, so
/// the two queries always agree on where the free space ends. Spawn surfaces
/// are separate, non-blocking boxes that mark where agents may be placed.
///
/// # Example
///
/// ```
/// use nav_spatial::{ObstacleField, OccupancyOracle, Sphere};
/// use nalgebra::Point3;
///
/// let field = ObstacleField::new()
///     .with_sphere(Sphere::new(Point3::origin(), 1.0))
///     .with_clearance(0.5);
///
/// // Inside the inflated shell
/// assert!(field.is_occupied(&Point3::new(1.4, 0.0, 0.0)).unwrap());
/// assert!(!field.is_occupied(&Point3::new(1.6, 0.0, 0.0)).unwrap());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
    spawn_surfaces: Vec<Aabb>,
    clearance: f64,
    surface_reach: f64,
}

impl Default for ObstacleField {
    fn default() -> Self {
        Self::new()
    }
}

impl ObstacleField {
    /// Creates an empty field with no clearance and a surface reach of 1.0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            obstacles: Vec::new(),
            spawn_surfaces: Vec::new(),
            clearance: 0.0,
            surface_reach: 1.0,
        }
    }

    /// Adds a box obstacle.
    #[must_use]
    pub fn with_aabb(mut self, aabb: Aabb) -> Self {
        self.obstacles.push(Obstacle::Box(aabb));
        self
    }

    /// Adds a sphere obstacle.
    #[must_use]
    pub fn with_sphere(mut self, sphere: Sphere) -> Self {
        self.obstacles.push(Obstacle::Ball(sphere));
        self
    }

    /// Sets the inflation applied to every obstacle.
    #[must_use]
    pub const fn with_clearance(mut self, clearance: f64) -> Self {
        self.clearance = clearance;
        self
    }

    /// Adds a non-blocking surface that makes nearby free points spawnable.
    #[must_use]
    pub fn with_spawn_surface(mut self, surface: Aabb) -> Self {
        self.spawn_surfaces.push(surface);
        self
    }

    /// Sets how close to a spawn surface a point must be to count as spawnable.
    #[must_use]
    pub const fn with_surface_reach(mut self, reach: f64) -> Self {
        self.surface_reach = reach;
        self
    }

    /// Adds an obstacle in place.
    pub fn push(&mut self, obstacle: impl Into<Obstacle>) {
        self.obstacles.push(obstacle.into());
    }

    /// Returns the obstacles in insertion order.
    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Returns the number of obstacles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    /// Returns `true` if the field has no obstacles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Returns the clearance inflation.
    #[must_use]
    pub const fn clearance(&self) -> f64 {
        self.clearance
    }

    /// Checks the field's own parameters and every obstacle.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::InvalidGeometry`] for a negative or non-finite
    /// clearance/reach, or any malformed obstacle.
    pub fn validate(&self) -> Result<(), SpatialError> {
        if !self.clearance.is_finite() || self.clearance < 0.0 {
            return Err(SpatialError::invalid_geometry(format!(
                "clearance must be finite and non-negative, got {}",
                self.clearance
            )));
        }
        if !self.surface_reach.is_finite() || self.surface_reach < 0.0 {
            return Err(SpatialError::invalid_geometry(format!(
                "surface reach must be finite and non-negative, got {}",
                self.surface_reach
            )));
        }
        for obstacle in &self.obstacles {
            obstacle.validate()?;
        }
        for surface in &self.spawn_surfaces {
            surface.validate()?;
        }
        Ok(())
    }

    /// Casts from `from` toward `to`, up to `max_distance` or the end of the
    /// segment, whichever is shorter, and returns the nearest hit.
    ///
    /// # Errors
    ///
    /// Returns an error for non-finite points, an invalid distance, or
    /// malformed geometry.
    pub fn cast(
        &self,
        from: &Point3<f64>,
        to: &Point3<f64>,
        max_distance: f64,
    ) -> Result<Option<RaycastHit>, SpatialError> {
        check_finite(from)?;
        check_finite(to)?;
        if max_distance.is_nan() || max_distance < 0.0 {
            return Err(SpatialError::InvalidDistance(max_distance));
        }
        self.validate()?;

        let reach = (to - from).norm().min(max_distance);
        let ray = Ray::between(from, to);

        let nearest = self
            .obstacles
            .iter()
            .enumerate()
            .filter_map(|(index, obstacle)| {
                obstacle
                    .inflated(self.clearance)
                    .cast(&ray, reach)
                    .map(|t| (index, t))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));

        Ok(nearest.map(|(obstacle, t)| RaycastHit {
            obstacle,
            t,
            point: ray.point_at(t),
        }))
    }
}

fn check_finite(point: &Point3<f64>) -> Result<(), SpatialError> {
    if point.coords.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(SpatialError::NonFinitePoint {
            x: point.x,
            y: point.y,
            z: point.z,
        })
    }
}

impl OccupancyOracle for ObstacleField {
    fn is_occupied(&self, point: &Point3<f64>) -> Result<bool, SpatialError> {
        check_finite(point)?;
        self.validate()?;
        Ok(self
            .obstacles
            .iter()
            .any(|obstacle| obstacle.inflated(self.clearance).contains(point)))
    }

    fn is_unobstructed(
        &self,
        from: &Point3<f64>,
        to: &Point3<f64>,
        max_distance: f64,
    ) -> Result<bool, SpatialError> {
        Ok(self.cast(from, to, max_distance)?.is_none())
    }

    fn is_spawn_surface(&self, point: &Point3<f64>) -> Result<bool, SpatialError> {
        check_finite(point)?;
        self.validate()?;
        Ok(self
            .spawn_surfaces
            .iter()
            .any(|surface| surface.expanded(self.surface_reach).contains(point)))
    }
}
