//! Obstacle volumes.
//!
//! Both shapes are closed sets: points on the surface count as inside.
//!
//! # Example
//!
//! ```
//! use nav_spatial::{Aabb, Sphere};
//! use nalgebra::Point3;
//!
//! let pillar = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 10.0));
//! assert!(pillar.contains(&Point3::new(1.0, 0.5, 5.0)));
//!
//! let balloon = Sphere::new(Point3::new(5.0, 5.0, 5.0), 2.0);
//! assert!(!balloon.contains(&Point3::new(7.5, 5.0, 5.0)));
//! ```

use nalgebra::{Point3, Vector3};

use crate::error::SpatialError;

/// Box with faces parallel to the world axes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    /// Corner with the smallest coordinates.
    pub min: Point3<f64>,
    /// Corner with the largest coordinates.
    pub max: Point3<f64>,
}

impl Aabb {
    /// Spans the box between two opposite corners given in any order.
    #[must_use]
    pub fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        let (min, max) = a.inf_sup(&b);
        Self { min, max }
    }

    /// Builds a box from its center and half its size along each axis.
    ///
    /// ```
    /// use nav_spatial::Aabb;
    /// use nalgebra::{Point3, Vector3};
    ///
    /// let crate_box = Aabb::around(Point3::new(2.0, 2.0, 1.0), Vector3::new(1.0, 1.0, 1.0));
    /// assert_eq!(crate_box.min, Point3::new(1.0, 1.0, 0.0));
    /// ```
    #[must_use]
    pub fn around(center: Point3<f64>, half_extents: Vector3<f64>) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Midpoint of the box.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Edge lengths along X, Y and Z.
    #[must_use]
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Returns `true` if `point` is inside the box or on its surface.
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        self.closest_point(point) == *point
    }

    /// The point of the box nearest to `point`.
    #[must_use]
    pub fn closest_point(&self, point: &Point3<f64>) -> Point3<f64> {
        point.sup(&self.min).inf(&self.max)
    }

    /// Returns a copy grown by `margin` on every face.
    #[must_use]
    pub fn expanded(&self, margin: f64) -> Self {
        let margin = Vector3::repeat(margin);
        Self {
            min: self.min - margin,
            max: self.max + margin,
        }
    }

    /// # Errors
    ///
    /// Returns [`SpatialError::InvalidGeometry`] if a corner is not finite.
    pub fn validate(&self) -> Result<(), SpatialError> {
        if is_finite(&self.min) && is_finite(&self.max) {
            Ok(())
        } else {
            Err(SpatialError::invalid_geometry(format!(
                "box {:?}..{:?} has a non-finite corner",
                self.min, self.max
            )))
        }
    }
}

/// Ball around a center point.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sphere {
    /// Center point.
    pub center: Point3<f64>,
    /// Radius, never negative.
    pub radius: f64,
}

impl Sphere {
    /// Creates a sphere. The sign of `radius` is ignored.
    #[must_use]
    pub const fn new(center: Point3<f64>, radius: f64) -> Self {
        Self {
            center,
            radius: radius.abs(),
        }
    }

    /// Returns `true` if `point` is inside the sphere or on its surface.
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        nalgebra::distance_squared(&self.center, point) <= self.radius * self.radius
    }

    /// Returns a copy with the radius grown by `margin`.
    #[must_use]
    pub fn expanded(&self, margin: f64) -> Self {
        Self::new(self.center, self.radius + margin)
    }

    /// # Errors
    ///
    /// Returns [`SpatialError::InvalidGeometry`] if the center or radius is
    /// not finite.
    pub fn validate(&self) -> Result<(), SpatialError> {
        if is_finite(&self.center) && self.radius.is_finite() {
            Ok(())
        } else {
            Err(SpatialError::invalid_geometry(format!(
                "sphere at {:?} with radius {} is not finite",
                self.center, self.radius
            )))
        }
    }
}

fn is_finite(point: &Point3<f64>) -> bool {
    point.iter().all(|v| v.is_finite())
}
