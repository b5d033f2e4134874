//! Ray casting against obstacle primitives.
//!
//! Rays are cast against [`Aabb`]s with the slab method and against [`Sphere`]s
//! analytically. All distances are measured along a unit-length direction, so
//! the returned `t` is a world-space distance from the ray origin.
//!
//! # Example
//!
//! ```
//! use nav_spatial::{Aabb, Ray};
//! use nalgebra::{Point3, Vector3};
//!
//! let wall = Aabb::new(Point3::new(5.0, -1.0, -1.0), Point3::new(6.0, 1.0, 1.0));
//! let ray = Ray::new(Point3::origin(), Vector3::x());
//!
//! let t = ray.cast_aabb(&wall, 100.0).unwrap();
//! assert!((t - 5.0).abs() < 1e-10);
//!
//! // Out of reach
//! assert!(ray.cast_aabb(&wall, 4.0).is_none());
//! ```

use nalgebra::{Point3, Vector3};

use crate::shape::{Aabb, Sphere};

/// A ray defined by an origin point and a unit direction vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin of the ray.
    pub origin: Point3<f64>,
    /// The direction of the ray, normalized on construction.
    pub direction: Vector3<f64>,
}

impl Ray {
    /// Creates a new ray. The direction is normalized; a zero direction is kept
    /// as zero and such a ray only "hits" volumes containing its origin.
    ///
    /// # Example
    ///
    /// ```
    /// use nav_spatial::Ray;
    /// use nalgebra::{Point3, Vector3};
    ///
    /// let ray = Ray::new(Point3::origin(), Vector3::new(3.0, 4.0, 0.0));
    /// assert!((ray.direction.norm() - 1.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Self {
        let norm = direction.norm();
        let direction = if norm < f64::EPSILON {
            Vector3::zeros()
        } else {
            direction / norm
        };
        Self { origin, direction }
    }

    /// Creates a ray starting at `from` pointing toward `to`.
    #[must_use]
    pub fn between(from: &Point3<f64>, to: &Point3<f64>) -> Self {
        Self::new(*from, to - from)
    }

    /// Returns the point along the ray at distance `t`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the first contact with `aabb`, if it lies
    /// within `[0, max_distance]`.
    ///
    /// A ray starting inside the box reports a hit at `t = 0`.
    #[must_use]
    pub fn cast_aabb(&self, aabb: &Aabb, max_distance: f64) -> Option<f64> {
        let mut entry = 0.0_f64;
        let mut exit = max_distance;

        for axis in 0..3 {
            let (start, step) = (self.origin[axis], self.direction[axis]);
            let (lo, hi) = (aabb.min[axis], aabb.max[axis]);

            if step.abs() < f64::EPSILON {
                if !(lo..=hi).contains(&start) {
                    return None;
                }
                continue;
            }

            let (near, far) = {
                let a = (lo - start) / step;
                let b = (hi - start) / step;
                if a <= b { (a, b) } else { (b, a) }
            };
            entry = entry.max(near);
            exit = exit.min(far);
            if entry > exit {
                return None;
            }
        }

        Some(entry)
    }

    /// Distance along the ray to the first contact with `sphere`, if it lies
    /// within `[0, max_distance]`.
    ///
    /// A ray starting inside the sphere reports a hit at `t = 0`.
    #[must_use]
    pub fn cast_sphere(&self, sphere: &Sphere, max_distance: f64) -> Option<f64> {
        if sphere.contains(&self.origin) {
            return Some(0.0);
        }

        let to_origin = self.origin - sphere.center;
        let b = to_origin.dot(&self.direction);
        let c = sphere.radius.mul_add(-sphere.radius, to_origin.norm_squared());
        let discriminant = b.mul_add(b, -c);

        // Pointing away, or missing entirely
        if b > 0.0 || discriminant < 0.0 {
            return None;
        }

        let t = -b - discriminant.sqrt();
        (t <= max_distance).then_some(t.max(0.0))
    }
}

/// Result of casting against an obstacle set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// Index of the obstacle that was hit.
    pub obstacle: usize,
    /// Distance along the ray where the hit occurred.
    pub t: f64,
    /// The world-space point where the hit occurred.
    pub point: Point3<f64>,
}
