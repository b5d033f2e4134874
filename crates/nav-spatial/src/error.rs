//! Error types for spatial operations.

/// Errors that can occur during spatial queries.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SpatialError {
    /// A query point had a NaN or infinite component.
    #[error("query point ({x}, {y}, {z}) is not finite")]
    NonFinitePoint {
        /// X component.
        x: f64,
        /// Y component.
        y: f64,
        /// Z component.
        z: f64,
    },

    /// Obstacle geometry is malformed (negative radius, NaN extents, ...).
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A cast distance was negative or NaN.
    #[error("cast distance {0} is negative or NaN")]
    InvalidDistance(f64),
}

impl SpatialError {
    /// Creates an invalid geometry error with the given message.
    ///
    /// # Example
    ///
    /// ```
    /// use nav_spatial::SpatialError;
    ///
    /// let error = SpatialError::invalid_geometry("sphere radius is negative");
    /// assert!(error.to_string().contains("radius"));
    /// ```
    #[must_use]
    pub fn invalid_geometry(message: impl Into<String>) -> Self {
        Self::InvalidGeometry(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_finite_display() {
        let error = SpatialError::NonFinitePoint {
            x: f64::NAN,
            y: 0.0,
            z: 1.0,
        };
        assert!(error.to_string().contains("not finite"));
    }

    #[test]
    fn test_invalid_distance_display() {
        let error = SpatialError::InvalidDistance(-2.0);
        assert!(error.to_string().contains("-2"));
    }

    #[test]
    fn test_invalid_geometry_helper() {
        let error = SpatialError::invalid_geometry("bad box");
        assert!(matches!(error, SpatialError::InvalidGeometry(msg) if msg == "bad box"));
    }
}
