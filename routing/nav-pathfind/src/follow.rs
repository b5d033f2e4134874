//! Waypoint tracking for agents moving along a planned path.

use nalgebra::Point3;

/// What a [`PathFollower`] wants the agent to do next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FollowStatus {
    /// Move toward this waypoint.
    Heading(Point3<f64>),
    /// Every waypoint has been reached.
    Completed,
    /// No path is set.
    Idle,
}

/// Walks an agent through a list of waypoints.
///
/// A waypoint counts as reached once the agent is strictly within the
/// completion radius of it on every axis. Several waypoints can be passed in
/// a single update.
///
/// # Example
///
/// ```
/// use nav_pathfind::{FollowStatus, PathFollower};
/// use nalgebra::Point3;
///
/// let mut follower = PathFollower::new(0.5);
/// follower.set_path(vec![Point3::new(4.0, 0.0, 0.0), Point3::new(4.0, 4.0, 0.0)]);
///
/// let target = Point3::new(4.0, 0.0, 0.0);
/// assert_eq!(follower.update(&Point3::origin()), FollowStatus::Heading(target));
/// assert_eq!(
///     follower.update(&Point3::new(3.8, 0.1, 0.0)),
///     FollowStatus::Heading(Point3::new(4.0, 4.0, 0.0)),
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PathFollower {
    waypoints: Vec<Point3<f64>>,
    next: usize,
    completion_radius: f64,
}

impl PathFollower {
    /// Default completion radius.
    pub const DEFAULT_COMPLETION_RADIUS: f64 = 0.5;

    /// Creates a follower with no path.
    #[must_use]
    pub const fn new(completion_radius: f64) -> Self {
        Self {
            waypoints: Vec::new(),
            next: 0,
            completion_radius,
        }
    }

    /// Replaces the path and starts again from its first waypoint.
    pub fn set_path(&mut self, waypoints: Vec<Point3<f64>>) {
        self.waypoints = waypoints;
        self.next = 0;
    }

    /// Drops the current path.
    pub fn clear(&mut self) {
        self.set_path(Vec::new());
    }

    /// Advances past every waypoint the agent has reached and reports the
    /// next one.
    pub fn update(&mut self, position: &Point3<f64>) -> FollowStatus {
        if self.waypoints.is_empty() {
            return FollowStatus::Idle;
        }
        while let Some(waypoint) = self.waypoints.get(self.next) {
            if !self.has_reached(position, waypoint) {
                return FollowStatus::Heading(*waypoint);
            }
            self.next += 1;
        }
        FollowStatus::Completed
    }

    /// The waypoint currently being approached.
    #[must_use]
    pub fn current_target(&self) -> Option<&Point3<f64>> {
        self.waypoints.get(self.next)
    }

    /// Waypoints not yet reached, starting with the current target.
    #[must_use]
    pub fn remaining(&self) -> &[Point3<f64>] {
        self.waypoints.get(self.next..).unwrap_or_default()
    }

    /// Returns `true` once every waypoint of a non-empty path is reached.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.waypoints.is_empty() && self.next >= self.waypoints.len()
    }

    /// Returns the completion radius.
    #[must_use]
    pub const fn completion_radius(&self) -> f64 {
        self.completion_radius
    }

    fn has_reached(&self, position: &Point3<f64>, waypoint: &Point3<f64>) -> bool {
        (waypoint - position)
            .iter()
            .all(|delta| delta.abs() < self.completion_radius)
    }
}

impl Default for PathFollower {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COMPLETION_RADIUS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn follower() -> PathFollower {
        let mut follower = PathFollower::new(0.5);
        follower.set_path(vec![
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(2.0, 2.0, 2.0),
        ]);
        follower
    }

    #[test]
    fn test_idle_without_path() {
        let mut follower = PathFollower::default();
        assert_eq!(follower.update(&Point3::origin()), FollowStatus::Idle);
        assert!(follower.current_target().is_none());
        assert!(follower.remaining().is_empty());
        assert!(!follower.is_complete());
    }

    #[test]
    fn test_heads_for_first_waypoint() {
        let mut follower = follower();
        assert_eq!(
            follower.update(&Point3::origin()),
            FollowStatus::Heading(Point3::new(2.0, 0.0, 0.0))
        );
        assert_eq!(follower.remaining().len(), 3);
    }

    #[test]
    fn test_overshoot_is_not_reached() {
        // Close on every axis
        let mut follower = follower();
        follower.update(&Point3::new(2.1, 0.0, 0.0));
        assert_eq!(follower.remaining().len(), 2);

        // Past the waypoint on y by more than the radius
        let status = follower.update(&Point3::new(2.0, 2.6, 0.0));
        assert_eq!(status, FollowStatus::Heading(Point3::new(2.0, 2.0, 0.0)));
    }

    #[test]
    fn test_radius_is_exclusive() {
        let mut follower = follower();
        follower.update(&Point3::new(1.5, 0.0, 0.0));
        assert_eq!(follower.current_target(), Some(&Point3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_completes_and_stays_complete() {
        let mut follower = follower();
        follower.update(&Point3::new(2.0, 0.0, 0.0));
        follower.update(&Point3::new(2.0, 2.0, 0.0));
        assert_eq!(
            follower.update(&Point3::new(2.0, 2.0, 1.9)),
            FollowStatus::Completed
        );
        assert!(follower.is_complete());
        assert_eq!(
            follower.update(&Point3::origin()),
            FollowStatus::Completed
        );

        follower.clear();
        assert_eq!(follower.update(&Point3::origin()), FollowStatus::Idle);
    }

    #[test]
    fn test_new_path_restarts() {
        let mut follower = follower();
        follower.update(&Point3::new(2.0, 0.0, 0.0));
        follower.set_path(vec![Point3::new(-1.0, 0.0, 0.0)]);
        assert_eq!(follower.remaining(), &[Point3::new(-1.0, 0.0, 0.0)]);
    }
}
