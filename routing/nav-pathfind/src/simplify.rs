//! Collinear-run compression for raw cell paths.
//!
//! Theta* paths already skip most intermediate cells, but A* paths and short
//! Theta* segments still contain runs of cells along one direction. These are
//! collapsed into their turn points.

use nav_spatial::VoxelCoord;

/// Collapses straight runs of a start-to-target cell path into turn points.
///
/// The start cell is never emitted. A cell is kept when the direction into it
/// differs from the direction out of it; directions are compared after
/// reduction by their greatest common divisor, so a Theta* jump of `(2, 1, 0)`
/// continues a run of `(4, 2, 0)` jumps. The target is always emitted last.
///
/// # Example
///
/// ```
/// use nav_pathfind::simplify::compress_collinear;
/// use nav_spatial::VoxelCoord;
///
/// let path = [
///     VoxelCoord::new(0, 0, 0),
///     VoxelCoord::new(1, 0, 0),
///     VoxelCoord::new(2, 0, 0),
///     VoxelCoord::new(2, 1, 0),
///     VoxelCoord::new(2, 2, 0),
/// ];
///
/// // One turn at (2, 0, 0), then the target
/// assert_eq!(
///     compress_collinear(&path),
///     vec![VoxelCoord::new(2, 0, 0), VoxelCoord::new(2, 2, 0)],
/// );
/// ```
#[must_use]
pub fn compress_collinear(path: &[VoxelCoord]) -> Vec<VoxelCoord> {
    let Some(&target) = path.last() else {
        return Vec::new();
    };

    let mut result = Vec::new();
    for window in path.windows(3) {
        let incoming = (window[1] - window[0]).direction();
        let outgoing = (window[2] - window[1]).direction();
        if incoming != outgoing {
            result.push(window[1]);
        }
    }
    result.push(target);
    result
}
