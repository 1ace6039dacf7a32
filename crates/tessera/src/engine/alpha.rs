//! Alpha-shape triangle filter.
//!
//! Drops every triangle whose squared circumradius exceeds the configured
//! alpha after hole carving, optionally protecting triangles that own a
//! constrained halfedge. Shares the planter's compaction.

use nalgebra::Vector2;

use crate::mesh::Mesh;
use crate::scalar::CoordScalar;

pub(crate) fn filter<T: CoordScalar>(
    points: &[Vector2<T>],
    mesh: &mut Mesh,
    alpha: T,
    protect_constraints: bool,
) {
    let t_count = mesh.len();
    if t_count == 0 {
        return;
    }
    let limit = alpha.wide();
    let mut removed = vec![false; t_count];
    let mut any = false;
    for t in 0..t_count {
        if protect_constraints
            && (mesh.constrained[3 * t]
                || mesh.constrained[3 * t + 1]
                || mesh.constrained[3 * t + 2])
        {
            continue;
        }
        let circle = T::circumcircle(
            points[mesh.triangles[3 * t]],
            points[mesh.triangles[3 * t + 1]],
            points[mesh.triangles[3 * t + 2]],
        );
        if circle.is_degenerate() || circle.radius_sq > limit {
            removed[t] = true;
            any = true;
        }
    }
    if any {
        mesh.compact(&removed);
    }
}
