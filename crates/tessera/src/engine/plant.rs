//! Seed planting: hole carving and boundary restoration.
//!
//! Purpose
//! - Remove triangles by flood-filling the triangle adjacency graph from
//!   seed triangles, crossing a halfedge only when it is not constrained (or
//!   when its planting-ignore flag makes it permeable), then compact the
//!   mesh buffers in place.
//!
//! Modes compose: explicit hole seeds, boundary restoration (removal floods
//! in from every unconstrained hull edge), and automatic hole and boundary
//! detection. Auto mode labels the constraint-separated regions and keeps
//! the ones reachable from a constrained boundary loop; islands one level
//! deeper are removed. Deeper nesting is not detected.

use nalgebra::Vector2;

use crate::mesh::{Mesh, EMPTY};
use crate::scalar::{point_in_triangle, CoordScalar};

pub(crate) fn plant_seeds<T: CoordScalar>(
    points: &[Vector2<T>],
    mesh: &mut Mesh,
    hole_seeds: &[Vector2<T>],
    restore_boundary: bool,
    auto_holes_and_boundary: bool,
) {
    let t_count = mesh.len();
    if t_count == 0 {
        return;
    }
    let mut removed = vec![false; t_count];
    let mut queue: Vec<usize> = Vec::new();
    let mark = |t: usize, removed: &mut Vec<bool>, queue: &mut Vec<usize>| {
        if !removed[t] {
            removed[t] = true;
            queue.push(t);
        }
    };

    // Hole seeds locate their containing triangle by linear scan; seeds that
    // land outside the mesh are silently ignored.
    for s in hole_seeds {
        if let Some(t) = locate_triangle(points, mesh, *s) {
            mark(t, &mut removed, &mut queue);
        }
    }

    if restore_boundary {
        for h in 0..mesh.halfedges.len() {
            if mesh.halfedges[h] == EMPTY && !mesh.constrained[h] {
                mark(h / 3, &mut removed, &mut queue);
            }
        }
    }

    if auto_holes_and_boundary {
        auto_mark(mesh, &mut removed, &mut queue);
    }

    // Flood across permeable halfedges.
    let mut cursor = 0;
    while cursor < queue.len() {
        let t = queue[cursor];
        cursor += 1;
        for k in 0..3 {
            let h = 3 * t + k;
            if mesh.constrained[h] && !mesh.ignored_for_planting[h] {
                continue;
            }
            let tw = mesh.halfedges[h];
            if tw == EMPTY {
                continue;
            }
            mark(tw / 3, &mut removed, &mut queue);
        }
    }

    if removed.iter().any(|&r| r) {
        mesh.compact(&removed);
    }
}

/// Inclusive point location by linear scan; deterministic first hit.
pub(crate) fn locate_triangle<T: CoordScalar>(
    points: &[Vector2<T>],
    mesh: &Mesh,
    p: Vector2<T>,
) -> Option<usize> {
    (0..mesh.len()).find(|&t| {
        point_in_triangle(
            points[mesh.triangles[3 * t]],
            points[mesh.triangles[3 * t + 1]],
            points[mesh.triangles[3 * t + 2]],
            p,
        )
    })
}

/// Two-sweep automatic hole and boundary detection.
///
/// Sweep 1 plants removal at every triangle whose boundary halfedge is not
/// constrained (the outside of the constrained outline). Sweep 2 propagates
/// inward across constrained edges: regions adjacent to removed ones (or
/// owning a constrained boundary halfedge) form the domain and are kept, and
/// regions one constrained edge deeper are islands and removed.
fn auto_mark(mesh: &Mesh, removed: &mut Vec<bool>, queue: &mut Vec<usize>) {
    let t_count = mesh.len();

    // Label the constraint-separated regions.
    let mut region = vec![usize::MAX; t_count];
    let mut regions = 0usize;
    let mut stack: Vec<usize> = Vec::new();
    for t0 in 0..t_count {
        if region[t0] != usize::MAX {
            continue;
        }
        region[t0] = regions;
        stack.push(t0);
        while let Some(t) = stack.pop() {
            for k in 0..3 {
                let h = 3 * t + k;
                if mesh.constrained[h] && !mesh.ignored_for_planting[h] {
                    continue;
                }
                let tw = mesh.halfedges[h];
                if tw == EMPTY {
                    continue;
                }
                let t2 = tw / 3;
                if region[t2] == usize::MAX {
                    region[t2] = regions;
                    stack.push(t2);
                }
            }
        }
        regions += 1;
    }

    const UNKNOWN: u8 = 0;
    const KEEP: u8 = 1;
    const REMOVE: u8 = 2;
    let mut status = vec![UNKNOWN; regions];

    let is_wall = |h: usize| mesh.constrained[h] && !mesh.ignored_for_planting[h];

    // Sweep 1: any region leaking through an unconstrained boundary halfedge
    // lies outside the outline.
    for h in 0..mesh.halfedges.len() {
        if mesh.halfedges[h] == EMPTY && !is_wall(h) {
            status[region[h / 3]] = REMOVE;
        }
    }

    // Sweep 2a: the domain sits just inside the constrained walls.
    for h in 0..mesh.halfedges.len() {
        if !is_wall(h) {
            continue;
        }
        let r = region[h / 3];
        let tw = mesh.halfedges[h];
        let outside_is_removed = tw == EMPTY || status[region[tw / 3]] == REMOVE;
        if outside_is_removed && status[r] == UNKNOWN {
            status[r] = KEEP;
        }
    }

    // Sweep 2b: one more constrained wall inward is an island.
    for h in 0..mesh.halfedges.len() {
        if !is_wall(h) {
            continue;
        }
        let tw = mesh.halfedges[h];
        if tw == EMPTY {
            continue;
        }
        let r = region[h / 3];
        if status[region[tw / 3]] == KEEP && status[r] == UNKNOWN {
            status[r] = REMOVE;
        }
    }

    for t in 0..t_count {
        if status[region[t]] == REMOVE && !removed[t] {
            removed[t] = true;
            queue.push(t);
        }
    }
}
