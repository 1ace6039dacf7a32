//! Bowyer-Watson point insertion.
//!
//! Purpose
//! - Insert a point into a valid mesh by carving the star-shaped cavity of
//!   triangles whose circumcircle contains it (never crossing a constrained
//!   edge), then fanning new triangles from the point over the cavity rim.
//!
//! Two variants share the machinery: the bulk cavity has a closed rim loop;
//! the boundary variant (point on a halfedge with no twin) leaves the loop
//! open, so the fan ends carry boundary halfedges on both extremities.
//!
//! Compaction happens here, in the same write-index pattern as seed planting;
//! callers rebase their outstanding queues through the returned triangle map.

use nalgebra::Vector2;

use crate::mesh::{next_halfedge, Mesh, EMPTY};
use crate::scalar::{Circle, CoordScalar};

/// Where the new point lands.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Seed {
    /// Strictly inside the given triangle (or inside its circumcircle).
    Bulk(usize),
    /// On the interior of a true boundary halfedge (twin is `EMPTY`).
    Boundary(usize),
}

/// Result of one insertion.
pub(crate) struct InsertOutcome {
    /// Old-to-new triangle map from the cavity compaction (`EMPTY` entries
    /// are the removed cavity triangles).
    pub tri_map: Vec<usize>,
    /// First new fan triangle id (post-compaction).
    pub first_new: usize,
    pub new_count: usize,
}

struct LoopEdge {
    u: usize,
    v: usize,
    outer: usize,
    constrained: bool,
    ignored: bool,
}

/// Next rim halfedge after `h`, walking the cavity boundary: rotate around
/// `dest(h)` through cavity triangles until the rim is hit again.
fn next_loop_edge(mesh: &Mesh, in_cavity: &[bool], h: usize) -> usize {
    let mut e = next_halfedge(h);
    loop {
        let t = mesh.halfedges[e];
        if t == EMPTY || !in_cavity[t / 3] {
            return e;
        }
        e = next_halfedge(t);
    }
}

/// Insert the already-pushed point `positions[p_idx]` into the mesh.
///
/// `circles` supplies the per-triangle circumcircle cache when the caller
/// maintains one (the refiner); without it the in-circle predicate is
/// evaluated directly.
pub(crate) fn insert_point<T: CoordScalar>(
    positions: &[Vector2<T>],
    mesh: &mut Mesh,
    circles: Option<&[Circle<T>]>,
    p_idx: usize,
    seed: Seed,
) -> InsertOutcome {
    let p = positions[p_idx];
    let start = match seed {
        Seed::Bulk(t) => t,
        Seed::Boundary(h) => {
            debug_assert_eq!(mesh.halfedges[h], EMPTY);
            h / 3
        }
    };

    // Grow the cavity across non-constrained twins whose circumcircle
    // strictly contains p.
    let mut in_cavity = vec![false; mesh.len()];
    in_cavity[start] = true;
    let mut stack = vec![start];
    while let Some(t) = stack.pop() {
        for k in 0..3 {
            let h = 3 * t + k;
            if mesh.constrained[h] {
                continue;
            }
            let tw = mesh.halfedges[h];
            if tw == EMPTY {
                continue;
            }
            let t2 = tw / 3;
            if in_cavity[t2] {
                continue;
            }
            let inside = match circles {
                Some(cache) => cache[t2].contains(p),
                None => {
                    let a = positions[mesh.triangles[3 * t2]];
                    let b = positions[mesh.triangles[3 * t2 + 1]];
                    let c = positions[mesh.triangles[3 * t2 + 2]];
                    T::in_circle(a, b, c, p)
                }
            };
            if inside {
                in_cavity[t2] = true;
                stack.push(t2);
            }
        }
    }

    // Collect the rim as an ordered loop. The boundary variant starts at the
    // split halfedge itself so the open ends fall out of the same walk.
    let h0 = match seed {
        Seed::Boundary(h) => h,
        Seed::Bulk(_) => {
            let mut first = EMPTY;
            for h in 0..mesh.halfedges.len() {
                if !in_cavity[h / 3] {
                    continue;
                }
                let tw = mesh.halfedges[h];
                if tw == EMPTY || !in_cavity[tw / 3] {
                    first = h;
                    break;
                }
            }
            debug_assert!(first != EMPTY, "cavity without a rim");
            first
        }
    };
    let mut rim: Vec<LoopEdge> = Vec::new();
    let mut h = h0;
    loop {
        rim.push(LoopEdge {
            u: mesh.origin(h),
            v: mesh.dest(h),
            outer: mesh.halfedges[h],
            constrained: mesh.constrained[h],
            ignored: mesh.ignored_for_planting[h],
        });
        h = next_loop_edge(mesh, &in_cavity, h);
        if h == h0 {
            break;
        }
    }

    // Carve the cavity, then retarget the captured outer twins.
    let tri_map = mesh.compact(&in_cavity);
    for e in &mut rim {
        e.outer = Mesh::rebase_halfedge(&tri_map, e.outer);
    }

    // Fan from the new point. Rim edge k yields triangle (u, v, p); side +1
    // runs v -> p, side +2 runs p -> u, so consecutive fan triangles pair up
    // as (k, +1) <-> (k + 1, +2).
    let first_new = mesh.len();
    let skip_first = matches!(seed, Seed::Boundary(_));
    let fan: &[LoopEdge] = if skip_first { &rim[1..] } else { &rim[..] };
    for e in fan {
        let t = mesh.add_triangle(e.u, e.v, p_idx, e.outer, EMPTY, EMPTY);
        mesh.constrained[t] = e.constrained;
        mesh.ignored_for_planting[t] = e.ignored;
    }
    let m = fan.len();
    for k in 0..m {
        let s = 3 * (first_new + k);
        let s_next = 3 * (first_new + (k + 1) % m);
        if k + 1 < m || !skip_first {
            mesh.link(s + 1, s_next + 2);
        }
    }

    InsertOutcome {
        tri_map,
        first_new,
        new_count: m,
    }
}
