//! Sloan edge forcing.
//!
//! Purpose
//! - Force each input segment into the Delaunay mesh: walk the triangle fan
//!   around the first endpoint to find the crossed edges (tunnel walk), then
//!   resolve the crossings by flipping strictly convex quadrilaterals until
//!   the segment appears, and mark it constrained.
//!
//! The unresolved crossings form a cursor queue; non-convex quadrilaterals
//! are deferred to a later pass. A configurable iteration cap bounds the
//! whole resolution loop.

use nalgebra::Vector2;

use crate::mesh::{next_halfedge, prev_halfedge, Mesh, EMPTY};
use crate::scalar::{orient_fast, segments_cross, CoordScalar};
use crate::status::Status;

pub(crate) fn force_edges<T: CoordScalar>(
    points: &[Vector2<T>],
    mesh: &mut Mesh,
    edges: &[usize],
    ignore_mask: Option<&[bool]>,
    max_iters: u32,
) -> Result<(), Status> {
    let mut unresolved: Vec<usize> = Vec::new();
    for (k, pair) in edges.chunks_exact(2).enumerate() {
        // Canonical endpoint order: smaller index first.
        let (ci, cj) = if pair[0] < pair[1] {
            (pair[0], pair[1])
        } else {
            (pair[1], pair[0])
        };
        if ci == cj {
            debug_assert!(false, "self-loop constraint reached the constrainer");
            continue;
        }
        let ignored = ignore_mask.map_or(false, |m| m.get(k).copied().unwrap_or(false));
        force_single(points, mesh, ci, cj, ignored, max_iters, &mut unresolved)?;
    }
    Ok(())
}

fn force_single<T: CoordScalar>(
    points: &[Vector2<T>],
    mesh: &mut Mesh,
    ci: usize,
    cj: usize,
    ignored: bool,
    max_iters: u32,
    unresolved: &mut Vec<usize>,
) -> Result<(), Status> {
    unresolved.clear();
    if collect_intersections(points, mesh, ci, cj, ignored, unresolved) {
        return Ok(());
    }

    let pi = points[ci];
    let pj = points[cj];
    let mut iters: u32 = 0;
    let mut cursor = 0usize;
    while cursor < unresolved.len() {
        if iters >= max_iters {
            return Err(Status::ERR_SLOAN_ITERS_EXCEEDED);
        }
        iters += 1;

        let h = unresolved[cursor];
        cursor += 1;
        if cursor > 1024 && cursor * 2 > unresolved.len() {
            unresolved.drain(..cursor);
            cursor = 0;
        }

        let t = mesh.twin(h);
        if t == EMPTY {
            debug_assert!(false, "crossed edge lost its twin");
            continue;
        }
        let pr = mesh.origin(h);
        let pl = mesh.dest(h);
        let q0 = mesh.apex(h);
        let q1 = mesh.apex(t);

        if !quad_strictly_convex(points, pr, pl, q0, q1) {
            // Defer to a later pass; neighbouring flips will open it up.
            unresolved.push(h);
            continue;
        }

        let (d0, d1) = mesh.flip_edge(h);
        // The two quad rim edges changed slots: the edge previously at d0
        // now lives at t, the one previously at d1 lives at h. Retarget any
        // queued crossings that referenced them.
        for q in unresolved[cursor..].iter_mut() {
            if *q == d0 {
                *q = t;
            } else if *q == d1 {
                *q = h;
            }
        }

        let u = mesh.origin(d0);
        let v = mesh.dest(d0);
        if (u == ci && v == cj) || (u == cj && v == ci) {
            mesh.set_constrained(d0, true);
            if ignored {
                mesh.set_ignored(d0, true);
            }
        } else if segments_cross(points[u], points[v], pi, pj) {
            unresolved.push(d0);
        }
    }
    Ok(())
}

/// Walk the fan around `ci` looking for either the existing edge to `cj`
/// (marked constrained directly; returns true) or the first crossed edge,
/// from which the tunnel walk fills `out`. Scans the mirror rotation when
/// the first direction hits the boundary.
fn collect_intersections<T: CoordScalar>(
    points: &[Vector2<T>],
    mesh: &mut Mesh,
    ci: usize,
    cj: usize,
    ignored: bool,
    out: &mut Vec<usize>,
) -> bool {
    let vmap = mesh.vertex_halfedges(points.len());
    let start = vmap[ci];
    if start == EMPTY {
        // Unreferenced vertex (duplicate dropped by the builder).
        debug_assert!(false, "constraint endpoint missing from the mesh");
        return true;
    }

    for forward in [true, false] {
        let mut h = start;
        loop {
            if mesh.dest(h) == cj {
                mesh.set_constrained(h, true);
                if ignored {
                    mesh.set_ignored(h, true);
                }
                return true;
            }
            // A hull edge to cj can exist with only its incoming halfedge.
            if mesh.apex(h) == cj {
                let incoming = prev_halfedge(h);
                mesh.set_constrained(incoming, true);
                if ignored {
                    mesh.set_ignored(incoming, true);
                }
                return true;
            }
            // Opposite edge of the fan triangle: dest(h) -> apex(h).
            let opp = next_halfedge(h);
            if segments_cross(
                points[mesh.origin(opp)],
                points[mesh.dest(opp)],
                points[ci],
                points[cj],
            ) {
                out.push(opp);
                tunnel(points, mesh, ci, cj, opp, out);
                return false;
            }
            let next = if forward {
                mesh.twin(prev_halfedge(h))
            } else {
                let t = mesh.twin(h);
                if t == EMPTY {
                    EMPTY
                } else {
                    next_halfedge(t)
                }
            };
            if next == EMPTY {
                break; // boundary reached; try the mirror rotation
            }
            h = next;
            if h == start {
                break;
            }
        }
        out.clear();
    }

    debug_assert!(false, "constraint endpoints are not connectable");
    true
}

/// Thread the segment through the mesh: enter across the crossed edge and
/// keep crossing whichever of the two far edges intersects it, until the
/// triangle containing `cj` is reached.
fn tunnel<T: CoordScalar>(
    points: &[Vector2<T>],
    mesh: &Mesh,
    ci: usize,
    cj: usize,
    first: usize,
    out: &mut Vec<usize>,
) {
    let pi = points[ci];
    let pj = points[cj];
    let mut crossed = first;
    loop {
        let entry = mesh.twin(crossed);
        debug_assert!(entry != EMPTY, "segment tunnels out of the mesh");
        if mesh.apex(entry) == cj {
            return;
        }
        let e1 = next_halfedge(entry);
        let e2 = prev_halfedge(entry);
        let next = if segments_cross(
            points[mesh.origin(e1)],
            points[mesh.dest(e1)],
            pi,
            pj,
        ) {
            e1
        } else {
            debug_assert!(
                segments_cross(points[mesh.origin(e2)], points[mesh.dest(e2)], pi, pj),
                "tunnel walk lost the segment"
            );
            e2
        };
        out.push(next);
        crossed = next;
    }
}

/// Strict convexity of the quadrilateral (pr, q1, pl, q0) around the crossed
/// diagonal (pr, pl): four strict orientation tests plus the intersection
/// test of the would-be diagonal (q0, q1).
fn quad_strictly_convex<T: CoordScalar>(
    points: &[Vector2<T>],
    pr: usize,
    pl: usize,
    q0: usize,
    q1: usize,
) -> bool {
    let eps = T::EPSILON.wide();
    let a = points[pr];
    let b = points[q1];
    let c = points[pl];
    let d = points[q0];
    orient_fast(a, b, c) > eps
        && orient_fast(b, c, d) > eps
        && orient_fast(c, d, a) > eps
        && orient_fast(d, a, b) > eps
        && segments_cross(points[q0], points[q1], points[pr], points[pl])
}
