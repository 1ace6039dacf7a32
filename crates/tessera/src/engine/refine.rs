//! Ruppert-style mesh refinement.
//!
//! Purpose
//! - Split encroached constrained segments and poor-quality triangles until
//!   the area and minimum-angle thresholds hold, inserting points by
//!   Bowyer-Watson cavity re-triangulation.
//!
//! Queue discipline
//! - Two cursor queues: segment halfedges and triangle ids. Segments drain
//!   first. Segment entries split unconditionally when popped; entries whose
//!   triangle died in an earlier cavity are dropped by the compaction rebase.
//!   Triangle entries re-validate (still bad) when popped.
//! - A bad triangle whose circumcenter sits in the closed diametral disc of
//!   any constrained segment queues those segments and re-queues itself;
//!   otherwise the circumcenter is inserted.
//! - Every insertion tests the new fan triangles (bad) and their constrained
//!   halfedges (encroached) and queues accordingly.
//!
//! Termination holds for angle thresholds up to ~pi/6; the engine accepts up
//! to pi/4 and warns. There is no hard iteration cap.

use nalgebra::Vector2;

use crate::mesh::{Mesh, EMPTY};
use crate::scalar::{orient_fast, Circle, CoordScalar};
use crate::settings::Settings;
use crate::status::Status;

use super::bowyer::{self, Seed};

pub(crate) fn refine<T: CoordScalar>(
    positions: &mut Vec<Vector2<T>>,
    mesh: &mut Mesh,
    settings: &Settings<T>,
    area_factor: T,
    original_point_count: usize,
) -> Result<(), Status> {
    if !T::SUPPORTS_REFINEMENT {
        return Err(Status::ERR_REFINEMENT_UNSUPPORTED);
    }
    if mesh.is_empty() {
        return Ok(());
    }

    // Refinement preserves the boundary: hull halfedges become segments.
    for h in 0..mesh.halfedges.len() {
        if mesh.halfedges[h] == EMPTY {
            mesh.constrained[h] = true;
        }
    }

    // Thresholds, with the area carried as twice the area (the orientation
    // value is twice the signed area) and rescaled into the working frame.
    let scaled = settings.refinement_area_threshold * area_factor;
    let area2_limit = scaled + scaled;
    let cos_min = T::cos(settings.refinement_angle_threshold);
    let cos_sq = cos_min * cos_min;
    let ctx = Thresholds {
        area2_limit,
        cos_sq,
        shells: settings.concentric_shells_parameter,
        original_point_count,
    };

    let mut circles: Vec<Circle<T>> = (0..mesh.len())
        .map(|t| triangle_circle(positions, mesh, t))
        .collect();

    let mut he_queue: Vec<usize> = Vec::new();
    let mut he_cursor = 0usize;
    let mut tri_queue: Vec<usize> = Vec::new();
    let mut tri_cursor = 0usize;

    for h in 0..mesh.halfedges.len() {
        if segment_handle(mesh, h) && segment_encroached(positions, mesh, h) {
            he_queue.push(h);
        }
    }
    for t in 0..mesh.len() {
        if triangle_is_bad(positions, mesh, t, &ctx) {
            tri_queue.push(t);
        }
    }

    loop {
        if he_cursor < he_queue.len() {
            let h = he_queue[he_cursor];
            he_cursor += 1;
            if h == EMPTY {
                continue;
            }
            split_segment(
                positions,
                mesh,
                &mut circles,
                h,
                &ctx,
                &mut he_queue,
                &mut tri_queue,
            );
            continue;
        }
        if tri_cursor < tri_queue.len() {
            let t = tri_queue[tri_cursor];
            tri_cursor += 1;
            if t == EMPTY || !triangle_is_bad(positions, mesh, t, &ctx) {
                continue;
            }
            split_triangle(
                positions,
                mesh,
                &mut circles,
                t,
                &ctx,
                &mut he_queue,
                &mut tri_queue,
            );
            continue;
        }
        break;
    }
    Ok(())
}

struct Thresholds<T: CoordScalar> {
    area2_limit: T,
    cos_sq: T,
    shells: T,
    original_point_count: usize,
}

fn triangle_circle<T: CoordScalar>(
    positions: &[Vector2<T>],
    mesh: &Mesh,
    t: usize,
) -> Circle<T> {
    T::circumcircle(
        positions[mesh.triangles[3 * t]],
        positions[mesh.triangles[3 * t + 1]],
        positions[mesh.triangles[3 * t + 2]],
    )
}

/// Canonical segment handle: constrained and either boundary or the lower of
/// the twin pair.
#[inline]
fn segment_handle(mesh: &Mesh, h: usize) -> bool {
    if !mesh.constrained[h] {
        return false;
    }
    let t = mesh.halfedges[h];
    t == EMPTY || h < t
}

#[inline]
fn canonical_segment(mesh: &Mesh, h: usize) -> usize {
    let t = mesh.halfedges[h];
    if t == EMPTY || h < t {
        h
    } else {
        t
    }
}

/// Closed diametral-disc test against the apex on each side of the segment.
fn segment_encroached<T: CoordScalar>(
    positions: &[Vector2<T>],
    mesh: &Mesh,
    h: usize,
) -> bool {
    let p0 = positions[mesh.origin(h)];
    let p1 = positions[mesh.dest(h)];
    let zero = T::Wide::default();
    let apex_encroaches = |hh: usize| {
        let p2 = positions[mesh.apex(hh)];
        !(T::diff_dot(p0, p2, p1) > zero)
    };
    if apex_encroaches(h) {
        return true;
    }
    let t = mesh.halfedges[h];
    t != EMPTY && apex_encroaches(t)
}

/// Point-in-closed-diametral-disc test for an arbitrary point.
#[inline]
fn diametral_disc_contains<T: CoordScalar>(
    p0: Vector2<T>,
    p1: Vector2<T>,
    q: Vector2<T>,
) -> bool {
    !(T::diff_dot(p0, q, p1) > T::Wide::default())
}

fn triangle_is_bad<T: CoordScalar>(
    positions: &[Vector2<T>],
    mesh: &Mesh,
    t: usize,
    ctx: &Thresholds<T>,
) -> bool {
    let a = positions[mesh.triangles[3 * t]];
    let b = positions[mesh.triangles[3 * t + 1]];
    let c = positions[mesh.triangles[3 * t + 2]];

    let area2 = orient_fast(a, b, c);
    if area2 > ctx.area2_limit.wide() {
        return true;
    }

    // Minimum-angle test without acos: at each corner, the angle is below
    // the threshold iff the edge dot product is positive and its square
    // exceeds cos^2 times the product of the squared edge lengths.
    let zero = T::Wide::default();
    let corners = [(a, b, c), (b, c, a), (c, a, b)];
    for (o, u, v) in corners {
        let d = T::diff_dot(u, o, v);
        if d > zero {
            let lu = T::dist_sq(u, o);
            let lv = T::dist_sq(v, o);
            if d * d > ctx.cos_sq.wide() * lu * lv {
                return true;
            }
        }
    }
    false
}

/// Rebase both queues and the circle cache after a cavity insertion, then
/// queue the new fan triangles and their constrained halfedges.
fn absorb_insertion<T: CoordScalar>(
    positions: &[Vector2<T>],
    mesh: &Mesh,
    circles: &mut Vec<Circle<T>>,
    outcome: &bowyer::InsertOutcome,
    ctx: &Thresholds<T>,
    he_queue: &mut Vec<usize>,
    tri_queue: &mut Vec<usize>,
) {
    for h in he_queue.iter_mut() {
        *h = Mesh::rebase_halfedge(&outcome.tri_map, *h);
    }
    for t in tri_queue.iter_mut() {
        if *t != EMPTY {
            *t = outcome.tri_map[*t];
        }
    }

    // Compact the circle cache through the same map and append the fan.
    let mut w = 0usize;
    for t in 0..outcome.tri_map.len() {
        let nt = outcome.tri_map[t];
        if nt != EMPTY {
            debug_assert_eq!(nt, w);
            circles[w] = circles[t];
            w += 1;
        }
    }
    circles.truncate(w);
    for t in outcome.first_new..outcome.first_new + outcome.new_count {
        circles.push(triangle_circle(positions, mesh, t));
    }

    let mut queued_segments: Vec<usize> = Vec::new();
    for t in outcome.first_new..outcome.first_new + outcome.new_count {
        if triangle_is_bad(positions, mesh, t, ctx) {
            tri_queue.push(t);
        }
        for k in 0..3 {
            let h = 3 * t + k;
            if !mesh.constrained[h] {
                continue;
            }
            let canon = canonical_segment(mesh, h);
            if queued_segments.contains(&canon) {
                continue;
            }
            if segment_encroached(positions, mesh, canon) {
                queued_segments.push(canon);
                he_queue.push(canon);
            }
        }
    }
}

/// Split a constrained segment: midpoint between two original or two
/// inserted endpoints, concentric shells otherwise; the constrained state is
/// cleared for the insertion and re-marked on the two halves.
fn split_segment<T: CoordScalar>(
    positions: &mut Vec<Vector2<T>>,
    mesh: &mut Mesh,
    circles: &mut Vec<Circle<T>>,
    h: usize,
    ctx: &Thresholds<T>,
    he_queue: &mut Vec<usize>,
    tri_queue: &mut Vec<usize>,
) {
    debug_assert!(mesh.constrained[h], "queued segment lost its flag");
    let i = mesh.origin(h);
    let j = mesh.dest(h);
    let p0 = positions[i];
    let p1 = positions[j];

    let p = if (i < ctx.original_point_count) == (j < ctx.original_point_count) {
        T::midpoint(p0, p1)
    } else {
        // Concentric shells: place the split on a power-of-two radius ring
        // around the input endpoint so cascading splits cannot creep up on
        // it.
        let (a, b) = if i < ctx.original_point_count {
            (p0, p1)
        } else {
            (p1, p0)
        };
        let d = T::dist(a, b);
        let k = (d / (ctx.shells + ctx.shells)).log2_round();
        let alpha = ctx.shells / d * T::exp2i(k);
        Vector2::new(T::lerp(a.x, b.x, alpha), T::lerp(a.y, b.y, alpha))
    };

    let was_ignored = mesh.ignored_for_planting[h];
    let twin = mesh.halfedges[h];
    mesh.set_constrained(h, false);
    mesh.set_ignored(h, false);

    let idx = positions.len();
    positions.push(p);
    let outcome = if twin == EMPTY {
        bowyer::insert_point(positions, mesh, Some(circles.as_slice()), idx, Seed::Boundary(h))
    } else {
        bowyer::insert_point(positions, mesh, Some(circles.as_slice()), idx, Seed::Bulk(h / 3))
    };

    // Re-mark the two halves (both directions land inside the new fan).
    let first = 3 * outcome.first_new;
    let last = 3 * (outcome.first_new + outcome.new_count);
    for hh in first..last {
        let (u, v) = (mesh.origin(hh), mesh.dest(hh));
        if (u == idx && (v == i || v == j)) || (v == idx && (u == i || u == j)) {
            mesh.set_constrained(hh, true);
            if was_ignored {
                mesh.set_ignored(hh, true);
            }
        }
    }

    absorb_insertion(positions, mesh, circles, &outcome, ctx, he_queue, tri_queue);
}

/// Split a bad triangle: queue the constrained segments whose closed
/// diametral disc contains the circumcenter, or insert the circumcenter.
fn split_triangle<T: CoordScalar>(
    positions: &mut Vec<Vector2<T>>,
    mesh: &mut Mesh,
    circles: &mut Vec<Circle<T>>,
    t: usize,
    ctx: &Thresholds<T>,
    he_queue: &mut Vec<usize>,
    tri_queue: &mut Vec<usize>,
) {
    if circles[t].is_degenerate() {
        // Zero-area sliver; its circumcenter is meaningless, leave it be.
        return;
    }
    let center = circles[t].center;

    let mut rejected = false;
    for h in 0..mesh.halfedges.len() {
        if !segment_handle(mesh, h) {
            continue;
        }
        let p0 = positions[mesh.origin(h)];
        let p1 = positions[mesh.dest(h)];
        if diametral_disc_contains(p0, p1, center) {
            he_queue.push(h);
            rejected = true;
        }
    }

    if rejected {
        // The segments split first; the triangle is revisited afterwards if
        // it survived the cavities.
        tri_queue.push(t);
        return;
    }

    let idx = positions.len();
    positions.push(center);
    let outcome =
        bowyer::insert_point(positions, mesh, Some(circles.as_slice()), idx, Seed::Bulk(t));
    absorb_insertion(positions, mesh, circles, &outcome, ctx, he_queue, tri_queue);
}
