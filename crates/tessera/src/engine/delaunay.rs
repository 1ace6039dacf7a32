//! Seeded incremental Delaunay construction.
//!
//! Purpose
//! - Build the convex-hull triangulation of the point set: pick a seed
//!   triangle near the bounding-box center, sort the remaining points by
//!   distance to its circumcenter, and grow the hull point by point with
//!   in-circle legalization.
//!
//! The advancing hull keeps `prev`/`next` links, the boundary triangle per
//! hull vertex, and a pseudo-angle hash (size ceil(sqrt(n))) to find a
//! visible edge in amortized constant time.

use nalgebra::Vector2;

use crate::mesh::{next_halfedge, prev_halfedge, Mesh, EMPTY};
use crate::scalar::{nearly_equals, orient_fast, CoordScalar};
use crate::status::Status;

/// Legalization stack bound; an overflowing branch is abandoned rather than
/// grown (only reachable on pathologically degenerate input).
const LEGALIZE_STACK: usize = 512;

pub(crate) fn build<T: CoordScalar>(
    points: &[Vector2<T>],
    mesh: &mut Mesh,
) -> Result<(), Status> {
    let n = points.len();
    let (i0, i1, i2) =
        find_seed_triangle(points).ok_or(Status::ERR_DELAUNAY_DUPLICATES_OR_COLLINEAR)?;
    let center = T::circumcircle(points[i0], points[i1], points[i2]).center;

    *mesh = Mesh::with_point_capacity(n);
    mesh.add_triangle(i0, i1, i2, EMPTY, EMPTY, EMPTY);

    // Insertion order: closest to the seed circumcenter first.
    let mut dists: Vec<(usize, T::Wide)> = points
        .iter()
        .enumerate()
        .map(|(i, &p)| (i, T::dist_sq(p, center)))
        .collect();
    dists.sort_unstable_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut hull = Hull::new(n, center, i0, i1, i2, points);
    let mut stack: Vec<usize> = Vec::with_capacity(LEGALIZE_STACK);
    let zero = T::Wide::default();

    for k in 0..dists.len() {
        let (i, _) = dists[k];
        let p = points[i];

        // Skip near-duplicates (exact duplicates for integer coordinates).
        if k > 0 && nearly_equals(p, points[dists[k - 1].0]) {
            continue;
        }
        if i == i0 || i == i1 || i == i2 {
            continue;
        }

        let (mut e, walk_back) = hull.find_visible_edge(p, points);
        if e == EMPTY {
            continue;
        }

        // First triangle from p.
        let t = mesh.add_triangle(e, i, hull.next[e], EMPTY, EMPTY, hull.tri[e]);
        hull.tri[i] = legalize(mesh, t + 2, points, &mut hull, &mut stack);
        hull.tri[e] = t;

        // Walk forward, adding triangles while the hull is visible from p.
        let mut next = hull.next[e];
        loop {
            let q = hull.next[next];
            if !(orient_fast(p, points[next], points[q]) < zero) {
                break;
            }
            let t = mesh.add_triangle(next, i, q, hull.tri[i], EMPTY, hull.tri[next]);
            hull.tri[i] = legalize(mesh, t + 2, points, &mut hull, &mut stack);
            hull.next[next] = EMPTY; // removed from the hull
            next = q;
        }

        // Walk backward from the other side.
        if walk_back {
            loop {
                let q = hull.prev[e];
                if !(orient_fast(p, points[q], points[e]) < zero) {
                    break;
                }
                let t = mesh.add_triangle(q, i, e, EMPTY, hull.tri[e], hull.tri[q]);
                legalize(mesh, t + 2, points, &mut hull, &mut stack);
                hull.tri[q] = t;
                hull.next[e] = EMPTY;
                e = q;
            }
        }

        hull.prev[i] = e;
        hull.next[i] = next;
        hull.prev[next] = i;
        hull.next[e] = i;
        hull.start = e;

        hull.hash_edge(p, i);
        hull.hash_edge(points[e], e);
    }

    Ok(())
}

/// Advancing convex hull: doubly-linked vertex ring plus the pseudo-angle
/// hash used to locate a visible edge.
struct Hull<T: CoordScalar> {
    prev: Vec<usize>,
    next: Vec<usize>,
    /// Boundary halfedge incident to each hull vertex.
    tri: Vec<usize>,
    hash: Vec<usize>,
    start: usize,
    center: Vector2<T>,
}

impl<T: CoordScalar> Hull<T> {
    fn new(
        n: usize,
        center: Vector2<T>,
        i0: usize,
        i1: usize,
        i2: usize,
        points: &[Vector2<T>],
    ) -> Self {
        let buckets = ((n as f64).sqrt().ceil() as usize).max(1);
        let mut hull = Self {
            prev: vec![0; n],
            next: vec![0; n],
            tri: vec![0; n],
            hash: vec![EMPTY; buckets],
            start: i0,
            center,
        };

        hull.next[i0] = i1;
        hull.prev[i2] = i1;
        hull.next[i1] = i2;
        hull.prev[i0] = i2;
        hull.next[i2] = i0;
        hull.prev[i1] = i0;

        hull.tri[i0] = 0;
        hull.tri[i1] = 1;
        hull.tri[i2] = 2;

        hull.hash_edge(points[i0], i0);
        hull.hash_edge(points[i1], i1);
        hull.hash_edge(points[i2], i2);
        hull
    }

    #[inline]
    fn hash_edge(&mut self, p: Vector2<T>, i: usize) {
        let key = T::hash_key(p, self.center, self.hash.len());
        self.hash[key] = i;
    }

    fn find_visible_edge(&self, p: Vector2<T>, points: &[Vector2<T>]) -> (usize, bool) {
        let len = self.hash.len();
        let key = T::hash_key(p, self.center, len);
        let mut start = EMPTY;
        for j in 0..len {
            start = self.hash[(key + j) % len];
            if start != EMPTY && self.next[start] != EMPTY {
                break;
            }
        }
        if start == EMPTY || self.next[start] == EMPTY {
            return (EMPTY, false);
        }
        let start = self.prev[start];
        let mut e = start;
        let zero = T::Wide::default();
        // Walk until an edge visible from p.
        while !(orient_fast(p, points[e], points[self.next[e]]) < zero) {
            e = self.next[e];
            if e == start {
                return (EMPTY, false); // likely a near-duplicate point
            }
        }
        (e, e == start)
    }

    /// An edge flip swapped a boundary halfedge reference (rare); rewrite it.
    fn fix_halfedge(&mut self, old: usize, new: usize) {
        let mut e = self.start;
        loop {
            if self.tri[e] == old {
                self.tri[e] = new;
                break;
            }
            e = self.next[e];
            if e == self.start {
                break;
            }
        }
    }
}

/// Iterative in-circle legalization with an explicit bounded stack.
fn legalize<T: CoordScalar>(
    mesh: &mut Mesh,
    a0: usize,
    points: &[Vector2<T>],
    hull: &mut Hull<T>,
    stack: &mut Vec<usize>,
) -> usize {
    stack.clear();
    let mut a = a0;
    let mut ar;
    loop {
        let b = mesh.halfedges[a];
        ar = prev_halfedge(a);

        // If the pair of triangles does not satisfy the Delaunay condition
        // (p1 inside the circumcircle of [p0, pl, pr]), flip them, then
        // re-check the two outer edges of the flipped pair.
        //
        //           pl                    pl
        //          /||\                  /  \
        //       al/ || \bl            al/    \a
        //        /  ||  \              /      \
        //       /  a||b  \    flip    /___ar___\
        //     p0\   ||   /p1   =>   p0\---bl---/p1
        //        \  ||  /              \      /
        //       ar\ || /br             b\    /br
        //          \||/                  \  /
        //           pr                    pr
        let b = if b == EMPTY {
            match stack.pop() {
                Some(next) => {
                    a = next;
                    continue;
                }
                None => break,
            }
        } else {
            b
        };

        let al = next_halfedge(a);
        let bl = prev_halfedge(b);

        let p0 = mesh.triangles[ar];
        let pr = mesh.triangles[a];
        let pl = mesh.triangles[al];
        let p1 = mesh.triangles[bl];

        let illegal = T::in_circle(points[p0], points[pr], points[pl], points[p1]);
        if illegal {
            mesh.triangles[a] = p1;
            mesh.triangles[b] = p0;

            let hbl = mesh.halfedges[bl];
            let har = mesh.halfedges[ar];

            // Edge swapped on the other side of the hull (rare).
            if hbl == EMPTY {
                hull.fix_halfedge(bl, a);
            }
            mesh.link(a, hbl);
            mesh.link(b, har);
            mesh.link(ar, bl);

            let br = next_halfedge(b);
            if stack.len() < LEGALIZE_STACK {
                stack.push(br);
            }
            // keep working on `a` first
        } else {
            match stack.pop() {
                Some(next) => a = next,
                None => break,
            }
        }
    }
    ar
}

fn find_seed_triangle<T: CoordScalar>(points: &[Vector2<T>]) -> Option<(usize, usize, usize)> {
    let n = points.len();
    if n < 3 {
        return None;
    }

    // Bounding-box center, then the point closest to it.
    let mut lo = points[0];
    let mut hi = points[0];
    for p in points {
        lo = Vector2::new(lo.x.min(p.x), lo.y.min(p.y));
        hi = Vector2::new(hi.x.max(p.x), hi.y.max(p.y));
    }
    let bbox_center = T::midpoint(lo, hi);

    let mut i0 = 0;
    let mut best = None::<T::Wide>;
    for (i, &p) in points.iter().enumerate() {
        let d = T::dist_sq(p, bbox_center);
        if best.map_or(true, |b| d < b) {
            i0 = i;
            best = Some(d);
        }
    }
    let p0 = points[i0];

    // Closest distinct point to the seed.
    let zero = T::Wide::default();
    let mut i1 = EMPTY;
    let mut best = None::<T::Wide>;
    for (i, &p) in points.iter().enumerate() {
        if i == i0 {
            continue;
        }
        let d = T::dist_sq(p, p0);
        if d > zero && best.map_or(true, |b| d < b) {
            i1 = i;
            best = Some(d);
        }
    }
    if i1 == EMPTY {
        return None;
    }
    let p1 = points[i1];

    // Third point minimizing the circumradius; collinear triples are ruled
    // out through the circumcircle sentinel.
    let mut i2 = EMPTY;
    let mut best = None::<T::Wide>;
    for (i, &p) in points.iter().enumerate() {
        if i == i0 || i == i1 {
            continue;
        }
        let circle = T::circumcircle(p0, p1, p);
        if circle.is_degenerate() {
            continue;
        }
        if best.map_or(true, |b| circle.radius_sq < b) {
            i2 = i;
            best = Some(circle.radius_sq);
        }
    }
    if i2 == EMPTY {
        return None;
    }

    // Order the seed for the stored winding.
    if orient_fast(p0, p1, points[i2]) < zero {
        Some((i0, i2, i1))
    } else {
        Some((i0, i1, i2))
    }
}
