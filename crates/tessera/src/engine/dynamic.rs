//! Dynamic mesh operations on a finished triangulation.
//!
//! Purpose
//! - Post-run primitives reusing the Bowyer-Watson machinery: barycentric
//!   point insertion, halfedge splitting, and bulk vertex removal with
//!   cavity re-triangulation through the full engine.
//!
//! The interpolating inserts are gated on refinement-capable scalars (their
//! parameters live in `T`); removal works for every scalar. Errors are
//! status values, never panics.

use nalgebra::Vector2;

use crate::mesh::{next_halfedge, prev_halfedge, Mesh, EMPTY};
use crate::scalar::CoordScalar;
use crate::settings::{Input, Settings};
use crate::status::Status;

use super::bowyer::{self, Seed};
use super::{triangulate, Triangulation};

struct RingEdge {
    /// Ring vertex (start of this ring edge).
    u: usize,
    /// Twin handle outside the one-ring, or `EMPTY`.
    outer: usize,
    constrained: bool,
    ignored: bool,
}

impl<T: CoordScalar> Triangulation<T> {
    /// Insert a point at barycentric coordinates `bary` of triangle `t`.
    /// Returns the new vertex index.
    pub fn insert_point_in_triangle(
        &mut self,
        t: usize,
        bary: [T; 3],
    ) -> Result<usize, Status> {
        if !T::SUPPORTS_REFINEMENT {
            return Err(Status::ERR_ARGS_INVALID);
        }
        if t >= self.mesh.len() {
            return Err(Status::ERR_ARGS_INVALID);
        }
        let zero = T::ZERO;
        let one = T::ONE;
        for b in bary {
            if !(b > zero) || !(b < one) {
                return Err(Status::ERR_ARGS_INVALID);
            }
        }
        let eps4 = T::EPSILON + T::EPSILON + T::EPSILON + T::EPSILON;
        if ((bary[0] + bary[1] + bary[2]) - one).abs() > eps4 {
            return Err(Status::ERR_ARGS_INVALID);
        }

        let a = self.positions[self.mesh.triangles[3 * t]];
        let b = self.positions[self.mesh.triangles[3 * t + 1]];
        let c = self.positions[self.mesh.triangles[3 * t + 2]];
        let p = Vector2::new(
            a.x * bary[0] + b.x * bary[1] + c.x * bary[2],
            a.y * bary[0] + b.y * bary[1] + c.y * bary[2],
        );

        let idx = self.positions.len();
        self.positions.push(p);
        bowyer::insert_point(&self.positions, &mut self.mesh, None, idx, Seed::Bulk(t));
        Ok(idx)
    }

    /// Split halfedge `h` at parameter `alpha` in (0, 1) along it. A true
    /// boundary halfedge keeps the mesh boundary open; a constrained edge
    /// leaves both subsegments constrained. Returns the new vertex index.
    pub fn split_halfedge(&mut self, h: usize, alpha: T) -> Result<usize, Status> {
        if !T::SUPPORTS_REFINEMENT {
            return Err(Status::ERR_ARGS_INVALID);
        }
        if h >= self.mesh.halfedges.len() {
            return Err(Status::ERR_ARGS_INVALID);
        }
        if !(alpha > T::ZERO) || !(alpha < T::ONE) {
            return Err(Status::ERR_ARGS_INVALID);
        }

        let i = self.mesh.origin(h);
        let j = self.mesh.dest(h);
        let p0 = self.positions[i];
        let p1 = self.positions[j];
        let p = Vector2::new(T::lerp(p0.x, p1.x, alpha), T::lerp(p0.y, p1.y, alpha));

        let was_constrained = self.mesh.constrained[h];
        let was_ignored = self.mesh.ignored_for_planting[h];
        let twin = self.mesh.halfedges[h];
        if was_constrained {
            self.mesh.set_constrained(h, false);
            self.mesh.set_ignored(h, false);
        }

        let idx = self.positions.len();
        self.positions.push(p);
        let outcome = if twin == EMPTY {
            bowyer::insert_point(&self.positions, &mut self.mesh, None, idx, Seed::Boundary(h))
        } else {
            bowyer::insert_point(&self.positions, &mut self.mesh, None, idx, Seed::Bulk(h / 3))
        };

        if was_constrained {
            let first = 3 * outcome.first_new;
            let last = 3 * (outcome.first_new + outcome.new_count);
            for hh in first..last {
                let (u, v) = (self.mesh.origin(hh), self.mesh.dest(hh));
                if (u == idx && (v == i || v == j)) || (v == idx && (u == i || u == j)) {
                    self.mesh.set_constrained(hh, true);
                    if was_ignored {
                        self.mesh.set_ignored(hh, true);
                    }
                }
            }
        }
        Ok(idx)
    }

    /// Remove a non-boundary, non-constrained vertex and re-triangulate its
    /// one-ring cavity. Higher vertex indices shift down by one.
    pub fn remove_point(&mut self, v: usize) -> Result<(), Status> {
        if v >= self.positions.len() {
            return Err(Status::ERR_ARGS_INVALID);
        }
        let vmap = self.mesh.vertex_halfedges(self.positions.len());
        let start = vmap[v];
        if start == EMPTY {
            // Unreferenced vertex: drop the position and shift indices.
            self.positions.remove(v);
            for x in &mut self.mesh.triangles {
                if *x > v {
                    *x -= 1;
                }
            }
            return Ok(());
        }

        // Ordered one-ring walk; rejects boundary vertices (the rotation
        // would fall off the mesh) and constrained spokes.
        let mut ring: Vec<RingEdge> = Vec::new();
        let mut removed = vec![false; self.mesh.len()];
        let mut h = start;
        loop {
            if self.mesh.constrained[h] {
                return Err(Status::ERR_ARGS_INVALID);
            }
            removed[h / 3] = true;
            let outer = next_halfedge(h);
            ring.push(RingEdge {
                u: self.mesh.origin(outer),
                outer: self.mesh.halfedges[outer],
                constrained: self.mesh.constrained[outer],
                ignored: self.mesh.ignored_for_planting[outer],
            });
            let spoke_in = prev_halfedge(h);
            let next = self.mesh.halfedges[spoke_in];
            if next == EMPTY {
                return Err(Status::ERR_ARGS_INVALID);
            }
            h = next;
            if h == start {
                break;
            }
        }

        // Re-triangulate the ring polygon with the engine itself; the ring
        // edges become constraints and boundary restoration carves whatever
        // lies outside the (possibly non-convex) polygon.
        let k = ring.len();
        let local_pts: Vec<Vector2<T>> = ring.iter().map(|r| self.positions[r.u]).collect();
        let mut local_edges: Vec<usize> = Vec::with_capacity(2 * k);
        for m in 0..k {
            local_edges.push(m);
            local_edges.push((m + 1) % k);
        }
        let local_settings = Settings::<T> {
            validate_input: false,
            restore_boundary: true,
            ..Settings::default()
        };
        let local_input = Input::from_positions(&local_pts).with_constraints(&local_edges);
        let local = triangulate(&local_input, &local_settings);
        if local.status.is_err() {
            return Err(local.status);
        }

        // Carve the one-ring and stitch the local result into the hole.
        let tri_map = self.mesh.compact(&removed);
        let base = self.mesh.len();
        for lt in 0..local.mesh.len() {
            self.mesh.add_triangle(
                ring[local.mesh.triangles[3 * lt]].u,
                ring[local.mesh.triangles[3 * lt + 1]].u,
                ring[local.mesh.triangles[3 * lt + 2]].u,
                EMPTY,
                EMPTY,
                EMPTY,
            );
        }
        for lh in 0..local.mesh.halfedges.len() {
            let g = 3 * base + lh;
            let lt = local.mesh.halfedges[lh];
            if lt != EMPTY {
                self.mesh.halfedges[g] = 3 * base + lt;
                continue;
            }
            // Local boundary halfedge: it runs along ring edge (lu, lu + 1).
            let lu = local.mesh.triangles[lh];
            debug_assert_eq!(
                local.mesh.triangles[next_halfedge(lh)],
                (lu + 1) % k,
                "cavity boundary does not follow the ring"
            );
            let outer = Mesh::rebase_halfedge(&tri_map, ring[lu].outer);
            self.mesh.link(g, outer);
            self.mesh.constrained[g] = ring[lu].constrained;
            self.mesh.ignored_for_planting[g] = ring[lu].ignored;
        }

        // Finally drop the position and shift the vertex indices above it.
        self.positions.remove(v);
        for x in &mut self.mesh.triangles {
            if *x > v {
                *x -= 1;
            }
        }
        Ok(())
    }
}
