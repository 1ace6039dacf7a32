//! Half-edge triangle mesh buffers.
//!
//! Purpose
//! - The single connectivity structure shared by every pipeline stage: three
//!   index-aligned buffers of length 3T (origin vertex, twin halfedge,
//!   constrained flag) plus the planting-permeability flag.
//!
//! Why parallel index arrays
//! - Triangles reference each other cyclically through halfedges; a plain
//!   index with `EMPTY` as the null keeps compaction O(T) and avoids any
//!   pointer graph. Halfedges of triangle `t` are `3t`, `3t + 1`, `3t + 2`,
//!   and `next`/`prev` are index arithmetic within the 3-block.


/// Null halfedge index; marks convex-hull and carved boundaries.
///
/// The two's-complement spelling of the -1 sentinel in the output contract.
pub const EMPTY: usize = usize::MAX;

/// Next halfedge within the owning triangle's 3-block.
#[inline]
pub fn next_halfedge(h: usize) -> usize {
    if h % 3 == 2 {
        h - 2
    } else {
        h + 1
    }
}

/// Previous halfedge within the owning triangle's 3-block.
#[inline]
pub fn prev_halfedge(h: usize) -> usize {
    if h % 3 == 0 {
        h + 2
    } else {
        h - 1
    }
}

/// Triangle mesh connectivity buffers.
///
/// Invariants between stages:
/// - all four buffers have equal length, divisible by 3;
/// - `halfedges[h] == EMPTY` or `halfedges[halfedges[h]] == h`;
/// - `constrained[h]` (and the ignore flag) agree with the twin when present.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    /// Origin vertex index of each halfedge.
    pub triangles: Vec<usize>,
    /// Twin halfedge index, or `EMPTY` on a boundary.
    pub halfedges: Vec<usize>,
    /// True when the undirected edge through this halfedge is forced.
    pub constrained: Vec<bool>,
    /// True when a constrained edge is permeable during seed planting.
    pub ignored_for_planting: Vec<bool>,
}

impl Mesh {
    /// Buffers pre-sized for a triangulation of `n` points
    /// (at most `2n - 5` triangles).
    pub fn with_point_capacity(n: usize) -> Self {
        let cap = 3 * (2 * n).saturating_sub(5);
        Self {
            triangles: Vec::with_capacity(cap),
            halfedges: Vec::with_capacity(cap),
            constrained: Vec::with_capacity(cap),
            ignored_for_planting: Vec::with_capacity(cap),
        }
    }

    /// Number of triangles.
    #[inline]
    pub fn len(&self) -> usize {
        self.triangles.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn clear(&mut self) {
        self.triangles.clear();
        self.halfedges.clear();
        self.constrained.clear();
        self.ignored_for_planting.clear();
    }

    /// Origin vertex of halfedge `h`.
    #[inline]
    pub fn origin(&self, h: usize) -> usize {
        self.triangles[h]
    }

    /// Destination vertex of halfedge `h`.
    #[inline]
    pub fn dest(&self, h: usize) -> usize {
        self.triangles[next_halfedge(h)]
    }

    /// Vertex opposite halfedge `h` in its own triangle.
    #[inline]
    pub fn apex(&self, h: usize) -> usize {
        self.triangles[prev_halfedge(h)]
    }

    /// Twin halfedge or `EMPTY`.
    #[inline]
    pub fn twin(&self, h: usize) -> usize {
        self.halfedges[h]
    }

    /// Write both sides of a twin link; either side may be `EMPTY`.
    #[inline]
    pub fn link(&mut self, a: usize, b: usize) {
        if a != EMPTY {
            self.halfedges[a] = b;
        }
        if b != EMPTY {
            self.halfedges[b] = a;
        }
    }

    /// Append the triangle `(i0, i1, i2)` with twin links `(a, b, c)` for its
    /// three halfedges; returns the first halfedge index.
    pub fn add_triangle(
        &mut self,
        i0: usize,
        i1: usize,
        i2: usize,
        a: usize,
        b: usize,
        c: usize,
    ) -> usize {
        let t = self.triangles.len();
        self.triangles.extend_from_slice(&[i0, i1, i2]);
        self.halfedges.extend_from_slice(&[a, b, c]);
        self.constrained.extend_from_slice(&[false, false, false]);
        self.ignored_for_planting
            .extend_from_slice(&[false, false, false]);
        if a != EMPTY {
            self.halfedges[a] = t;
        }
        if b != EMPTY {
            self.halfedges[b] = t + 1;
        }
        if c != EMPTY {
            self.halfedges[c] = t + 2;
        }
        t
    }

    /// Set the constrained flag on `h` and on its twin when present.
    #[inline]
    pub fn set_constrained(&mut self, h: usize, value: bool) {
        self.constrained[h] = value;
        let t = self.halfedges[h];
        if t != EMPTY {
            self.constrained[t] = value;
        }
    }

    /// Set the planting-permeability flag on `h` and on its twin when present.
    #[inline]
    pub fn set_ignored(&mut self, h: usize, value: bool) {
        self.ignored_for_planting[h] = value;
        let t = self.halfedges[h];
        if t != EMPTY {
            self.ignored_for_planting[t] = value;
        }
    }

    /// First outgoing halfedge per vertex (`EMPTY` for unreferenced
    /// vertices). Deterministic: lowest halfedge index wins.
    pub fn vertex_halfedges(&self, point_count: usize) -> Vec<usize> {
        let mut map = vec![EMPTY; point_count];
        for (h, &v) in self.triangles.iter().enumerate() {
            if map[v] == EMPTY {
                map[v] = h;
            }
        }
        map
    }

    /// Flip the diagonal `h` of the quadrilateral formed with its twin,
    /// carrying the constrained and planting flags of the four outer edges.
    ///
    /// The flipped diagonal comes out unflagged on the halfedge pair
    /// `(prev(h), prev(twin))`, which is returned.
    pub fn flip_edge(&mut self, a: usize) -> (usize, usize) {
        let b = self.halfedges[a];
        debug_assert!(b != EMPTY, "cannot flip a boundary halfedge");
        debug_assert!(!self.constrained[a], "cannot flip a constrained halfedge");

        let ar = prev_halfedge(a);
        let bl = prev_halfedge(b);

        let p0 = self.triangles[ar];
        let p1 = self.triangles[bl];

        // Outer edges migrating into the diagonal slots: edge(bl) moves to
        // slot a, edge(ar) moves to slot b.
        let c_bl = self.constrained[bl];
        let g_bl = self.ignored_for_planting[bl];
        let c_ar = self.constrained[ar];
        let g_ar = self.ignored_for_planting[ar];

        self.triangles[a] = p1;
        self.triangles[b] = p0;

        let hbl = self.halfedges[bl];
        let har = self.halfedges[ar];
        self.link(a, hbl);
        self.link(b, har);
        self.link(ar, bl);

        self.constrained[a] = c_bl;
        self.ignored_for_planting[a] = g_bl;
        self.constrained[b] = c_ar;
        self.ignored_for_planting[b] = g_ar;
        self.constrained[ar] = false;
        self.ignored_for_planting[ar] = false;
        self.constrained[bl] = false;
        self.ignored_for_planting[bl] = false;

        (ar, bl)
    }

    /// Remove every triangle flagged in `removed`, compacting the buffers in
    /// place left-to-right. Returns the old-to-new triangle index map with
    /// `EMPTY` for removed triangles; surviving halfedges that pointed into a
    /// removed triangle become boundaries (`EMPTY`).
    ///
    /// This is the single compaction point; callers rebase any outstanding
    /// halfedge or triangle queues through the returned map (entries landing
    /// on `EMPTY` are dead and must be skipped when popped).
    pub fn compact(&mut self, removed: &[bool]) -> Vec<usize> {
        let old_len = self.len();
        debug_assert_eq!(removed.len(), old_len);

        let mut tri_map = vec![EMPTY; old_len];
        let mut w = 0usize;
        for (t, &dead) in removed.iter().enumerate() {
            if !dead {
                tri_map[t] = w;
                w += 1;
            }
        }

        for t in 0..old_len {
            let nt = tri_map[t];
            if nt == EMPTY {
                continue;
            }
            for k in 0..3 {
                let src = 3 * t + k;
                let dst = 3 * nt + k;
                self.triangles[dst] = self.triangles[src];
                let twin = self.halfedges[src];
                self.halfedges[dst] = if twin == EMPTY || tri_map[twin / 3] == EMPTY {
                    EMPTY
                } else {
                    3 * tri_map[twin / 3] + twin % 3
                };
                self.constrained[dst] = self.constrained[src];
                self.ignored_for_planting[dst] = self.ignored_for_planting[src];
            }
        }

        let new_len = 3 * w;
        self.triangles.truncate(new_len);
        self.halfedges.truncate(new_len);
        self.constrained.truncate(new_len);
        self.ignored_for_planting.truncate(new_len);
        tri_map
    }

    /// Rebase one halfedge handle through a [`Mesh::compact`] map.
    #[inline]
    pub fn rebase_halfedge(tri_map: &[usize], h: usize) -> usize {
        if h == EMPTY || tri_map[h / 3] == EMPTY {
            EMPTY
        } else {
            3 * tri_map[h / 3] + h % 3
        }
    }
}
