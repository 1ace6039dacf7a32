//! Scalar coordinate types and geometric predicates.
//!
//! Purpose
//! - One trait, [`CoordScalar`], carries everything the pipeline needs from a
//!   coordinate representation: arithmetic, a widened product type for squared
//!   quantities, the in-circle and circumcircle predicates, the hull hash key,
//!   and per-type capability flags.
//!
//! Why this design
//! - The stages are written once against the trait; `f32`, `f64`, fixed-point
//!   Q31.32 and `i32` plug in without touching the algorithms.
//! - Quadratic quantities (squared distances, dots, crosses) live in
//!   `CoordScalar::Wide` so the `i32` backend stays exact in `i64`, and the
//!   quartic in-circle determinant for `i32` is evaluated exactly in `i128`.

use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

use nalgebra::Vector2;

mod fix;
mod float;
mod int;


/// Circumcircle as (center, radius²). `radius_sq` is a widened scalar.
///
/// Degenerate (collinear) triples are reported with a saturated sentinel
/// center and a saturated radius; see [`CoordScalar::circumcircle`].
#[derive(Clone, Copy, Debug)]
pub struct Circle<T: CoordScalar> {
    pub center: Vector2<T>,
    pub radius_sq: T::Wide,
}

impl<T: CoordScalar> Circle<T> {
    /// Strict containment test against the cached circle.
    #[inline]
    pub fn contains(&self, p: Vector2<T>) -> bool {
        T::dist_sq(p, self.center) < self.radius_sq
    }

    /// True for the saturated sentinel produced from a collinear triple.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !(self.center.x < T::MAX_SENTINEL) || !(self.center.y < T::MAX_SENTINEL)
    }
}

/// Coordinate scalar abstraction for the triangulation pipeline.
///
/// Implementations: `f32`, `f64`, `fixed::types::I32F32`, `i32`.
pub trait CoordScalar:
    Copy
    + PartialEq
    + PartialOrd
    + Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// Widened product type; exact for integer coordinates.
    type Wide: Copy
        + PartialOrd
        + Default
        + Debug
        + Add<Output = Self::Wide>
        + Sub<Output = Self::Wide>
        + Mul<Output = Self::Wide>
        + Neg<Output = Self::Wide>;

    const ZERO: Self;
    const ONE: Self;
    /// Tolerance suited to the representation (0 for exact integers).
    const EPSILON: Self;
    const MIN_SENTINEL: Self;
    const MAX_SENTINEL: Self;
    /// Whether the refinement stage (and the interpolating dynamic inserts)
    /// are available for this scalar.
    const SUPPORTS_REFINEMENT: bool;
    /// Whether scaling transforms (COM rescale, PCA) are available. When
    /// false, COM degenerates to a pure translation.
    const SUPPORTS_SCALING: bool;

    /// Conversion used for settings defaults and fixed constants.
    fn from_config(v: f64) -> Self;
    fn to_f64(self) -> f64;
    /// False for NaN/infinite float coordinates; always true otherwise.
    fn is_finite_coord(self) -> bool;

    /// Whether the bounding box `[lo, hi]` stays inside the representation's
    /// supported span. Only the integer backend restricts this (its in-circle
    /// headroom assumes a diameter of at most 2^20).
    #[inline]
    fn span_supported(lo: Vector2<Self>, hi: Vector2<Self>) -> bool {
        let _ = (lo, hi);
        true
    }

    fn abs(self) -> Self;
    fn min(self, other: Self) -> Self;
    fn max(self, other: Self) -> Self;

    /// Widening conversion.
    fn wide(self) -> Self::Wide;
    /// Widening product.
    fn wide_mul(self, other: Self) -> Self::Wide;
    /// `num / den` with the result narrowed back to `Self` (used for means).
    fn wide_ratio(num: Self::Wide, den: usize) -> Self;

    /// Linear interpolation `a + (b - a) * t`.
    #[inline]
    fn lerp(a: Self, b: Self, t: Self) -> Self {
        a + (b - a) * t
    }

    /// Midpoint that cannot overflow on integer inputs.
    #[inline]
    fn midpoint(a: Vector2<Self>, b: Vector2<Self>) -> Vector2<Self> {
        let two = Self::ONE + Self::ONE;
        Vector2::new(a.x + (b.x - a.x) / two, a.y + (b.y - a.y) / two)
    }

    /// Euclidean distance (refinement-gated scalars only).
    fn dist(a: Vector2<Self>, b: Vector2<Self>) -> Self;

    /// Squared distance in the widened type.
    #[inline]
    fn dist_sq(a: Vector2<Self>, b: Vector2<Self>) -> Self::Wide {
        let dx = a.x - b.x;
        let dy = a.y - b.y;
        dx.wide_mul(dx) + dy.wide_mul(dy)
    }

    /// Dot product of coordinate differences in the widened type.
    #[inline]
    fn diff_dot(a: Vector2<Self>, o: Vector2<Self>, b: Vector2<Self>) -> Self::Wide {
        let ux = a.x - o.x;
        let uy = a.y - o.y;
        let vx = b.x - o.x;
        let vy = b.y - o.y;
        ux.wide_mul(vx) + uy.wide_mul(vy)
    }

    /// `p` strictly inside the circumcircle of the triangle `(a, b, c)`,
    /// where the triangle satisfies `orient_fast(a, b, c) >= 0` (the stored
    /// winding). Duplicates the determinant sign convention of the
    /// incremental builder, so legalization and cavity tests agree.
    fn in_circle(a: Vector2<Self>, b: Vector2<Self>, c: Vector2<Self>, p: Vector2<Self>) -> bool;

    /// Circumcircle of `(a, b, c)`, or the saturated sentinel when the three
    /// points are collinear (zero divisor).
    fn circumcircle(a: Vector2<Self>, b: Vector2<Self>, c: Vector2<Self>) -> Circle<Self>;

    /// Pseudo-angle bucket of `p` around `center` in `[0, buckets)`, used by
    /// the advancing-hull hash. Formula: `dx / (|dx| + |dy|)` folded into
    /// `[0, 1)`, then scaled.
    fn hash_key(p: Vector2<Self>, center: Vector2<Self>, buckets: usize) -> usize;

    /// `v / |v|`, or the zero vector when `|v|` is zero.
    fn normalize_safe(v: Vector2<Self>) -> Vector2<Self>;

    // Trigonometric and power helpers. Only reachable behind the
    // `SUPPORTS_REFINEMENT` / `SUPPORTS_SCALING` gates; the `i32` backend
    // never executes them.
    fn cos(self) -> Self;
    fn sin(self) -> Self;
    fn atan2(y: Self, x: Self) -> Self;
    fn sqrt(self) -> Self;
    /// `round(log2(self))` for positive inputs (concentric-shell exponent).
    fn log2_round(self) -> i32;
    /// `2^k` as a scalar, saturating at the representable range.
    fn exp2i(k: i32) -> Self;
}

/// Orientation of the triple `(p, q, r)`:
/// `(q.y - p.y)(r.x - q.x) - (q.x - p.x)(r.y - q.y)`.
///
/// Stored triangles satisfy `orient_fast >= 0`; equivalently their signed
/// area under the standard mathematical convention is <= 0 (the clockwise
/// winding of the output contract).
#[inline]
pub fn orient_fast<T: CoordScalar>(
    p: Vector2<T>,
    q: Vector2<T>,
    r: Vector2<T>,
) -> T::Wide {
    (q.y - p.y).wide_mul(r.x - q.x) - (q.x - p.x).wide_mul(r.y - q.y)
}

/// Inclusive point-in-triangle test for a stored-winding triangle.
#[inline]
pub fn point_in_triangle<T: CoordScalar>(
    a: Vector2<T>,
    b: Vector2<T>,
    c: Vector2<T>,
    p: Vector2<T>,
) -> bool {
    let zero = T::Wide::default();
    !(orient_fast(a, b, p) < zero)
        && !(orient_fast(b, c, p) < zero)
        && !(orient_fast(c, a, p) < zero)
}

/// Proper (open-segment) intersection of segments `(a, b)` and `(c, d)`.
///
/// Strict on both sides of both supporting lines; touching endpoints do not
/// count. Callers exclude shared endpoints by index before calling.
#[inline]
pub fn segments_cross<T: CoordScalar>(
    a: Vector2<T>,
    b: Vector2<T>,
    c: Vector2<T>,
    d: Vector2<T>,
) -> bool {
    let eps = T::EPSILON.wide();
    let zero = T::Wide::default();
    let o1 = orient_fast(a, b, c);
    let o2 = orient_fast(a, b, d);
    let o3 = orient_fast(c, d, a);
    let o4 = orient_fast(c, d, b);
    let opposite = |x: T::Wide, y: T::Wide| {
        (x > eps && y < zero - eps) || (x < zero - eps && y > eps)
    };
    opposite(o1, o2) && opposite(o3, o4)
}

/// Near-equality used to drop duplicate points during hull construction
/// (exact equality for integer coordinates, where `EPSILON` is zero).
#[inline]
pub fn nearly_equals<T: CoordScalar>(a: Vector2<T>, b: Vector2<T>) -> bool {
    let eps2 = T::EPSILON + T::EPSILON;
    (a.x - b.x).abs() <= eps2 && (a.y - b.y).abs() <= eps2
}

/// Shared in-circle determinant for scalar types whose `Wide` equals `Self`
/// (floating point and fixed point). Sign convention of the incremental
/// builder: negative determinant means `p` lies strictly inside.
#[inline]
pub(crate) fn in_circle_arith<T>(
    a: Vector2<T>,
    b: Vector2<T>,
    c: Vector2<T>,
    p: Vector2<T>,
) -> bool
where
    T: CoordScalar,
{
    let dx = a.x - p.x;
    let dy = a.y - p.y;
    let ex = b.x - p.x;
    let ey = b.y - p.y;
    let fx = c.x - p.x;
    let fy = c.y - p.y;

    let ap = dx * dx + dy * dy;
    let bp = ex * ex + ey * ey;
    let cp = fx * fx + fy * fy;

    dx * (ey * cp - bp * fy) - dy * (ex * cp - bp * fx) + ap * (ex * fy - ey * fx) < T::ZERO
}

/// Shared circumcircle for scalar types whose `Wide` equals `Self`.
#[inline]
pub(crate) fn circumcircle_arith<T>(
    a: Vector2<T>,
    b: Vector2<T>,
    c: Vector2<T>,
) -> Circle<T>
where
    T: CoordScalar<Wide = T>,
{
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let ex = c.x - a.x;
    let ey = c.y - a.y;

    let bl = dx * dx + dy * dy;
    let cl = ex * ex + ey * ey;
    let div = dx * ey - dy * ex;
    if div == T::ZERO {
        return Circle {
            center: Vector2::new(T::MAX_SENTINEL, T::MAX_SENTINEL),
            radius_sq: T::MAX_SENTINEL,
        };
    }
    let half = T::from_config(0.5);
    let d = half / div;
    let x = (ey * bl - dy * cl) * d;
    let y = (dx * cl - ex * bl) * d;
    Circle {
        center: Vector2::new(a.x + x, a.y + y),
        radius_sq: x * x + y * y,
    }
}

/// Shared pseudo-angle hash for scalar types whose arithmetic can divide.
#[inline]
pub(crate) fn hash_key_arith<T: CoordScalar>(
    p: Vector2<T>,
    center: Vector2<T>,
    buckets: usize,
) -> usize {
    let dx = p.x - center.x;
    let dy = p.y - center.y;
    let denom = dx.abs() + dy.abs();
    if denom == T::ZERO {
        return 0;
    }
    let r = dx / denom;
    // Fold into [0, 1): upper half-plane maps to (3 - r)/4, lower to (1 + r)/4.
    let three = T::from_config(3.0);
    let four = T::from_config(4.0);
    let angle = if dy > T::ZERO {
        (three - r) / four
    } else {
        (T::ONE + r) / four
    };
    (((buckets as f64) * angle.to_f64()).floor() as usize) % buckets
}
