//! 32-bit integer coordinate backend.
//!
//! Exactness notes
//! - Squared quantities are carried in `i64`. With the supported bounding-box
//!   diameter of at most 2^20, every squared distance fits with headroom.
//! - The in-circle determinant multiplies three squared terms, which exceeds
//!   64 bits; it is evaluated exactly in `i128`.
//! - Refinement and scaling transforms are unavailable: interpolated points
//!   do not exist on the integer grid.

use nalgebra::Vector2;

use super::{Circle, CoordScalar};

#[inline]
fn clamp_i32(v: i128) -> i32 {
    v.clamp(i32::MIN as i128, i32::MAX as i128) as i32
}

#[inline]
fn clamp_i64(v: i128) -> i64 {
    v.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

impl CoordScalar for i32 {
    type Wide = i64;

    const ZERO: Self = 0;
    const ONE: Self = 1;
    /// Integer arithmetic is exact; predicates compare against zero.
    const EPSILON: Self = 0;
    const MIN_SENTINEL: Self = i32::MIN;
    const MAX_SENTINEL: Self = i32::MAX;
    const SUPPORTS_REFINEMENT: bool = false;
    const SUPPORTS_SCALING: bool = false;

    #[inline]
    fn from_config(v: f64) -> Self {
        v as i32
    }
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
    #[inline]
    fn is_finite_coord(self) -> bool {
        true
    }

    #[inline]
    fn span_supported(lo: Vector2<Self>, hi: Vector2<Self>) -> bool {
        const MAX_SPAN: i64 = 1 << 20;
        (hi.x as i64 - lo.x as i64) <= MAX_SPAN && (hi.y as i64 - lo.y as i64) <= MAX_SPAN
    }

    #[inline]
    fn abs(self) -> Self {
        i32::wrapping_abs(self)
    }
    #[inline]
    fn min(self, other: Self) -> Self {
        Ord::min(self, other)
    }
    #[inline]
    fn max(self, other: Self) -> Self {
        Ord::max(self, other)
    }

    #[inline]
    fn wide(self) -> Self::Wide {
        self as i64
    }
    #[inline]
    fn wide_mul(self, other: Self) -> Self::Wide {
        self as i64 * other as i64
    }
    #[inline]
    fn wide_ratio(num: Self::Wide, den: usize) -> Self {
        (num / den as i64) as i32
    }

    fn dist(_a: Vector2<Self>, _b: Vector2<Self>) -> Self {
        unreachable!("refinement is gated off for integer coordinates")
    }

    fn in_circle(a: Vector2<Self>, b: Vector2<Self>, c: Vector2<Self>, p: Vector2<Self>) -> bool {
        let dx = a.x as i64 - p.x as i64;
        let dy = a.y as i64 - p.y as i64;
        let ex = b.x as i64 - p.x as i64;
        let ey = b.y as i64 - p.y as i64;
        let fx = c.x as i64 - p.x as i64;
        let fy = c.y as i64 - p.y as i64;

        let ap = dx * dx + dy * dy;
        let bp = ex * ex + ey * ey;
        let cp = fx * fx + fy * fy;

        // The three cofactor products reach ~2^86 at the supported coordinate
        // range, so the determinant is assembled in i128.
        let det = dx as i128 * (ey as i128 * cp as i128 - bp as i128 * fy as i128)
            - dy as i128 * (ex as i128 * cp as i128 - bp as i128 * fx as i128)
            + ap as i128 * (ex as i128 * fy as i128 - ey as i128 * fx as i128);
        det < 0
    }

    fn circumcircle(a: Vector2<Self>, b: Vector2<Self>, c: Vector2<Self>) -> Circle<Self> {
        let dx = b.x as i64 - a.x as i64;
        let dy = b.y as i64 - a.y as i64;
        let ex = c.x as i64 - a.x as i64;
        let ey = c.y as i64 - a.y as i64;

        let bl = dx * dx + dy * dy;
        let cl = ex * ex + ey * ey;
        let div = dx * ey - dy * ex;
        if div == 0 {
            // Collinear triple: saturated sentinel.
            return Circle {
                center: Vector2::new(i32::MAX, i32::MAX),
                radius_sq: i64::MAX,
            };
        }
        let nx = ey as i128 * bl as i128 - dy as i128 * cl as i128;
        let ny = dx as i128 * cl as i128 - ex as i128 * bl as i128;
        let d2 = 2 * div as i128;
        let x = nx / d2;
        let y = ny / d2;
        Circle {
            center: Vector2::new(
                clamp_i32(a.x as i128 + x),
                clamp_i32(a.y as i128 + y),
            ),
            radius_sq: clamp_i64(x * x + y * y),
        }
    }

    fn hash_key(p: Vector2<Self>, center: Vector2<Self>, buckets: usize) -> usize {
        let dx = (p.x as i64 - center.x as i64) as f64;
        let dy = (p.y as i64 - center.y as i64) as f64;
        let denom = dx.abs() + dy.abs();
        if denom == 0.0 {
            return 0;
        }
        let r = dx / denom;
        let angle = if dy > 0.0 { (3.0 - r) / 4.0 } else { (1.0 + r) / 4.0 };
        ((buckets as f64 * angle).floor() as usize) % buckets
    }

    fn normalize_safe(_v: Vector2<Self>) -> Vector2<Self> {
        unreachable!("scaling transforms are gated off for integer coordinates")
    }
    fn cos(self) -> Self {
        unreachable!("refinement is gated off for integer coordinates")
    }
    fn sin(self) -> Self {
        unreachable!("refinement is gated off for integer coordinates")
    }
    fn atan2(_y: Self, _x: Self) -> Self {
        unreachable!("refinement is gated off for integer coordinates")
    }
    fn sqrt(self) -> Self {
        unreachable!("refinement is gated off for integer coordinates")
    }
    fn log2_round(self) -> i32 {
        unreachable!("refinement is gated off for integer coordinates")
    }
    fn exp2i(_k: i32) -> Self {
        unreachable!("refinement is gated off for integer coordinates")
    }
}
