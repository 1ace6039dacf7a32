//! Floating-point coordinate backends (`f32`, `f64`).

use nalgebra::Vector2;

use super::{circumcircle_arith, hash_key_arith, in_circle_arith, Circle, CoordScalar};

macro_rules! float_coord_impl {
    ($t:ty) => {
        impl CoordScalar for $t {
            type Wide = $t;

            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            const EPSILON: Self = <$t>::EPSILON;
            const MIN_SENTINEL: Self = <$t>::MIN;
            const MAX_SENTINEL: Self = <$t>::MAX;
            const SUPPORTS_REFINEMENT: bool = true;
            const SUPPORTS_SCALING: bool = true;

            #[inline]
            fn from_config(v: f64) -> Self {
                v as $t
            }
            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }
            #[inline]
            fn is_finite_coord(self) -> bool {
                self.is_finite()
            }

            #[inline]
            fn abs(self) -> Self {
                <$t>::abs(self)
            }
            #[inline]
            fn min(self, other: Self) -> Self {
                <$t>::min(self, other)
            }
            #[inline]
            fn max(self, other: Self) -> Self {
                <$t>::max(self, other)
            }

            #[inline]
            fn wide(self) -> Self::Wide {
                self
            }
            #[inline]
            fn wide_mul(self, other: Self) -> Self::Wide {
                self * other
            }
            #[inline]
            fn wide_ratio(num: Self::Wide, den: usize) -> Self {
                num / den as $t
            }

            #[inline]
            fn dist(a: Vector2<Self>, b: Vector2<Self>) -> Self {
                Self::dist_sq(a, b).sqrt()
            }

            #[inline]
            fn in_circle(
                a: Vector2<Self>,
                b: Vector2<Self>,
                c: Vector2<Self>,
                p: Vector2<Self>,
            ) -> bool {
                in_circle_arith(a, b, c, p)
            }

            #[inline]
            fn circumcircle(
                a: Vector2<Self>,
                b: Vector2<Self>,
                c: Vector2<Self>,
            ) -> Circle<Self> {
                circumcircle_arith(a, b, c)
            }

            #[inline]
            fn hash_key(p: Vector2<Self>, center: Vector2<Self>, buckets: usize) -> usize {
                hash_key_arith(p, center, buckets)
            }

            #[inline]
            fn normalize_safe(v: Vector2<Self>) -> Vector2<Self> {
                let len_sq = v.x * v.x + v.y * v.y;
                if len_sq <= 0.0 {
                    return Vector2::new(0.0, 0.0);
                }
                let inv = 1.0 / len_sq.sqrt();
                Vector2::new(v.x * inv, v.y * inv)
            }

            #[inline]
            fn cos(self) -> Self {
                <$t>::cos(self)
            }
            #[inline]
            fn sin(self) -> Self {
                <$t>::sin(self)
            }
            #[inline]
            fn atan2(y: Self, x: Self) -> Self {
                <$t>::atan2(y, x)
            }
            #[inline]
            fn sqrt(self) -> Self {
                <$t>::sqrt(self)
            }
            #[inline]
            fn log2_round(self) -> i32 {
                <$t>::log2(self).round() as i32
            }
            #[inline]
            fn exp2i(k: i32) -> Self {
                <$t>::exp2(k as $t)
            }
        }
    };
}

float_coord_impl!(f32);
float_coord_impl!(f64);
