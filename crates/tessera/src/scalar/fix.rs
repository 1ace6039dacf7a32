//! Fixed-point Q31.32 coordinate backend (`fixed::types::I32F32`).
//!
//! Same formulas as the floating backends; trigonometry and square roots go
//! through `cordic`, which operates natively on the fixed representation.

use fixed::types::I32F32;
use nalgebra::Vector2;

use super::{circumcircle_arith, hash_key_arith, in_circle_arith, Circle, CoordScalar};

/// `sqrt(2)` in Q31.32, used to round `log2` to the nearest integer.
const SQRT_2: I32F32 = I32F32::from_bits(6_074_001_000);

impl CoordScalar for I32F32 {
    type Wide = I32F32;

    const ZERO: Self = I32F32::ZERO;
    const ONE: Self = I32F32::ONE;
    /// Smallest representable increment, the comparison tolerance of the
    /// representation.
    const EPSILON: Self = I32F32::DELTA;
    const MIN_SENTINEL: Self = I32F32::MIN;
    const MAX_SENTINEL: Self = I32F32::MAX;
    const SUPPORTS_REFINEMENT: bool = true;
    const SUPPORTS_SCALING: bool = true;

    #[inline]
    fn from_config(v: f64) -> Self {
        I32F32::from_num(v)
    }
    #[inline]
    fn to_f64(self) -> f64 {
        self.to_num()
    }
    #[inline]
    fn is_finite_coord(self) -> bool {
        true
    }

    #[inline]
    fn abs(self) -> Self {
        I32F32::abs(self)
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
        self
    }
    #[inline]
    fn wide_mul(self, other: Self) -> Self::Wide {
        self * other
    }
    #[inline]
    fn wide_ratio(num: Self::Wide, den: usize) -> Self {
        num / I32F32::from_num(den as i64)
    }

    #[inline]
    fn dist(a: Vector2<Self>, b: Vector2<Self>) -> Self {
        cordic::sqrt(Self::dist_sq(a, b))
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
    fn circumcircle(a: Vector2<Self>, b: Vector2<Self>, c: Vector2<Self>) -> Circle<Self> {
        circumcircle_arith(a, b, c)
    }

    #[inline]
    fn hash_key(p: Vector2<Self>, center: Vector2<Self>, buckets: usize) -> usize {
        hash_key_arith(p, center, buckets)
    }

    #[inline]
    fn normalize_safe(v: Vector2<Self>) -> Vector2<Self> {
        let len_sq = v.x * v.x + v.y * v.y;
        if len_sq <= I32F32::ZERO {
            return Vector2::new(I32F32::ZERO, I32F32::ZERO);
        }
        let len = cordic::sqrt(len_sq);
        Vector2::new(v.x / len, v.y / len)
    }

    #[inline]
    fn cos(self) -> Self {
        cordic::cos(self)
    }
    #[inline]
    fn sin(self) -> Self {
        cordic::sin(self)
    }
    #[inline]
    fn atan2(y: Self, x: Self) -> Self {
        cordic::atan2(y, x)
    }
    #[inline]
    fn sqrt(self) -> Self {
        cordic::sqrt(self)
    }

    fn log2_round(self) -> i32 {
        if self <= I32F32::ZERO {
            return 0;
        }
        let k0 = self.int_log2();
        // Nearest rather than floor: the boundary between k0 and k0 + 1 in log
        // space sits at sqrt(2) * 2^k0.
        let shifted = if k0 >= 0 {
            self >> k0 as u32
        } else {
            self << (-k0) as u32
        };
        if shifted >= SQRT_2 {
            k0 + 1
        } else {
            k0
        }
    }

    fn exp2i(k: i32) -> Self {
        let sh = 32_i64 + k as i64;
        if sh <= 0 {
            I32F32::DELTA
        } else if sh >= 63 {
            I32F32::MAX
        } else {
            I32F32::from_bits(1_i64 << sh)
        }
    }
}
