//! Coordinate preprocessing transforms.
//!
//! Purpose
//! - Move the input into a numerically friendly frame before triangulating
//!   and map results back afterwards: identity, center-of-mass with isotropic
//!   rescale, or a principal-components rotation with a [-1, 1] box rescale.
//!
//! Notes
//! - On integer coordinates only the translation part is available (scaling
//!   would not round-trip on the grid); the engine gates PCA off entirely.
//! - The PCA frame does not preserve angles between input and transformed
//!   space, so a refinement angle threshold is interpreted in the transformed
//!   frame. Documented limitation.

use nalgebra::Vector2;

use crate::scalar::CoordScalar;

/// Affine change of frame: subtract `mu`, rotate, recenter, scale per axis.
///
/// All three preprocessors are instances of this one shape, so `forward` and
/// `inverse` have a single implementation each.
#[derive(Clone, Copy, Debug)]
pub struct CoordTransform<T: CoordScalar> {
    mu: Vector2<T>,
    cos_t: T,
    sin_t: T,
    box_center: Vector2<T>,
    scale: Vector2<T>,
    inv_scale: Vector2<T>,
}

impl<T: CoordScalar> CoordTransform<T> {
    pub fn identity() -> Self {
        Self {
            mu: Vector2::new(T::ZERO, T::ZERO),
            cos_t: T::ONE,
            sin_t: T::ZERO,
            box_center: Vector2::new(T::ZERO, T::ZERO),
            scale: Vector2::new(T::ONE, T::ONE),
            inv_scale: Vector2::new(T::ONE, T::ONE),
        }
    }

    /// Center of mass: translate by the negated centroid, then (when the
    /// scalar supports scaling) rescale isotropically by the largest
    /// coordinate magnitude.
    pub fn center_of_mass(points: &[Vector2<T>]) -> Self {
        let mu = centroid(points);
        let mut t = Self::identity();
        t.mu = mu;
        if T::SUPPORTS_SCALING {
            let mut m = T::ZERO;
            for p in points {
                m = m.max((p.x - mu.x).abs()).max((p.y - mu.y).abs());
            }
            if m > T::ZERO {
                let s = T::ONE / m;
                t.scale = Vector2::new(s, s);
                t.inv_scale = Vector2::new(m, m);
            }
        }
        t
    }

    /// Principal components: rotate onto the covariance eigenbasis (closed
    /// form for the 2x2 symmetric eigenproblem), then rescale the rotated
    /// bounding box to [-1, 1] per axis.
    pub fn principal_components(points: &[Vector2<T>]) -> Self {
        let mu = centroid(points);
        let n = points.len().max(1);

        let mut c00 = T::ZERO;
        let mut c01 = T::ZERO;
        let mut c11 = T::ZERO;
        for p in points {
            let dx = p.x - mu.x;
            let dy = p.y - mu.y;
            c00 = c00 + dx * dx;
            c01 = c01 + dx * dy;
            c11 = c11 + dy * dy;
        }
        c00 = T::wide_ratio(c00.wide(), n);
        c01 = T::wide_ratio(c01.wide(), n);
        c11 = T::wide_ratio(c11.wide(), n);

        let half = T::from_config(0.5);
        let theta = half * T::atan2(c01 + c01, c00 - c11);
        let axis = T::normalize_safe(Vector2::new(T::cos(theta), T::sin(theta)));
        let (cos_t, sin_t) = if axis.x == T::ZERO && axis.y == T::ZERO {
            (T::ONE, T::ZERO)
        } else {
            (axis.x, axis.y)
        };

        let rotate = |p: Vector2<T>| {
            let dx = p.x - mu.x;
            let dy = p.y - mu.y;
            Vector2::new(cos_t * dx + sin_t * dy, cos_t * dy - sin_t * dx)
        };

        let mut lo = Vector2::new(T::MAX_SENTINEL, T::MAX_SENTINEL);
        let mut hi = Vector2::new(T::MIN_SENTINEL, T::MIN_SENTINEL);
        for p in points {
            let r = rotate(*p);
            lo = Vector2::new(lo.x.min(r.x), lo.y.min(r.y));
            hi = Vector2::new(hi.x.max(r.x), hi.y.max(r.y));
        }
        let box_center = T::midpoint(lo, hi);
        let ext = Vector2::new(half * (hi.x - lo.x), half * (hi.y - lo.y));
        let sx = if ext.x > T::ZERO { T::ONE / ext.x } else { T::ONE };
        let sy = if ext.y > T::ZERO { T::ONE / ext.y } else { T::ONE };
        let ix = if ext.x > T::ZERO { ext.x } else { T::ONE };
        let iy = if ext.y > T::ZERO { ext.y } else { T::ONE };

        Self {
            mu,
            cos_t,
            sin_t,
            box_center,
            scale: Vector2::new(sx, sy),
            inv_scale: Vector2::new(ix, iy),
        }
    }

    #[inline]
    pub fn forward(&self, p: Vector2<T>) -> Vector2<T> {
        let dx = p.x - self.mu.x;
        let dy = p.y - self.mu.y;
        let rx = self.cos_t * dx + self.sin_t * dy;
        let ry = self.cos_t * dy - self.sin_t * dx;
        Vector2::new(
            (rx - self.box_center.x) * self.scale.x,
            (ry - self.box_center.y) * self.scale.y,
        )
    }

    #[inline]
    pub fn inverse(&self, p: Vector2<T>) -> Vector2<T> {
        let rx = p.x * self.inv_scale.x + self.box_center.x;
        let ry = p.y * self.inv_scale.y + self.box_center.y;
        Vector2::new(
            self.cos_t * rx - self.sin_t * ry + self.mu.x,
            self.sin_t * rx + self.cos_t * ry + self.mu.y,
        )
    }

    /// Jacobian determinant of `forward`; multiplies input-frame areas into
    /// transformed-frame areas (used to carry the refinement area threshold
    /// across the frame change).
    #[inline]
    pub fn area_scaling_factor(&self) -> T {
        self.scale.x * self.scale.y
    }
}

fn centroid<T: CoordScalar>(points: &[Vector2<T>]) -> Vector2<T> {
    let n = points.len().max(1);
    let mut sx = T::ZERO.wide();
    let mut sy = T::ZERO.wide();
    for p in points {
        sx = sx + p.x.wide();
        sy = sy + p.y.wide();
    }
    Vector2::new(T::wide_ratio(sx, n), T::wide_ratio(sy, n))
}
