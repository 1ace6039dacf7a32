//! Argument and input validation.
//!
//! Purpose
//! - Emit the status flags of the error taxonomy before any geometry runs.
//!   Argument (settings) gates are always checked; input well-formedness
//!   checks run only when `Settings::validate_input` is set.
//!
//! Non-fatal conditions are reported through `log::warn!` when
//! `Settings::verbose` is on.

use nalgebra::Vector2;

use crate::scalar::{orient_fast, segments_cross, CoordScalar};
use crate::settings::{Input, Preprocessor, Settings};
use crate::status::Status;

/// Settings checks: capability gates and numeric ranges.
pub(crate) fn check_arguments<T: CoordScalar>(settings: &Settings<T>) -> Status {
    if settings.sloan_max_iters < 1 {
        return Status::ERR_ARGS_INVALID;
    }
    if settings.refine_mesh && !T::SUPPORTS_REFINEMENT {
        return Status::ERR_REFINEMENT_UNSUPPORTED;
    }
    if settings.alpha_shape_filter && !T::SUPPORTS_REFINEMENT {
        return Status::ERR_ARGS_INVALID;
    }
    if settings.preprocessor == Preprocessor::Pca && !T::SUPPORTS_SCALING {
        return Status::ERR_ARGS_INVALID;
    }
    if settings.refine_mesh {
        let zero = T::ZERO;
        if settings.refinement_area_threshold < zero {
            return Status::ERR_ARGS_INVALID;
        }
        let quarter_pi = T::from_config(std::f64::consts::FRAC_PI_4);
        if settings.refinement_angle_threshold < zero
            || settings.refinement_angle_threshold > quarter_pi
        {
            return Status::ERR_ARGS_INVALID;
        }
        if !(settings.concentric_shells_parameter > zero) {
            return Status::ERR_ARGS_INVALID;
        }
        if settings.verbose {
            let sixth_pi = T::from_config(std::f64::consts::FRAC_PI_6);
            if settings.refinement_angle_threshold > sixth_pi {
                log::warn!(
                    "refinement angle threshold above pi/6; termination is not guaranteed"
                );
            }
            if settings.preprocessor == Preprocessor::Pca {
                log::warn!(
                    "PCA preprocessing does not preserve the refinement angle threshold"
                );
            }
        }
    }
    if settings.alpha_shape_filter && !(settings.alpha > T::ZERO) {
        return Status::ERR_ARGS_INVALID;
    }
    Status::OK
}

/// Input well-formedness and geometry checks, in taxonomy order.
pub(crate) fn check_input<T: CoordScalar>(
    input: &Input<'_, T>,
    settings: &Settings<T>,
) -> Status {
    let pts = input.positions;
    if pts.len() < 3 {
        return Status::ERR_INPUT_POSITIONS_LENGTH;
    }
    for p in pts {
        if !p.x.is_finite_coord() || !p.y.is_finite_coord() {
            return Status::ERR_INPUT_POSITION_UNDEFINED;
        }
    }

    // Representation-specific span limit (the integer in-circle headroom).
    let mut lo = pts[0];
    let mut hi = pts[0];
    for p in pts {
        lo = Vector2::new(lo.x.min(p.x), lo.y.min(p.y));
        hi = Vector2::new(hi.x.max(p.x), hi.y.max(p.y));
    }
    if !T::span_supported(lo, hi) {
        return Status::ERR_INPUT_POSITION_UNDEFINED;
    }

    // Duplicate positions: sort an index permutation and compare neighbours.
    let mut order: Vec<usize> = (0..pts.len()).collect();
    order.sort_unstable_by(|&a, &b| {
        (pts[a].x, pts[a].y)
            .partial_cmp(&(pts[b].x, pts[b].y))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for w in order.windows(2) {
        if pts[w[0]] == pts[w[1]] {
            return Status::ERR_INPUT_POSITIONS_DUPLICATES;
        }
    }

    let edges = input.constraint_edges.unwrap_or(&[]);
    if settings.verbose && edges.is_empty() {
        if settings.auto_holes_and_boundary || settings.restore_boundary {
            log::warn!("hole or boundary processing requested without constraint edges");
        }
        if input.hole_seeds.map_or(false, |s| !s.is_empty()) {
            log::warn!("hole seeds provided without constraint edges");
        }
        if input.ignore_constraint_for_planting.is_some() {
            log::warn!("planting ignore mask provided without constraint edges");
        }
    }

    if !edges.is_empty() {
        if edges.len() % 2 != 0 {
            return Status::ERR_INPUT_CONSTRAINTS_LENGTH;
        }
        for &e in edges {
            if e >= pts.len() {
                return Status::ERR_INPUT_CONSTRAINTS_OUT_OF_RANGE;
            }
        }
        let pairs: Vec<(usize, usize)> = edges
            .chunks_exact(2)
            .map(|c| if c[0] < c[1] { (c[0], c[1]) } else { (c[1], c[0]) })
            .collect();
        for &(a, b) in &pairs {
            if a == b {
                return Status::ERR_INPUT_CONSTRAINTS_SELF_LOOP;
            }
        }
        let mut sorted = pairs.clone();
        sorted.sort_unstable();
        for w in sorted.windows(2) {
            if w[0] == w[1] {
                return Status::ERR_INPUT_CONSTRAINTS_DUPLICATES;
            }
        }
        // A constrained segment must not pass through a third vertex.
        let eps = T::EPSILON.wide();
        for &(a, b) in &pairs {
            let pa = pts[a];
            let pb = pts[b];
            for (k, &p) in pts.iter().enumerate() {
                if k == a || k == b {
                    continue;
                }
                let o = orient_fast(pa, pb, p);
                let collinear = !(o > eps) && !(o < T::Wide::default() - eps);
                if collinear
                    && p.x >= pa.x.min(pb.x)
                    && p.x <= pa.x.max(pb.x)
                    && p.y >= pa.y.min(pb.y)
                    && p.y <= pa.y.max(pb.y)
                {
                    return Status::ERR_INPUT_CONSTRAINTS_COLLINEAR_POINT;
                }
            }
        }
        // Pairwise proper intersections (shared endpoints excluded).
        for i in 0..pairs.len() {
            for j in i + 1..pairs.len() {
                let (a, b) = pairs[i];
                let (c, d) = pairs[j];
                if a == c || a == d || b == c || b == d {
                    continue;
                }
                if segments_cross(pts[a], pts[b], pts[c], pts[d]) {
                    return Status::ERR_INPUT_CONSTRAINTS_INTERSECT;
                }
            }
        }
    }

    if let Some(seeds) = input.hole_seeds {
        for s in seeds {
            if !s.x.is_finite_coord() || !s.y.is_finite_coord() {
                return Status::ERR_INPUT_HOLE_UNDEFINED;
            }
        }
    }

    if let Some(mask) = input.ignore_constraint_for_planting {
        if !edges.is_empty() && mask.len() != edges.len() / 2 {
            return Status::ERR_INPUT_IGNORE_MASK_LENGTH;
        }
    }

    Status::OK
}
