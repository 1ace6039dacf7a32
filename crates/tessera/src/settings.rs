//! Run settings and the borrowed input record.

use nalgebra::Vector2;

use crate::scalar::CoordScalar;

/// Coordinate preprocessing choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Preprocessor {
    /// Triangulate the input coordinates as they are.
    #[default]
    None,
    /// Translate by the negated centroid and rescale isotropically
    /// (translation only on integer coordinates).
    Com,
    /// Rotate onto the principal axes and rescale to the [-1, 1] box.
    /// Angles are not preserved, so a refinement angle threshold applies in
    /// the transformed frame.
    Pca,
}

/// Borrowed triangulation input.
///
/// `constraint_edges` is a flat sequence of endpoint index pairs; the
/// optional planting mask has one entry per pair.
#[derive(Clone, Copy, Debug)]
pub struct Input<'a, T: CoordScalar> {
    pub positions: &'a [Vector2<T>],
    pub constraint_edges: Option<&'a [usize]>,
    pub hole_seeds: Option<&'a [Vector2<T>]>,
    pub ignore_constraint_for_planting: Option<&'a [bool]>,
}

impl<'a, T: CoordScalar> Input<'a, T> {
    pub fn from_positions(positions: &'a [Vector2<T>]) -> Self {
        Self {
            positions,
            constraint_edges: None,
            hole_seeds: None,
            ignore_constraint_for_planting: None,
        }
    }

    pub fn with_constraints(mut self, edges: &'a [usize]) -> Self {
        self.constraint_edges = Some(edges);
        self
    }

    pub fn with_holes(mut self, seeds: &'a [Vector2<T>]) -> Self {
        self.hole_seeds = Some(seeds);
        self
    }

    pub fn with_planting_ignore_mask(mut self, mask: &'a [bool]) -> Self {
        self.ignore_constraint_for_planting = Some(mask);
        self
    }
}

/// Pipeline settings.
#[derive(Clone, Copy, Debug)]
pub struct Settings<T: CoordScalar> {
    /// Run the input validator before triangulating.
    pub validate_input: bool,
    /// Emit non-fatal diagnostics through the `log` facade.
    pub verbose: bool,
    pub preprocessor: Preprocessor,
    /// Detect holes and the outer boundary from the constraint loops
    /// (one level of island nesting).
    pub auto_holes_and_boundary: bool,
    /// Drop every triangle reachable from an unconstrained hull edge.
    pub restore_boundary: bool,
    /// Edge-forcing iteration cap; exceeding it aborts the run.
    pub sloan_max_iters: u32,
    pub refine_mesh: bool,
    /// Maximum admissible triangle area (input frame); 0 disables the area
    /// criterion.
    pub refinement_area_threshold: T,
    /// Minimum admissible interior angle, radians in [0, pi/4]. Termination
    /// is only guaranteed up to ~pi/6.
    pub refinement_angle_threshold: T,
    /// Shell spacing parameter for constrained-segment splits.
    pub concentric_shells_parameter: T,
    /// Drop triangles with circumradius^2 above `alpha` after planting.
    pub alpha_shape_filter: bool,
    pub alpha: T,
    /// Keep alpha-filtered triangles that own a constrained halfedge.
    pub alpha_protect_constraints: bool,
}

impl<T: CoordScalar> Default for Settings<T> {
    fn default() -> Self {
        Self {
            validate_input: true,
            verbose: false,
            preprocessor: Preprocessor::None,
            auto_holes_and_boundary: false,
            restore_boundary: false,
            sloan_max_iters: 1_000_000,
            refine_mesh: false,
            refinement_area_threshold: T::from_config(1.0),
            refinement_angle_threshold: T::from_config(0.087_266_462_599_716_47), // 5 degrees
            concentric_shells_parameter: T::from_config(0.001),
            alpha_shape_filter: false,
            alpha: T::from_config(1.0),
            alpha_protect_constraints: false,
        }
    }
}
