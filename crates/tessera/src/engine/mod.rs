//! Triangulation pipeline.
//!
//! Purpose
//! - Drive the stages in their fixed order over a single mutable mesh:
//!   preprocess, validate, Delaunay, constrain, plant seeds, alpha filter,
//!   refine, postprocess. Each stage reads the mesh the previous one left;
//!   the first error aborts before the next stage with cleared buffers.
//!
//! Determinism
//! - Single-threaded, no global state; iteration orders derive from vertex
//!   and halfedge indices, so identical inputs give identical outputs on a
//!   given scalar type and platform.

pub(crate) mod alpha;
pub(crate) mod bowyer;
pub(crate) mod constrain;
pub(crate) mod delaunay;
mod dynamic;
pub(crate) mod plant;
pub(crate) mod refine;
pub(crate) mod validate;

#[cfg(test)]
mod tests;

use nalgebra::Vector2;

use crate::mesh::Mesh;
use crate::scalar::CoordScalar;
use crate::settings::{Input, Preprocessor, Settings};
use crate::status::Status;
use crate::transform::CoordTransform;

/// Triangulation result: the (possibly extended) positions, the half-edge
/// mesh buffers, and the run status.
///
/// Triangles are wound clockwise under the output convention (signed area
/// <= 0); `next_halfedge`/`prev_halfedge` and the `EMPTY` twin sentinel are
/// the stable traversal contract.
#[derive(Clone, Debug, Default)]
pub struct Triangulation<T: CoordScalar> {
    pub positions: Vec<Vector2<T>>,
    pub mesh: Mesh,
    pub status: Status,
}

impl<T: CoordScalar> Triangulation<T> {
    /// Number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.mesh.len()
    }

    /// Flat triangle buffer (origin vertex per halfedge).
    #[inline]
    pub fn triangles(&self) -> &[usize] {
        &self.mesh.triangles
    }

    /// Flat twin buffer with `EMPTY` boundaries.
    #[inline]
    pub fn halfedges(&self) -> &[usize] {
        &self.mesh.halfedges
    }

    #[inline]
    pub fn constrained(&self) -> &[bool] {
        &self.mesh.constrained
    }

    #[inline]
    pub fn ignored_for_planting(&self) -> &[bool] {
        &self.mesh.ignored_for_planting
    }

    fn failed(status: Status) -> Self {
        Self {
            positions: Vec::new(),
            mesh: Mesh::default(),
            status,
        }
    }
}

/// Run the full pipeline on borrowed input.
pub fn triangulate<T: CoordScalar>(
    input: &Input<'_, T>,
    settings: &Settings<T>,
) -> Triangulation<T> {
    let status = validate::check_arguments::<T>(settings);
    if status.is_err() {
        return Triangulation::failed(status);
    }
    if settings.validate_input {
        let status = validate::check_input(input, settings);
        if status.is_err() {
            return Triangulation::failed(status);
        }
    }

    // Preprocess into the working frame.
    let transform = match settings.preprocessor {
        Preprocessor::None => CoordTransform::identity(),
        Preprocessor::Com => CoordTransform::center_of_mass(input.positions),
        Preprocessor::Pca => CoordTransform::principal_components(input.positions),
    };
    let mut positions: Vec<Vector2<T>> = input
        .positions
        .iter()
        .map(|&p| transform.forward(p))
        .collect();

    let mut mesh = Mesh::default();
    if let Err(status) = delaunay::build(&positions, &mut mesh) {
        return Triangulation::failed(status);
    }
    log::debug!("delaunay: {} triangles", mesh.len());

    if let Some(edges) = input.constraint_edges {
        if !edges.is_empty() {
            if let Err(status) = constrain::force_edges(
                &positions,
                &mut mesh,
                edges,
                input.ignore_constraint_for_planting,
                settings.sloan_max_iters,
            ) {
                return Triangulation::failed(status);
            }
        }
    }

    let seeds: Vec<Vector2<T>> = input
        .hole_seeds
        .unwrap_or(&[])
        .iter()
        .map(|&s| transform.forward(s))
        .collect();
    if !seeds.is_empty() || settings.restore_boundary || settings.auto_holes_and_boundary {
        plant::plant_seeds(
            &positions,
            &mut mesh,
            &seeds,
            settings.restore_boundary,
            settings.auto_holes_and_boundary,
        );
        log::debug!("planting: {} triangles kept", mesh.len());
    }

    if settings.alpha_shape_filter {
        alpha::filter(
            &positions,
            &mut mesh,
            settings.alpha,
            settings.alpha_protect_constraints,
        );
    }

    if settings.refine_mesh {
        if let Err(status) = refine::refine(
            &mut positions,
            &mut mesh,
            settings,
            transform.area_scaling_factor(),
            input.positions.len(),
        ) {
            return Triangulation::failed(status);
        }
        log::debug!("refinement: {} triangles", mesh.len());
    }

    // Postprocess: map every position (including inserted ones) back.
    let positions = positions.iter().map(|&p| transform.inverse(p)).collect();
    Triangulation {
        positions,
        mesh,
        status: Status::OK,
    }
}
