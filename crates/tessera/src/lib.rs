//! 2D constrained Delaunay triangulation with quality refinement.
//!
//! Purpose
//! - Turn a point set, optional edge constraints and optional hole seeds
//!   into a triangle mesh with half-edge connectivity, generic over the
//!   coordinate scalar (`f32`, `f64`, fixed-point Q31.32, `i32`).
//!
//! Pipeline
//! - Preprocess -> Validate -> Delaunay -> Constrain -> PlantSeeds ->
//!   AlphaShape -> Refine -> Postprocess; see [`triangulate`].
//!
//! # Example
//!
//! ```
//! use nalgebra::Vector2;
//! use tessera::{triangulate, Input, Settings};
//!
//! let square = [
//!     Vector2::new(0.0, 0.0),
//!     Vector2::new(1.0, 0.0),
//!     Vector2::new(1.0, 1.0),
//!     Vector2::new(0.0, 1.0),
//! ];
//! let result = triangulate(&Input::from_positions(&square), &Settings::default());
//! assert!(result.status.is_ok());
//! assert_eq!(result.triangle_count(), 2);
//! ```

pub mod engine;
pub mod mesh;
pub mod sample;
pub mod scalar;
pub mod settings;
pub mod status;
pub mod transform;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use engine::{triangulate, Triangulation};
pub use mesh::{next_halfedge, prev_halfedge, Mesh, EMPTY};
pub use scalar::{Circle, CoordScalar};
pub use settings::{Input, Preprocessor, Settings};
pub use status::Status;
pub use transform::CoordTransform;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::engine::{triangulate, Triangulation};
    pub use crate::mesh::{next_halfedge, prev_halfedge, EMPTY};
    pub use crate::scalar::CoordScalar;
    pub use crate::settings::{Input, Preprocessor, Settings};
    pub use crate::status::Status;
    pub use nalgebra::Vector2;
}
