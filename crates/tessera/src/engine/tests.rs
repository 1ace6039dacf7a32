use std::collections::BTreeSet;

use fixed::types::I32F32;
use nalgebra::Vector2;
use proptest::prelude::*;

use super::{triangulate, Triangulation};
use crate::mesh::{next_halfedge, EMPTY};
use crate::sample::{draw_point_cloud, ReplayToken};
use crate::scalar::{orient_fast, CoordScalar};
use crate::settings::{Input, Preprocessor, Settings};
use crate::status::Status;
use crate::transform::CoordTransform;

fn square() -> Vec<Vector2<f64>> {
    vec![
        Vector2::new(0.0, 0.0),
        Vector2::new(1.0, 0.0),
        Vector2::new(1.0, 1.0),
        Vector2::new(0.0, 1.0),
    ]
}

fn tri_set<T: CoordScalar>(out: &Triangulation<T>) -> BTreeSet<[usize; 3]> {
    out.triangles()
        .chunks_exact(3)
        .map(|t| {
            let mut k = [t[0], t[1], t[2]];
            k.sort_unstable();
            k
        })
        .collect()
}

fn assert_invariants<T: CoordScalar>(out: &Triangulation<T>) {
    let m = &out.mesh;
    let len = m.triangles.len();
    assert_eq!(len % 3, 0);
    assert_eq!(m.halfedges.len(), len);
    assert_eq!(m.constrained.len(), len);
    assert_eq!(m.ignored_for_planting.len(), len);
    let zero = T::Wide::default();
    for h in 0..len {
        assert!(m.triangles[h] < out.positions.len(), "vertex out of range");
        let t = m.halfedges[h];
        if t != EMPTY {
            assert!(t < len, "twin out of range");
            assert_eq!(m.halfedges[t], h, "twin symmetry at {h}");
            assert_eq!(m.constrained[h], m.constrained[t]);
            assert_eq!(m.ignored_for_planting[h], m.ignored_for_planting[t]);
        }
    }
    for t in 0..len / 3 {
        let a = out.positions[m.triangles[3 * t]];
        let b = out.positions[m.triangles[3 * t + 1]];
        let c = out.positions[m.triangles[3 * t + 2]];
        assert!(!(orient_fast(a, b, c) < zero), "winding flipped at {t}");
    }
}

fn regenerate_halfedges(triangles: &[usize]) -> Vec<usize> {
    let mut map = std::collections::HashMap::new();
    for h in 0..triangles.len() {
        map.insert((triangles[h], triangles[next_halfedge(h)]), h);
    }
    (0..triangles.len())
        .map(|h| {
            let key = (triangles[next_halfedge(h)], triangles[h]);
            map.get(&key).copied().unwrap_or(EMPTY)
        })
        .collect()
}

fn find_halfedge<T: CoordScalar>(out: &Triangulation<T>, u: usize, v: usize) -> Option<usize> {
    (0..out.halfedges().len())
        .find(|&h| out.mesh.origin(h) == u && out.mesh.dest(h) == v)
}

// --- concrete scenarios ---------------------------------------------------

#[test]
fn unit_square_picks_the_centermost_diagonal() {
    let pts = square();
    let out = triangulate(&Input::from_positions(&pts), &Settings::default());
    assert!(out.status.is_ok());
    assert_invariants(&out);
    let expect: BTreeSet<[usize; 3]> = [[0, 1, 2], [0, 2, 3]].into_iter().collect();
    assert_eq!(tri_set(&out), expect);
}

#[test]
fn unit_square_refinement_splits_two_side_midpoints() {
    let pts = square();
    let settings = Settings {
        refine_mesh: true,
        refinement_area_threshold: 0.3,
        refinement_angle_threshold: 20f64.to_radians(),
        ..Settings::default()
    };
    let out = triangulate(&Input::from_positions(&pts), &settings);
    assert!(out.status.is_ok());
    assert_invariants(&out);
    assert_eq!(out.positions.len(), 6);
    assert_eq!(out.triangle_count(), 4);
    assert_eq!(out.positions[4], Vector2::new(1.0, 0.5));
    assert_eq!(out.positions[5], Vector2::new(0.0, 0.5));
    let expect: BTreeSet<[usize; 3]> = [[0, 1, 4], [2, 3, 4], [3, 4, 5], [0, 4, 5]]
        .into_iter()
        .collect();
    assert_eq!(tri_set(&out), expect);
    // Every output triangle meets the thresholds.
    for t in 0..out.triangle_count() {
        let a = out.positions[out.triangles()[3 * t]];
        let b = out.positions[out.triangles()[3 * t + 1]];
        let c = out.positions[out.triangles()[3 * t + 2]];
        assert!(orient_fast(a, b, c) <= 0.6 + 1e-12);
    }
}

fn square_with_hole() -> (Vec<Vector2<f64>>, Vec<usize>) {
    let pts = vec![
        Vector2::new(0.0, 0.0),
        Vector2::new(3.0, 0.0),
        Vector2::new(3.0, 3.0),
        Vector2::new(0.0, 3.0),
        Vector2::new(1.0, 1.0),
        Vector2::new(2.0, 1.0),
        Vector2::new(2.0, 2.0),
        Vector2::new(1.0, 2.0),
    ];
    let edges = vec![0, 1, 1, 2, 2, 3, 3, 0, 4, 5, 5, 6, 6, 7, 7, 4];
    (pts, edges)
}

#[test]
fn square_with_hole_leaves_the_annulus() {
    let (pts, edges) = square_with_hole();
    let seeds = [Vector2::new(1.5, 1.5)];
    let input = Input::from_positions(&pts)
        .with_constraints(&edges)
        .with_holes(&seeds);
    let out = triangulate(&input, &Settings::default());
    assert!(out.status.is_ok());
    assert_invariants(&out);
    assert_eq!(out.triangle_count(), 8);
    // No triangle remains inside the hole.
    for t in 0..out.triangle_count() {
        let cx: f64 = (0..3)
            .map(|k| out.positions[out.triangles()[3 * t + k]].x)
            .sum::<f64>()
            / 3.0;
        let cy: f64 = (0..3)
            .map(|k| out.positions[out.triangles()[3 * t + k]].y)
            .sum::<f64>()
            / 3.0;
        assert!(!(cx > 1.0 && cx < 2.0 && cy > 1.0 && cy < 2.0));
    }
}

#[test]
fn auto_holes_and_boundary_carves_without_seeds() {
    let (pts, edges) = square_with_hole();
    let input = Input::from_positions(&pts).with_constraints(&edges);
    let settings = Settings {
        auto_holes_and_boundary: true,
        ..Settings::default()
    };
    let out = triangulate(&input, &settings);
    assert!(out.status.is_ok());
    assert_invariants(&out);
    assert_eq!(out.triangle_count(), 8);
}

#[test]
fn auto_holes_also_trims_outside_the_outline() {
    // Same annulus, plus four far corners so the hull is not the outline.
    let (mut pts, edges) = square_with_hole();
    pts.extend([
        Vector2::new(-2.0, -2.0),
        Vector2::new(5.0, -2.0),
        Vector2::new(5.0, 5.0),
        Vector2::new(-2.0, 5.0),
    ]);
    let input = Input::from_positions(&pts).with_constraints(&edges);
    let settings = Settings {
        auto_holes_and_boundary: true,
        ..Settings::default()
    };
    let out = triangulate(&input, &settings);
    assert!(out.status.is_ok());
    assert_invariants(&out);
    for t in 0..out.triangle_count() {
        let cx: f64 = (0..3)
            .map(|k| out.positions[out.triangles()[3 * t + k]].x)
            .sum::<f64>()
            / 3.0;
        let cy: f64 = (0..3)
            .map(|k| out.positions[out.triangles()[3 * t + k]].y)
            .sum::<f64>()
            / 3.0;
        // Inside the outer square, outside the inner one.
        assert!(cx > 0.0 && cx < 3.0 && cy > 0.0 && cy < 3.0);
        assert!(!(cx > 1.0 && cx < 2.0 && cy > 1.0 && cy < 2.0));
    }
}

#[test]
fn permeable_constraints_let_the_flood_through() {
    let (pts, edges) = square_with_hole();
    let seeds = [Vector2::new(1.5, 1.5)];
    // Outer loop solid, inner loop permeable for planting.
    let mask = [false, false, false, false, true, true, true, true];
    let input = Input::from_positions(&pts)
        .with_constraints(&edges)
        .with_holes(&seeds)
        .with_planting_ignore_mask(&mask);
    let out = triangulate(&input, &Settings::default());
    assert!(out.status.is_ok());
    // The flood escapes the inner loop and eats the whole mesh.
    assert_eq!(out.triangle_count(), 0);
}

#[test]
fn forced_interior_edge_is_marked_constrained_both_sides() {
    let pts = square();
    let edges = [0, 2];
    let input = Input::from_positions(&pts).with_constraints(&edges);
    let out = triangulate(&input, &Settings::default());
    assert!(out.status.is_ok());
    assert_invariants(&out);
    let h = find_halfedge(&out, 0, 2).expect("forced edge must exist");
    let t = out.halfedges()[h];
    assert!(t != EMPTY);
    assert!(out.constrained()[h]);
    assert!(out.constrained()[t]);
}

#[test]
fn restore_boundary_carves_a_nonconvex_outline() {
    // L-shaped hexagon; the convex hull adds the reflex notch back, and
    // boundary restoration must carve it out again.
    let pts = vec![
        Vector2::new(0.0, 0.0),
        Vector2::new(2.0, 0.0),
        Vector2::new(2.0, 1.0),
        Vector2::new(1.0, 1.0),
        Vector2::new(1.0, 2.0),
        Vector2::new(0.0, 2.0),
    ];
    let edges = vec![0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 0];
    let input = Input::from_positions(&pts).with_constraints(&edges);
    let settings = Settings {
        restore_boundary: true,
        ..Settings::default()
    };
    let out = triangulate(&input, &settings);
    assert!(out.status.is_ok());
    assert_invariants(&out);
    assert_eq!(out.triangle_count(), 4);
    for t in 0..out.triangle_count() {
        let cx: f64 = (0..3)
            .map(|k| out.positions[out.triangles()[3 * t + k]].x)
            .sum::<f64>()
            / 3.0;
        let cy: f64 = (0..3)
            .map(|k| out.positions[out.triangles()[3 * t + k]].y)
            .sum::<f64>()
            / 3.0;
        // Inside the L: not in the notch quadrant.
        assert!(!(cx > 1.0 && cy > 1.0), "triangle centroid in the notch");
    }
}

fn sloan_stress_case() -> (Vec<Vector2<f64>>, Vec<usize>) {
    // Two long rows; the constraint from the bottom-left to the top-right
    // vertex tunnels through every column.
    let cols = 12usize;
    let mut pts = Vec::with_capacity(2 * cols);
    for x in 0..cols {
        pts.push(Vector2::new(x as f64, 0.0));
    }
    for x in 0..cols {
        pts.push(Vector2::new(x as f64, 1.0));
    }
    let edges = vec![0, 2 * cols - 1];
    (pts, edges)
}

#[test]
fn long_tunnel_constraint_terminates_within_default_cap() {
    let (pts, edges) = sloan_stress_case();
    let input = Input::from_positions(&pts).with_constraints(&edges);
    let out = triangulate(&input, &Settings::default());
    assert!(out.status.is_ok());
    assert_invariants(&out);
    let h = find_halfedge(&out, 0, 23).or(find_halfedge(&out, 23, 0));
    assert!(h.is_some(), "forced edge missing");
    assert!(out.constrained()[h.unwrap()]);
}

#[test]
fn tiny_iteration_cap_reports_sloan_exhaustion() {
    let (pts, edges) = sloan_stress_case();
    let input = Input::from_positions(&pts).with_constraints(&edges);
    let settings = Settings {
        sloan_max_iters: 5,
        ..Settings::default()
    };
    let out = triangulate(&input, &settings);
    assert_eq!(out.status, Status::ERR_SLOAN_ITERS_EXCEEDED);
    assert_eq!(out.triangle_count(), 0);
}

// --- validation -----------------------------------------------------------

#[test]
fn validator_reports_the_first_failure_class() {
    let pts = square();

    let two = &pts[..2];
    let out = triangulate(&Input::from_positions(two), &Settings::default());
    assert_eq!(out.status, Status::ERR_INPUT_POSITIONS_LENGTH);

    let nan = vec![Vector2::new(0.0, 0.0), Vector2::new(f64::NAN, 0.0), Vector2::new(1.0, 1.0)];
    let out = triangulate(&Input::from_positions(&nan), &Settings::default());
    assert_eq!(out.status, Status::ERR_INPUT_POSITION_UNDEFINED);

    let dup = vec![
        Vector2::new(0.0, 0.0),
        Vector2::new(1.0, 0.0),
        Vector2::new(1.0, 0.0),
        Vector2::new(0.0, 1.0),
    ];
    let out = triangulate(&Input::from_positions(&dup), &Settings::default());
    assert_eq!(out.status, Status::ERR_INPUT_POSITIONS_DUPLICATES);

    let odd = [0usize];
    let out = triangulate(
        &Input::from_positions(&pts).with_constraints(&odd),
        &Settings::default(),
    );
    assert_eq!(out.status, Status::ERR_INPUT_CONSTRAINTS_LENGTH);

    let oob = [0usize, 9];
    let out = triangulate(
        &Input::from_positions(&pts).with_constraints(&oob),
        &Settings::default(),
    );
    assert_eq!(out.status, Status::ERR_INPUT_CONSTRAINTS_OUT_OF_RANGE);

    let loop_edge = [1usize, 1];
    let out = triangulate(
        &Input::from_positions(&pts).with_constraints(&loop_edge),
        &Settings::default(),
    );
    assert_eq!(out.status, Status::ERR_INPUT_CONSTRAINTS_SELF_LOOP);

    let dup_edge = [0usize, 2, 2, 0];
    let out = triangulate(
        &Input::from_positions(&pts).with_constraints(&dup_edge),
        &Settings::default(),
    );
    assert_eq!(out.status, Status::ERR_INPUT_CONSTRAINTS_DUPLICATES);

    let crossing = [0usize, 2, 1, 3];
    let out = triangulate(
        &Input::from_positions(&pts).with_constraints(&crossing),
        &Settings::default(),
    );
    assert_eq!(out.status, Status::ERR_INPUT_CONSTRAINTS_INTERSECT);

    let collinear_pts = vec![
        Vector2::new(0.0, 0.0),
        Vector2::new(2.0, 0.0),
        Vector2::new(2.0, 2.0),
        Vector2::new(1.0, 0.0),
    ];
    let through = [0usize, 1];
    let out = triangulate(
        &Input::from_positions(&collinear_pts).with_constraints(&through),
        &Settings::default(),
    );
    assert_eq!(out.status, Status::ERR_INPUT_CONSTRAINTS_COLLINEAR_POINT);

    let bad_seed = [Vector2::new(f64::INFINITY, 0.0)];
    let out = triangulate(
        &Input::from_positions(&pts).with_holes(&bad_seed),
        &Settings::default(),
    );
    assert_eq!(out.status, Status::ERR_INPUT_HOLE_UNDEFINED);

    let edges = [0usize, 2];
    let mask = [true, false];
    let out = triangulate(
        &Input::from_positions(&pts)
            .with_constraints(&edges)
            .with_planting_ignore_mask(&mask),
        &Settings::default(),
    );
    assert_eq!(out.status, Status::ERR_INPUT_IGNORE_MASK_LENGTH);
}

#[test]
fn argument_gates() {
    let pts = square();

    let out = triangulate(
        &Input::from_positions(&pts),
        &Settings {
            sloan_max_iters: 0,
            ..Settings::default()
        },
    );
    assert_eq!(out.status, Status::ERR_ARGS_INVALID);

    let out = triangulate(
        &Input::from_positions(&pts),
        &Settings {
            refine_mesh: true,
            refinement_angle_threshold: 1.0, // above pi/4
            ..Settings::default()
        },
    );
    assert_eq!(out.status, Status::ERR_ARGS_INVALID);

    let int_pts: Vec<Vector2<i32>> = vec![
        Vector2::new(0, 0),
        Vector2::new(10, 0),
        Vector2::new(10, 10),
    ];
    let out = triangulate(
        &Input::from_positions(&int_pts),
        &Settings {
            refine_mesh: true,
            ..Settings::default()
        },
    );
    assert_eq!(out.status, Status::ERR_REFINEMENT_UNSUPPORTED);

    let out = triangulate(
        &Input::from_positions(&int_pts),
        &Settings {
            preprocessor: Preprocessor::Pca,
            ..Settings::default()
        },
    );
    assert_eq!(out.status, Status::ERR_ARGS_INVALID);
}

#[test]
fn integer_span_limit_is_enforced() {
    let wide: Vec<Vector2<i32>> = vec![
        Vector2::new(0, 0),
        Vector2::new(1 << 21, 0),
        Vector2::new(0, 5),
    ];
    let out = triangulate(&Input::from_positions(&wide), &Settings::default());
    assert_eq!(out.status, Status::ERR_INPUT_POSITION_UNDEFINED);

    let ok: Vec<Vector2<i32>> = vec![
        Vector2::new(0, 0),
        Vector2::new(1 << 19, 0),
        Vector2::new(0, 1 << 19),
        Vector2::new(1 << 19, 1 << 19),
    ];
    let out = triangulate(&Input::from_positions(&ok), &Settings::default());
    assert!(out.status.is_ok());
    assert_eq!(out.triangle_count(), 2);
}

// --- other scalar backends ------------------------------------------------

#[test]
fn fixed_point_square_matches_the_float_result() {
    let pts: Vec<Vector2<I32F32>> = square()
        .into_iter()
        .map(|p| Vector2::new(I32F32::from_num(p.x), I32F32::from_num(p.y)))
        .collect();
    let out = triangulate(&Input::from_positions(&pts), &Settings::default());
    assert!(out.status.is_ok());
    assert_invariants(&out);
    let expect: BTreeSet<[usize; 3]> = [[0, 1, 2], [0, 2, 3]].into_iter().collect();
    assert_eq!(tri_set(&out), expect);
}

#[test]
fn fixed_point_refinement_matches_the_float_scenario() {
    let pts: Vec<Vector2<I32F32>> = square()
        .into_iter()
        .map(|p| Vector2::new(I32F32::from_num(p.x), I32F32::from_num(p.y)))
        .collect();
    let settings = Settings::<I32F32> {
        refine_mesh: true,
        refinement_area_threshold: I32F32::from_num(0.3),
        refinement_angle_threshold: I32F32::from_num(20f64.to_radians()),
        ..Settings::default()
    };
    let out = triangulate(&Input::from_positions(&pts), &settings);
    assert!(out.status.is_ok());
    assert_invariants(&out);
    assert_eq!(out.positions.len(), 6);
    assert_eq!(out.triangle_count(), 4);
}

#[test]
fn single_precision_square_matches_the_double_result() {
    let pts: Vec<Vector2<f32>> = square()
        .into_iter()
        .map(|p| Vector2::new(p.x as f32, p.y as f32))
        .collect();
    let out = triangulate(&Input::from_positions(&pts), &Settings::default());
    assert!(out.status.is_ok());
    assert_invariants(&out);
    let expect: BTreeSet<[usize; 3]> = [[0, 1, 2], [0, 2, 3]].into_iter().collect();
    assert_eq!(tri_set(&out), expect);
}

#[test]
fn integer_grid_triangulates_exactly() {
    let mut pts: Vec<Vector2<i32>> = Vec::new();
    for y in 0..4 {
        for x in 0..4 {
            pts.push(Vector2::new(x * 100, y * 100));
        }
    }
    let out = triangulate(&Input::from_positions(&pts), &Settings::default());
    assert!(out.status.is_ok());
    assert_invariants(&out);
    // 16 points, 12 on the hull: 2*16 - 2 - 12 = 18 triangles.
    assert_eq!(out.triangle_count(), 18);
}

// --- preprocessing --------------------------------------------------------

#[test]
fn com_preprocessing_is_idempotent_up_to_epsilon() {
    let pts = draw_point_cloud(40, 50.0, ReplayToken::new(11, 0));
    let transform = CoordTransform::center_of_mass(&pts);
    let manual: Vec<Vector2<f64>> = pts.iter().map(|&p| transform.forward(p)).collect();

    let with_com = triangulate(
        &Input::from_positions(&pts),
        &Settings {
            preprocessor: Preprocessor::Com,
            ..Settings::default()
        },
    );
    let manual_none = triangulate(&Input::from_positions(&manual), &Settings::default());
    assert!(with_com.status.is_ok() && manual_none.status.is_ok());
    assert_eq!(tri_set(&with_com), tri_set(&manual_none));
    // The preprocessed run maps its output back to the input frame.
    for (a, b) in with_com.positions.iter().zip(&pts) {
        assert!((a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9);
    }
}

#[test]
fn pca_preprocessing_round_trips_positions() {
    // Anisotropic rotated cloud.
    let base = draw_point_cloud(60, 1.0, ReplayToken::new(3, 1));
    let (s, c) = (0.6f64.sin(), 0.6f64.cos());
    let pts: Vec<Vector2<f64>> = base
        .iter()
        .map(|p| {
            let (x, y) = (20.0 * p.x, 2.0 * p.y);
            Vector2::new(c * x - s * y + 100.0, s * x + c * y - 40.0)
        })
        .collect();
    let out = triangulate(
        &Input::from_positions(&pts),
        &Settings {
            preprocessor: Preprocessor::Pca,
            ..Settings::default()
        },
    );
    assert!(out.status.is_ok());
    assert_invariants(&out);
    for (a, b) in out.positions.iter().zip(&pts) {
        assert!((a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6);
    }
}

// --- refinement on clouds -------------------------------------------------

#[test]
fn refinement_meets_both_thresholds_on_a_cloud() {
    let pts = draw_point_cloud(30, 10.0, ReplayToken::new(21, 0));
    let area = 5.0;
    let angle = 15f64.to_radians();
    let settings = Settings {
        refine_mesh: true,
        refinement_area_threshold: area,
        refinement_angle_threshold: angle,
        ..Settings::default()
    };
    let out = triangulate(&Input::from_positions(&pts), &settings);
    assert!(out.status.is_ok());
    assert_invariants(&out);
    assert!(out.positions.len() >= pts.len());

    let cos_sq = angle.cos() * angle.cos();
    for t in 0..out.triangle_count() {
        let a = out.positions[out.triangles()[3 * t]];
        let b = out.positions[out.triangles()[3 * t + 1]];
        let c = out.positions[out.triangles()[3 * t + 2]];
        let area2 = orient_fast(a, b, c);
        assert!(area2 <= 2.0 * area + 1e-9, "oversized triangle survived");
        for (o, u, v) in [(a, b, c), (b, c, a), (c, a, b)] {
            let d = f64::diff_dot(u, o, v);
            if d > 0.0 {
                let lu = f64::dist_sq(u, o);
                let lv = f64::dist_sq(v, o);
                assert!(d * d <= cos_sq * lu * lv + 1e-9, "sharp angle survived");
            }
        }
    }
}

#[test]
fn refinement_keeps_constrained_subsegments_constrained() {
    let (pts, edges) = square_with_hole();
    let seeds = [Vector2::new(1.5, 1.5)];
    let input = Input::from_positions(&pts)
        .with_constraints(&edges)
        .with_holes(&seeds);
    let settings = Settings {
        refine_mesh: true,
        refinement_area_threshold: 0.2,
        refinement_angle_threshold: 15f64.to_radians(),
        ..Settings::default()
    };
    let out = triangulate(&input, &settings);
    assert!(out.status.is_ok());
    assert_invariants(&out);
    assert!(out.triangle_count() > 8);
    // The hole survives refinement: no centroid inside the inner square.
    for t in 0..out.triangle_count() {
        let cx: f64 = (0..3)
            .map(|k| out.positions[out.triangles()[3 * t + k]].x)
            .sum::<f64>()
            / 3.0;
        let cy: f64 = (0..3)
            .map(|k| out.positions[out.triangles()[3 * t + k]].y)
            .sum::<f64>()
            / 3.0;
        assert!(!(cx > 1.02 && cx < 1.98 && cy > 1.02 && cy < 1.98));
    }
}

// --- alpha shape ----------------------------------------------------------

#[test]
fn alpha_filter_drops_oversized_circumcircles() {
    let mut pts = square();
    pts.push(Vector2::new(10.0, 0.5));
    let settings = Settings {
        alpha_shape_filter: true,
        alpha: 1.0,
        ..Settings::default()
    };
    let out = triangulate(&Input::from_positions(&pts), &settings);
    assert!(out.status.is_ok());
    assert_invariants(&out);
    assert!(out.triangle_count() >= 2);
    // The sliver triangles reaching the far point are gone.
    for t in 0..out.triangle_count() {
        for k in 0..3 {
            assert!(out.triangles()[3 * t + k] != 4, "far sliver survived");
        }
    }
}

// --- dynamic operations ---------------------------------------------------

#[test]
fn dynamic_barycentric_insert_fans_the_cavity() {
    let pts = square();
    let mut out = triangulate(&Input::from_positions(&pts), &Settings::default());
    let third = 1.0 / 3.0;
    let v = out.insert_point_in_triangle(0, [third, third, third]).unwrap();
    assert_eq!(v, 4);
    assert_eq!(out.triangle_count(), 4);
    assert_invariants(&out);
    for t in 0..out.triangle_count() {
        assert!(out.triangles()[3 * t..3 * t + 3].contains(&4));
    }

    assert_eq!(
        out.insert_point_in_triangle(0, [0.5, 0.5, 0.5]),
        Err(Status::ERR_ARGS_INVALID)
    );
    assert_eq!(
        out.insert_point_in_triangle(99, [third, third, third]),
        Err(Status::ERR_ARGS_INVALID)
    );
}

#[test]
fn dynamic_split_preserves_constrained_state() {
    let pts = square();
    let edges = [0usize, 2];
    let mut out = triangulate(
        &Input::from_positions(&pts).with_constraints(&edges),
        &Settings::default(),
    );
    let h = find_halfedge(&out, 0, 2).unwrap();
    let v = out.split_halfedge(h, 0.5).unwrap();
    assert_eq!(v, 4);
    assert_eq!(out.positions[4], Vector2::new(0.5, 0.5));
    assert_invariants(&out);
    assert_eq!(out.triangle_count(), 4);
    for (a, b) in [(0, 4), (4, 2)] {
        let hh = find_halfedge(&out, a, b).expect("subsegment missing");
        assert!(out.constrained()[hh], "subsegment lost its flag");
    }
}

#[test]
fn dynamic_split_on_a_boundary_halfedge_stays_open() {
    let pts = square();
    let mut out = triangulate(&Input::from_positions(&pts), &Settings::default());
    let h = (0..out.halfedges().len())
        .find(|&h| out.halfedges()[h] == EMPTY)
        .unwrap();
    let before = out.triangle_count();
    out.split_halfedge(h, 0.25).unwrap();
    assert_invariants(&out);
    assert!(out.triangle_count() > before);
    assert_eq!(
        out.split_halfedge(0, 1.5),
        Err(Status::ERR_ARGS_INVALID)
    );
}

#[test]
fn dynamic_remove_restores_the_square() {
    let pts = square();
    let mut out = triangulate(&Input::from_positions(&pts), &Settings::default());
    let third = 1.0 / 3.0;
    let v = out.insert_point_in_triangle(0, [third, third, third]).unwrap();
    out.remove_point(v).unwrap();
    assert_eq!(out.positions.len(), 4);
    assert_eq!(out.triangle_count(), 2);
    assert_invariants(&out);

    // Boundary vertices cannot be removed in bulk.
    assert_eq!(out.remove_point(0), Err(Status::ERR_ARGS_INVALID));
}

#[test]
fn dynamic_remove_works_on_the_integer_backend() {
    let mut pts: Vec<Vector2<i32>> = Vec::new();
    for y in 0..3 {
        for x in 0..3 {
            pts.push(Vector2::new(x * 10, y * 10));
        }
    }
    let mut out = triangulate(&Input::from_positions(&pts), &Settings::default());
    assert_eq!(out.triangle_count(), 8);
    out.remove_point(4).unwrap(); // grid center
    assert_eq!(out.positions.len(), 8);
    assert_eq!(out.triangle_count(), 6);
    assert_invariants(&out);

    // Interpolating inserts stay gated off for integers.
    assert_eq!(
        out.split_halfedge(0, 1),
        Err(Status::ERR_ARGS_INVALID)
    );
}

// --- quantified properties ------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn cloud_invariants_roundtrip_and_regeneration(seed in 0u64..256, n in 8usize..64) {
        let pts = draw_point_cloud(n, 10.0, ReplayToken::new(seed, 0));
        let out = triangulate(&Input::from_positions(&pts), &Settings::default());
        prop_assert!(out.status.is_ok());
        assert_invariants(&out);

        // Reconstructing the twin buffer from the triangle buffer alone
        // reproduces the engine's output.
        prop_assert_eq!(regenerate_halfedges(out.triangles()), out.halfedges());

        // A lossless re-triangulation of the output positions yields the
        // same triangle set.
        let again = triangulate(&Input::from_positions(&out.positions), &Settings::default());
        prop_assert!(again.status.is_ok());
        prop_assert_eq!(tri_set(&again), tri_set(&out));
    }

    #[test]
    fn constrained_ring_invariants(seed in 0u64..128, n in 4usize..24) {
        let (pts, edges) = crate::sample::draw_ring_polygon(
            n,
            5.0,
            0.3,
            ReplayToken::new(seed, 1),
        );
        let input = Input::from_positions(&pts).with_constraints(&edges);
        let settings = Settings { restore_boundary: true, ..Settings::default() };
        let out = triangulate(&input, &settings);
        prop_assert!(out.status.is_ok());
        assert_invariants(&out);
        prop_assert!(out.triangle_count() >= n - 2);
        // Every ring edge survived as a constrained halfedge.
        for c in edges.chunks_exact(2) {
            let h = find_halfedge(&out, c[0], c[1]).or(find_halfedge(&out, c[1], c[0]));
            prop_assert!(h.is_some());
            prop_assert!(out.constrained()[h.unwrap()]);
        }
    }
}
