mod common;

use approx::assert_abs_diff_eq;
use chess_lattice::{
    anchor_from_box, reconstruct_lattice, split_orientations, BoardOccupancy, CellIndex,
    LatticeError, LatticeReconstructor, Line, Orientation, OrientationParams, PointOrigin,
    ReconstructionParams, Representative, Stage,
};
use common::*;
use nalgebra::Point2;

#[test]
fn orientation_recovers_nine_and_nine() {
    let lines = board_lines();
    assert_eq!(20, lines.len());

    let split = split_orientations(&lines, &OrientationParams::default()).unwrap();
    assert_eq!(vertical_lines(), split.lines.vertical);
    assert_eq!(horizontal_lines(&[]), split.lines.horizontal);

    let removed: Vec<(Orientation, Line)> =
        split.outliers.iter().map(|o| (o.orientation, o.line)).collect();
    assert_eq!(
        vec![
            (Orientation::Vertical, SPURIOUS_VERTICAL),
            (Orientation::Horizontal, SPURIOUS_HORIZONTAL)
        ],
        removed
    );
}

#[test]
fn full_board_reconstructs_complete_lattice() {
    let result = reconstruct_lattice(&board_lines(), IMAGE).unwrap();
    let diag = &result.diagnostics;

    assert_eq!(20, diag.filtered.lines.len());
    assert_eq!(9, diag.oriented.vertical.len());
    assert_eq!(9, diag.oriented.horizontal.len());
    assert_eq!(4, diag.extreme_corners.len());
    assert_eq!(81, diag.grid_points);
    assert_eq!(9, diag.extrapolated.len());
    assert_eq!(90, diag.pool_size);
    assert!(diag
        .extrapolated
        .iter()
        .all(|p| matches!(p.origin, PointOrigin::Extrapolated { .. })));

    let spacing = diag.spacing.as_ref().unwrap().spacing;
    assert!((45.0..55.0).contains(&spacing), "spacing {spacing}");

    let lattice = &result.lattice;
    assert!(lattice.is_complete());
    assert_eq!(vec![9; 9], lattice.row_lengths());
    assert_eq!(81, lattice.num_corners());

    for row in lattice.rows() {
        assert!(row.windows(2).all(|w| w[0].x <= w[1].x));
    }
    for pair in lattice.rows().windows(2) {
        assert!(pair[0][0].y < pair[1][0].y);
    }
}

#[test]
fn lookup_on_reconstructed_board() {
    let result = reconstruct_lattice(&board_lines(), IMAGE).unwrap();

    let inside = result.lookup(Point2::new(420.0, 770.0));
    assert!(!inside.is_fallback());
    assert!(inside.confident().is_ok());

    let outside = result.lookup(Point2::new(5000.0, 5000.0));
    assert!(outside.is_fallback());
    assert_eq!(CellIndex { file: 1, rank: 1 }, outside.cell);
    assert!(matches!(
        outside.confident(),
        Err(LatticeError::CellOutOfBounds { .. })
    ));
}

#[test]
fn missing_rows_are_reported_as_incomplete() {
    let lines = board_lines_without(&[3, 6]);

    let err = reconstruct_lattice(&lines, IMAGE).unwrap_err();
    assert_eq!(Stage::Lattice, err.stage);
    match err.source {
        LatticeError::GridIncomplete {
            rows, row_lengths, ..
        } => {
            assert_eq!(8, rows);
            assert_eq!(70, row_lengths.iter().sum::<usize>());
        }
        other => panic!("unexpected error {other:?}"),
    }

    let params = ReconstructionParams {
        require_complete: false,
        ..ReconstructionParams::default()
    };
    let partial = LatticeReconstructor::new(params)
        .reconstruct(&lines, IMAGE)
        .unwrap();
    assert!(!partial.lattice.is_complete());
    assert_eq!(70, partial.lattice.num_corners());
}

#[test]
fn centroid_representatives_stay_near_grid_points() {
    let mut params = ReconstructionParams::default();
    params.dedup.representative = Representative::Centroid;
    let with_centroids = LatticeReconstructor::new(params)
        .reconstruct(&board_lines(), IMAGE)
        .unwrap();
    let first_members = reconstruct_lattice(&board_lines(), IMAGE).unwrap();

    assert!(with_centroids.lattice.is_complete());
    for (a, b) in with_centroids
        .lattice
        .rows()
        .iter()
        .flatten()
        .zip(first_members.lattice.rows().iter().flatten())
    {
        assert!((a - b).norm() < 20.0);
    }
}

#[test]
fn disabling_extrapolation_keeps_grid_only() {
    let mut params = ReconstructionParams::default();
    params.spacing.extrapolate = false;
    let result = LatticeReconstructor::new(params)
        .reconstruct(&board_lines(), IMAGE)
        .unwrap();
    assert!(result.diagnostics.spacing.is_none());
    assert_eq!(81, result.diagnostics.pool_size);
    assert!(result.lattice.is_complete());
}

#[test]
fn pieces_land_on_board_cells() {
    let result = reconstruct_lattice(&board_lines(), IMAGE).unwrap();
    let mut board = BoardOccupancy::new();

    let anchor = anchor_from_box(400.0, 700.0, 440.0, 770.0);
    assert_abs_diff_eq!(anchor.x, 420.0);
    let hit = board.place(&result.lattice, anchor, "white_pawn");
    assert!(!hit.is_fallback());
    assert_eq!(Some(&"white_pawn"), board.get(hit.cell));
    assert_eq!(1, board.occupied());
}

#[test]
fn a_single_line_fails_at_the_filter() {
    let err = reconstruct_lattice(&vertical_lines()[..1], IMAGE).unwrap_err();
    assert_eq!(Stage::LineFilter, err.stage);
    assert!(err.to_string().contains("insufficient lines"));
}
