#![allow(dead_code)]

use chess_lattice::{ImageGeometry, Line};
use std::f32::consts::FRAC_PI_2;

pub const IMAGE: ImageGeometry = ImageGeometry {
    width: 1000,
    height: 1000,
};

/// Line that belongs to the vertical family but lies off the board.
pub const SPURIOUS_VERTICAL: Line = Line {
    rho: 500.0,
    theta: 0.45,
};

/// Line that belongs to the horizontal family but lies off the board.
pub const SPURIOUS_HORIZONTAL: Line = Line {
    rho: 1100.0,
    theta: 1.25,
};

/// Nine slightly tilted vertical board lines, 50 px apart.
pub fn vertical_lines() -> Vec<Line> {
    (0..9)
        .map(|i| Line::new(300.0 + 50.0 * i as f32, 0.12 + 0.001 * ((i % 3) as f32 - 1.0)))
        .collect()
}

/// Nine near-horizontal board lines, 50 px apart, skipping `skip`.
pub fn horizontal_lines(skip: &[usize]) -> Vec<Line> {
    (0..9)
        .filter(|j| !skip.contains(j))
        .map(|j| {
            Line::new(
                560.0 + 50.0 * j as f32,
                FRAC_PI_2 + 0.03 + 0.001 * ((j % 3) as f32 - 1.0),
            )
        })
        .collect()
}

/// Detector output for a full board: 9 vertical, 9 horizontal and one
/// spurious line per family.
pub fn board_lines() -> Vec<Line> {
    board_lines_without(&[])
}

pub fn board_lines_without(skip_horizontal: &[usize]) -> Vec<Line> {
    let mut lines = vertical_lines();
    lines.extend(horizontal_lines(skip_horizontal));
    lines.push(SPURIOUS_VERTICAL);
    lines.push(SPURIOUS_HORIZONTAL);
    lines
}
