//! Geometric rejection of spurious Hough lines.
//!
//! The filter assumes a roughly fronto-parallel board placed in the lower
//! center of the frame and applies, per line and in detection order:
//! 1. region rejection for lines that only cover the upper-left of the image,
//! 2. rejection of vertical segments (`dx == 0`),
//! 3. a slope band: `min_abs_slope <= |dy/dx| <= max_abs_slope`,
//! 4. an angular band check that is a pass-through (both outcomes keep the line),
//! 5. strong-line bookkeeping on the far endpoints (diagnostic only), seeded
//!    by the first detected line whether or not it survived.

use crate::params::LineFilterParams;
use chess_lattice_core::{ImageGeometry, Line, Segment};
use log::debug;
use serde::Serialize;
use std::f32::consts::{FRAC_PI_3, FRAC_PI_4};

/// Why lines were discarded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RejectionCounts {
    pub region: usize,
    pub vertical: usize,
    pub slope: usize,
}

/// Output of [`filter_lines`].
#[derive(Clone, Debug, Default, Serialize)]
pub struct FilteredLines {
    /// Surviving lines, in detection order.
    pub lines: Vec<Line>,
    /// Lines admitted to the strong set. The first entry is the first input
    /// line, even when it was rejected; the rest are kept lines.
    pub strong_lines: Vec<Line>,
    /// Kept lines whose angle lies outside both primary angular bands.
    pub outside_angular_band: usize,
    pub rejected: RejectionCounts,
}

/// Filter raw detector lines.
pub fn filter_lines(
    lines: &[Line],
    geometry: &ImageGeometry,
    params: &LineFilterParams,
) -> FilteredLines {
    let length = geometry.bounding_length();
    let mut out = FilteredLines::default();

    for line in lines {
        let seg = line.to_segment(length);

        if outside_board_region(&seg, geometry, params.region_fraction) {
            out.rejected.region += 1;
            continue;
        }

        let Some(slope) = seg.slope() else {
            out.rejected.vertical += 1;
            continue;
        };

        let s = slope.abs();
        if s > params.max_abs_slope || s < params.min_abs_slope {
            out.rejected.slope += 1;
            continue;
        }

        if !in_primary_band(line.theta) {
            out.outside_angular_band += 1;
        }
        out.lines.push(*line);
    }

    out.strong_lines = match lines.first() {
        Some(seed) => admit_strong_lines(*seed, &out.lines, geometry, params),
        None => Vec::new(),
    };

    debug!(
        "kept {} of {} lines (region {}, vertical {}, slope {}), {} strong",
        out.lines.len(),
        lines.len(),
        out.rejected.region,
        out.rejected.vertical,
        out.rejected.slope,
        out.strong_lines.len()
    );

    out
}

/// Lines that start left of the origin and end right of it with a
/// non-negative far `y` (either sign of the start `y`) must reach far
/// enough into the image to plausibly border the board.
fn outside_board_region(seg: &Segment, geometry: &ImageGeometry, fraction: f32) -> bool {
    let (p1, p2) = (seg.p1, seg.p2);
    let crosses = p1.x <= 0.0 && p2.x >= 0.0 && p2.y >= 0.0;
    if !crosses {
        return false;
    }
    let min_x = (fraction * geometry.width as f32).ceil();
    let min_y = (fraction * geometry.height as f32).ceil();
    p2.x < min_x || p2.y < min_y
}

fn in_primary_band(theta: f32) -> bool {
    (-FRAC_PI_3..=FRAC_PI_3).contains(&theta)
        || (-FRAC_PI_3 - FRAC_PI_4..=FRAC_PI_3 + FRAC_PI_4).contains(&theta)
}

/// Greedy strong-line admission in detection order.
///
/// `seed` starts the set; the first kept line is skipped and every later kept
/// line is compared. A line is not admitted when its far endpoint `x` lies
/// within both distance limits of some strong line.
fn admit_strong_lines(
    seed: Line,
    kept: &[Line],
    geometry: &ImageGeometry,
    params: &LineFilterParams,
) -> Vec<Line> {
    let length = geometry.bounding_length();
    let diag_limit = params.strong_diagonal_fraction * length;
    let height_limit = params.strong_height_factor * (geometry.height as f32).sqrt();

    let mut strong: Vec<(Line, f32)> = vec![(seed, seed.to_segment(length).p2.x)];
    for line in kept.iter().skip(1) {
        let x2 = line.to_segment(length).p2.x;
        let close = strong.iter().any(|(_, sx2)| {
            let d = (sx2 - x2).abs();
            d < diag_limit && d < height_limit
        });
        if !close {
            strong.push((*line, x2));
        }
    }

    strong.into_iter().map(|(l, _)| l).collect()
}
