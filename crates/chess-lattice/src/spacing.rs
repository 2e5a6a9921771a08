//! Modal line spacing and extrapolation of the missing edge column.
//!
//! Hough detection regularly misses the outermost board edge on one side.
//! The dominant gap between neighbouring vertical lines is estimated with a
//! small 1D k-means, and the rightmost column of intersections is copied
//! with a fixed offset derived from that gap.

use crate::error::LatticeError;
use crate::intersections::{extremes, GridIntersections, IntersectionPoint, PointOrigin};
use crate::params::SpacingParams;
use chess_lattice_core::{kmeans, ClusterError, Line};
use log::debug;
use nalgebra::Vector2;
use serde::Serialize;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Modal gap between consecutive vertical lines.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpacingEstimate {
    /// Center of the most populated gap cluster.
    pub spacing: f32,
    /// Consecutive gaps of the sorted origins.
    pub gaps: Vec<f32>,
    /// Number of gaps in the modal cluster.
    pub support: usize,
}

/// Start-point `x` of each vertical line's segment, sorted ascending.
pub fn vertical_origins(vertical: &[Line], length: f32) -> Vec<f32> {
    let mut xs: Vec<f32> = vertical.iter().map(|l| l.to_segment(length).p1.x).collect();
    xs.sort_by(f32::total_cmp);
    xs
}

/// Estimate the modal spacing of `origins` (any order).
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(origins, params), fields(n = origins.len()))
)]
pub fn estimate_modal_spacing(
    origins: &[f32],
    params: &SpacingParams,
) -> Result<SpacingEstimate, LatticeError> {
    if origins.len() < 2 {
        return Err(LatticeError::InsufficientLines {
            context: "spacing estimation",
            found: origins.len(),
            required: 2,
        });
    }

    let mut sorted = origins.to_vec();
    sorted.sort_by(f32::total_cmp);
    let gaps: Vec<f32> = sorted.windows(2).map(|w| (w[1] - w[0]).abs()).collect();

    let k = params.gap_clusters.clamp(1, gaps.len());
    let points: Vec<[f32; 1]> = gaps.iter().map(|&g| [g]).collect();
    let res = kmeans(&points, k, &params.kmeans)?;

    let modal = res
        .largest_cluster()
        .ok_or_else(|| ClusterError::Degenerate("no gap cluster".to_string()))?;
    let spacing = res.centers[modal][0];
    if spacing <= 0.0 {
        return Err(ClusterError::Degenerate(format!("non-positive modal spacing {spacing}")).into());
    }

    let support = res.cluster_sizes()[modal];
    debug!("modal spacing {spacing:.2} from {support} of {} gaps", gaps.len());
    Ok(SpacingEstimate {
        spacing,
        gaps,
        support,
    })
}

/// Offset applied to extrapolated points: `(-d/3, -ln(d/3))`.
pub fn extrapolation_offset(spacing: f32) -> Vector2<f32> {
    let third = spacing / 3.0;
    Vector2::new(-third, -third.ln())
}

/// Shift the grid points of the rightmost vertical line (largest segment
/// midpoint `x`, first on ties) by [`extrapolation_offset`].
pub fn extrapolate_edge_column(
    vertical: &[Line],
    grid: &GridIntersections,
    spacing: f32,
    length: f32,
) -> Vec<IntersectionPoint> {
    let Some((_, rightmost)) = extremes(vertical, length, 0) else {
        return Vec::new();
    };
    let offset = extrapolation_offset(spacing);

    grid.column(rightmost)
        .unwrap_or_default()
        .iter()
        .map(|p| {
            let horizontal = match p.origin {
                PointOrigin::Grid { horizontal, .. } | PointOrigin::Extrapolated { horizontal, .. } => {
                    horizontal
                }
            };
            IntersectionPoint {
                position: p.position + offset,
                origin: PointOrigin::Extrapolated {
                    vertical: rightmost,
                    horizontal,
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intersections::grid_intersections;
    use crate::orientation::OrientedLines;
    use approx::assert_abs_diff_eq;
    use chess_lattice_core::DEFAULT_SINGULAR_EPS;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn modal_spacing_ignores_a_spurious_line() {
        let mut origins: Vec<f32> = (0..9).map(|i| 10.0 * i as f32).collect();
        origins.push(45.0);
        let est = estimate_modal_spacing(&origins, &SpacingParams::default()).unwrap();
        assert_abs_diff_eq!(est.spacing, 10.0, epsilon = 1e-4);
        assert_eq!(9, est.gaps.len());
        assert_eq!(6, est.support);
    }

    #[test]
    fn single_gap_is_its_own_mode() {
        let est = estimate_modal_spacing(&[40.0, 12.0], &SpacingParams::default()).unwrap();
        assert_abs_diff_eq!(est.spacing, 28.0);
        assert_eq!(1, est.support);
    }

    #[test]
    fn coincident_lines_have_no_spacing() {
        let err = estimate_modal_spacing(&[5.0, 5.0, 5.0], &SpacingParams::default()).unwrap_err();
        assert!(matches!(err, LatticeError::ClusteringFailure(_)));
        assert!(estimate_modal_spacing(&[1.0], &SpacingParams::default()).is_err());
    }

    #[test]
    fn offset_is_third_of_spacing() {
        let o = extrapolation_offset(30.0);
        assert_abs_diff_eq!(o.x, -10.0);
        assert_abs_diff_eq!(o.y, -(10.0f32).ln());
    }

    #[test]
    fn rightmost_column_is_shifted() {
        let lines = OrientedLines {
            vertical: vec![Line::new(90.0, 0.0), Line::new(30.0, 0.0), Line::new(60.0, 0.0)],
            horizontal: vec![Line::new(10.0, FRAC_PI_2), Line::new(40.0, FRAC_PI_2)],
        };
        let grid = grid_intersections(&lines, DEFAULT_SINGULAR_EPS).unwrap();
        let extra = extrapolate_edge_column(&lines.vertical, &grid, 30.0, 200.0);

        assert_eq!(2, extra.len());
        assert_abs_diff_eq!(extra[1].position.x, 80.0, epsilon = 1e-3);
        assert_abs_diff_eq!(extra[1].position.y, 40.0 - (10.0f32).ln(), epsilon = 1e-3);
        assert_eq!(
            PointOrigin::Extrapolated {
                vertical: 0,
                horizontal: 1
            },
            extra[1].origin
        );
    }

    #[test]
    fn origins_are_sorted_segment_starts() {
        let xs = vertical_origins(&[Line::new(60.0, 0.0), Line::new(20.0, 0.0)], 100.0);
        assert_eq!(vec![20.0, 60.0], xs);
    }
}
