use crate::error::LatticeError;
use crate::orientation::OrientedLines;
use chess_lattice_core::{intersect_with_tolerance, Line};
use log::debug;
use nalgebra::Point2;
use serde::Serialize;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Where an intersection point came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointOrigin {
    /// Intersection of `vertical[vertical]` and `horizontal[horizontal]`.
    Grid { vertical: usize, horizontal: usize },
    /// Shifted copy of a grid point of the edge column.
    Extrapolated { vertical: usize, horizontal: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct IntersectionPoint {
    pub position: Point2<f32>,
    pub origin: PointOrigin,
}

/// Every vertical × horizontal intersection, grouped per vertical line.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GridIntersections {
    /// `columns[v][h]` is the intersection of vertical `v` with horizontal `h`.
    pub columns: Vec<Vec<IntersectionPoint>>,
}

impl GridIntersections {
    pub fn len(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All points, vertical-major.
    pub fn points(&self) -> impl Iterator<Item = &IntersectionPoint> + '_ {
        self.columns.iter().flatten()
    }

    pub fn column(&self, vertical: usize) -> Option<&[IntersectionPoint]> {
        self.columns.get(vertical).map(Vec::as_slice)
    }
}

/// Index of the line whose segment midpoint has the smallest / largest
/// coordinate along `axis` (0 = x, 1 = y). The first line wins ties.
pub(crate) fn extremes(lines: &[Line], length: f32, axis: usize) -> Option<(usize, usize)> {
    let keys: Vec<f32> = lines
        .iter()
        .map(|l| l.to_segment(length).midpoint()[axis])
        .collect();
    let first = *keys.first()?;

    let (mut min_i, mut max_i) = (0usize, 0usize);
    let (mut min_k, mut max_k) = (first, first);
    for (i, &k) in keys.iter().enumerate().skip(1) {
        if k < min_k {
            min_k = k;
            min_i = i;
        }
        if k > max_k {
            max_k = k;
            max_i = i;
        }
    }
    Some((min_i, max_i))
}

fn extremes_of(
    lines: &[Line],
    length: f32,
    axis: usize,
    context: &'static str,
) -> Result<(usize, usize), LatticeError> {
    extremes(lines, length, axis).ok_or(LatticeError::InsufficientLines {
        context,
        found: 0,
        required: 1,
    })
}

/// The four extreme board corners, in the order
/// `minV×maxH, minV×minH, maxV×minH, maxV×maxH`.
///
/// Vertical lines are ranked by segment midpoint `x`, horizontal lines by
/// segment midpoint `y`, with segments of half-length `length`.
pub fn extreme_corners(
    lines: &OrientedLines,
    length: f32,
    singular_eps: f64,
) -> Result<[Point2<f32>; 4], LatticeError> {
    let (v_min, v_max) = extremes_of(&lines.vertical, length, 0, "vertical lines")?;
    let (h_min, h_max) = extremes_of(&lines.horizontal, length, 1, "horizontal lines")?;

    let v = &lines.vertical;
    let h = &lines.horizontal;
    let corner = |a: &Line, b: &Line| intersect_with_tolerance(a, b, singular_eps);

    Ok([
        corner(&v[v_min], &h[h_max])?,
        corner(&v[v_min], &h[h_min])?,
        corner(&v[v_max], &h[h_min])?,
        corner(&v[v_max], &h[h_max])?,
    ])
}

/// Intersect every vertical line with every horizontal line.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(lines), fields(vertical = lines.vertical.len(), horizontal = lines.horizontal.len()))
)]
pub fn grid_intersections(
    lines: &OrientedLines,
    singular_eps: f64,
) -> Result<GridIntersections, LatticeError> {
    let mut columns = Vec::with_capacity(lines.vertical.len());
    for (vi, v) in lines.vertical.iter().enumerate() {
        let mut column = Vec::with_capacity(lines.horizontal.len());
        for (hi, h) in lines.horizontal.iter().enumerate() {
            column.push(IntersectionPoint {
                position: intersect_with_tolerance(v, h, singular_eps)?,
                origin: PointOrigin::Grid {
                    vertical: vi,
                    horizontal: hi,
                },
            });
        }
        columns.push(column);
    }

    let grid = GridIntersections { columns };
    debug!("computed {} grid intersections", grid.len());
    Ok(grid)
}
