use crate::error::LatticeError;
use crate::intersections::{GridIntersections, IntersectionPoint};
use crate::params::{DedupParams, Representative};
use chess_lattice_core::kmeans;
use log::debug;
use nalgebra::Point2;
use serde::Serialize;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Output of [`deduplicate_points`].
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Deduplicated {
    /// One representative per cluster, ordered by first appearance in the pool.
    pub corners: Vec<Point2<f32>>,
    /// For every pooled point, the index of its representative in `corners`.
    pub assignment: Vec<usize>,
    /// Number of k-means clusters requested.
    pub clusters: usize,
}

/// Deduplication pool: grid points (vertical-major), then extrapolated
/// points. Exact positional duplicates keep their first occurrence.
pub fn pool_points(
    grid: &GridIntersections,
    extrapolated: &[IntersectionPoint],
) -> Vec<IntersectionPoint> {
    let mut pool: Vec<IntersectionPoint> = Vec::with_capacity(grid.len() + extrapolated.len());
    for p in grid.points().chain(extrapolated.iter()) {
        if !pool.iter().any(|q| q.position == p.position) {
            pool.push(*p);
        }
    }
    pool
}

/// Collapse near-duplicate points into at most `params.target_points`
/// representatives.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(points, params), fields(n = points.len()))
)]
pub fn deduplicate_points(
    points: &[Point2<f32>],
    params: &DedupParams,
) -> Result<Deduplicated, LatticeError> {
    let k = params.target_points.min(points.len());
    let data: Vec<[f32; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
    let res = kmeans(&data, k, &params.kmeans)?;

    // Cluster label -> index in `corners`, assigned on first appearance.
    let mut slot: Vec<Option<usize>> = vec![None; res.k()];
    let mut corners = Vec::with_capacity(res.k());
    let mut assignment = Vec::with_capacity(points.len());

    for (p, &label) in points.iter().zip(res.labels.iter()) {
        let idx = match slot[label] {
            Some(idx) => idx,
            None => {
                let rep = match params.representative {
                    Representative::FirstMember => *p,
                    Representative::Centroid => {
                        let c = res.centers[label];
                        Point2::new(c[0], c[1])
                    }
                };
                corners.push(rep);
                slot[label] = Some(corners.len() - 1);
                corners.len() - 1
            }
        };
        assignment.push(idx);
    }

    debug!(
        "deduplicated {} points into {} corners (k={k})",
        points.len(),
        corners.len()
    );
    Ok(Deduplicated {
        corners,
        assignment,
        clusters: k,
    })
}
