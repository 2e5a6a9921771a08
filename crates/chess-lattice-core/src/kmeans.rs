//! Bounded Lloyd k-means over fixed-dimension points.
//!
//! The same primitive backs all three clustering steps of lattice recovery:
//! 2-means on double-angle line embeddings, 1D k-means on line gaps, and
//! K-means on intersection points.
//!
//! Seeding is deterministic (farthest-point traversal starting from the
//! first input point), so identical inputs always produce identical labels.
//! Empty clusters are refilled from the point lying farthest from its own
//! center, which guarantees `k` non-empty clusters whenever `n >= k`.

use log::debug;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Parameters for [`kmeans`].
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct KMeansParams {
    /// Max Lloyd iterations before giving up with [`ClusterError::NotConverged`].
    pub max_iters: usize,
    /// Converged once no center moves farther than this (Euclidean).
    pub epsilon: f32,
}

impl Default for KMeansParams {
    fn default() -> Self {
        Self {
            max_iters: 100,
            epsilon: 1e-4,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ClusterError {
    #[error("k-means needs at least one cluster")]
    NoClusters,
    #[error("cannot form {clusters} clusters from {points} points")]
    TooFewPoints { points: usize, clusters: usize },
    #[error("non-finite coordinate in point {index}")]
    NonFinite { index: usize },
    #[error("k-means did not converge within {max_iters} iterations")]
    NotConverged { max_iters: usize },
    #[error("degenerate clustering result: {0}")]
    Degenerate(String),
}

/// Output of [`kmeans`].
#[derive(Clone, Debug)]
pub struct KMeansResult<const D: usize> {
    /// Cluster centers, indexed by label.
    pub centers: Vec<[f32; D]>,
    /// Label of each input point, in input order.
    pub labels: Vec<usize>,
    /// Lloyd iterations performed.
    pub iterations: usize,
}

impl<const D: usize> KMeansResult<D> {
    pub fn k(&self) -> usize {
        self.centers.len()
    }

    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.k()];
        for &l in &self.labels {
            sizes[l] += 1;
        }
        sizes
    }

    /// Indices of the points assigned to `cluster`, in input order.
    pub fn members(&self, cluster: usize) -> impl Iterator<Item = usize> + '_ {
        self.labels
            .iter()
            .enumerate()
            .filter(move |(_, &l)| l == cluster)
            .map(|(i, _)| i)
    }

    /// Most populated cluster; ties go to the lowest label.
    pub fn largest_cluster(&self) -> Option<usize> {
        let sizes = self.cluster_sizes();
        let mut best: Option<usize> = None;
        for (c, &s) in sizes.iter().enumerate() {
            if best.is_none_or(|b| s > sizes[b]) {
                best = Some(c);
            }
        }
        best
    }
}

/// Cluster `points` into `k` groups.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(points, params), fields(n = points.len()))
)]
pub fn kmeans<const D: usize>(
    points: &[[f32; D]],
    k: usize,
    params: &KMeansParams,
) -> Result<KMeansResult<D>, ClusterError> {
    if k == 0 {
        return Err(ClusterError::NoClusters);
    }
    if points.len() < k {
        return Err(ClusterError::TooFewPoints {
            points: points.len(),
            clusters: k,
        });
    }
    if let Some(index) = points
        .iter()
        .position(|p| p.iter().any(|v| !v.is_finite()))
    {
        return Err(ClusterError::NonFinite { index });
    }

    let mut centers = seed_farthest(points, k);
    // Sentinel labels so the first assignment always counts as a change.
    let mut labels = vec![usize::MAX; points.len()];

    for iter in 1..=params.max_iters {
        let mut new_labels = assign(points, &centers);
        refill_empty(points, &centers, &mut new_labels, k);
        let new_centers = update_centers(points, &new_labels, &centers);

        let shift = centers
            .iter()
            .zip(new_centers.iter())
            .map(|(a, b)| dist_sq(a, b))
            .fold(0.0f32, f32::max)
            .sqrt();
        let stable = new_labels == labels;

        labels = new_labels;
        centers = new_centers;

        if stable || shift <= params.epsilon {
            debug!("k-means k={k} n={} converged after {iter} iterations", points.len());
            return Ok(KMeansResult {
                centers,
                labels,
                iterations: iter,
            });
        }
    }

    Err(ClusterError::NotConverged {
        max_iters: params.max_iters,
    })
}

#[inline]
fn dist_sq<const D: usize>(a: &[f32; D], b: &[f32; D]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Farthest-point traversal: the first point, then repeatedly the point
/// with the largest distance to its nearest chosen seed (first on ties).
fn seed_farthest<const D: usize>(points: &[[f32; D]], k: usize) -> Vec<[f32; D]> {
    let mut seeds = Vec::with_capacity(k);
    seeds.push(points[0]);
    let mut nearest: Vec<f32> = points.iter().map(|p| dist_sq(p, &points[0])).collect();

    while seeds.len() < k {
        let mut best = 0usize;
        for (i, &d) in nearest.iter().enumerate() {
            if d > nearest[best] {
                best = i;
            }
        }
        let seed = points[best];
        seeds.push(seed);
        for (d, p) in nearest.iter_mut().zip(points.iter()) {
            *d = d.min(dist_sq(p, &seed));
        }
    }
    seeds
}

/// Nearest center per point; ties go to the lowest label.
fn assign<const D: usize>(points: &[[f32; D]], centers: &[[f32; D]]) -> Vec<usize> {
    points
        .iter()
        .map(|p| {
            let mut best = 0usize;
            let mut best_d = f32::INFINITY;
            for (c, center) in centers.iter().enumerate() {
                let d = dist_sq(p, center);
                if d < best_d {
                    best = c;
                    best_d = d;
                }
            }
            best
        })
        .collect()
}

fn refill_empty<const D: usize>(
    points: &[[f32; D]],
    centers: &[[f32; D]],
    labels: &mut [usize],
    k: usize,
) {
    let mut sizes = vec![0usize; k];
    for &l in labels.iter() {
        sizes[l] += 1;
    }

    for empty in 0..k {
        if sizes[empty] > 0 {
            continue;
        }
        // Steal the worst-fitting point from a cluster that can spare one.
        let mut donor: Option<(usize, f32)> = None;
        for (i, p) in points.iter().enumerate() {
            let own = labels[i];
            if sizes[own] < 2 {
                continue;
            }
            let d = dist_sq(p, &centers[own]);
            if donor.is_none_or(|(_, best)| d > best) {
                donor = Some((i, d));
            }
        }
        if let Some((i, _)) = donor {
            sizes[labels[i]] -= 1;
            labels[i] = empty;
            sizes[empty] = 1;
        }
    }
}

fn update_centers<const D: usize>(
    points: &[[f32; D]],
    labels: &[usize],
    previous: &[[f32; D]],
) -> Vec<[f32; D]> {
    let k = previous.len();
    let mut sums = vec![[0.0f64; D]; k];
    let mut counts = vec![0usize; k];

    for (p, &l) in points.iter().zip(labels.iter()) {
        for (acc, v) in sums[l].iter_mut().zip(p.iter()) {
            *acc += *v as f64;
        }
        counts[l] += 1;
    }

    (0..k)
        .map(|c| {
            if counts[c] == 0 {
                return previous[c];
            }
            let n = counts[c] as f64;
            std::array::from_fn(|d| (sums[c][d] / n) as f32)
        })
        .collect()
}
