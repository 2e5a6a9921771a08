use chess_lattice_core::{KMeansParams, DEFAULT_SINGULAR_EPS};
use serde::{Deserialize, Serialize};

/// Thresholds of the geometric line filter.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LineFilterParams {
    /// Lines crossing the upper-left region must reach this fraction of the
    /// image width and height with their far endpoint.
    pub region_fraction: f32,
    /// Segments steeper than this (|dy/dx|) are rejected.
    pub max_abs_slope: f32,
    /// Segments flatter than this are rejected.
    pub min_abs_slope: f32,
    /// Strong-line admission: far-endpoint x distance, as a fraction of the diagonal.
    pub strong_diagonal_fraction: f32,
    /// Strong-line admission: far-endpoint x distance, in units of `sqrt(height)`.
    pub strong_height_factor: f32,
}

impl Default for LineFilterParams {
    fn default() -> Self {
        Self {
            region_fraction: 0.55,
            max_abs_slope: 10.0,
            min_abs_slope: 0.01,
            strong_diagonal_fraction: 0.015,
            strong_height_factor: 0.7,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct OrientationParams {
    /// Drop one minority line from each orientation group.
    pub remove_outliers: bool,
    pub kmeans: KMeansParams,
}

impl Default for OrientationParams {
    fn default() -> Self {
        Self {
            remove_outliers: true,
            kmeans: KMeansParams {
                max_iters: 10,
                ..KMeansParams::default()
            },
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SpacingParams {
    /// Number of 1D clusters the consecutive line gaps are split into.
    pub gap_clusters: usize,
    /// Extrapolate one extra column next to the rightmost vertical line.
    pub extrapolate: bool,
    pub kmeans: KMeansParams,
}

impl Default for SpacingParams {
    fn default() -> Self {
        Self {
            gap_clusters: 3,
            extrapolate: true,
            kmeans: KMeansParams {
                max_iters: 10,
                ..KMeansParams::default()
            },
        }
    }
}

/// How a deduplicated cluster is represented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Representative {
    /// First pooled point carrying the cluster label.
    #[default]
    FirstMember,
    /// Mean of the cluster members.
    Centroid,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct DedupParams {
    /// Expected number of lattice vertices (81 for a 9×9 lattice).
    pub target_points: usize,
    pub representative: Representative,
    pub kmeans: KMeansParams,
}

impl Default for DedupParams {
    fn default() -> Self {
        Self {
            target_points: 81,
            representative: Representative::FirstMember,
            kmeans: KMeansParams::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LatticeParams {
    /// Expected lattice rows (board ranks + 1).
    pub rows: usize,
    /// Expected lattice columns; also the chunk size when splitting sorted corners into rows.
    pub columns: usize,
    /// Row and column bands scanned by lookup, capped at 8. The default 7
    /// leaves the last band unmatched, so points there fall back to 1.
    pub bands: usize,
}

impl Default for LatticeParams {
    fn default() -> Self {
        Self {
            rows: 9,
            columns: 9,
            bands: 7,
        }
    }
}

/// Configuration of a full reconstruction run.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ReconstructionParams {
    pub line_filter: LineFilterParams,
    pub orientation: OrientationParams,
    pub spacing: SpacingParams,
    pub dedup: DedupParams,
    pub lattice: LatticeParams,
    /// Determinant magnitude under which two lines count as parallel.
    pub singular_eps: f64,
    /// Fail with `GridIncomplete` instead of returning a partial lattice.
    pub require_complete: bool,
}

impl Default for ReconstructionParams {
    fn default() -> Self {
        Self {
            line_filter: LineFilterParams::default(),
            orientation: OrientationParams::default(),
            spacing: SpacingParams::default(),
            dedup: DedupParams::default(),
            lattice: LatticeParams::default(),
            singular_eps: DEFAULT_SINGULAR_EPS,
            require_complete: true,
        }
    }
}
