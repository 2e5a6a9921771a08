//! Split lines into vertical and horizontal families.
//!
//! Angles are embedded as `(cos 2θ, sin 2θ)` so that `θ` and `θ + π` coincide,
//! then 2-means separates the two board directions. The family whose mean
//! `cos 2θ` is larger holds the lines with normals near 0 or π, i.e. the
//! vertical board edges.

use crate::error::LatticeError;
use crate::params::OrientationParams;
use chess_lattice_core::{kmeans, KMeansParams, Line};
use log::debug;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// The two orientation families; together they partition the clustered lines.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct OrientedLines {
    pub vertical: Vec<Line>,
    pub horizontal: Vec<Line>,
}

impl OrientedLines {
    pub fn get(&self, orientation: Orientation) -> &[Line] {
        match orientation {
            Orientation::Vertical => &self.vertical,
            Orientation::Horizontal => &self.horizontal,
        }
    }

    pub fn get_mut(&mut self, orientation: Orientation) -> &mut Vec<Line> {
        match orientation {
            Orientation::Vertical => &mut self.vertical,
            Orientation::Horizontal => &mut self.horizontal,
        }
    }

    pub fn len(&self) -> usize {
        self.vertical.len() + self.horizontal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A line removed as the minority of its orientation family.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RemovedOutlier {
    pub orientation: Orientation,
    pub line: Line,
}

/// Families after outlier removal, plus what was removed.
#[derive(Clone, Debug, Default, Serialize)]
pub struct OrientationSplit {
    pub lines: OrientedLines,
    pub outliers: Vec<RemovedOutlier>,
}

/// Partition `lines` into the two orientation families (input order is kept
/// inside each family).
pub fn cluster_orientations(
    lines: &[Line],
    params: &KMeansParams,
) -> Result<OrientedLines, LatticeError> {
    if lines.len() < 2 {
        return Err(LatticeError::InsufficientLines {
            context: "orientation clustering",
            found: lines.len(),
            required: 2,
        });
    }

    let embedded: Vec<[f32; 2]> = lines.iter().map(Line::double_angle).collect();
    let res = kmeans(&embedded, 2, params)?;

    let mut cos_sum = [0.0f32; 2];
    let mut count = [0usize; 2];
    for (e, &l) in embedded.iter().zip(res.labels.iter()) {
        cos_sum[l] += e[0];
        count[l] += 1;
    }
    let mean_cos = |c: usize| cos_sum[c] / count[c].max(1) as f32;
    let vertical_label = if mean_cos(1) > mean_cos(0) { 1 } else { 0 };

    let mut out = OrientedLines::default();
    for (line, &l) in lines.iter().zip(res.labels.iter()) {
        if l == vertical_label {
            out.vertical.push(*line);
        } else {
            out.horizontal.push(*line);
        }
    }

    debug!(
        "orientation split: {} vertical, {} horizontal",
        out.vertical.len(),
        out.horizontal.len()
    );
    Ok(out)
}

/// Find the minority line of one family.
///
/// The family is split again with 2-means; the first line of the smaller
/// sub-cluster is returned (the sub-cluster whose first line comes earlier
/// wins a size tie).
pub fn find_outlier(group: &[Line], params: &KMeansParams) -> Result<Line, LatticeError> {
    if group.len() < 2 {
        return Err(LatticeError::InsufficientLines {
            context: "orientation group",
            found: group.len(),
            required: 2,
        });
    }

    let embedded: Vec<[f32; 2]> = group.iter().map(Line::double_angle).collect();
    let res = kmeans(&embedded, 2, params)?;
    let sizes = res.cluster_sizes();

    let first_of = |c: usize| res.members(c).next();
    let (Some(first0), Some(first1)) = (first_of(0), first_of(1)) else {
        return Err(chess_lattice_core::ClusterError::Degenerate(
            "orientation group split produced an empty cluster".to_string(),
        )
        .into());
    };

    let minority = match sizes[0].cmp(&sizes[1]) {
        std::cmp::Ordering::Less => first0,
        std::cmp::Ordering::Greater => first1,
        std::cmp::Ordering::Equal => first0.min(first1),
    };
    Ok(group[minority])
}

/// Remove the minority line from `group` by exact `(rho, theta)` match.
pub fn remove_outlier(group: &mut Vec<Line>, params: &KMeansParams) -> Result<Line, LatticeError> {
    let outlier = find_outlier(group, params)?;
    if let Some(pos) = group.iter().position(|l| *l == outlier) {
        group.remove(pos);
    }
    Ok(outlier)
}

/// Cluster into families and drop one outlier per family.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(lines, params), fields(lines = lines.len()))
)]
pub fn split_orientations(
    lines: &[Line],
    params: &OrientationParams,
) -> Result<OrientationSplit, LatticeError> {
    let mut split = OrientationSplit {
        lines: cluster_orientations(lines, &params.kmeans)?,
        outliers: Vec::new(),
    };

    if params.remove_outliers {
        for orientation in [Orientation::Vertical, Orientation::Horizontal] {
            let line = remove_outlier(split.lines.get_mut(orientation), &params.kmeans)?;
            debug!("removed {orientation:?} outlier rho={} theta={}", line.rho, line.theta);
            split.outliers.push(RemovedOutlier { orientation, line });
        }
    }

    Ok(split)
}
