//! End-to-end lattice reconstruction.

use crate::dedup::{deduplicate_points, pool_points};
use crate::error::{AtStage, LatticeError, PipelineError, Stage};
use crate::intersections::{extreme_corners, grid_intersections, IntersectionPoint};
use crate::lattice::{CellLookup, Lattice};
use crate::line_filter::{filter_lines, FilteredLines};
use crate::orientation::{split_orientations, OrientedLines, RemovedOutlier};
use crate::params::ReconstructionParams;
use crate::spacing::{
    estimate_modal_spacing, extrapolate_edge_column, vertical_origins, SpacingEstimate,
};
use chess_lattice_core::{ImageGeometry, Line};
use log::{info, warn};
use nalgebra::Point2;
use serde::Serialize;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Intermediate results of every stage, for inspection and visualization.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ReconstructionDiagnostics {
    pub input_lines: usize,
    pub filtered: FilteredLines,
    pub oriented: OrientedLines,
    pub outliers: Vec<RemovedOutlier>,
    /// `minV×maxH, minV×minH, maxV×minH, maxV×maxH`.
    pub extreme_corners: Vec<Point2<f32>>,
    pub grid_points: usize,
    pub spacing: Option<SpacingEstimate>,
    pub extrapolated: Vec<IntersectionPoint>,
    pub pool_size: usize,
    pub corners: Vec<Point2<f32>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Reconstruction {
    pub lattice: Lattice,
    pub diagnostics: ReconstructionDiagnostics,
}

impl Reconstruction {
    pub fn lookup(&self, point: Point2<f32>) -> CellLookup {
        self.lattice.lookup(point)
    }
}

/// Runs the stages in order with one parameter set; holds no per-image state.
#[derive(Clone, Debug, Default)]
pub struct LatticeReconstructor {
    params: ReconstructionParams,
}

impl LatticeReconstructor {
    pub fn new(params: ReconstructionParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ReconstructionParams {
        &self.params
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, lines),
            fields(lines = lines.len(), width = geometry.width, height = geometry.height)
        )
    )]
    pub fn reconstruct(
        &self,
        lines: &[Line],
        geometry: ImageGeometry,
    ) -> Result<Reconstruction, PipelineError> {
        let p = &self.params;
        let length = geometry.bounding_length();
        let mut diag = ReconstructionDiagnostics {
            input_lines: lines.len(),
            ..Default::default()
        };

        diag.filtered = filter_lines(lines, &geometry, &p.line_filter);
        if diag.filtered.lines.len() < 2 {
            return Err(LatticeError::InsufficientLines {
                context: "filtered lines",
                found: diag.filtered.lines.len(),
                required: 2,
            })
            .at(Stage::LineFilter);
        }

        let split = split_orientations(&diag.filtered.lines, &p.orientation).at(Stage::Orientation)?;
        diag.oriented = split.lines;
        diag.outliers = split.outliers;

        let oriented = &diag.oriented;
        diag.extreme_corners = extreme_corners(oriented, length, p.singular_eps)
            .at(Stage::Intersections)?
            .to_vec();
        let grid = grid_intersections(oriented, p.singular_eps).at(Stage::Intersections)?;
        diag.grid_points = grid.len();

        if p.spacing.extrapolate {
            let origins = vertical_origins(&oriented.vertical, length);
            let est = estimate_modal_spacing(&origins, &p.spacing).at(Stage::Spacing)?;
            diag.extrapolated = extrapolate_edge_column(&oriented.vertical, &grid, est.spacing, length);
            diag.spacing = Some(est);
        }

        let pool = pool_points(&grid, &diag.extrapolated);
        diag.pool_size = pool.len();
        let positions: Vec<Point2<f32>> = pool.iter().map(|q| q.position).collect();
        let dedup = deduplicate_points(&positions, &p.dedup).at(Stage::Deduplication)?;
        diag.corners = dedup.corners;

        let lattice = Lattice::build(&diag.corners, &p.lattice);
        if p.require_complete {
            lattice.check_complete().at(Stage::Lattice)?;
        } else if !lattice.is_complete() {
            warn!("lattice incomplete, row lengths {:?}", lattice.row_lengths());
        }

        info!(
            "reconstructed lattice from {} lines: {} vertical, {} horizontal, {} corners in {} rows",
            diag.input_lines,
            diag.oriented.vertical.len(),
            diag.oriented.horizontal.len(),
            lattice.num_corners(),
            lattice.rows().len()
        );

        Ok(Reconstruction {
            lattice,
            diagnostics: diag,
        })
    }
}

/// Reconstruct with default parameters.
pub fn reconstruct_lattice(
    lines: &[Line],
    geometry: ImageGeometry,
) -> Result<Reconstruction, PipelineError> {
    LatticeReconstructor::default().reconstruct(lines, geometry)
}
