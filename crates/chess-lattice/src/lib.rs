//! Chessboard lattice recovery from Hough lines.
//!
//! Input is an ordered list of polar lines `(rho, theta)` from a line
//! detector plus the image size. The pipeline filters spurious lines, splits
//! the rest into vertical and horizontal families, intersects them,
//! extrapolates one missing edge column, collapses near-duplicate points and
//! orders the survivors into a 9×9 lattice that maps image points to board
//! cells.
//!
//! ## Quickstart
//!
//! ```no_run
//! use chess_lattice::{reconstruct_lattice, ImageGeometry, Line};
//! use nalgebra::Point2;
//!
//! # fn main() -> Result<(), chess_lattice::PipelineError> {
//! let lines: Vec<Line> = vec![/* detector output */];
//! let result = reconstruct_lattice(&lines, ImageGeometry::new(1280, 960))?;
//!
//! let lookup = result.lookup(Point2::new(640.0, 700.0));
//! if !lookup.is_fallback() {
//!     println!("file {} rank {}", lookup.cell.file, lookup.cell.rank);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Each stage is also public ([`filter_lines`], [`split_orientations`],
//! [`grid_intersections`], [`estimate_modal_spacing`],
//! [`deduplicate_points`], [`Lattice::build`]) for callers that want to run
//! or visualize them separately.

mod dedup;
mod error;
mod intersections;
mod io;
mod lattice;
mod line_filter;
mod occupancy;
mod orientation;
mod params;
mod pipeline;
mod spacing;

pub use chess_lattice_core::{
    intersect, intersect_with_tolerance, ClusterError, ImageGeometry, KMeansParams, Line, Segment,
};

pub use dedup::{deduplicate_points, pool_points, Deduplicated};
pub use error::{LatticeError, PipelineError, Stage};
pub use intersections::{
    extreme_corners, grid_intersections, GridIntersections, IntersectionPoint, PointOrigin,
};
pub use io::{load_lines, LatticeIoError, ReconstructionReport};
pub use lattice::{lookup, CellIndex, CellLookup, Lattice, BOARD_CELLS};
pub use line_filter::{filter_lines, FilteredLines, RejectionCounts};
pub use occupancy::{anchor_from_box, BoardOccupancy};
pub use orientation::{
    cluster_orientations, find_outlier, remove_outlier, split_orientations, Orientation,
    OrientationSplit, OrientedLines, RemovedOutlier,
};
pub use params::{
    DedupParams, LatticeParams, LineFilterParams, OrientationParams, ReconstructionParams,
    Representative, SpacingParams,
};
pub use pipeline::{
    reconstruct_lattice, LatticeReconstructor, Reconstruction, ReconstructionDiagnostics,
};
pub use spacing::{
    estimate_modal_spacing, extrapolate_edge_column, extrapolation_offset, vertical_origins,
    SpacingEstimate,
};
