use chess_lattice_core::{ClusterError, IntersectError};
use serde::Serialize;
use std::fmt;

/// Failure kinds of lattice reconstruction.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LatticeError {
    #[error("insufficient lines in {context}: found {found}, need at least {required}")]
    InsufficientLines {
        context: &'static str,
        found: usize,
        required: usize,
    },
    #[error("clustering failed: {0}")]
    ClusteringFailure(#[from] ClusterError),
    #[error("lines are parallel and do not intersect (theta1={theta1}, theta2={theta2})")]
    SingularSystem { theta1: f32, theta2: f32 },
    #[error(
        "lattice incomplete: {rows} rows (expected {expected_rows}), row lengths {row_lengths:?} (expected {expected_cols})"
    )]
    GridIncomplete {
        rows: usize,
        expected_rows: usize,
        expected_cols: usize,
        row_lengths: Vec<usize>,
    },
    #[error("point ({x}, {y}) lies outside every lattice band")]
    CellOutOfBounds { x: f32, y: f32 },
}

impl From<IntersectError> for LatticeError {
    fn from(e: IntersectError) -> Self {
        match e {
            IntersectError::Singular { theta1, theta2 } => {
                LatticeError::SingularSystem { theta1, theta2 }
            }
        }
    }
}

/// Pipeline stage that produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    LineFilter,
    Orientation,
    Intersections,
    Spacing,
    Deduplication,
    Lattice,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::LineFilter => "line filter",
            Stage::Orientation => "orientation clustering",
            Stage::Intersections => "intersections",
            Stage::Spacing => "spacing estimation",
            Stage::Deduplication => "point deduplication",
            Stage::Lattice => "lattice",
        };
        f.write_str(name)
    }
}

/// First failure of a reconstruction run, tagged with its stage.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: LatticeError,
}

pub(crate) trait AtStage<T> {
    fn at(self, stage: Stage) -> Result<T, PipelineError>;
}

impl<T> AtStage<T> for Result<T, LatticeError> {
    fn at(self, stage: Stage) -> Result<T, PipelineError> {
        self.map_err(|source| PipelineError { stage, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_error_names_stage() {
        let err: Result<(), _> = Err(LatticeError::InsufficientLines {
            context: "filtered lines",
            found: 1,
            required: 2,
        });
        let err = err.at(Stage::LineFilter).unwrap_err();
        assert_eq!(Stage::LineFilter, err.stage);
        assert!(err.to_string().starts_with("line filter stage failed"));
    }

    #[test]
    fn singular_intersection_maps_to_singular_system() {
        let e: LatticeError = IntersectError::Singular {
            theta1: 0.5,
            theta2: 0.5,
        }
        .into();
        assert_eq!(
            e,
            LatticeError::SingularSystem {
                theta1: 0.5,
                theta2: 0.5
            }
        );
    }
}
