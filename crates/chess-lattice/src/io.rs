//! JSON input/output helpers: detector lines, parameter files and reports.

use crate::lattice::Lattice;
use crate::params::ReconstructionParams;
use crate::pipeline::{Reconstruction, ReconstructionDiagnostics};
use chess_lattice_core::Line;
use nalgebra::Point2;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum LatticeIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Read a JSON array of `{ "rho": .., "theta": .. }` objects.
pub fn load_lines(path: impl AsRef<Path>) -> Result<Vec<Line>, LatticeIoError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

impl ReconstructionParams {
    /// Load parameters from JSON; missing fields keep their defaults.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, LatticeIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), LatticeIoError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Serializable summary of a reconstruction run.
#[derive(Clone, Debug, Serialize)]
pub struct ReconstructionReport {
    pub complete: bool,
    pub row_lengths: Vec<usize>,
    pub rows: Vec<Vec<Point2<f32>>>,
    pub columns: Vec<Vec<Point2<f32>>>,
    pub diagnostics: ReconstructionDiagnostics,
}

impl ReconstructionReport {
    pub fn new(result: &Reconstruction) -> Self {
        let lattice: &Lattice = &result.lattice;
        Self {
            complete: lattice.is_complete(),
            row_lengths: lattice.row_lengths(),
            rows: lattice.rows().to_vec(),
            columns: lattice.columns().to_vec(),
            diagnostics: result.diagnostics.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, LatticeIoError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), LatticeIoError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
