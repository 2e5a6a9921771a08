//! Row/column ordering of deduplicated corners and point-to-cell lookup.

use crate::error::LatticeError;
use crate::params::LatticeParams;
use log::{debug, warn};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Number of cells along each board side.
pub const BOARD_CELLS: u8 = 8;

/// 1-based board cell, both coordinates in `1..=8`.
///
/// `file` counts lattice row bands (image y), `rank` counts column bands
/// (image x).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellIndex {
    pub file: u8,
    pub rank: u8,
}

impl CellIndex {
    /// `None` unless both coordinates are in `1..=8`.
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        let valid = |v: u8| (1..=BOARD_CELLS).contains(&v);
        (valid(file) && valid(rank)).then_some(Self { file, rank })
    }
}

/// Result of [`Lattice::lookup`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CellLookup {
    pub point: Point2<f32>,
    pub cell: CellIndex,
    /// A row band contained the point; otherwise `cell.file` fell back to 1.
    pub file_matched: bool,
    /// A column band contained the point; otherwise `cell.rank` fell back to 1.
    pub rank_matched: bool,
}

impl CellLookup {
    pub fn is_fallback(&self) -> bool {
        !(self.file_matched && self.rank_matched)
    }

    /// The cell, or [`LatticeError::CellOutOfBounds`] when either dimension
    /// fell back.
    pub fn confident(&self) -> Result<CellIndex, LatticeError> {
        if self.is_fallback() {
            return Err(LatticeError::CellOutOfBounds {
                x: self.point.x,
                y: self.point.y,
            });
        }
        Ok(self.cell)
    }
}

/// Corners sorted into rows (ascending y) and, within each row, ascending x.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Lattice {
    rows: Vec<Vec<Point2<f32>>>,
    columns: Vec<Vec<Point2<f32>>>,
    expected_rows: usize,
    expected_columns: usize,
    bands: usize,
}

fn by_coord(axis: usize) -> impl Fn(&Point2<f32>, &Point2<f32>) -> Ordering {
    move |a, b| a[axis].partial_cmp(&b[axis]).unwrap_or(Ordering::Equal)
}

impl Lattice {
    /// Sort `corners` by `y` (stable), cut them into rows of
    /// `params.columns`, then sort each row by `x`.
    pub fn build(corners: &[Point2<f32>], params: &LatticeParams) -> Self {
        let mut sorted = corners.to_vec();
        sorted.sort_by(by_coord(1));

        let rows: Vec<Vec<Point2<f32>>> = sorted
            .chunks(params.columns.max(1))
            .map(|chunk| {
                let mut row = chunk.to_vec();
                row.sort_by(by_coord(0));
                row
            })
            .collect();

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let columns = (0..width)
            .map(|c| rows.iter().filter_map(|row| row.get(c).copied()).collect())
            .collect();

        let lattice = Self {
            rows,
            columns,
            expected_rows: params.rows,
            expected_columns: params.columns,
            bands: params.bands,
        };
        debug!(
            "lattice: {} rows, {} columns",
            lattice.rows.len(),
            lattice.columns.len()
        );
        lattice
    }

    pub fn rows(&self) -> &[Vec<Point2<f32>>] {
        &self.rows
    }

    pub fn columns(&self) -> &[Vec<Point2<f32>>] {
        &self.columns
    }

    pub fn row_lengths(&self) -> Vec<usize> {
        self.rows.iter().map(Vec::len).collect()
    }

    pub fn num_corners(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.check_complete().is_ok()
    }

    /// [`LatticeError::GridIncomplete`] unless there are exactly the expected
    /// number of rows, each of the expected length.
    pub fn check_complete(&self) -> Result<(), LatticeError> {
        let complete = self.rows.len() == self.expected_rows
            && self.rows.iter().all(|r| r.len() == self.expected_columns);
        if complete {
            return Ok(());
        }
        Err(LatticeError::GridIncomplete {
            rows: self.rows.len(),
            expected_rows: self.expected_rows,
            expected_cols: self.expected_columns,
            row_lengths: self.row_lengths(),
        })
    }

    /// Map an image point to a board cell.
    ///
    /// Row band `i` spans from the first corner of row `i` to the last corner
    /// of row `i + 1` in `y`; column band `i` spans from the last corner of
    /// column `i` to the first corner of column `i + 1` in `x`. Only bands
    /// `i < LatticeParams::bands` are scanned. When bands overlap the last
    /// match wins. A dimension without a match falls back to 1 and is
    /// flagged in the result.
    pub fn lookup(&self, point: Point2<f32>) -> CellLookup {
        let file = last_band(&self.rows, self.bands, |i| {
            let lo = self.rows[i].first()?.y;
            let hi = self.rows[i + 1].last()?.y;
            Some(lo <= point.y && point.y <= hi)
        });
        let rank = last_band(&self.columns, self.bands, |i| {
            let lo = self.columns[i].last()?.x;
            let hi = self.columns[i + 1].first()?.x;
            Some(lo <= point.x && point.x <= hi)
        });

        let result = CellLookup {
            point,
            cell: CellIndex {
                file: file.unwrap_or(1),
                rank: rank.unwrap_or(1),
            },
            file_matched: file.is_some(),
            rank_matched: rank.is_some(),
        };
        if result.is_fallback() {
            warn!(
                "point ({}, {}) outside lattice bands, falling back to {:?}",
                point.x, point.y, result.cell
            );
        }
        result
    }
}

/// Highest 1-based band index `i + 1` for which `contains(i)` holds, with
/// `i < min(lines - 1, scanned, 8)`.
fn last_band<T>(
    lines: &[T],
    scanned: usize,
    contains: impl Fn(usize) -> Option<bool>,
) -> Option<u8> {
    let limit = lines
        .len()
        .saturating_sub(1)
        .min(scanned)
        .min(BOARD_CELLS as usize);
    (0..limit)
        .rev()
        .find(|&i| contains(i).unwrap_or(false))
        .map(|i| i as u8 + 1)
}

/// Free-function form of [`Lattice::lookup`].
pub fn lookup(lattice: &Lattice, point: Point2<f32>) -> CellLookup {
    lattice.lookup(point)
}
