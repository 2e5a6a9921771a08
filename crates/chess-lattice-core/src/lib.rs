//! Geometric primitives for recovering a board lattice from Hough lines.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any concrete line detector or image type: lines come in as
//! `(rho, theta)` pairs and everything else is derived from them.

mod intersect;
mod kmeans;
mod line;
mod logger;

pub use intersect::{intersect, intersect_with_tolerance, IntersectError, DEFAULT_SINGULAR_EPS};
pub use kmeans::{kmeans, ClusterError, KMeansParams, KMeansResult};
pub use line::{ImageGeometry, Line, Segment};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_verbosity};
