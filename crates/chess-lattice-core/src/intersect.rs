//! Intersection of two polar lines.

use crate::Line;
use nalgebra::{Matrix2, Point2, Vector2};

/// Determinant magnitude below which two lines are treated as parallel.
///
/// The system matrix has unit rows, so the determinant is `sin(θ2 - θ1)`.
pub const DEFAULT_SINGULAR_EPS: f64 = 1e-6;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum IntersectError {
    #[error("lines are parallel (theta1={theta1}, theta2={theta2})")]
    Singular { theta1: f32, theta2: f32 },
}

/// Intersect two lines using [`DEFAULT_SINGULAR_EPS`].
pub fn intersect(a: &Line, b: &Line) -> Result<Point2<f32>, IntersectError> {
    intersect_with_tolerance(a, b, DEFAULT_SINGULAR_EPS)
}

/// Solve
///
/// ```text
/// | cos θ1  sin θ1 | |x|   |ρ1|
/// | cos θ2  sin θ2 | |y| = |ρ2|
/// ```
///
/// The solve runs in `f64`; Hough angles differ by fractions of a degree
/// for nearly parallel lines and `f32` loses the intersection there.
pub fn intersect_with_tolerance(
    a: &Line,
    b: &Line,
    singular_eps: f64,
) -> Result<Point2<f32>, IntersectError> {
    let (t1, t2) = (a.theta as f64, b.theta as f64);
    let m = Matrix2::new(t1.cos(), t1.sin(), t2.cos(), t2.sin());

    let singular = IntersectError::Singular {
        theta1: a.theta,
        theta2: b.theta,
    };
    if m.determinant().abs() < singular_eps {
        return Err(singular);
    }
    let inv = m.try_inverse().ok_or(singular)?;
    let xy = inv * Vector2::new(a.rho as f64, b.rho as f64);

    Ok(Point2::new(xy.x as f32, xy.y as f32))
}
