//! Polar (Hough) lines and their finite pixel-space segments.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Infinite line `rho = x·cos(theta) + y·sin(theta)`.
///
/// This is the shape produced by a standard Hough transform: `rho` is the
/// signed perpendicular distance from the image origin, `theta` the angle of
/// the line normal in radians. Lines are never mutated by the pipeline; they
/// are only kept, discarded or grouped.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub rho: f32,
    pub theta: f32,
}

impl Line {
    pub fn new(rho: f32, theta: f32) -> Self {
        Self { rho, theta }
    }

    /// Project the line onto a finite segment of half-length `length`
    /// centered on the foot of the normal.
    ///
    /// Endpoints are snapped to whole pixels by truncation toward zero, so
    /// the heuristics that compare endpoints operate on pixel coordinates.
    pub fn to_segment(&self, length: f32) -> Segment {
        let (sin, cos) = self.theta.sin_cos();
        let x0 = cos * self.rho;
        let y0 = sin * self.rho;
        Segment {
            p1: Point2::new((x0 - length * sin).trunc(), (y0 + length * cos).trunc()),
            p2: Point2::new((x0 + length * sin).trunc(), (y0 - length * cos).trunc()),
        }
    }

    /// Double-angle embedding `(cos 2θ, sin 2θ)`.
    ///
    /// `θ` and `θ + π` describe the same undirected line and map to the
    /// same point on the unit circle.
    pub fn double_angle(&self) -> [f32; 2] {
        let (sin, cos) = (2.0 * self.theta).sin_cos();
        [cos, sin]
    }

    /// Unit normal `(cos θ, sin θ)`.
    pub fn normal(&self) -> Vector2<f32> {
        Vector2::new(self.theta.cos(), self.theta.sin())
    }

    /// Signed distance of `p` from the line.
    pub fn residual(&self, p: Point2<f32>) -> f32 {
        self.normal().dot(&p.coords) - self.rho
    }
}

/// Finite segment obtained from [`Line::to_segment`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start point (`x0 - L·sinθ`, `y0 + L·cosθ`).
    pub p1: Point2<f32>,
    /// Far point (`x0 + L·sinθ`, `y0 - L·cosθ`).
    pub p2: Point2<f32>,
}

impl Segment {
    pub fn dx(&self) -> f32 {
        self.p2.x - self.p1.x
    }

    pub fn dy(&self) -> f32 {
        self.p2.y - self.p1.y
    }

    /// Pixel-space slope `dy / dx`, `None` for a vertical segment.
    pub fn slope(&self) -> Option<f32> {
        let dx = self.dx();
        if dx == 0.0 {
            None
        } else {
            Some(self.dy() / dx)
        }
    }

    pub fn midpoint(&self) -> Point2<f32> {
        nalgebra::center(&self.p1, &self.p2)
    }
}

/// Size of the analysed image in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageGeometry {
    pub width: u32,
    pub height: u32,
}

impl ImageGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Image diagonal; every line is projected onto a segment of this half-length.
    pub fn bounding_length(&self) -> f32 {
        let w = self.width as f32;
        let h = self.height as f32;
        (w * w + h * h).sqrt()
    }
}
