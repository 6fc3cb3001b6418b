//! Orientation-agnostic line geometry.
//!
//! Every stage works on [`Endpoint`]s in an abstract frame: `lower` is the
//! line's coordinate on the first image edge, `upper` on the opposite edge.
//! [`Axis`] maps that frame to pixels, so vertical and horizontal lines share
//! one code path.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Line family being detected.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Lines running top to bottom; endpoints are x-coordinates on the top
    /// and bottom rows.
    Vertical,
    /// Lines running left to right; endpoints are y-coordinates on the left
    /// and right columns.
    Horizontal,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::Vertical, Axis::Horizontal];

    /// Number of positions across the family (width for vertical lines).
    #[inline]
    pub fn span(self, width: usize, height: usize) -> usize {
        match self {
            Axis::Vertical => width,
            Axis::Horizontal => height,
        }
    }

    /// Extent along a line of the family (height for vertical lines).
    #[inline]
    pub fn length(self, width: usize, height: usize) -> usize {
        match self {
            Axis::Vertical => height,
            Axis::Horizontal => width,
        }
    }

    /// Pixel segment for `endpoint`, anchored on the two opposite image edges.
    pub fn grid_line(self, endpoint: Endpoint, width: usize, height: usize) -> GridLine {
        match self {
            Axis::Vertical => GridLine {
                start: Point2::new(endpoint.lower, 0),
                end: Point2::new(endpoint.upper, height as i32 - 1),
            },
            Axis::Horizontal => GridLine {
                start: Point2::new(0, endpoint.lower),
                end: Point2::new(width as i32 - 1, endpoint.upper),
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Axis::Vertical => "vertical",
            Axis::Horizontal => "horizontal",
        }
    }
}

/// Edge intersections of one candidate or reconstructed line.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub lower: i32,
    pub upper: i32,
}

impl Endpoint {
    #[inline]
    pub const fn new(lower: i32, upper: i32) -> Self {
        Self { lower, upper }
    }

    /// Position of the line halfway along its length.
    #[inline]
    pub fn mid(&self) -> f32 {
        (self.lower + self.upper) as f32 / 2.0
    }

    /// `length / (upper - lower)`; infinite for an axis-parallel line.
    #[inline]
    pub fn slope(&self, length: f32) -> f32 {
        length / (self.upper - self.lower) as f32
    }

    /// Inverse of [`Endpoint::mid`] / [`Endpoint::slope`], rounded to pixels.
    pub fn from_mid_slope(mid: f32, slope: f32, length: f32) -> Self {
        let half_run = length / (2.0 * slope);
        Self {
            lower: (mid - half_run).round() as i32,
            upper: (mid + half_run).round() as i32,
        }
    }

    /// True when both endpoints fall outside `[0, span - 1]` on the same side.
    pub fn is_beyond(&self, span: usize) -> bool {
        let last = span as i32 - 1;
        (self.lower < 0 && self.upper < 0) || (self.lower > last && self.upper > last)
    }
}

/// Renderable segment between two image-edge points.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GridLine {
    pub start: Point2<i32>,
    pub end: Point2<i32>,
}
