//! Reconstruct the regular line grid of photographed ruled paper.
//!
//! This crate provides:
//! - re-exports of the `gridlines-*` crates
//! - (feature `image`) decoding/encoding of image files into sample grids and
//!   end-to-end helpers that go from an image file to a rendered grid
//! - (feature `cli`) the `gridlines` binary
//!
//! ## Quickstart
//!
//! ```no_run
//! use gridlines::detect::detect_file;
//! use gridlines::{GridDetector, GridDetectorParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let detector = GridDetector::new(GridDetectorParams::default())?;
//! let (_image, result) = detect_file("paper.jpg", &detector)?;
//! println!(
//!     "period {:?}, {} vertical lines",
//!     result.spacing.period(),
//!     result.vertical.len()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `gridlines::core`: sample grids, smoothing kernels, line walker, logger.
//! - `gridlines::detect_lines`: thresholding, scan, clustering, spacing,
//!   reconstruction and rendering.
//! - `gridlines::codec` (feature `image`): image files <-> sample grids.
//! - `gridlines::detect` (feature `image`): file-level pipeline runs.

pub use gridlines_core as core;
pub use gridlines_detect as detect_lines;

pub use gridlines_core::{SampleGrid, SmoothingKernel};
pub use gridlines_detect::{
    Axis, AxisLines, Endpoint, GridDetectConfig, GridDetectReport, GridDetectionResult,
    GridDetector, GridDetectorParams, OverlayParams,
};

#[cfg(feature = "image")]
pub mod codec;

#[cfg(feature = "image")]
pub mod detect;
