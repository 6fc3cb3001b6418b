//! Grid line reconstruction for photographed ruled paper.
//!
//! Pipeline:
//! - global Otsu binarization (paper on, rules off),
//! - exhaustive edge-to-edge candidate scan with a streak limit, which keeps
//!   segments that follow a rule even across short occlusions,
//! - clustering of near-duplicate candidates into canonical lines,
//! - period estimation from gaps pooled over both families,
//! - interpolation of missing lines and extrapolation to the image border.
//!
//! Vertical and horizontal lines run through the same code, parameterized by
//! [`Axis`].

mod axis;
mod cluster;
mod compose;
mod detector;
mod error;
mod io;
mod params;
mod reconstruct;
mod result;
mod scan;
mod spacing;
mod threshold;

pub use axis::{Axis, Endpoint, GridLine};
pub use cluster::{cluster_endpoints, ClusteredLines};
pub use compose::{draw_lines, overlay_canvas, OverlayParams};
pub use detector::GridDetector;
pub use error::GridDetectError;
pub use io::{AxisReport, GridDetectConfig, GridDetectReport, GridIoError, TimingsMs};
pub use params::{ClusterParams, GridDetectorParams, ScanParams, SpacingParams, ThresholdParams};
pub use reconstruct::{extrapolate, interpolate, missing_between, reconstruct, Reconstruction};
pub use result::{AxisLines, GridDetectionResult};
pub use scan::{follows_grid_line, scan_candidates};
pub use spacing::{estimate_spacing, SpacingCluster, SpacingEstimate, MIN_PERIOD};
pub use threshold::{binarize, histogram, otsu_threshold, otsu_threshold_from_histogram, BinaryMask};
