use gridlines_core::SmoothingKernel;
use serde::{Deserialize, Serialize};

use crate::error::GridDetectError;

/// Global Otsu threshold settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdParams {
    /// Histogram bins over `[0, 1]`. Large counts keep the threshold precise
    /// for float samples.
    pub num_bins: usize,
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self { num_bins: 1000 }
    }
}

/// Candidate-line acceptance settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanParams {
    /// Longest run of consecutive foreground (paper) pixels a candidate may
    /// cross and still count as following a grid line.
    pub max_streak: u32,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self { max_streak: 10 }
    }
}

/// Near-duplicate merge settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterParams {
    /// Raw detections whose `lower` coordinates differ by at most this many
    /// pixels from their neighbour join the same line.
    pub tolerance: i32,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self { tolerance: 1 }
    }
}

/// Grid period estimation settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpacingParams {
    /// Sorted midpoint differences closer than this belong to one cluster.
    pub tolerance: f32,
}

impl Default for SpacingParams {
    fn default() -> Self {
        Self { tolerance: 10.0 }
    }
}

/// Full configuration of [`crate::GridDetector`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridDetectorParams {
    /// Pre-filter applied to the greyscale image before thresholding.
    pub smoothing: SmoothingKernel,
    pub threshold: ThresholdParams,
    pub scan: ScanParams,
    pub cluster: ClusterParams,
    pub spacing: SpacingParams,
}

impl GridDetectorParams {
    pub fn validate(&self) -> Result<(), GridDetectError> {
        if self.threshold.num_bins < 2 {
            return Err(GridDetectError::InvalidParams(format!(
                "threshold.num_bins must be at least 2 (got {})",
                self.threshold.num_bins
            )));
        }
        if self.cluster.tolerance < 0 {
            return Err(GridDetectError::InvalidParams(format!(
                "cluster.tolerance must be non-negative (got {})",
                self.cluster.tolerance
            )));
        }
        if self.spacing.tolerance.is_nan() || self.spacing.tolerance < 0.0 {
            return Err(GridDetectError::InvalidParams(format!(
                "spacing.tolerance must be non-negative (got {})",
                self.spacing.tolerance
            )));
        }
        self.smoothing.build()?;
        Ok(())
    }
}
