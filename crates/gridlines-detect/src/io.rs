//! JSON configuration and report helpers for grid detection runs.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    compose::OverlayParams, AxisLines, GridDetectError, GridDetectionResult, GridDetector,
    GridDetectorParams, SpacingEstimate,
};

#[derive(thiserror::Error, Debug)]
pub enum GridIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Configuration of one detection run, loaded from JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GridDetectConfig {
    pub image_path: String,
    /// Where to write the composited grid image.
    #[serde(default)]
    pub output_path: Option<String>,
    /// Optional diagnostic: the binary mask.
    #[serde(default)]
    pub mask_path: Option<String>,
    /// Optional diagnostic: detected lines per family, `{axis}` is replaced by
    /// `vertical` / `horizontal`.
    #[serde(default)]
    pub axes_path: Option<String>,
    #[serde(default)]
    pub report_path: Option<String>,
    #[serde(default)]
    pub params: GridDetectorParams,
    #[serde(default)]
    pub overlay: OverlayParams,
}

impl GridDetectConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, GridIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), GridIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output image path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("gridlines_output.png"))
    }

    /// Path of the diagnostic image for one family, if requested.
    pub fn axis_path(&self, axis: crate::Axis) -> Option<PathBuf> {
        self.axes_path
            .as_ref()
            .map(|p| PathBuf::from(p.replace("{axis}", axis.name())))
    }

    /// Build a detector from this config.
    pub fn build_detector(&self) -> Result<GridDetector, GridDetectError> {
        GridDetector::new(self.params.clone())
    }
}

/// Wall-clock timings of the pipeline stages in milliseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimingsMs {
    pub load_image: u64,
    pub detect: u64,
    pub render: u64,
    pub total: u64,
}

/// Lines of one family, as written to the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisReport {
    pub raw_candidates: usize,
    pub detected: usize,
    pub interpolated: usize,
    pub extrapolated: usize,
    pub lines: AxisLines,
}

impl From<&AxisLines> for AxisReport {
    fn from(lines: &AxisLines) -> Self {
        Self {
            raw_candidates: lines.raw_candidates,
            detected: lines.canonical.len(),
            interpolated: lines.interpolated.len(),
            extrapolated: lines.before.len() + lines.after.len(),
            lines: lines.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridDetectReport {
    pub image_path: String,
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    #[serde(default)]
    pub threshold: Option<f32>,
    #[serde(default)]
    pub spacing: Option<SpacingEstimate>,
    #[serde(default)]
    pub vertical: Option<AxisReport>,
    #[serde(default)]
    pub horizontal: Option<AxisReport>,
    #[serde(default)]
    pub timings_ms: TimingsMs,
    #[serde(default)]
    pub error: Option<String>,
}

impl GridDetectReport {
    /// Build a base report for an image of the given shape.
    pub fn new(image_path: impl Into<String>, width: usize, height: usize, channels: usize) -> Self {
        Self {
            image_path: image_path.into(),
            width,
            height,
            channels,
            threshold: None,
            spacing: None,
            vertical: None,
            horizontal: None,
            timings_ms: TimingsMs::default(),
            error: None,
        }
    }

    /// Populate report fields from a successful detection.
    pub fn set_detection(&mut self, res: &GridDetectionResult) {
        self.threshold = res.threshold;
        self.spacing = Some(res.spacing.clone());
        self.vertical = Some(AxisReport::from(&res.vertical));
        self.horizontal = Some(AxisReport::from(&res.horizontal));
        self.error = None;
    }

    /// Record a detection error.
    pub fn set_error(&mut self, err: impl std::fmt::Display) {
        self.error = Some(err.to_string());
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, GridIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), GridIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
