//! Grid detection pipeline.
//!
//! greyscale → smoothing → Otsu mask → per-family candidate scan →
//! clustering → pooled spacing estimate → interpolation/extrapolation.

use gridlines_core::SampleGrid;
use log::info;

use crate::axis::{Axis, Endpoint};
use crate::cluster::cluster_endpoints;
use crate::error::GridDetectError;
use crate::params::GridDetectorParams;
use crate::reconstruct::{reconstruct, Reconstruction};
use crate::result::{AxisLines, GridDetectionResult};
use crate::scan::scan_candidates;
use crate::spacing::estimate_spacing;
use crate::threshold::{binarize, BinaryMask};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Reconstructs the regular line grid of a photographed ruled surface.
#[derive(Clone, Debug)]
pub struct GridDetector {
    params: GridDetectorParams,
}

impl GridDetector {
    pub fn new(params: GridDetectorParams) -> Result<Self, GridDetectError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &GridDetectorParams {
        &self.params
    }

    /// Greyscale reduction followed by the configured smoothing.
    pub fn prepare(&self, image: &SampleGrid) -> Result<SampleGrid, GridDetectError> {
        let grey = image.to_greyscale();
        Ok(self.params.smoothing.apply(&grey)?)
    }

    /// Otsu mask of a prepared greyscale grid, with its threshold.
    pub fn binarize(&self, grey: &SampleGrid) -> (BinaryMask, f32) {
        binarize(grey, self.params.threshold.num_bins)
    }

    /// Run the full pipeline on a decoded image (any channel count).
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, image),
            fields(width = image.width(), height = image.height(), channels = image.channels())
        )
    )]
    pub fn detect(&self, image: &SampleGrid) -> Result<GridDetectionResult, GridDetectError> {
        let grey = self.prepare(image)?;
        let (mask, threshold) = self.binarize(&grey);
        let mut result = self.detect_from_mask(&mask);
        result.threshold = Some(threshold);
        Ok(result)
    }

    /// Run scan, clustering and reconstruction on an existing mask.
    ///
    /// Grid lines must be the *off* pixels of the mask.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, mask), fields(width = mask.width(), height = mask.height()))
    )]
    pub fn detect_from_mask(&self, mask: &BinaryMask) -> GridDetectionResult {
        let (width, height) = (mask.width(), mask.height());

        let mut differences = Vec::new();
        let [vertical, horizontal] = Axis::ALL.map(|axis| {
            let raw = scan_candidates(mask, axis, &self.params.scan);
            let raw_candidates = raw.len();
            let clustered = cluster_endpoints(raw, &self.params.cluster);
            differences.extend_from_slice(&clustered.differences);
            (axis, raw_candidates, clustered.lines)
        });

        let spacing = estimate_spacing(&differences, width, height, &self.params.spacing);
        let finish = |(axis, raw_candidates, canonical): (Axis, usize, Vec<Endpoint>)| {
            let rec = match spacing.period() {
                Some(period) => reconstruct(
                    &canonical,
                    period,
                    axis.span(width, height),
                    axis.length(width, height),
                ),
                None => Reconstruction::default(),
            };
            AxisLines::new(axis, raw_candidates, canonical, rec)
        };
        let vertical = finish(vertical);
        let horizontal = finish(horizontal);

        info!(
            "grid {}x{}: spacing {:.2}, vertical {} detected / {} total, horizontal {} detected / {} total",
            width,
            height,
            spacing.value,
            vertical.canonical.len(),
            vertical.len(),
            horizontal.canonical.len(),
            horizontal.len()
        );

        GridDetectionResult {
            width,
            height,
            threshold: None,
            spacing,
            vertical,
            horizontal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SpacingParams;
    use gridlines_core::SmoothingKernel;

    /// Bright paper, dark 3-px rules centred on the given coordinates.
    fn paper(w: usize, h: usize, xs: &[usize], ys: &[usize]) -> SampleGrid {
        let near = |v: usize, centers: &[usize]| centers.iter().any(|&c| v + 1 >= c && v <= c + 1);
        SampleGrid::from_fn(w, h, 1, |x, y, _| if near(x, xs) || near(y, ys) { 0.05 } else { 0.95 })
            .unwrap()
    }

    #[test]
    fn rejects_invalid_params() {
        let mut params = GridDetectorParams::default();
        params.threshold.num_bins = 0;
        assert!(GridDetector::new(params).is_err());
    }

    #[test]
    fn blank_paper_yields_no_lines() {
        let detector = GridDetector::new(GridDetectorParams::default()).unwrap();
        let image = SampleGrid::from_vec(40, 30, 1, vec![0.9; 1200]).unwrap();
        let res = detector.detect(&image).unwrap();
        assert_eq!(res.threshold, Some(0.0));
        assert!(res.vertical.is_empty());
        assert!(res.horizontal.is_empty());
        assert_eq!(res.spacing.period(), None);
    }

    #[test]
    fn detects_both_families_on_square_paper() {
        let detector = GridDetector::new(GridDetectorParams::default()).unwrap();
        let image = paper(90, 90, &[15, 45, 75], &[15, 45, 75]);
        let res = detector.detect(&image).unwrap();

        for axis in Axis::ALL {
            let lines = &res.axis(axis).canonical;
            assert_eq!(lines.len(), 3, "{axis:?}: {lines:?}");
            for (line, expected) in lines.iter().zip([15, 45, 75]) {
                assert!((line.lower - expected).abs() <= 1, "{line:?}");
                assert!((line.upper - expected).abs() <= 1, "{line:?}");
            }
            assert!(res.axis(axis).interpolated.is_empty());
        }
        let period = res.spacing.period().unwrap();
        assert!((period - 30.0).abs() <= 1.0, "period {period}");
    }

    #[test]
    fn single_family_without_period_is_not_extended() {
        let params = GridDetectorParams {
            spacing: SpacingParams { tolerance: 10.0 },
            smoothing: SmoothingKernel::Identity,
            ..GridDetectorParams::default()
        };
        let detector = GridDetector::new(params).unwrap();
        let image = paper(60, 60, &[30], &[]);
        let res = detector.detect(&image).unwrap();
        assert_eq!(res.vertical.canonical.len(), 1);
        assert!((res.vertical.canonical[0].lower - 30).abs() <= 1);
        assert_eq!(res.spacing.period(), None);
        assert!(res.vertical.before.is_empty() && res.vertical.after.is_empty());
    }

    #[test]
    fn render_draws_every_family() {
        let detector = GridDetector::new(GridDetectorParams::default()).unwrap();
        let image = paper(90, 90, &[15, 45, 75], &[15, 45, 75]);
        let res = detector.detect(&image).unwrap();
        let out = res.render(None, &Default::default()).unwrap();
        assert_eq!((out.width(), out.height(), out.channels()), (90, 90, 3));
        let c = res.vertical.canonical[1];
        assert_eq!(out.get(c.lower, 0, 0), Some(1.0));
        let r = res.horizontal.canonical[0];
        assert_eq!(out.get(0, r.lower, 0), Some(1.0));
        assert_eq!(out.get(30, 30, 0), Some(0.0));

        let only_vertical = res.render_axis(Axis::Vertical, &Default::default()).unwrap();
        assert_eq!(only_vertical.get(0, r.lower, 0), Some(0.0));
        assert!(res.grid_lines(Axis::Horizontal).count() >= 3);
    }
}
