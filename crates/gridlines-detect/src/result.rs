use gridlines_core::SampleGrid;
use serde::{Deserialize, Serialize};

use crate::axis::{Axis, Endpoint, GridLine};
use crate::compose::{draw_lines, overlay_canvas, OverlayParams};
use crate::error::GridDetectError;
use crate::reconstruct::Reconstruction;
use crate::spacing::SpacingEstimate;

/// Detected and reconstructed lines of one family.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisLines {
    pub axis: Axis,
    /// Accepted scan candidates before clustering.
    pub raw_candidates: usize,
    /// One merged line per detected grid line, sorted by `lower`.
    pub canonical: Vec<Endpoint>,
    pub interpolated: Vec<Endpoint>,
    /// Extrapolated before the first canonical line, nearest first.
    pub before: Vec<Endpoint>,
    /// Extrapolated after the last canonical line, nearest first.
    pub after: Vec<Endpoint>,
}

impl AxisLines {
    pub fn new(axis: Axis, raw_candidates: usize, canonical: Vec<Endpoint>, rec: Reconstruction) -> Self {
        Self {
            axis,
            raw_candidates,
            canonical,
            interpolated: rec.interpolated,
            before: rec.before,
            after: rec.after,
        }
    }

    /// Canonical, interpolated, then extrapolated lines (before, after).
    pub fn all(&self) -> impl Iterator<Item = Endpoint> + '_ {
        self.canonical
            .iter()
            .chain(&self.interpolated)
            .chain(&self.before)
            .chain(&self.after)
            .copied()
    }

    pub fn len(&self) -> usize {
        self.canonical.len() + self.interpolated.len() + self.before.len() + self.after.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Output of a grid detection run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridDetectionResult {
    pub width: usize,
    pub height: usize,
    /// Otsu threshold, when the detector binarized the image itself.
    pub threshold: Option<f32>,
    pub spacing: SpacingEstimate,
    pub vertical: AxisLines,
    pub horizontal: AxisLines,
}

impl GridDetectionResult {
    pub fn axis(&self, axis: Axis) -> &AxisLines {
        match axis {
            Axis::Vertical => &self.vertical,
            Axis::Horizontal => &self.horizontal,
        }
    }

    /// Every line of `axis` as a pixel segment.
    pub fn grid_lines(&self, axis: Axis) -> impl Iterator<Item = GridLine> + '_ {
        let (w, h) = (self.width, self.height);
        self.axis(axis).all().map(move |e| axis.grid_line(e, w, h))
    }

    /// Composite both families into a fresh grid.
    ///
    /// `grey` is only used when `params.background` is set.
    pub fn render(
        &self,
        grey: Option<&SampleGrid>,
        params: &OverlayParams,
    ) -> Result<SampleGrid, GridDetectError> {
        let mut canvas = overlay_canvas(self.width, self.height, grey, params)?;
        for axis in Axis::ALL {
            draw_lines(&mut canvas, self.grid_lines(axis), params.line_channel);
        }
        Ok(canvas)
    }

    /// Render only the canonical (detected) lines of one family.
    pub fn render_axis(&self, axis: Axis, params: &OverlayParams) -> Result<SampleGrid, GridDetectError> {
        let mut canvas = overlay_canvas(self.width, self.height, None, params)?;
        let (w, h) = (self.width, self.height);
        let lines = self.axis(axis).canonical.iter().map(|&e| axis.grid_line(e, w, h));
        draw_lines(&mut canvas, lines, params.line_channel);
        Ok(canvas)
    }
}
