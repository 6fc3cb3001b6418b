//! Render reconstructed lines into a sample grid.

use gridlines_core::{LineWalker, SampleGrid};
use serde::{Deserialize, Serialize};

use crate::axis::GridLine;
use crate::error::GridDetectError;

/// Output layout for rendered grids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayParams {
    /// Channels of the output grid; at least 2.
    pub channels: usize,
    /// Channel set to `1.0` under every line.
    pub line_channel: usize,
    /// Copy the greyscale input into every channel before drawing.
    pub background: bool,
}

impl Default for OverlayParams {
    fn default() -> Self {
        Self {
            channels: 3,
            line_channel: 0,
            background: false,
        }
    }
}

impl OverlayParams {
    pub fn validate(&self) -> Result<(), GridDetectError> {
        if self.channels < 2 || self.line_channel >= self.channels {
            return Err(GridDetectError::InvalidOverlay {
                channels: self.channels,
                line_channel: self.line_channel,
            });
        }
        Ok(())
    }
}

/// Set `channel` to `1.0` on every in-bounds pixel of every line.
///
/// Overlapping lines saturate; nothing accumulates.
pub fn draw_lines<I>(target: &mut SampleGrid, lines: I, channel: usize)
where
    I: IntoIterator<Item = GridLine>,
{
    for line in lines {
        for p in LineWalker::new(line.start, line.end) {
            target.set(p.x, p.y, channel, 1.0);
        }
    }
}

/// Allocate the output grid for `params`, optionally seeded with `grey`.
pub fn overlay_canvas(
    width: usize,
    height: usize,
    grey: Option<&SampleGrid>,
    params: &OverlayParams,
) -> Result<SampleGrid, GridDetectError> {
    params.validate()?;
    match grey {
        Some(grey) if params.background => {
            if grey.width() != width || grey.height() != height {
                return Err(GridDetectError::SizeMismatch {
                    width,
                    height,
                    got_width: grey.width(),
                    got_height: grey.height(),
                });
            }
            Ok(grey.to_greyscale().broadcast(params.channels)?)
        }
        _ => Ok(SampleGrid::new(width, height, params.channels)?),
    }
}
