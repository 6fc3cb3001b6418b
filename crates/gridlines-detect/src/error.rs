use gridlines_core::GridError;

/// Errors returned by the grid detector.
#[derive(thiserror::Error, Debug)]
pub enum GridDetectError {
    #[error("invalid detector parameters: {0}")]
    InvalidParams(String),
    #[error("overlay needs at least 2 channels and line_channel < channels (channels={channels}, line_channel={line_channel})")]
    InvalidOverlay { channels: usize, line_channel: usize },
    #[error("mask samples must be 0.0 or 1.0 (found {value} at index {index})")]
    NotBinary { index: usize, value: f32 },
    #[error("background is {got_width}x{got_height}, detection ran on {width}x{height}")]
    SizeMismatch {
        width: usize,
        height: usize,
        got_width: usize,
        got_height: usize,
    },
    #[error(transparent)]
    Grid(#[from] GridError),
}
