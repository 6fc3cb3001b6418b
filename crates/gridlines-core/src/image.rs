/// Errors raised when constructing or indexing sample grids and kernels.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("invalid grid dimensions (width={width}, height={height}, channels={channels})")]
    InvalidDimensions {
        width: usize,
        height: usize,
        channels: usize,
    },

    #[error("invalid sample buffer length (expected {expected} samples, got {got})")]
    InvalidBuffer { expected: usize, got: usize },

    #[error("channel {channel} out of range for a {channels}-channel grid")]
    ChannelOutOfRange { channel: usize, channels: usize },

    #[error("kernel size must be odd and non-zero (got {size})")]
    InvalidKernelSize { size: usize },
}

/// Dense grid of `f32` samples in `[0, 1]`.
///
/// Storage is row-major with interleaved channels: the samples of one pixel
/// are contiguous, so sample `(x, y, c)` lives at `channels * (y * width + x) + c`.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleGrid {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<f32>,
}

impl SampleGrid {
    /// Allocate a zero-filled grid.
    pub fn new(width: usize, height: usize, channels: usize) -> Result<Self, GridError> {
        let len = checked_len(width, height, channels)?;
        Ok(Self {
            width,
            height,
            channels,
            data: vec![0.0; len],
        })
    }

    /// Wrap an existing sample buffer, validating its length.
    pub fn from_vec(
        width: usize,
        height: usize,
        channels: usize,
        data: Vec<f32>,
    ) -> Result<Self, GridError> {
        let expected = checked_len(width, height, channels)?;
        if data.len() != expected {
            return Err(GridError::InvalidBuffer {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Build a grid by evaluating `f(x, y, c)` for every sample.
    pub fn from_fn<F>(width: usize, height: usize, channels: usize, mut f: F) -> Result<Self, GridError>
    where
        F: FnMut(usize, usize, usize) -> f32,
    {
        let mut grid = Self::new(width, height, channels)?;
        for y in 0..height {
            for x in 0..width {
                for c in 0..channels {
                    let idx = grid.index(x, y, c);
                    grid.data[idx] = f(x, y, c);
                }
            }
        }
        Ok(grid)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Flat index of sample `(x, y, c)`. The caller guarantees bounds.
    #[inline]
    pub fn index(&self, x: usize, y: usize, c: usize) -> usize {
        self.channels * (y * self.width + x) + c
    }

    /// True when `(x, y)` is a pixel of the grid.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Sample at `(x, y, c)`; `None` outside the grid or channel range.
    #[inline]
    pub fn get(&self, x: i32, y: i32, c: usize) -> Option<f32> {
        if c >= self.channels || !self.contains(x, y) {
            return None;
        }
        Some(self.data[self.index(x as usize, y as usize, c)])
    }

    /// Write `value` at `(x, y, c)`; returns `false` when out of bounds.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, c: usize, value: f32) -> bool {
        if c >= self.channels || !self.contains(x, y) {
            return false;
        }
        let idx = self.index(x as usize, y as usize, c);
        self.data[idx] = value;
        true
    }

    /// Reduce to a single channel.
    ///
    /// Single-channel grids are copied. Grids with three or more channels
    /// average the first three; a grey+alpha pair keeps the grey channel.
    pub fn to_greyscale(&self) -> SampleGrid {
        if self.channels == 1 {
            return self.clone();
        }
        let used = if self.channels >= 3 { 3 } else { 1 };
        let data = self
            .data
            .chunks_exact(self.channels)
            .map(|px| px[..used].iter().sum::<f32>() / used as f32)
            .collect();
        SampleGrid {
            width: self.width,
            height: self.height,
            channels: 1,
            data,
        }
    }

    /// Expand a single-channel grid into `channels` identical channels.
    pub fn broadcast(&self, channels: usize) -> Result<SampleGrid, GridError> {
        if self.channels != 1 {
            return Err(GridError::InvalidDimensions {
                width: self.width,
                height: self.height,
                channels: self.channels,
            });
        }
        let len = checked_len(self.width, self.height, channels)?;
        let mut data = Vec::with_capacity(len);
        for &v in &self.data {
            data.extend(std::iter::repeat_n(v, channels));
        }
        Ok(SampleGrid {
            width: self.width,
            height: self.height,
            channels,
            data,
        })
    }
}

fn checked_len(width: usize, height: usize, channels: usize) -> Result<usize, GridError> {
    let invalid = GridError::InvalidDimensions {
        width,
        height,
        channels,
    };
    if width == 0 || height == 0 || channels == 0 {
        return Err(invalid);
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .ok_or(invalid)
}
