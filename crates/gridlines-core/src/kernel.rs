//! Square correlation kernels and the smoothing pre-filter.

use serde::{Deserialize, Serialize};

use crate::image::{GridError, SampleGrid};

/// Square, odd-sized weight matrix stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    size: usize,
    weights: Vec<f32>,
}

impl Kernel {
    pub fn new(size: usize, weights: Vec<f32>) -> Result<Self, GridError> {
        if size == 0 || size % 2 == 0 {
            return Err(GridError::InvalidKernelSize { size });
        }
        if weights.len() != size * size {
            return Err(GridError::InvalidBuffer {
                expected: size * size,
                got: weights.len(),
            });
        }
        Ok(Self { size, weights })
    }

    pub fn identity() -> Self {
        Self {
            size: 1,
            weights: vec![1.0],
        }
    }

    /// Uniform averaging kernel (weights sum to one).
    pub fn box_filter(size: usize) -> Result<Self, GridError> {
        let n = (size * size) as f32;
        Self::new(size, vec![1.0 / n; size * size])
    }

    /// Sampled isotropic Gaussian, normalized to unit sum.
    pub fn gaussian(size: usize, sigma: f32) -> Result<Self, GridError> {
        if size == 0 || size % 2 == 0 {
            return Err(GridError::InvalidKernelSize { size });
        }
        let r = (size / 2) as f32;
        let s2 = 2.0 * sigma.max(f32::EPSILON).powi(2);
        let mut weights = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                let dx = x as f32 - r;
                let dy = y as f32 - r;
                weights.push((-(dx * dx + dy * dy) / s2).exp());
            }
        }
        let sum: f32 = weights.iter().sum();
        weights.iter_mut().for_each(|w| *w /= sum);
        Self::new(size, weights)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn weight(&self, x: usize, y: usize) -> f32 {
        self.weights[y * self.size + x]
    }
}

/// 2-D correlation of every channel of `grid` against `kernel`.
///
/// Neighbours outside the grid contribute nothing. Each output sample is the
/// weighted sum divided by `normalizing_factor`. With `flip_y` the kernel rows
/// are applied bottom-up, which matters for asymmetric kernels on images
/// stored with a bottom-left origin.
pub fn convolve(grid: &SampleGrid, kernel: &Kernel, normalizing_factor: f32, flip_y: bool) -> SampleGrid {
    let n = kernel.size();
    let half = (n / 2) as i32;
    let mut out = grid.clone();

    for y in 0..grid.height() as i32 {
        for x in 0..grid.width() as i32 {
            for c in 0..grid.channels() {
                let mut acc = 0.0f32;
                for ky in 0..n {
                    let ry = if flip_y { n - 1 - ky } else { ky };
                    let sy = y + ry as i32 - half;
                    for kx in 0..n {
                        let sx = x + kx as i32 - half;
                        if let Some(v) = grid.get(sx, sy, c) {
                            acc += v * kernel.weight(kx, ky);
                        }
                    }
                }
                out.set(x, y, c, acc / normalizing_factor);
            }
        }
    }
    out
}

/// Smoothing applied to the greyscale image before binarization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SmoothingKernel {
    #[default]
    Identity,
    Box {
        size: usize,
    },
    Gaussian {
        size: usize,
        sigma: f32,
    },
}

impl SmoothingKernel {
    pub fn build(&self) -> Result<Kernel, GridError> {
        match *self {
            SmoothingKernel::Identity => Ok(Kernel::identity()),
            SmoothingKernel::Box { size } => Kernel::box_filter(size),
            SmoothingKernel::Gaussian { size, sigma } => Kernel::gaussian(size, sigma),
        }
    }

    /// Smooth `grid`. `Identity` returns a copy without touching samples.
    pub fn apply(&self, grid: &SampleGrid) -> Result<SampleGrid, GridError> {
        if matches!(self, SmoothingKernel::Identity) {
            return Ok(grid.clone());
        }
        let kernel = self.build()?;
        Ok(convolve(grid, &kernel, 1.0, false))
    }
}
