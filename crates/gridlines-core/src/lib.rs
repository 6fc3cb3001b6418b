//! Core types and utilities for ruled-surface grid reconstruction.
//!
//! This crate is intentionally small: a dense float sample grid, square
//! correlation kernels for pre-filtering, and an integer line walker shared by
//! line detection and rendering. It does *not* decode or encode image files.

mod image;
mod kernel;
mod logger;
mod raster;

pub use image::{GridError, SampleGrid};
pub use kernel::{convolve, Kernel, SmoothingKernel};
pub use raster::{walk_line, LineWalker};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_verbosity};
