//! Image file decoding/encoding through the `image` crate.
//!
//! Samples are floats in `[0, 1]`; files are read at any bit depth and
//! written as 8 bits per channel. The format is picked from the extension.

use std::fs;
use std::path::Path;

use gridlines_core::{GridError, SampleGrid};
use image::{DynamicImage, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};
use log::debug;

#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("cannot encode {channels}-channel grid (supported: 1 to 4)")]
    UnsupportedChannels { channels: usize },

    #[error("grid of {width}x{height} does not fit an image buffer")]
    TooLarge { width: usize, height: usize },
}

/// Decode an image file, keeping its channel count (1 to 4).
pub fn load_sample_grid(path: impl AsRef<Path>) -> Result<SampleGrid, CodecError> {
    let path = path.as_ref();
    let img = image::open(path)?;
    let grid = from_dynamic(&img)?;
    debug!(
        "loaded {} ({}x{}, {} channels)",
        path.display(),
        grid.width(),
        grid.height(),
        grid.channels()
    );
    Ok(grid)
}

/// Convert a decoded image to float samples.
pub fn from_dynamic(img: &DynamicImage) -> Result<SampleGrid, CodecError> {
    let (w, h) = (img.width() as usize, img.height() as usize);
    let (channels, data) = match img.color().channel_count() {
        1 => (1, img.to_luma32f().into_raw()),
        2 => (2, img.to_luma_alpha32f().into_raw()),
        3 => (3, img.to_rgb32f().into_raw()),
        _ => (4, img.to_rgba32f().into_raw()),
    };
    Ok(SampleGrid::from_vec(w, h, channels, data)?)
}

/// Quantize a grid to an 8-bit image.
pub fn to_dynamic(grid: &SampleGrid) -> Result<DynamicImage, CodecError> {
    let (w, h) = (grid.width(), grid.height());
    let too_large = || CodecError::TooLarge { width: w, height: h };
    let (w32, h32) = (
        u32::try_from(w).map_err(|_| too_large())?,
        u32::try_from(h).map_err(|_| too_large())?,
    );
    let bytes: Vec<u8> = grid
        .data()
        .iter()
        .map(|&v| (v * 255.0).round().clamp(0.0, 255.0) as u8)
        .collect();

    let img = match grid.channels() {
        1 => GrayImage::from_raw(w32, h32, bytes).map(DynamicImage::ImageLuma8),
        2 => GrayAlphaImage::from_raw(w32, h32, bytes).map(DynamicImage::ImageLumaA8),
        3 => RgbImage::from_raw(w32, h32, bytes).map(DynamicImage::ImageRgb8),
        4 => RgbaImage::from_raw(w32, h32, bytes).map(DynamicImage::ImageRgba8),
        channels => return Err(CodecError::UnsupportedChannels { channels }),
    };
    img.ok_or_else(too_large)
}

/// Encode `grid` to `path`, creating missing parent directories.
pub fn save_sample_grid(grid: &SampleGrid, path: impl AsRef<Path>) -> Result<(), CodecError> {
    let path = path.as_ref();
    let img = to_dynamic(grid)?;
    ensure_parent_dir(path)?;
    img.save(path)?;
    debug!("wrote {}", path.display());
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
