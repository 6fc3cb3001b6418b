//! Global Otsu thresholding and the two-valued mask it produces.

use gridlines_core::SampleGrid;
use log::{debug, warn};

use crate::error::GridDetectError;

/// Histogram of samples in `[0, 1]` over `num_bins` bins.
///
/// A sample `v` lands in bin `floor(v * (num_bins - 1))`; out-of-range values
/// are clamped first.
pub fn histogram(samples: &[f32], num_bins: usize) -> Vec<u64> {
    let mut hist = vec![0u64; num_bins];
    if num_bins == 0 {
        return hist;
    }
    let scale = (num_bins - 1) as f32;
    for &v in samples {
        let bin = (v.clamp(0.0, 1.0) * scale) as usize;
        hist[bin.min(num_bins - 1)] += 1;
    }
    hist
}

/// Otsu threshold of a histogram, rescaled to `[0, 1]`.
///
/// The split index `level` maximizing the between-class variance becomes
/// `level / (bins - 1)`. Splits that leave one class empty are skipped.
///
/// Every split inside a run of empty bins scores the same variance, so a
/// two-level image has a plateau of best splits between its populations.
/// The middle of that plateau is taken; the first one would sit on the
/// darker population's bin and put it in the foreground.
///
/// When every split is degenerate (all samples in one bin) the threshold is
/// `0.0`: everything is foreground.
pub fn otsu_threshold_from_histogram(hist: &[u64]) -> f32 {
    let bins = hist.len();
    let total: u64 = hist.iter().sum();
    if bins < 2 || total == 0 {
        return 0.0;
    }
    let n = total as f64;

    // Cumulative probability and probability-weighted bin index.
    let mut count = vec![0u64; bins];
    let mut sum_p = vec![0f64; bins];
    let mut sum_pi = vec![0f64; bins];
    let (mut c_acc, mut p_acc, mut pi_acc) = (0u64, 0f64, 0f64);
    for (i, &h) in hist.iter().enumerate() {
        c_acc += h;
        p_acc += h as f64 / n;
        pi_acc += i as f64 * h as f64 / n;
        count[i] = c_acc;
        sum_p[i] = p_acc;
        sum_pi[i] = pi_acc;
    }
    let mu_t = sum_pi[bins - 1];

    // (first, last, variance) of the best run of equal-scoring splits.
    let mut best: Option<(usize, usize, f64)> = None;
    let mut on_plateau = false;
    for i in 0..bins {
        if count[i] == 0 || count[i] == total {
            continue;
        }
        let w0 = sum_p[i];
        let w1 = (total - count[i]) as f64 / n;
        let mu0 = sum_pi[i] / w0;
        let mu1 = (mu_t - sum_pi[i]) / w1;
        let var_between = w0 * w1 * (mu0 - mu1) * (mu0 - mu1);
        match best {
            Some((first, _, v)) if var_between == v => {
                if on_plateau {
                    best = Some((first, i, v));
                }
            }
            Some((_, _, v)) if var_between < v => on_plateau = false,
            _ => {
                best = Some((i, i, var_between));
                on_plateau = true;
            }
        }
    }

    match best {
        Some((first, last, _)) => ((first + last) / 2) as f32 / (bins - 1) as f32,
        None => {
            warn!("uniform histogram ({total} samples), treating every pixel as foreground");
            0.0
        }
    }
}

/// Otsu threshold of a single-channel grid.
pub fn otsu_threshold(grey: &SampleGrid, num_bins: usize) -> f32 {
    let hist = histogram(grey.data(), num_bins);
    let t = otsu_threshold_from_histogram(&hist);
    debug!("otsu threshold {t:.4} over {num_bins} bins");
    t
}

/// Single-channel grid with samples restricted to `{0.0, 1.0}`.
#[derive(Clone, Debug, PartialEq)]
pub struct BinaryMask {
    grid: SampleGrid,
}

impl BinaryMask {
    /// Mark samples `>= threshold` as on. Multi-channel input is reduced to
    /// greyscale first.
    pub fn from_threshold(grey: &SampleGrid, threshold: f32) -> Self {
        let reduced;
        let src = if grey.channels() == 1 {
            grey
        } else {
            reduced = grey.to_greyscale();
            &reduced
        };
        let mut grid = src.clone();
        for (dst, &v) in grid.data_mut().iter_mut().zip(src.data()) {
            *dst = if v >= threshold { 1.0 } else { 0.0 };
        }
        Self { grid }
    }

    /// Adopt an existing grid, checking it is single-channel and two-valued.
    pub fn from_grid(grid: SampleGrid) -> Result<Self, GridDetectError> {
        if grid.channels() != 1 {
            return Err(GridDetectError::InvalidParams(format!(
                "mask must have one channel (got {})",
                grid.channels()
            )));
        }
        if let Some((index, &value)) = grid
            .data()
            .iter()
            .enumerate()
            .find(|(_, &v)| v != 0.0 && v != 1.0)
        {
            return Err(GridDetectError::NotBinary { index, value });
        }
        Ok(Self { grid })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// True for foreground pixels; out-of-bounds pixels are off.
    #[inline]
    pub fn is_on(&self, x: i32, y: i32) -> bool {
        self.grid.get(x, y, 0) == Some(1.0)
    }

    pub fn count_on(&self) -> usize {
        self.grid.data().iter().filter(|&&v| v == 1.0).count()
    }

    pub fn as_grid(&self) -> &SampleGrid {
        &self.grid
    }

    pub fn into_grid(self) -> SampleGrid {
        self.grid
    }
}

/// Threshold `grey` with Otsu's method.
pub fn binarize(grey: &SampleGrid, num_bins: usize) -> (BinaryMask, f32) {
    let threshold = otsu_threshold(grey, num_bins);
    (BinaryMask::from_threshold(grey, threshold), threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn two_level(dark: f32, bright: f32) -> SampleGrid {
        SampleGrid::from_fn(10, 10, 1, |x, _, _| if x < 3 { dark } else { bright }).unwrap()
    }

    #[test]
    fn histogram_places_extremes_in_end_bins() {
        let h = histogram(&[0.0, 1.0, 1.0, 0.5, 2.0, -1.0], 11);
        assert_eq!(h[0], 2);
        assert_eq!(h[5], 1);
        assert_eq!(h[10], 3);
    }

    #[test]
    fn black_and_white_split_between_levels() {
        let grey = two_level(0.0, 1.0);
        let t = otsu_threshold(&grey, 1000);
        assert!(t > 0.0 && t <= 1.0, "t = {t}");
        let mask = BinaryMask::from_threshold(&grey, t);
        assert_eq!(mask.count_on(), 70);
        assert!(!mask.is_on(0, 0));
        assert!(mask.is_on(9, 9));
    }

    #[test]
    fn mid_grey_levels_are_separated() {
        let grey = two_level(0.2, 0.7);
        let t = otsu_threshold(&grey, 256);
        assert!(t > 0.2 && t <= 0.7, "t = {t}");
    }

    #[test]
    fn threshold_is_deterministic() {
        let grey = SampleGrid::from_fn(17, 13, 1, |x, y, _| ((x * 7 + y * 3) % 11) as f32 / 10.0)
            .unwrap();
        let a = otsu_threshold(&grey, 1000);
        let b = otsu_threshold(&grey, 1000);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn uniform_image_falls_back_to_all_foreground() {
        let grey = SampleGrid::from_vec(4, 4, 1, vec![0.6; 16]).unwrap();
        let t = otsu_threshold(&grey, 1000);
        assert_abs_diff_eq!(t, 0.0);
        assert_eq!(BinaryMask::from_threshold(&grey, t).count_on(), 16);
    }

    #[test]
    fn empty_and_tiny_histograms_do_not_panic() {
        assert_eq!(otsu_threshold_from_histogram(&[]), 0.0);
        assert_eq!(otsu_threshold_from_histogram(&[0, 0, 0]), 0.0);
        assert_eq!(otsu_threshold_from_histogram(&[5, 5]), 0.0);
    }

    #[test]
    fn threshold_is_the_best_split_over_bins_minus_one() {
        // Split 1 beats split 0; split 2 ties it across the empty bin.
        assert_abs_diff_eq!(otsu_threshold_from_histogram(&[10, 10, 0, 10]), 1.0 / 3.0);
        // Split 2 alone is best.
        assert_abs_diff_eq!(otsu_threshold_from_histogram(&[0, 4, 6, 10, 0]), 0.5);
    }

    #[test]
    fn empty_bins_between_levels_split_in_the_middle() {
        // Splits 0, 1 and 2 score the same; the middle one is taken.
        let t = otsu_threshold_from_histogram(&[10, 0, 0, 10]);
        assert_abs_diff_eq!(t, 1.0 / 3.0);
        let grey = SampleGrid::from_vec(2, 1, 1, vec![0.0, 1.0]).unwrap();
        let mask = BinaryMask::from_threshold(&grey, t);
        assert!(!mask.is_on(0, 0));
        assert!(mask.is_on(1, 0));

        let mut hist = vec![0u64; 11];
        hist[2] = 8;
        hist[9] = 3;
        assert_abs_diff_eq!(otsu_threshold_from_histogram(&hist), 0.5);
    }

    #[test]
    fn thresholding_is_idempotent() {
        let grey = SampleGrid::from_fn(9, 9, 1, |x, y, _| ((x + 2 * y) % 5) as f32 / 4.0).unwrap();
        let (mask, t) = binarize(&grey, 1000);
        assert_eq!(BinaryMask::from_threshold(&grey, t), mask);
        assert_eq!(BinaryMask::from_threshold(mask.as_grid(), t), mask);
    }

    #[test]
    fn from_grid_rejects_non_binary_values() {
        let grid = SampleGrid::from_vec(2, 1, 1, vec![1.0, 0.5]).unwrap();
        assert!(matches!(
            BinaryMask::from_grid(grid),
            Err(GridDetectError::NotBinary { index: 1, .. })
        ));
        let ok = SampleGrid::from_vec(2, 1, 1, vec![1.0, 0.0]).unwrap();
        assert_eq!(BinaryMask::from_grid(ok).unwrap().count_on(), 1);
    }
}
