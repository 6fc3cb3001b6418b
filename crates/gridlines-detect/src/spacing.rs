//! Grid period estimation from consecutive-line gaps.
//!
//! Gaps between detected neighbours are either one grid cell or a multiple of
//! it (when lines in between were missed). Sorting the gaps and clustering
//! nearby values separates those populations; the smallest cluster mean is
//! the fundamental period.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::params::SpacingParams;

/// Smallest gap, in pixels, accepted as a grid period.
///
/// Gaps below it come from crossing or coincident lines, never from two
/// distinct rules.
pub const MIN_PERIOD: f32 = 1.0;

/// One group of similar gaps.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpacingCluster {
    pub mean: f32,
    pub count: usize,
}

/// Estimated grid period and the evidence it was picked from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpacingEstimate {
    /// Smallest cluster mean, or `upper_bound` when nothing clustered.
    pub value: f32,
    /// `max(width, height)`; no real period can reach it.
    pub upper_bound: f32,
    pub clusters: Vec<SpacingCluster>,
}

impl SpacingEstimate {
    /// The period, if one was actually observed.
    pub fn period(&self) -> Option<f32> {
        (self.value >= MIN_PERIOD && self.value < self.upper_bound).then_some(self.value)
    }
}

/// Estimate the period from pooled midpoint differences of both families.
pub fn estimate_spacing(
    differences: &[f32],
    width: usize,
    height: usize,
    params: &SpacingParams,
) -> SpacingEstimate {
    let upper_bound = width.max(height) as f32;
    let mut sorted: Vec<f32> = differences
        .iter()
        .copied()
        .filter(|d| d.is_finite() && *d >= MIN_PERIOD)
        .collect();
    if sorted.len() < differences.len() {
        debug!(
            "dropped {} gaps below {MIN_PERIOD} px",
            differences.len() - sorted.len()
        );
    }
    sorted.sort_by(f32::total_cmp);
    // The bound closes the last real cluster and is never closed itself.
    sorted.push(upper_bound);

    let mut clusters = Vec::new();
    let mut value = upper_bound;
    let (mut mean, mut count) = (sorted[0], 1usize);
    for w in sorted.windows(2) {
        let (prev, next) = (w[0], w[1]);
        if next - prev <= params.tolerance {
            count += 1;
            mean += (next - mean) / count as f32;
        } else {
            clusters.push(SpacingCluster { mean, count });
            value = value.min(mean);
            (mean, count) = (next, 1);
        }
    }

    if clusters.is_empty() {
        warn!("no line gaps observed, grid period unknown");
    } else {
        debug!("spacing {value:.2} from {} gap clusters", clusters.len());
    }
    SpacingEstimate {
        value,
        upper_bound,
        clusters,
    }
}
