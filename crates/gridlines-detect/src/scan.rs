//! Exhaustive candidate-line scan over the binary mask.
//!
//! Every segment joining an interior point of the first image edge with an
//! interior point of the opposite edge is walked pixel by pixel. Grid lines
//! are dark, so they are *off* in the mask; a segment lying on a line sees
//! only short runs of paper where the line is faint or occluded, while a
//! segment across open paper quickly collects a long run of *on* pixels and
//! is dropped.

use std::ops::ControlFlow;

use gridlines_core::walk_line;
use log::debug;

use crate::axis::{Axis, Endpoint};
use crate::params::ScanParams;
use crate::threshold::BinaryMask;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Walk `endpoint` on `axis` and report whether it never crosses more than
/// `max_streak` consecutive on-pixels.
pub fn follows_grid_line(mask: &BinaryMask, axis: Axis, endpoint: Endpoint, max_streak: u32) -> bool {
    let line = axis.grid_line(endpoint, mask.width(), mask.height());
    let mut streak = 0u32;
    walk_line(line.start, line.end, |p| {
        if mask.is_on(p.x, p.y) {
            streak += 1;
            if streak > max_streak {
                return ControlFlow::Break(());
            }
        } else {
            streak = 0;
        }
        ControlFlow::Continue(())
    })
    .is_continue()
}

/// Collect every accepted candidate of one line family.
///
/// Both endpoints range over the open interior `1..span-1`. The result is in
/// enumeration order and typically holds several near-duplicates per line.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(mask, params), fields(axis = axis.name()))
)]
pub fn scan_candidates(mask: &BinaryMask, axis: Axis, params: &ScanParams) -> Vec<Endpoint> {
    let span = axis.span(mask.width(), mask.height()) as i32;
    let interior = 1..(span - 1).max(1);

    let mut accepted = Vec::new();
    for lower in interior.clone() {
        for upper in interior.clone() {
            let candidate = Endpoint::new(lower, upper);
            if follows_grid_line(mask, axis, candidate, params.max_streak) {
                accepted.push(candidate);
            }
        }
    }
    debug!(
        "{} scan: {} of {} candidates accepted",
        axis.name(),
        accepted.len(),
        interior.len().pow(2)
    );
    accepted
}
