//! Fill in grid lines the detector missed.
//!
//! Interpolation inserts lines between canonical neighbours whose gap spans
//! several periods; extrapolation continues the period past the first and
//! last canonical line until it leaves the image. Lines are described by
//! midpoint and slope (`length / (upper - lower)`), so slanted families are
//! interpolated smoothly and axis-parallel ones keep an infinite slope.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::axis::Endpoint;
use crate::spacing::MIN_PERIOD;

/// Lines synthesized for one family.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Reconstruction {
    pub interpolated: Vec<Endpoint>,
    /// Stepping backward from the first canonical line, nearest first.
    pub before: Vec<Endpoint>,
    /// Stepping forward from the last canonical line, nearest first.
    pub after: Vec<Endpoint>,
}

/// Number of lines missing strictly between two midpoints `gap` apart.
#[inline]
pub fn missing_between(gap: f32, spacing: f32) -> usize {
    if !usable(spacing) {
        return 0;
    }
    let n = (gap / spacing).round() - 1.0;
    if n.is_finite() && n > 0.0 {
        n as usize
    } else {
        0
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    // Keeps infinite slopes infinite instead of producing NaN.
    a * (1.0 - t) + b * t
}

/// Lines inserted between each pair of adjacent canonical lines.
pub fn interpolate(lines: &[Endpoint], spacing: f32, length: f32) -> Vec<Endpoint> {
    if !usable(spacing) {
        return Vec::new();
    }
    let mut out = Vec::new();
    for pair in lines.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let gap = missing_between(b.mid() - a.mid(), spacing);
        let (slope_a, slope_b) = (a.slope(length), b.slope(length));
        for k in 1..=gap {
            let t = k as f32 / (gap + 1) as f32;
            let mid = lerp(a.mid(), b.mid(), t);
            let slope = lerp(slope_a, slope_b, t);
            out.push(Endpoint::from_mid_slope(mid, slope, length));
        }
    }
    out
}

/// Lines continuing from `from` in steps of `step` (negative steps walk
/// backward) until one lies entirely outside `[0, span - 1]`.
///
/// The terminating out-of-range line is included, so the result ends just
/// past the image border. Steps shorter than [`MIN_PERIOD`] yield nothing.
pub fn extrapolate(from: Endpoint, step: f32, span: usize, length: f32) -> Vec<Endpoint> {
    if !usable(step.abs()) {
        return Vec::new();
    }
    let slope = from.slope(length);
    let start = from.mid();
    // Enough steps to carry both ends past either border.
    let reach = span as f32 + from.upper.abs_diff(from.lower) as f32 + start.abs() + 2.0;
    let max_steps = (reach / step.abs()).ceil() as usize + 1;

    let mut out = Vec::new();
    for k in 1..=max_steps {
        let line = Endpoint::from_mid_slope(start + k as f32 * step, slope, length);
        out.push(line);
        if line.is_beyond(span) {
            break;
        }
    }
    out
}

/// Interpolate and extrapolate one family.
///
/// `span` is the number of positions across the family and `length` the
/// extent along it. An empty `lines` or an unusable spacing yields nothing.
pub fn reconstruct(lines: &[Endpoint], spacing: f32, span: usize, length: usize) -> Reconstruction {
    let (Some(first), Some(last)) = (lines.first(), lines.last()) else {
        return Reconstruction::default();
    };
    if !usable(spacing) {
        debug!("spacing {spacing} unusable, skipping reconstruction");
        return Reconstruction::default();
    }
    let length = length as f32;
    let rec = Reconstruction {
        interpolated: interpolate(lines, spacing, length),
        before: extrapolate(*first, -spacing, span, length),
        after: extrapolate(*last, spacing, span, length),
    };
    debug!(
        "reconstructed {} interpolated, {} + {} extrapolated lines",
        rec.interpolated.len(),
        rec.before.len(),
        rec.after.len()
    );
    rec
}

#[inline]
fn usable(spacing: f32) -> bool {
    spacing.is_finite() && spacing >= MIN_PERIOD
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight(x: i32) -> Endpoint {
        Endpoint::new(x, x)
    }

    #[test]
    fn count_law() {
        assert_eq!(missing_between(40.0, 40.0), 0);
        assert_eq!(missing_between(59.0, 40.0), 0);
        assert_eq!(missing_between(61.0, 40.0), 1);
        assert_eq!(missing_between(80.0, 40.0), 1);
        assert_eq!(missing_between(160.0, 40.0), 3);
        assert_eq!(missing_between(-80.0, 40.0), 0);
        assert_eq!(missing_between(10.0, 0.0), 0);
        assert_eq!(missing_between(1.0, 3.7e-9), 0);
        assert_eq!(missing_between(f32::MAX, 0.5), 0);
    }

    #[test]
    fn interpolates_evenly_between_straight_lines() {
        let lines = [straight(10), straight(90)];
        assert_eq!(interpolate(&lines, 40.0, 100.0), vec![straight(50)]);
        assert_eq!(
            interpolate(&lines, 20.0, 100.0),
            vec![straight(30), straight(50), straight(70)]
        );
        assert!(interpolate(&lines, 80.0, 100.0).is_empty());
    }

    #[test]
    fn interpolates_slope_between_slanted_lines() {
        // Both lines lean by 10 px over the length; the inserted one does too.
        let lines = [Endpoint::new(10, 20), Endpoint::new(90, 100)];
        assert_eq!(interpolate(&lines, 40.0, 100.0), vec![Endpoint::new(50, 60)]);
    }

    #[test]
    fn extrapolation_stops_after_leaving_the_image() {
        let before = extrapolate(straight(10), -40.0, 100, 100.0);
        assert_eq!(before, vec![straight(-30)]);
        let after = extrapolate(straight(90), 40.0, 100, 100.0);
        assert_eq!(after, vec![straight(130)]);

        let after = extrapolate(straight(30), 20.0, 100, 100.0);
        assert_eq!(after, vec![straight(50), straight(70), straight(90), straight(110)]);
    }

    #[test]
    fn extrapolation_boundary_law_for_slanted_lines() {
        let span = 120;
        let seed = Endpoint::new(40, 70);
        for step in [-17.0f32, 17.0] {
            let lines = extrapolate(seed, step, span, 100.0);
            let last = *lines.last().unwrap();
            assert!(last.is_beyond(span));
            let prev = if lines.len() >= 2 { lines[lines.len() - 2] } else { seed };
            let inside = |v: i32| (0..span as i32).contains(&v);
            assert!(inside(prev.lower) || inside(prev.upper), "{prev:?}");
        }
    }

    #[test]
    fn degenerate_inputs_produce_nothing() {
        assert_eq!(reconstruct(&[], 40.0, 100, 100), Reconstruction::default());
        let lines = [straight(10), straight(90)];
        for spacing in [0.0, -5.0, 3.7e-9, 0.5, f32::NAN, f32::INFINITY] {
            assert_eq!(reconstruct(&lines, spacing, 100, 100), Reconstruction::default());
        }
    }

    #[test]
    fn single_line_still_extrapolates() {
        let rec = reconstruct(&[straight(50)], 30.0, 100, 100);
        assert!(rec.interpolated.is_empty());
        assert_eq!(rec.before, vec![straight(20), straight(-10)]);
        assert_eq!(rec.after, vec![straight(80), straight(110)]);
    }

    #[test]
    fn tiny_steps_are_not_extrapolated() {
        assert!(extrapolate(straight(10), 3.7e-9, 2000, 2000.0).is_empty());
        assert!(extrapolate(straight(10), -0.25, 2000, 2000.0).is_empty());
    }

    #[test]
    fn unit_step_walks_to_the_border_and_stops() {
        let after = extrapolate(straight(10), 1.0, 2000, 2000.0);
        assert_eq!(after.len(), 1990);
        assert_eq!(after.last(), Some(&straight(2000)));
        let before = extrapolate(straight(10), -1.0, 2000, 2000.0);
        assert_eq!(before.len(), 11);
        assert_eq!(before.last(), Some(&straight(-1)));
    }

    #[test]
    fn far_away_seed_terminates() {
        // Both ends already past the border: one step, then stop.
        let after = extrapolate(straight(5000), 1.0, 100, 100.0);
        assert_eq!(after, vec![straight(5001)]);
        let steep = extrapolate(Endpoint::new(-40, 60), 1.0, 50, 100.0);
        assert!(steep.last().unwrap().is_beyond(50));
        assert!(steep.len() < 200);
    }
}
