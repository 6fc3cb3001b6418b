//! Merge near-duplicate detections into one canonical line each.

use log::debug;

use crate::axis::Endpoint;
use crate::params::ClusterParams;

/// Canonical lines of one family plus their consecutive midpoint gaps.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClusteredLines {
    /// Sorted ascending by `lower`; neighbours differ by more than the
    /// cluster tolerance.
    pub lines: Vec<Endpoint>,
    /// `mid(lines[k + 1]) - mid(lines[k])` for every consecutive pair.
    pub differences: Vec<f32>,
}

/// Sort `raw` by `lower` and average runs whose consecutive `lower` gap is
/// within `params.tolerance`. Averages are truncated to integers.
pub fn cluster_endpoints(mut raw: Vec<Endpoint>, params: &ClusterParams) -> ClusteredLines {
    raw.sort_by_key(|e| e.lower);

    let mut lines = Vec::new();
    let mut iter = raw.iter();
    if let Some(first) = iter.next() {
        let (mut sum_lower, mut sum_upper, mut count) = (first.lower as i64, first.upper as i64, 1i64);
        let mut prev = first.lower;
        for e in iter {
            if e.lower - prev <= params.tolerance {
                sum_lower += e.lower as i64;
                sum_upper += e.upper as i64;
                count += 1;
            } else {
                lines.push(mean_endpoint(sum_lower, sum_upper, count));
                (sum_lower, sum_upper, count) = (e.lower as i64, e.upper as i64, 1);
            }
            prev = e.lower;
        }
        lines.push(mean_endpoint(sum_lower, sum_upper, count));
    }

    let differences = lines.windows(2).map(|w| w[1].mid() - w[0].mid()).collect();
    debug!("clustered {} raw detections into {} lines", raw.len(), lines.len());
    ClusteredLines { lines, differences }
}

fn mean_endpoint(sum_lower: i64, sum_upper: i64, count: i64) -> Endpoint {
    Endpoint::new((sum_lower / count) as i32, (sum_upper / count) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eps(pairs: &[(i32, i32)]) -> Vec<Endpoint> {
        pairs.iter().map(|&(l, u)| Endpoint::new(l, u)).collect()
    }

    #[test]
    fn empty_input_yields_no_lines() {
        let out = cluster_endpoints(Vec::new(), &ClusterParams::default());
        assert!(out.lines.is_empty());
        assert!(out.differences.is_empty());
    }

    #[test]
    fn adjacent_detections_are_averaged() {
        let raw = eps(&[(11, 12), (9, 8), (10, 10), (50, 51), (49, 49), (90, 90)]);
        let out = cluster_endpoints(raw, &ClusterParams::default());
        assert_eq!(out.lines, eps(&[(10, 10), (49, 50), (90, 90)]));
        assert_eq!(out.differences, vec![39.5, 40.5]);
    }

    #[test]
    fn chains_merge_transitively() {
        let raw = eps(&[(1, 1), (2, 2), (3, 3), (4, 4), (6, 6)]);
        let out = cluster_endpoints(raw, &ClusterParams::default());
        // 1..=4 form one chain, mean 2 (10 / 4 truncated).
        assert_eq!(out.lines, eps(&[(2, 2), (6, 6)]));
    }

    #[test]
    fn wider_tolerance_merges_more() {
        let raw = eps(&[(10, 10), (12, 12), (20, 20)]);
        assert_eq!(cluster_endpoints(raw.clone(), &ClusterParams::default()).lines.len(), 3);
        assert_eq!(cluster_endpoints(raw, &ClusterParams { tolerance: 2 }).lines.len(), 2);
    }

    #[test]
    fn output_is_sorted_and_separated() {
        // Deterministic pseudo-random detections.
        let mut state = 12345u32;
        let mut raw = Vec::new();
        for _ in 0..500 {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12345);
            let lower = ((state >> 8) % 2000) as i32 + 1;
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12345);
            let upper = ((state >> 8) % 200) as i32 + 1;
            raw.push(Endpoint::new(lower, upper));
        }
        let out = cluster_endpoints(raw, &ClusterParams::default());
        for w in out.lines.windows(2) {
            assert!(w[1].lower - w[0].lower > 1, "{:?}", w);
        }
        assert_eq!(out.differences.len(), out.lines.len().saturating_sub(1));
    }
}
