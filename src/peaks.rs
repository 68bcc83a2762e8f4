use itertools::Itertools as _;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;

/// A local maximum: a position whose value exceeds both immediate neighbours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub index: usize,
    pub value: f64,
}

/// Finds all local maxima of `series` with no constraints applied.
///
/// Series of length zero or one, and monotonic series, yield an empty result.
pub fn find_maxima(series: &[f64]) -> Vec<Peak> {
    PeakFinder::new().find(series)
}

/// Local maxima detection with optional constraints on the candidates,
/// mirroring the usual height/prominence/distance conditions of peak-finding
/// routines. By default nothing is filtered out.
#[derive(Debug, Clone, Default)]
pub struct PeakFinder {
    min_height: Option<f64>,
    min_prominence: Option<f64>,
    min_distance: Option<usize>,
}

impl PeakFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_height(mut self, height: f64) -> Self {
        self.min_height = Some(height);
        self
    }

    pub fn min_prominence(mut self, prominence: f64) -> Self {
        self.min_prominence = Some(prominence);
        self
    }

    pub fn min_distance(mut self, distance: usize) -> Self {
        self.min_distance = Some(distance);
        self
    }

    /// Returns the maxima of `series` that satisfy all constraints,
    /// ordered by index.
    pub fn find(&self, series: &[f64]) -> Vec<Peak> {
        let mut peaks: Vec<Peak> = series
            .iter()
            .copied()
            .tuple_windows()
            .enumerate()
            .filter(|&(_, (left, mid, right))| mid > left && mid > right)
            .map(|(i, (_, mid, _))| Peak {
                index: i + 1,
                value: mid,
            })
            .collect();

        if let Some(height) = self.min_height {
            peaks.retain(|p| p.value >= height);
        }
        if let Some(min) = self.min_prominence {
            peaks.retain(|p| prominence(series, p) >= min);
        }
        if let Some(distance) = self.min_distance {
            peaks = enforce_distance(peaks, distance);
        }
        peaks
    }
}

/// Height of a peak above the higher of its two bases. A base is the lowest
/// point between the peak and the nearest higher point on that side, or the
/// series edge when no higher point exists.
fn prominence(series: &[f64], peak: &Peak) -> f64 {
    let mut left_base = peak.value;
    for &v in series[..peak.index].iter().rev() {
        if v > peak.value {
            break;
        }
        left_base = left_base.min(v);
    }

    let mut right_base = peak.value;
    for &v in &series[peak.index + 1..] {
        if v > peak.value {
            break;
        }
        right_base = right_base.min(v);
    }

    peak.value - left_base.max(right_base)
}

/// Drops peaks closer than `distance` to a taller kept peak, tallest first.
fn enforce_distance(mut peaks: Vec<Peak>, distance: usize) -> Vec<Peak> {
    peaks.sort_by_key(|p| Reverse(OrderedFloat(p.value)));

    let mut kept: Vec<Peak> = Vec::with_capacity(peaks.len());
    for peak in peaks {
        if kept
            .iter()
            .all(|k| k.index.abs_diff(peak.index) >= distance)
        {
            kept.push(peak);
        }
    }
    kept.sort_by_key(|p| p.index);
    kept
}
