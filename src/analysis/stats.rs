//! Latency statistics over plain `f64` samples.
//!
//! All helpers return `None` for an empty sample rather than a fake zero.

use std::cmp::Ordering;

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median; an even count averages the middle pair
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted(values);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Percentile with linear interpolation between closest ranks.
///
/// # Examples
/// ```
/// use dvn_analyzer::analysis::stats::percentile;
///
/// let values: Vec<f64> = (1..=100).map(f64::from).collect();
/// let p95 = percentile(&values, 95.0).unwrap();
/// assert!((p95 - 95.05).abs() < 1e-9);
/// ```
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted(values);
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Count, median, mean and p95 of one sample, as the stack tables report them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencySummary {
    pub count: usize,
    pub median: f64,
    pub mean: f64,
    pub p95: f64,
}

impl LatencySummary {
    pub fn of(values: &[f64]) -> Option<Self> {
        Some(Self {
            count: values.len(),
            median: median(values)?,
            mean: mean(values)?,
            p95: percentile(values, 95.0)?,
        })
    }
}
