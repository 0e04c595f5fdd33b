use std::time::Duration;

use super::RateSummary;

const BITS_PER_BYTE: f64 = 8.0;

/// One plotted bin: start time since flow start and its rate in bits/s.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RatePoint {
    pub index: usize,
    pub time: f64,
    pub rate: f64,
}

/// Mean rate and coefficient of variation over the complete bins.
///
/// The last bin is partial and dropped; a series without a complete bin
/// reports zero rate and zero variation, as does a zero mean for the cv.
#[must_use]
pub fn rate_summary(sizes: &[u64], interval: Duration) -> RateSummary {
    let seconds = interval.as_secs_f64();
    let Some((_, complete)) = sizes.split_last() else {
        return RateSummary::default();
    };
    if complete.is_empty() || seconds <= 0.0 {
        return RateSummary::default();
    }

    let count = complete.len() as f64;
    let rates = complete.iter().map(|size| bin_rate(*size, seconds));
    let mean = rates.clone().sum::<f64>() / count;
    let variance = rates
        .map(|rate| {
            let delta = rate - mean;
            delta * delta
        })
        .sum::<f64>()
        / count;
    let cv = if mean > 0.0 {
        variance.sqrt() / mean
    } else {
        0.0
    };

    RateSummary { rate: mean, cv }
}

/// Every bin, including the trailing partial one, as a rate point.
#[must_use]
pub fn rate_points(sizes: &[u64], interval: Duration) -> Vec<RatePoint> {
    let seconds = interval.as_secs_f64();
    if seconds <= 0.0 {
        return Vec::new();
    }
    sizes
        .iter()
        .enumerate()
        .map(|(index, size)| RatePoint {
            index,
            time: seconds * index as f64,
            rate: bin_rate(*size, seconds),
        })
        .collect()
}

fn bin_rate(size: u64, seconds: f64) -> f64 {
    size as f64 * BITS_PER_BYTE / seconds
}
