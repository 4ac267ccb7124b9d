//! Summary statistics over samples of NPC or demand.

use serde::Serialize;

/// Percentile by linear interpolation between order statistics.
///
/// `q` is in percent. Returns NaN for an empty sample.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = (q / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let weight = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * weight
        }
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let m = mean(values);
    (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Distribution summary of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub p5: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
}

impl Summary {
    pub fn from_values(values: &[f64]) -> Self {
        let sorted = sorted(values);
        Self {
            count: values.len(),
            mean: mean(values),
            std: std_dev(values),
            min: sorted.first().copied().unwrap_or(f64::NAN),
            max: sorted.last().copied().unwrap_or(f64::NAN),
            p5: percentile(&sorted, 5.0),
            p25: percentile(&sorted, 25.0),
            p50: percentile(&sorted, 50.0),
            p75: percentile(&sorted, 75.0),
            p95: percentile(&sorted, 95.0),
        }
    }
}

/// Two-sided 95 % interval from the 2.5th and 97.5th percentiles.
pub fn confidence_interval_95(values: &[f64]) -> (f64, f64) {
    let sorted = sorted(values);
    (percentile(&sorted, 2.5), percentile(&sorted, 97.5))
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    #[test]
    fn percentiles_interpolate() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 50.0), 3.0);
        assert_eq!(percentile(&values, 100.0), 5.0);
        assert!(is_close!(percentile(&values, 10.0), 1.4));
        assert!(percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn summary_of_sample() {
        let summary = Summary::from_values(&[4.0, 2.0, 6.0, 8.0]);
        assert_eq!(summary.count, 4);
        assert_eq!(summary.mean, 5.0);
        assert!(is_close!(summary.std, 5.0_f64.sqrt()));
        assert_eq!(summary.min, 2.0);
        assert_eq!(summary.max, 8.0);
        assert_eq!(summary.p50, 5.0);
    }

    #[test]
    fn interval_brackets_the_median() {
        let values: Vec<f64> = (0..=100).map(f64::from).collect();
        let (low, high) = confidence_interval_95(&values);
        assert!(is_close!(low, 2.5));
        assert!(is_close!(high, 97.5));
    }
}
