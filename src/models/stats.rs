//! Running mean and standard deviation

use average::{Estimate, Variance};

/// Incremental mean/variance over per-iteration samples.
///
/// Samples are folded in with Welford's update, so nothing but the
/// count, mean and sum of squared deviations is kept.
#[derive(Debug, Clone)]
pub struct RunningStatistic {
    inner: Variance,
}

impl RunningStatistic {
    pub fn new() -> Self {
        Self {
            inner: Variance::new(),
        }
    }

    /// Fold in one sample
    pub fn add(&mut self, sample: f64) {
        self.inner.add(sample);
    }

    /// Number of samples seen
    pub fn len(&self) -> u64 {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Mean of the samples, 0 when empty
    pub fn mean(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.inner.mean()
        }
    }

    /// Population standard deviation, 0 with fewer than two samples
    pub fn std_dev(&self) -> f64 {
        if self.len() < 2 {
            return 0.0;
        }
        self.inner.population_variance().max(0.0).sqrt()
    }
}

impl Default for RunningStatistic {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<f64> for RunningStatistic {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stat = Self::new();
        for sample in iter {
            stat.add(sample);
        }
        stat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let stat = RunningStatistic::new();
        assert!(stat.is_empty());
        assert_eq!(stat.mean(), 0.0);
        assert_eq!(stat.std_dev(), 0.0);
    }

    #[test]
    fn test_mean_and_population_std_dev() {
        let stat: RunningStatistic = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0].into_iter().collect();
        assert_eq!(stat.len(), 8);
        assert!((stat.mean() - 5.0).abs() < 1e-12);
        assert!((stat.std_dev() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_samples() {
        let stat: RunningStatistic = std::iter::repeat(1.000_001).take(1000).collect();
        assert!((stat.mean() - 1.000_001).abs() < 1e-12);
        assert!(stat.std_dev() >= 0.0);
        assert!(stat.std_dev() < 1e-9);
    }
}
