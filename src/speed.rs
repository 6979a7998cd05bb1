/// Running max and mean of instantaneous speed. No sample history is kept.
#[derive(Debug, Clone, Default)]
pub struct SpeedStats {
    max_kmh: f64,
    sample_sum: f64,
    sample_count: u64,
}

impl SpeedStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stationary or unknown samples (<= 0) are ignored so they don't drag the mean down.
    pub fn observe(&mut self, speed_kmh: f64) {
        if speed_kmh.is_nan() || speed_kmh <= 0.0 {
            return;
        }
        self.max_kmh = self.max_kmh.max(speed_kmh);
        self.sample_sum += speed_kmh;
        self.sample_count += 1;
    }

    pub fn max_kmh(&self) -> f64 {
        self.max_kmh
    }

    pub fn average_kmh(&self) -> f64 {
        if self.sample_count == 0 {
            0.0
        } else {
            self.sample_sum / self.sample_count as f64
        }
    }

    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_stationary_samples_ignored() {
        let mut stats = SpeedStats::new();
        for _ in 0..10 {
            stats.observe(0.0);
        }
        assert_eq!(stats.max_kmh(), 0.0);
        assert_eq!(stats.average_kmh(), 0.0);
        assert_eq!(stats.sample_count(), 0);
    }

    #[test]
    fn test_running_mean_and_max() {
        let mut stats = SpeedStats::new();
        stats.observe(30.0);
        stats.observe(0.0);
        stats.observe(60.0);
        stats.observe(45.0);
        assert_eq!(stats.max_kmh(), 60.0);
        assert_abs_diff_eq!(stats.average_kmh(), 45.0, epsilon = 1e-9);
        assert_eq!(stats.sample_count(), 3);
    }
}
