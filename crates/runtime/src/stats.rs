/// Running min/max/mean over frame intervals (ms).
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct IntervalHistogram {
    pub count: u64,
    pub sum_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

impl IntervalHistogram {
    pub fn record(&mut self, value_ms: f64) {
        if self.count == 0 {
            self.min_ms = value_ms;
            self.max_ms = value_ms;
        } else {
            self.min_ms = self.min_ms.min(value_ms);
            self.max_ms = self.max_ms.max(value_ms);
        }
        self.count += 1;
        self.sum_ms += value_ms;
    }

    pub fn mean_ms(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum_ms / self.count as f64)
    }
}

/// Counters kept by an [`crate::AnimationLoop`].
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct LoopStats {
    /// Ticks received while running.
    pub ticks: u64,
    /// Ticks admitted as frames.
    pub frames: u64,
    /// Ticks skipped by the frame-rate cap.
    pub throttled: u64,
    /// Ticks received while idle or disposed.
    pub inactive: u64,
    pub intervals: IntervalHistogram,
}

impl LoopStats {
    pub fn record_interval(&mut self, ms: f64) {
        self.intervals.record(ms);
    }

    /// Effective frame rate over the recorded intervals.
    pub fn effective_fps(&self) -> Option<f64> {
        self.intervals
            .mean_ms()
            .filter(|m| *m > 0.0)
            .map(|m| 1000.0 / m)
    }
}

#[cfg(test)]
mod tests {
    use super::{IntervalHistogram, LoopStats};

    #[test]
    fn histogram_tracks_min_max_mean() {
        let mut h = IntervalHistogram::default();
        h.record(40.0);
        h.record(20.0);
        h.record(30.0);
        assert_eq!(h.count, 3);
        assert_eq!(h.min_ms, 20.0);
        assert_eq!(h.max_ms, 40.0);
        assert_eq!(h.mean_ms(), Some(30.0));
    }

    #[test]
    fn effective_fps_from_intervals() {
        let mut s = LoopStats::default();
        assert_eq!(s.effective_fps(), None);
        s.record_interval(50.0);
        s.record_interval(50.0);
        assert_eq!(s.effective_fps(), Some(20.0));
    }
}
