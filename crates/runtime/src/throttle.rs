use foundation::time::Time;

/// Frame-rate cap. Ticks arriving sooner than `1000 / fps` ms after the last admitted
/// frame are skipped.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameThrottle {
    min_interval_ms: Option<f64>,
    last_admitted: Option<Time>,
}

impl FrameThrottle {
    /// No cap: every tick is admitted (bounded only by the host repaint rate).
    pub fn uncapped() -> Self {
        Self {
            min_interval_ms: None,
            last_admitted: None,
        }
    }

    /// Caps to `fps` frames per second. Non-positive or non-finite caps mean uncapped.
    pub fn fps_cap(fps: f64) -> Self {
        let min_interval_ms = (fps.is_finite() && fps > 0.0).then(|| 1000.0 / fps);
        Self {
            min_interval_ms,
            last_admitted: None,
        }
    }

    pub fn from_cap(fps: Option<f64>) -> Self {
        fps.map(Self::fps_cap).unwrap_or_else(Self::uncapped)
    }

    pub fn min_interval_ms(&self) -> Option<f64> {
        self.min_interval_ms
    }

    /// Returns `true` and records `now` when a frame may run.
    pub fn admit(&mut self, now: Time) -> bool {
        let admitted = match (self.min_interval_ms, self.last_admitted) {
            (None, _) | (_, None) => true,
            (Some(min), Some(last)) => now.as_millis() - last.as_millis() >= min,
        };
        if admitted {
            self.last_admitted = Some(now);
        }
        admitted
    }

    pub fn last_admitted(&self) -> Option<Time> {
        self.last_admitted
    }

    pub fn reset(&mut self) {
        self.last_admitted = None;
    }
}

#[cfg(test)]
mod tests {
    use super::FrameThrottle;
    use foundation::time::Time;

    #[test]
    fn thirty_fps_skips_fast_ticks() {
        let mut t = FrameThrottle::fps_cap(30.0);
        let admitted: Vec<bool> = (0..6)
            .map(|i| t.admit(Time::from_millis(i as f64 * 20.0)))
            .collect();
        // The first tick always runs; after that every other 50 Hz tick.
        assert_eq!(admitted, vec![true, false, true, false, true, false]);
    }

    #[test]
    fn uncapped_admits_everything() {
        let mut t = FrameThrottle::uncapped();
        assert!(t.admit(Time(0.0)));
        assert!(t.admit(Time(0.0)));
        assert_eq!(t.min_interval_ms(), None);
    }

    #[test]
    fn invalid_cap_is_uncapped() {
        assert_eq!(FrameThrottle::fps_cap(0.0), FrameThrottle::uncapped());
        assert_eq!(FrameThrottle::fps_cap(f64::NAN), FrameThrottle::uncapped());
    }
}
