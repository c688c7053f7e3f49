use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    /// Host interval between steps.
    pub interval_ms: f64,
    /// Steps a retarget takes to settle.
    pub settle_ticks: u32,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            interval_ms: 16.0,
            settle_ticks: 60,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CounterStep {
    pub value: f64,
    pub settled: bool,
    /// Set on the single step where the target is first reached.
    pub target_reached: bool,
}

/// Displayed donation total animating toward the current amount.
///
/// Each retarget fixes a linear increment covering the gap in `settle_ticks` steps. The
/// displayed value never exceeds `current`.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterInterpolator {
    config: CounterConfig,
    display: f64,
    current: f64,
    target: f64,
    increment: f64,
    ticks: u32,
    reached_once: bool,
}

impl CounterInterpolator {
    pub fn new(target: f64, config: CounterConfig) -> Self {
        Self {
            config,
            display: 0.0,
            current: 0.0,
            target,
            increment: 0.0,
            ticks: 0,
            reached_once: false,
        }
    }

    pub fn config(&self) -> &CounterConfig {
        &self.config
    }

    pub fn display_value(&self) -> f64 {
        self.display
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn reached_once(&self) -> bool {
        self.reached_once
    }

    pub fn set_current(&mut self, current: f64) {
        let current = if current.is_finite() { current } else { 0.0 };
        self.current = current;
        if self.display > current {
            self.display = current;
        }
        let ticks = self.config.settle_ticks.max(1);
        self.increment = (current - self.display) / f64::from(ticks);
        self.ticks = 0;
        debug!(current, display = self.display, "counter retargeted");
    }

    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    pub fn step(&mut self) -> CounterStep {
        self.ticks = self.ticks.saturating_add(1);
        let next = self.display + self.increment;
        if next < self.current && self.ticks < self.config.settle_ticks.max(1) {
            self.display = next;
            return CounterStep {
                value: next,
                settled: false,
                target_reached: false,
            };
        }

        self.display = self.current;
        let target_reached = !self.reached_once && self.current >= self.target;
        if target_reached {
            self.reached_once = true;
            debug!(target = self.target, "counter reached target");
        }
        CounterStep {
            value: self.display,
            settled: true,
            target_reached,
        }
    }

    /// Share of the target shown so far, capped at 100.
    pub fn progress_percent(&self) -> f64 {
        if self.target <= 0.0 {
            return 100.0;
        }
        (self.display / self.target * 100.0).clamp(0.0, 100.0)
    }

    pub fn remaining(&self) -> f64 {
        (self.target - self.display).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{CounterConfig, CounterInterpolator};
    use pretty_assertions::assert_eq;

    fn counter(target: f64) -> CounterInterpolator {
        CounterInterpolator::new(target, CounterConfig::default())
    }

    #[test]
    fn converges_within_settle_ticks_without_overshoot() {
        let mut c = counter(1_000_000.0);
        c.set_current(12_345.67);
        let mut settled_at = None;
        for tick in 1..=60 {
            let s = c.step();
            assert!(s.value <= 12_345.67);
            if s.settled {
                settled_at = Some(tick);
                break;
            }
        }
        assert!(settled_at.is_some());
        assert_eq!(c.display_value(), 12_345.67);
    }

    #[test]
    fn values_increase_monotonically() {
        let mut c = counter(100.0);
        c.set_current(90.0);
        let mut last = 0.0;
        for _ in 0..60 {
            let v = c.step().value;
            assert!(v >= last);
            last = v;
        }
    }

    #[test]
    fn target_reached_fires_once() {
        let mut c = counter(100.0);
        c.set_current(150.0);
        let fired: usize = (0..200).filter(|_| c.step().target_reached).count();
        assert_eq!(fired, 1);

        c.set_current(50.0);
        c.set_current(300.0);
        let again: usize = (0..200).filter(|_| c.step().target_reached).count();
        assert_eq!(again, 0);
        assert!(c.reached_once());
    }

    #[test]
    fn below_target_never_fires() {
        let mut c = counter(100.0);
        c.set_current(99.0);
        assert!((0..100).all(|_| !c.step().target_reached));
    }

    #[test]
    fn lower_current_snaps_down() {
        let mut c = counter(100.0);
        c.set_current(80.0);
        for _ in 0..60 {
            c.step();
        }
        c.set_current(40.0);
        assert_eq!(c.display_value(), 40.0);
        let s = c.step();
        assert!(s.settled);
        assert_eq!(s.value, 40.0);
    }

    #[test]
    fn progress_and_remaining() {
        let mut c = counter(200.0);
        c.set_current(50.0);
        for _ in 0..60 {
            c.step();
        }
        assert_eq!(c.progress_percent(), 25.0);
        assert_eq!(c.remaining(), 150.0);

        c.set_current(500.0);
        for _ in 0..60 {
            c.step();
        }
        assert_eq!(c.progress_percent(), 100.0);
        assert_eq!(c.remaining(), 0.0);
    }

    #[test]
    fn raising_current_past_target_fires_once() {
        let mut c = counter(100.0);
        c.set_current(50.0);
        let mut fired = 0;
        for _ in 0..200 {
            let step = c.step();
            if step.target_reached {
                fired += 1;
            }
            if step.settled {
                break;
            }
        }
        assert_eq!(fired, 0);
        assert_eq!(c.display_value(), 50.0);

        c.set_current(120.0);
        for _ in 0..200 {
            let step = c.step();
            assert!(step.value <= 120.0, "overshot: {}", step.value);
            if step.target_reached {
                fired += 1;
            }
        }
        assert_eq!(fired, 1);
        assert_eq!(c.display_value(), 120.0);
        assert!(c.reached_once());
    }
}
