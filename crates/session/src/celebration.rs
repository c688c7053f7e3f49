use effects::{
    Burst, BurstStatus, ConfettiConfig, CounterConfig, CounterInterpolator, CounterStep,
    ParticleCanvas, draw_confetti,
};
use runtime::{EVENT_BURST_COMPLETE, EVENT_TARGET_REACHED, Event, EventBus};
use tracing::debug;

/// Animated donation total that rains confetti the first time it reaches the target.
#[derive(Debug)]
pub struct Celebration {
    counter: CounterInterpolator,
    confetti_config: ConfettiConfig,
    viewport: (f64, f64),
    confetti: Option<Burst>,
    seed: u64,
    steps: u64,
    events: EventBus,
}

impl Celebration {
    pub fn new(
        target: f64,
        counter: CounterConfig,
        confetti: ConfettiConfig,
        viewport: (f64, f64),
        seed: u64,
    ) -> Self {
        Self {
            counter: CounterInterpolator::new(target, counter),
            confetti_config: confetti,
            viewport,
            confetti: None,
            seed,
            steps: 0,
            events: EventBus::new(),
        }
    }

    pub fn counter(&self) -> &CounterInterpolator {
        &self.counter
    }

    pub fn confetti(&self) -> Option<&Burst> {
        self.confetti.as_ref()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    pub fn set_current(&mut self, current: f64) {
        self.counter.set_current(current);
    }

    pub fn set_target(&mut self, target: f64) {
        self.counter.set_target(target);
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = (width, height);
    }

    /// One counter interval. Reaching the target launches the confetti.
    pub fn step_counter(&mut self) -> CounterStep {
        self.steps += 1;
        let step = self.counter.step();
        if step.target_reached {
            self.events.emit(
                self.steps,
                EVENT_TARGET_REACHED,
                format!("{}", self.counter.target()),
            );
            let (w, h) = self.viewport;
            self.confetti = Some(self.confetti_config.spawn(w, h, self.seed));
            debug!(width = w, height = h, "confetti launched");
        }
        step
    }

    /// One animation frame of the confetti, if any is falling.
    pub fn step_confetti(&mut self) -> Option<BurstStatus> {
        let burst = self.confetti.as_mut()?;
        let status = burst.step();
        if let Some(done) = burst.take_completion() {
            self.events
                .emit(done.ticks, EVENT_BURST_COMPLETE, "confetti");
        }
        Some(status)
    }

    pub fn draw_confetti<C: ParticleCanvas + ?Sized>(&self, canvas: &mut C) {
        if let Some(burst) = &self.confetti {
            draw_confetti(canvas, burst);
        }
    }

    pub fn is_celebrating(&self) -> bool {
        self.confetti.as_ref().is_some_and(|b| !b.is_complete())
    }

    /// Drops any falling confetti.
    pub fn cancel(&mut self) {
        self.confetti = None;
    }
}

#[cfg(test)]
mod tests {
    use super::Celebration;
    use effects::{BurstStatus, ConfettiConfig, CounterConfig, RecordingCanvas};
    use runtime::{EVENT_BURST_COMPLETE, EVENT_TARGET_REACHED};

    fn celebration(target: f64) -> Celebration {
        Celebration::new(
            target,
            CounterConfig::default(),
            ConfettiConfig::default(),
            (640.0, 480.0),
            9,
        )
    }

    #[test]
    fn reaching_target_launches_confetti_once() {
        let mut c = celebration(1000.0);
        c.set_current(1500.0);
        for _ in 0..120 {
            c.step_counter();
        }
        assert_eq!(c.events().count(EVENT_TARGET_REACHED), 1);
        assert!(c.is_celebrating());
        assert_eq!(c.confetti().map(|b| b.particles().len()), Some(150));
    }

    #[test]
    fn confetti_completion_is_reported_once() {
        let mut c = celebration(10.0);
        c.set_current(10.0);
        while !c.step_counter().settled {}

        let mut ticks = 0;
        while c.step_confetti() == Some(BurstStatus::Running) {
            ticks += 1;
            assert!(ticks < 1000);
        }
        c.step_confetti();
        assert_eq!(c.events().count(EVENT_BURST_COMPLETE), 1);
        assert!(!c.is_celebrating());
    }

    #[test]
    fn below_target_stays_quiet() {
        let mut c = celebration(1000.0);
        c.set_current(999.0);
        for _ in 0..120 {
            c.step_counter();
        }
        assert!(c.confetti().is_none());
        assert_eq!(c.step_confetti(), None);

        let mut canvas = RecordingCanvas::default();
        c.draw_confetti(&mut canvas);
        assert!(canvas.ops.is_empty());
    }
}
