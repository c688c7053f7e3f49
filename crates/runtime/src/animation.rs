use std::cell::RefCell;
use std::rc::Rc;

use foundation::time::Time;
use tracing::debug;

use crate::frame::Frame;
use crate::stats::LoopStats;
use crate::throttle::FrameThrottle;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TickId(pub u64);

/// Host frame clock: schedules and cancels one-shot frame callbacks
/// (`requestAnimationFrame` / `cancelAnimationFrame` on the web).
///
/// The host calls [`AnimationLoop::on_tick`] when a requested tick fires.
pub trait TickSource {
    fn request(&mut self) -> TickId;
    fn cancel(&mut self, id: TickId);
}

#[derive(Debug, Default)]
struct ManualTicks {
    next_id: u64,
    pending: Vec<TickId>,
    requested: usize,
    cancelled: usize,
}

/// Tick source driven synchronously by tests and headless tools.
///
/// Clones share state, so a test can keep one clone to inspect what the loop scheduled.
#[derive(Debug, Clone, Default)]
pub struct ManualTickSource {
    inner: Rc<RefCell<ManualTicks>>,
}

impl ManualTickSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Vec<TickId> {
        self.inner.borrow().pending.clone()
    }

    pub fn has_pending(&self) -> bool {
        !self.inner.borrow().pending.is_empty()
    }

    pub fn requested(&self) -> usize {
        self.inner.borrow().requested
    }

    pub fn cancelled(&self) -> usize {
        self.inner.borrow().cancelled
    }

    /// Consumes the oldest pending request, as the host does when it fires a callback.
    pub fn fire(&self) -> Option<TickId> {
        let mut t = self.inner.borrow_mut();
        if t.pending.is_empty() {
            None
        } else {
            Some(t.pending.remove(0))
        }
    }
}

impl TickSource for ManualTickSource {
    fn request(&mut self) -> TickId {
        let mut t = self.inner.borrow_mut();
        let id = TickId(t.next_id);
        t.next_id += 1;
        t.requested += 1;
        t.pending.push(id);
        id
    }

    fn cancel(&mut self, id: TickId) {
        let mut t = self.inner.borrow_mut();
        let before = t.pending.len();
        t.pending.retain(|p| *p != id);
        if t.pending.len() != before {
            t.cancelled += 1;
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Disposed,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TickOutcome {
    /// Work for this tick should run and render.
    Frame(Frame),
    /// Too soon after the last frame; the next tick is already scheduled.
    Throttled,
    /// The loop is not running; nothing may run.
    Inactive,
}

/// Per-frame loop as an explicit state machine: `Idle -> Running -> Disposed`.
///
/// While running, every tick re-schedules the next one before any work so an error in the
/// frame body cannot stall the loop. Disposal cancels the pending tick and is terminal.
pub struct AnimationLoop<S: TickSource> {
    source: S,
    state: LoopState,
    pending: Option<TickId>,
    throttle: FrameThrottle,
    next_index: u64,
    last_frame: Option<Time>,
    stats: LoopStats,
}

impl<S: TickSource> AnimationLoop<S> {
    pub fn new(source: S, throttle: FrameThrottle) -> Self {
        Self {
            source,
            state: LoopState::Idle,
            pending: None,
            throttle,
            next_index: 0,
            last_frame: None,
            stats: LoopStats::default(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn pending_tick(&self) -> Option<TickId> {
        self.pending
    }

    pub fn stats(&self) -> &LoopStats {
        &self.stats
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// `Idle -> Running`. Returns `false` when the loop was not idle.
    pub fn start(&mut self) -> bool {
        if self.state != LoopState::Idle {
            return false;
        }
        self.state = LoopState::Running;
        self.pending = Some(self.source.request());
        debug!(fps_cap_interval_ms = ?self.throttle.min_interval_ms(), "animation loop started");
        true
    }

    pub fn on_tick(&mut self, now: Time) -> TickOutcome {
        if self.state != LoopState::Running {
            self.stats.inactive += 1;
            return TickOutcome::Inactive;
        }
        self.stats.ticks += 1;
        self.pending = Some(self.source.request());

        if !self.throttle.admit(now) {
            self.stats.throttled += 1;
            return TickOutcome::Throttled;
        }

        let dt_s = self.last_frame.map(|last| now.since(last)).unwrap_or(0.0);
        if self.last_frame.is_some() {
            self.stats.record_interval(dt_s * 1000.0);
        }
        self.last_frame = Some(now);

        let frame = Frame::at(self.next_index, dt_s, now);
        self.next_index += 1;
        self.stats.frames += 1;
        TickOutcome::Frame(frame)
    }

    /// `* -> Disposed`. Idempotent; returns `true` only on the first call.
    pub fn dispose(&mut self) -> bool {
        if self.state == LoopState::Disposed {
            return false;
        }
        if let Some(id) = self.pending.take() {
            self.source.cancel(id);
        }
        self.state = LoopState::Disposed;
        debug!(frames = self.stats.frames, "animation loop disposed");
        true
    }
}

impl<S: TickSource> Drop for AnimationLoop<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}
