//! Headless drivers behind each subcommand. Every runner returns a JSON summary.

use effects::{
    BurstStatus, ConfettiConfig, CounterConfig, RecordingCanvas, TreeBurstConfig, draw_confetti,
    draw_tree,
};
use foundation::time::Time;
use gpu::CapabilityDetector;
use gpu::headless::{HeadlessBackend, HeadlessOptions};
use runtime::{Event, ManualTickSource};
use serde_json::{Value, json};
use session::views::SceneView;
use session::{Celebration, ContainerSize, Presentation, SessionTick, present};
use tracing::{debug, warn};

/// How a view session is driven.
#[derive(Debug, Clone, Copy)]
pub struct SessionRun {
    pub size: ContainerSize,
    pub frames: u64,
    pub frame_ms: f64,
    /// Answer given by the capability check.
    pub capable: bool,
    pub allocation_limit: Option<usize>,
}

fn event_kinds(events: &[Event]) -> Vec<&'static str> {
    events.iter().map(|e| e.kind).collect()
}

/// Presents `view` on a recording backend, delivers `frames` host ticks, then disposes.
/// `describe` adds view-specific fields, read just before disposal.
pub fn run_view<V: SceneView>(view: V, run: &SessionRun, describe: impl Fn(&V) -> Value) -> Value {
    let name = view.name();
    let capable = run.capable;
    let mut detector = CapabilityDetector::new(move || Ok::<bool, String>(capable));
    let ticks = ManualTickSource::new();
    let options = HeadlessOptions {
        allocation_limit: run.allocation_limit,
        ..HeadlessOptions::default()
    };

    let presentation = present(&mut detector, view, ticks.clone(), run.size, |size| {
        HeadlessBackend::acquire(size, options)
    });

    let mut session = match presentation {
        Presentation::Accelerated(session) => session,
        Presentation::Static(fallback) => {
            return json!({ "view": name, "presentation": "static", "fallback": fallback });
        }
        Presentation::Error(notice) => {
            return json!({ "view": name, "presentation": "error", "notice": notice });
        }
    };

    let ledger = session.backend().ledger();
    let mut failure = None;
    for i in 0..run.frames {
        if ticks.fire().is_none() {
            warn!(frame = i, "loop stopped requesting frames");
            break;
        }
        let now = Time::from_millis(i as f64 * run.frame_ms);
        if let SessionTick::Failed(e) = session.on_tick(now) {
            failure = Some(e.to_string());
            break;
        }
    }

    let stats = *session.stats();
    let resources = session.live_resources();
    let details = describe(session.view());
    session.dispose();
    let released = session.release_report().map_or(0, |r| r.total());
    debug!(view = name, released, "headless run finished");

    let ledger = ledger.borrow();
    json!({
        "view": name,
        "presentation": "accelerated",
        "ticks": stats.ticks,
        "frames": stats.frames,
        "throttled": stats.throttled,
        "effective_fps": stats.effective_fps(),
        "draws_last_frame": ledger.frames.last().map_or(0, |f| f.draws),
        "resources": resources,
        "released": released,
        "leaked": ledger.live.len(),
        "failure": failure,
        "events": event_kinds(session.events().events()),
        "details": details,
    })
}

/// Steps the counter until it settles on `current`, then lets any confetti finish.
pub fn run_counter(
    target: f64,
    current: f64,
    counter: CounterConfig,
    confetti: ConfettiConfig,
    seed: u64,
) -> Value {
    let mut celebration = Celebration::new(target, counter, confetti, (1280.0, 720.0), seed);
    celebration.set_current(current);

    let mut steps = 0u64;
    let mut values = Vec::new();
    loop {
        let step = celebration.step_counter();
        steps += 1;
        values.push(step.value);
        if step.settled {
            break;
        }
    }

    let mut confetti_frames = 0u64;
    while let Some(BurstStatus::Running) = celebration.step_confetti() {
        confetti_frames += 1;
    }

    let counter = celebration.counter();
    json!({
        "steps": steps,
        "display": counter.display_value(),
        "progress_percent": counter.progress_percent(),
        "remaining": counter.remaining(),
        "target_reached": counter.reached_once(),
        "confetti_frames": confetti_frames,
        "events": event_kinds(celebration.events().events()),
        "values": values,
    })
}

pub fn run_confetti(config: &ConfettiConfig, width: f64, height: f64, seed: u64) -> Value {
    let mut burst = config.spawn(width, height, seed);
    let particles = burst.particles().len();
    let mut canvas = RecordingCanvas::default();
    draw_confetti(&mut canvas, &burst);
    let first_frame_ops = canvas.ops.len();

    let ticks = burst.run_to_completion();
    let completion = burst.take_completion();
    json!({
        "particles": particles,
        "first_frame_ops": first_frame_ops,
        "ticks": ticks,
        "reason": completion.map(|c| format!("{:?}", c.reason)),
    })
}

pub fn run_tree(config: &TreeBurstConfig, seed: u64) -> Value {
    let mut burst = config.spawn(seed);
    let trunk = config.trunk();
    let particles = burst.particles().len();
    let mut canvas = RecordingCanvas::default();
    draw_tree(&mut canvas, &burst, &trunk);
    let first_frame_ops = canvas.ops.len();

    let ticks = burst.run_to_completion();
    let completion = burst.take_completion();
    json!({
        "particles": particles,
        "first_frame_ops": first_frame_ops,
        "ticks": ticks,
        "reason": completion.map(|c| format!("{:?}", c.reason)),
    })
}
