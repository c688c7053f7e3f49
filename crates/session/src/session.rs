use foundation::math::Vec2;
use foundation::time::Time;
use gpu::{
    DisposalList, PhysicalSize, ReleaseReport, RenderBackend, RenderError, Renderer, ResourceKind,
};
use runtime::{
    AnimationLoop, EVENT_DISPOSED, EVENT_MOUNTED, EVENT_RESIZED, Event, EventBus, Frame,
    FrameThrottle, LoopState, LoopStats, TickOutcome, TickSource,
};
use scene::World;
use tracing::{debug, error};

use crate::error::MountError;
use crate::resize::{ContainerSize, ResizeReactor};
use crate::views::SceneView;

/// Result of delivering one host tick to a session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionTick {
    Rendered(Frame),
    Throttled,
    Inactive,
    /// Rendering failed; the session has disposed itself.
    Failed(RenderError),
}

/// One mounted visualization: its render context, every resource allocated on it, the
/// frame loop and the scene. Dropping the session disposes it.
pub struct AnimationSession<V: SceneView, B: RenderBackend, S: TickSource> {
    view: V,
    world: World,
    backend: B,
    renderer: Renderer,
    disposal: DisposalList,
    frames: AnimationLoop<S>,
    resize: ResizeReactor,
    pointer: Vec2,
    events: EventBus,
    last_report: Option<ReleaseReport>,
}

impl<V: SceneView, B: RenderBackend, S: TickSource> AnimationSession<V, B, S> {
    /// Acquires the context through `acquire`, builds and uploads the scene, then starts
    /// the frame loop. Anything acquired before a failure is released before returning.
    pub fn mount(
        mut view: V,
        ticks: S,
        size: ContainerSize,
        acquire: impl FnOnce(PhysicalSize) -> Result<B, RenderError>,
    ) -> Result<Self, MountError> {
        let physical = size.physical();
        let mut backend = acquire(physical).map_err(|e| {
            error!(view = view.name(), error = %e, "render context creation failed");
            MountError::Context(e)
        })?;

        let mut disposal = DisposalList::new();
        disposal.track_context();

        let mut world = World::new();
        view.build(&mut world);

        let mut renderer = Renderer::new(view.camera());
        renderer.resize(&mut backend, physical);
        if let Err(e) = renderer.sync(&world, &mut backend, &mut disposal) {
            error!(view = view.name(), error = %e, "scene upload failed");
            let report = disposal.release_all(&mut backend);
            debug!(resources = report.total(), "released partial mount");
            return Err(MountError::Resources(e));
        }

        let mut frames = AnimationLoop::new(ticks, FrameThrottle::from_cap(view.fps_cap()));
        frames.start();

        let mut events = EventBus::new();
        events.emit(0, EVENT_MOUNTED, view.name());
        debug!(
            view = view.name(),
            resources = disposal.len(),
            width = physical.width,
            height = physical.height,
            "session mounted"
        );

        Ok(Self {
            view,
            world,
            backend,
            renderer,
            disposal,
            frames,
            resize: ResizeReactor::new(size),
            pointer: Vec2::ZERO,
            events,
            last_report: None,
        })
    }

    pub fn state(&self) -> LoopState {
        self.frames.state()
    }

    pub fn is_running(&self) -> bool {
        self.frames.is_running()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Data changes made here are applied at the start of the next frame.
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Takes the queued events. Hosts call this after each tick.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    pub fn stats(&self) -> &LoopStats {
        self.frames.stats()
    }

    pub fn tick_source(&self) -> &S {
        self.frames.source()
    }

    pub fn live_resources(&self) -> usize {
        self.disposal.len()
    }

    /// What the last disposal released.
    pub fn release_report(&self) -> Option<ReleaseReport> {
        self.last_report
    }

    pub fn observe_resize(&mut self, size: ContainerSize) {
        self.resize.observe(size);
    }

    pub fn set_pointer(&mut self, pointer: Vec2) {
        self.pointer = pointer;
    }

    /// Pointer position in container coordinates (CSS pixels).
    pub fn set_pointer_px(&mut self, x: f64, y: f64) {
        if let Some(size) = self.resize.current() {
            self.pointer = size.normalized_pointer(x, y);
        }
    }

    /// Registers a host listener removal to run when the session is disposed.
    pub fn register_listener(&mut self, label: &'static str, remove: impl FnOnce() + 'static) {
        self.disposal.defer(ResourceKind::Listener, label, remove);
    }

    pub fn on_tick(&mut self, now: Time) -> SessionTick {
        let frame = match self.frames.on_tick(now) {
            TickOutcome::Frame(frame) => frame,
            TickOutcome::Throttled => return SessionTick::Throttled,
            TickOutcome::Inactive => return SessionTick::Inactive,
        };

        if let Some(size) = self.resize.take_pending() {
            let physical = size.physical();
            self.renderer.resize(&mut self.backend, physical);
            self.events.emit_at(
                frame,
                EVENT_RESIZED,
                format!("{}x{}", physical.width, physical.height),
            );
        }

        self.view.update(&mut self.world);
        self.view.animate(&mut self.world, &frame, self.pointer);

        match self
            .renderer
            .render(&self.world, &mut self.backend, &mut self.disposal)
        {
            Ok(()) => SessionTick::Rendered(frame),
            Err(e) => {
                error!(view = self.view.name(), error = %e, "render failed; disposing session");
                self.dispose();
                SessionTick::Failed(e)
            }
        }
    }

    /// Stops the loop and releases every resource, context last. Idempotent; returns
    /// `true` only for the call that did the work.
    pub fn dispose(&mut self) -> bool {
        if !self.frames.dispose() {
            return false;
        }
        self.renderer.clear();
        let report = self.disposal.release_all(&mut self.backend);
        self.last_report = Some(report);
        self.events.emit(
            self.frames.stats().frames,
            EVENT_DISPOSED,
            format!("{} resources", report.total()),
        );
        debug!(
            view = self.view.name(),
            resources = report.total(),
            "session disposed"
        );
        true
    }
}

impl<V: SceneView, B: RenderBackend, S: TickSource> Drop for AnimationSession<V, B, S> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::{AnimationSession, SessionTick};
    use crate::error::MountError;
    use crate::resize::ContainerSize;
    use crate::views::{FundsMapConfig, FundsMapView, GlobeConfig, GlobeView};
    use foundation::math::Vec2;
    use foundation::time::Time;
    use gpu::headless::{HeadlessBackend, HeadlessOptions};
    use gpu::{PhysicalSize, RenderError, ResourceKind};
    use pretty_assertions::assert_eq;
    use runtime::{EVENT_DISPOSED, EVENT_MOUNTED, EVENT_RESIZED, LoopState, ManualTickSource};
    use scene::data::{Anchor, DonationPoint, FundsDistribution};
    use foundation::color::Rgb;
    use std::cell::RefCell;
    use std::rc::Rc;

    type GlobeSession = AnimationSession<GlobeView, HeadlessBackend, ManualTickSource>;

    fn donations(n: usize) -> Vec<DonationPoint> {
        (0..n)
            .map(|i| DonationPoint::new(10.0 * i as f64, -20.0 * i as f64, 250.0, "education"))
            .collect()
    }

    fn mount_globe(options: HeadlessOptions) -> (Result<GlobeSession, MountError>, ManualTickSource) {
        let ticks = ManualTickSource::new();
        let session = AnimationSession::mount(
            GlobeView::new(GlobeConfig::default(), donations(3)),
            ticks.clone(),
            ContainerSize::new(800.0, 600.0, 1.0),
            |px| HeadlessBackend::acquire(px, options),
        );
        (session, ticks)
    }

    fn ms(v: f64) -> Time {
        Time::from_millis(v)
    }

    #[test]
    fn drained_events_do_not_pile_up() {
        let (session, ticks) = mount_globe(HeadlessOptions::default());
        let mut session = session.expect("mount");
        for i in 0..50 {
            session.observe_resize(ContainerSize::new(801.0 + i as f64, 600.0, 1.0));
            ticks.fire();
            session.on_tick(ms(i as f64 * 40.0));
            let kinds: Vec<&str> = session.drain_events().iter().map(|e| e.kind).collect();
            if i == 0 {
                assert_eq!(kinds, vec![EVENT_MOUNTED, EVENT_RESIZED]);
            } else {
                assert_eq!(kinds, vec![EVENT_RESIZED]);
            }
        }
        assert!(session.events().events().is_empty());
    }

    #[test]
    fn mount_uploads_scene_and_starts_loop() {
        let (session, ticks) = mount_globe(HeadlessOptions::default());
        let session = session.expect("mount");
        assert_eq!(session.state(), LoopState::Running);
        assert!(ticks.has_pending());
        // globe + clouds + 3 markers, each a geometry and a material; 2 textures; context.
        assert_eq!(session.live_resources(), 5 * 2 + 2 + 1);
    }

    #[test]
    fn globe_renders_at_most_thirty_fps() {
        let (session, ticks) = mount_globe(HeadlessOptions::default());
        let mut session = session.expect("mount");
        let ledger = session.backend().ledger();

        let mut rendered = 0;
        for i in 0..6 {
            ticks.fire();
            if let SessionTick::Rendered(_) = session.on_tick(ms(i as f64 * 20.0)) {
                rendered += 1;
            }
        }
        assert_eq!(rendered, 3);
        assert_eq!(ledger.borrow().frames.len(), 3);
        assert_eq!(ledger.borrow().frames[0].draws, 5);
    }

    #[test]
    fn dispose_releases_everything_once_and_stops_ticks() {
        let (session, ticks) = mount_globe(HeadlessOptions::default());
        let mut session = session.expect("mount");
        let ledger = session.backend().ledger();
        ticks.fire();
        session.on_tick(ms(0.0));

        let removed = Rc::new(RefCell::new(0));
        let r = removed.clone();
        session.register_listener("pointermove", move || *r.borrow_mut() += 1);

        assert!(session.dispose());
        assert!(!session.dispose());
        assert!(!ticks.has_pending());
        assert_eq!(*removed.borrow(), 1);
        {
            let l = ledger.borrow();
            assert!(l.live.is_empty());
            assert!(l.destroyed);
            assert_eq!(l.double_releases, 0);
        }
        let report = session.release_report().expect("report");
        assert_eq!(report.listeners, 1);
        assert_eq!(report.contexts, 1);

        let frames_before = ledger.borrow().frames.len();
        assert_eq!(session.on_tick(ms(1000.0)), SessionTick::Inactive);
        assert_eq!(ledger.borrow().frames.len(), frames_before);
        assert_eq!(session.events().count(EVENT_DISPOSED), 1);
    }

    #[test]
    fn drop_disposes() {
        let (session, ticks) = mount_globe(HeadlessOptions::default());
        let session = session.expect("mount");
        let ledger = session.backend().ledger();
        drop(session);
        assert!(ledger.borrow().live.is_empty());
        assert!(ledger.borrow().destroyed);
        assert_eq!(ticks.cancelled(), 1);
    }

    #[test]
    fn context_failure_acquires_nothing() {
        let (session, ticks) = mount_globe(HeadlessOptions {
            context_failure: Some("blocked".into()),
            ..Default::default()
        });
        let err = session.err().expect("mount should fail");
        assert_eq!(
            err.render_error(),
            &RenderError::ContextCreationFailed("blocked".into())
        );
        assert_eq!(ticks.requested(), 0);
    }

    #[test]
    fn partial_mount_releases_what_it_acquired() {
        let observed = Rc::new(RefCell::new(None));
        let o = observed.clone();
        let ticks = ManualTickSource::new();
        let result = AnimationSession::mount(
            GlobeView::new(GlobeConfig::default(), donations(3)),
            ticks.clone(),
            ContainerSize::new(100.0, 100.0, 1.0),
            move |px| {
                let backend = HeadlessBackend::acquire(
                    px,
                    HeadlessOptions {
                        allocation_limit: Some(4),
                        ..Default::default()
                    },
                )?;
                *o.borrow_mut() = Some(backend.ledger());
                Ok(backend)
            },
        );
        assert!(matches!(result, Err(MountError::Resources(_))));
        let ledger = observed.borrow().clone().expect("ledger");
        let l = ledger.borrow();
        assert_eq!(l.created, 4);
        assert!(l.live.is_empty());
        assert!(l.destroyed);
        assert_eq!(ticks.requested(), 0);
    }

    #[test]
    fn resize_is_applied_before_the_next_render() {
        let (session, ticks) = mount_globe(HeadlessOptions::default());
        let mut session = session.expect("mount");
        let ledger = session.backend().ledger();

        session.observe_resize(ContainerSize::new(300.0, 200.0, 3.0));
        session.observe_resize(ContainerSize::new(400.0, 200.0, 3.0));
        ticks.fire();
        session.on_tick(ms(0.0));

        let l = ledger.borrow();
        assert_eq!(l.frames[0].size, PhysicalSize::new(800, 400));
        assert_eq!(session.renderer().camera().aspect, 2.0);
        assert_eq!(session.events().count(EVENT_RESIZED), 1);
    }

    #[test]
    fn rebuilt_markers_release_old_resources() {
        let (session, ticks) = mount_globe(HeadlessOptions::default());
        let mut session = session.expect("mount");
        let ledger = session.backend().ledger();

        session.view_mut().set_donations(donations(1));
        ticks.fire();
        session.on_tick(ms(0.0));

        assert_eq!(ledger.borrow().live_count(ResourceKind::Geometry), 3);
        assert_eq!(ledger.borrow().frames[0].draws, 3);
        assert_eq!(session.live_resources(), 3 * 2 + 2 + 1);
    }

    #[test]
    fn render_failure_disposes_session() {
        let ticks = ManualTickSource::new();
        let mut session = AnimationSession::mount(
            GlobeView::new(GlobeConfig::default(), Vec::new()),
            ticks.clone(),
            ContainerSize::new(100.0, 100.0, 1.0),
            |px| {
                HeadlessBackend::acquire(
                    px,
                    HeadlessOptions {
                        // Enough for globe, clouds and their textures, nothing more.
                        allocation_limit: Some(6),
                        ..Default::default()
                    },
                )
            },
        )
        .expect("mount");
        let ledger = session.backend().ledger();

        session.view_mut().set_donations(donations(1));
        ticks.fire();
        assert!(matches!(session.on_tick(ms(0.0)), SessionTick::Failed(_)));
        assert_eq!(session.state(), LoopState::Disposed);
        assert!(ledger.borrow().live.is_empty());
    }

    #[test]
    fn funds_map_renders_every_tick() {
        let ticks = ManualTickSource::new();
        let dists = vec![FundsDistribution {
            label: "Water".into(),
            amount: 10.0,
            color: Rgb::from_hex(0x00bcd4),
            anchor: Anchor { x: 1.0, z: 0.0 },
        }];
        let mut session = AnimationSession::mount(
            FundsMapView::new(FundsMapConfig::default(), dists),
            ticks.clone(),
            ContainerSize::new(100.0, 100.0, 1.0),
            |px| HeadlessBackend::acquire(px, HeadlessOptions::default()),
        )
        .expect("mount");
        session.set_pointer(Vec2::new(0.5, 0.5));

        let rendered = (0..5)
            .filter(|i| {
                ticks.fire();
                matches!(session.on_tick(ms(*i as f64)), SessionTick::Rendered(_))
            })
            .count();
        assert_eq!(rendered, 5);
    }
}
