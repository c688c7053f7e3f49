use std::fmt;

use foundation::handles::{Handle, HandleAllocator};
use tracing::debug;

use crate::backend::RenderBackend;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Context,
    Geometry,
    Material,
    Texture,
    Listener,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Context => "context",
            ResourceKind::Geometry => "geometry",
            ResourceKind::Material => "material",
            ResourceKind::Texture => "texture",
            ResourceKind::Listener => "listener",
        };
        f.write_str(name)
    }
}

/// Backend-issued handle for one GPU allocation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub Handle);

impl ResourceId {
    pub fn index(&self) -> u32 {
        self.0.index()
    }
}

/// Issues resource ids for backends.
#[derive(Debug, Default)]
pub struct ResourceIds {
    handles: HandleAllocator,
}

impl ResourceIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> ResourceId {
        ResourceId(self.handles.allocate())
    }

    pub fn issued(&self) -> u32 {
        self.handles.allocated()
    }
}

enum Entry {
    Context,
    Gpu {
        id: ResourceId,
        kind: ResourceKind,
    },
    Deferred {
        kind: ResourceKind,
        label: &'static str,
        release: Box<dyn FnOnce()>,
    },
}

impl Entry {
    fn kind(&self) -> ResourceKind {
        match self {
            Entry::Context => ResourceKind::Context,
            Entry::Gpu { kind, .. } | Entry::Deferred { kind, .. } => *kind,
        }
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Context => f.write_str("Context"),
            Entry::Gpu { id, kind } => write!(f, "Gpu({kind}, {:?})", id.0),
            Entry::Deferred { kind, label, .. } => write!(f, "Deferred({kind}, {label})"),
        }
    }
}

/// Counts of entries released by one [`DisposalList::release_all`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ReleaseReport {
    pub contexts: usize,
    pub geometries: usize,
    pub materials: usize,
    pub textures: usize,
    pub listeners: usize,
}

impl ReleaseReport {
    pub fn total(&self) -> usize {
        self.contexts + self.geometries + self.materials + self.textures + self.listeners
    }

    fn count(&mut self, kind: ResourceKind) {
        match kind {
            ResourceKind::Context => self.contexts += 1,
            ResourceKind::Geometry => self.geometries += 1,
            ResourceKind::Material => self.materials += 1,
            ResourceKind::Texture => self.textures += 1,
            ResourceKind::Listener => self.listeners += 1,
        }
    }
}

/// Everything one session acquired, released in reverse acquisition order.
///
/// Once released the list is closed: later registrations are released on the spot.
#[derive(Debug, Default)]
pub struct DisposalList {
    entries: Vec<Entry>,
    closed: bool,
}

impl DisposalList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn count(&self, kind: ResourceKind) -> usize {
        self.entries.iter().filter(|e| e.kind() == kind).count()
    }

    /// Records ownership of the backend's context. Push it first so it goes last.
    pub fn track_context(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.entries.push(Entry::Context);
        true
    }

    /// Records a backend allocation. Returns false when the list is already closed; the
    /// caller must release `id` itself.
    pub fn track(&mut self, kind: ResourceKind, id: ResourceId) -> bool {
        if self.closed {
            return false;
        }
        self.entries.push(Entry::Gpu { id, kind });
        true
    }

    /// Records a host-side release (listener removal, observer disconnect). Runs it now
    /// if the list is closed.
    pub fn defer(&mut self, kind: ResourceKind, label: &'static str, release: impl FnOnce() + 'static) {
        if self.closed {
            release();
            return;
        }
        self.entries.push(Entry::Deferred {
            kind,
            label,
            release: Box::new(release),
        });
    }

    /// Releases one tracked allocation ahead of teardown.
    pub fn release_one<B: RenderBackend + ?Sized>(&mut self, id: ResourceId, backend: &mut B) -> bool {
        let Some(pos) = self
            .entries
            .iter()
            .position(|e| matches!(e, Entry::Gpu { id: other, .. } if *other == id))
        else {
            return false;
        };
        self.entries.remove(pos);
        backend.release(id);
        true
    }

    /// Releases every entry, newest first, and closes the list. Calling again is a no-op.
    pub fn release_all<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) -> ReleaseReport {
        let mut report = ReleaseReport::default();
        self.closed = true;
        while let Some(entry) = self.entries.pop() {
            report.count(entry.kind());
            match entry {
                Entry::Context => backend.destroy(),
                Entry::Gpu { id, .. } => backend.release(id),
                Entry::Deferred { label, release, .. } => {
                    debug!(label, "running deferred release");
                    release();
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::{DisposalList, ResourceKind};
    use crate::backend::PhysicalSize;
    use crate::headless::{HeadlessBackend, HeadlessOptions};
    use crate::RenderBackend;
    use pretty_assertions::assert_eq;
    use scene::components::Shape3D;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn backend() -> HeadlessBackend {
        HeadlessBackend::acquire(PhysicalSize::new(10, 10), HeadlessOptions::default())
            .expect("headless backend")
    }

    #[test]
    fn releases_in_reverse_order_with_context_last() {
        let mut gpu = backend();
        let ledger = gpu.ledger();
        let mut list = DisposalList::new();
        list.track_context();

        let plane = Shape3D::Plane { width: 1.0, height: 1.0 };
        let a = gpu.create_geometry(&plane).expect("a");
        let b = gpu.create_geometry(&plane).expect("b");
        list.track(ResourceKind::Geometry, a);
        list.track(ResourceKind::Geometry, b);

        let report = list.release_all(&mut gpu);
        assert_eq!(report.geometries, 2);
        assert_eq!(report.contexts, 1);
        assert_eq!(ledger.borrow().released, vec![b, a]);
        assert!(ledger.borrow().destroyed);
        assert!(list.is_closed());
    }

    #[test]
    fn release_all_is_idempotent() {
        let mut gpu = backend();
        let ledger = gpu.ledger();
        let mut list = DisposalList::new();
        let id = gpu
            .create_geometry(&Shape3D::Grid { size: 1.0, divisions: 1 })
            .expect("grid");
        list.track(ResourceKind::Geometry, id);

        assert_eq!(list.release_all(&mut gpu).total(), 1);
        assert_eq!(list.release_all(&mut gpu).total(), 0);
        assert_eq!(ledger.borrow().released.len(), 1);
        assert_eq!(ledger.borrow().double_releases, 0);
    }

    #[test]
    fn deferred_release_runs_once() {
        let mut gpu = backend();
        let hits = Rc::new(RefCell::new(0));
        let mut list = DisposalList::new();
        let h = hits.clone();
        list.defer(ResourceKind::Listener, "pointer", move || *h.borrow_mut() += 1);

        list.release_all(&mut gpu);
        list.release_all(&mut gpu);
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn closed_list_refuses_new_entries() {
        let mut gpu = backend();
        let mut list = DisposalList::new();
        list.release_all(&mut gpu);

        let id = gpu
            .create_geometry(&Shape3D::Plane { width: 1.0, height: 1.0 })
            .expect("plane");
        assert!(!list.track(ResourceKind::Geometry, id));

        let hits = Rc::new(RefCell::new(0));
        let h = hits.clone();
        list.defer(ResourceKind::Listener, "late", move || *h.borrow_mut() += 1);
        assert_eq!(*hits.borrow(), 1);
        assert!(list.is_empty());
    }

    #[test]
    fn release_one_removes_entry() {
        let mut gpu = backend();
        let mut list = DisposalList::new();
        let id = gpu
            .create_geometry(&Shape3D::Plane { width: 1.0, height: 1.0 })
            .expect("plane");
        list.track(ResourceKind::Geometry, id);

        assert!(list.release_one(id, &mut gpu));
        assert!(!list.release_one(id, &mut gpu));
        assert_eq!(list.release_all(&mut gpu).total(), 0);
    }
}
