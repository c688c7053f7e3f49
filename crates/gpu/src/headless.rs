//! Recording backend with no GPU behind it. Used by the CLI and in tests.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use scene::components::{Material, Shape3D};
use scene::texture::TextureImage;
use tracing::debug;

use crate::backend::{PhysicalSize, RenderBackend, RenderFrame};
use crate::error::RenderError;
use crate::resources::{ResourceId, ResourceIds, ResourceKind};

#[derive(Debug, Clone, Default)]
pub struct HeadlessOptions {
    /// Fail context creation with this message.
    pub context_failure: Option<String>,
    /// Fail every allocation after this many have succeeded.
    pub allocation_limit: Option<usize>,
}

/// One rendered frame as seen by the backend.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameRecord {
    pub size: PhysicalSize,
    pub draws: usize,
}

/// Everything the backend observed. Shared so it outlives the backend.
#[derive(Debug, Default)]
pub struct Ledger {
    pub live: BTreeMap<ResourceId, ResourceKind>,
    pub created: usize,
    pub released: Vec<ResourceId>,
    /// Releases of ids that were not live.
    pub double_releases: usize,
    pub frames: Vec<FrameRecord>,
    pub resizes: Vec<PhysicalSize>,
    pub destroyed: bool,
}

impl Ledger {
    pub fn live_count(&self, kind: ResourceKind) -> usize {
        self.live.values().filter(|k| **k == kind).count()
    }
}

pub struct HeadlessBackend {
    ids: ResourceIds,
    size: PhysicalSize,
    options: HeadlessOptions,
    ledger: Rc<RefCell<Ledger>>,
}

impl HeadlessBackend {
    pub fn acquire(size: PhysicalSize, options: HeadlessOptions) -> Result<Self, RenderError> {
        if let Some(reason) = &options.context_failure {
            return Err(RenderError::ContextCreationFailed(reason.clone()));
        }
        Ok(Self {
            ids: ResourceIds::new(),
            size,
            options,
            ledger: Rc::new(RefCell::new(Ledger::default())),
        })
    }

    pub fn ledger(&self) -> Rc<RefCell<Ledger>> {
        self.ledger.clone()
    }

    fn allocate(&mut self, kind: ResourceKind) -> Result<ResourceId, RenderError> {
        let mut ledger = self.ledger.borrow_mut();
        if ledger.destroyed {
            return Err(RenderError::Disposed);
        }
        if let Some(limit) = self.options.allocation_limit
            && ledger.created >= limit
        {
            return Err(RenderError::ResourceAllocation {
                kind,
                reason: format!("allocation limit {limit} reached"),
            });
        }
        let id = self.ids.next();
        ledger.created += 1;
        ledger.live.insert(id, kind);
        Ok(id)
    }
}

impl RenderBackend for HeadlessBackend {
    fn size(&self) -> PhysicalSize {
        self.size
    }

    fn resize(&mut self, size: PhysicalSize) {
        self.size = size;
        self.ledger.borrow_mut().resizes.push(size);
    }

    fn create_geometry(&mut self, _shape: &Shape3D) -> Result<ResourceId, RenderError> {
        self.allocate(ResourceKind::Geometry)
    }

    fn create_material(&mut self, _material: &Material) -> Result<ResourceId, RenderError> {
        self.allocate(ResourceKind::Material)
    }

    fn create_texture(&mut self, _image: &TextureImage) -> Result<ResourceId, RenderError> {
        self.allocate(ResourceKind::Texture)
    }

    fn render(&mut self, frame: &RenderFrame) -> Result<(), RenderError> {
        let mut ledger = self.ledger.borrow_mut();
        if ledger.destroyed {
            return Err(RenderError::Disposed);
        }
        ledger.frames.push(FrameRecord {
            size: self.size,
            draws: frame.draws.len(),
        });
        Ok(())
    }

    fn release(&mut self, id: ResourceId) {
        let mut ledger = self.ledger.borrow_mut();
        if ledger.live.remove(&id).is_some() {
            ledger.released.push(id);
        } else {
            ledger.double_releases += 1;
        }
    }

    fn destroy(&mut self) {
        let mut ledger = self.ledger.borrow_mut();
        if !ledger.destroyed {
            debug!(live = ledger.live.len(), "headless context destroyed");
        }
        ledger.destroyed = true;
    }
}
