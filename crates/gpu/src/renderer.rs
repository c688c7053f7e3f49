use std::collections::BTreeMap;

use scene::components::{Material, Shape3D};
use scene::entity::EntityId;
use scene::texture::TextureKey;
use scene::world::World;
use tracing::debug;

use crate::backend::{DrawCall, PhysicalSize, RenderBackend, RenderFrame};
use crate::camera::PerspectiveCamera;
use crate::error::RenderError;
use crate::resources::{DisposalList, ResourceId, ResourceKind};

#[derive(Debug, Clone, PartialEq)]
struct Upload {
    shape: Shape3D,
    /// Material as uploaded, with opacity zeroed since it animates per frame.
    material: Material,
    geometry: ResourceId,
    material_id: ResourceId,
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct TextureUpload {
    id: ResourceId,
    revision: u32,
}

fn material_key(material: &Material) -> Material {
    Material {
        opacity: 0.0,
        ..material.clone()
    }
}

/// Mirrors a [`World`] into backend resources and turns it into frames.
///
/// Every allocation is recorded in the caller's [`DisposalList`]; allocations the world
/// no longer needs are released through it as well.
#[derive(Debug)]
pub struct Renderer {
    camera: PerspectiveCamera,
    uploads: BTreeMap<EntityId, Upload>,
    textures: BTreeMap<TextureKey, TextureUpload>,
}

impl Renderer {
    pub fn new(camera: PerspectiveCamera) -> Self {
        Self {
            camera,
            uploads: BTreeMap::new(),
            textures: BTreeMap::new(),
        }
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }

    pub fn uploaded_entities(&self) -> usize {
        self.uploads.len()
    }

    pub fn resize<B: RenderBackend + ?Sized>(&mut self, backend: &mut B, size: PhysicalSize) {
        self.camera.set_aspect(size.aspect());
        backend.resize(size);
    }

    /// Uploads new or changed textures and drawables, releasing stale ones.
    pub fn sync<B: RenderBackend + ?Sized>(
        &mut self,
        world: &World,
        backend: &mut B,
        disposal: &mut DisposalList,
    ) -> Result<(), RenderError> {
        for (key, slot) in world.textures() {
            let current = self.textures.get(&key).copied();
            if current.is_some_and(|t| t.revision == slot.revision) {
                continue;
            }
            let id = backend.create_texture(&slot.image)?;
            track(disposal, backend, ResourceKind::Texture, id)?;
            if let Some(old) = current {
                disposal.release_one(old.id, backend);
            }
            self.textures.insert(
                key,
                TextureUpload {
                    id,
                    revision: slot.revision,
                },
            );
        }

        let drawables = world.drawables_3d();
        let mut seen = Vec::with_capacity(drawables.len());
        for (entity, _, drawable) in &drawables {
            seen.push(*entity);
            let key = material_key(&drawable.material);
            if let Some(existing) = self.uploads.get(entity)
                && existing.shape == drawable.shape
                && existing.material == key
            {
                continue;
            }
            if let Some(stale) = self.uploads.remove(entity) {
                disposal.release_one(stale.material_id, backend);
                disposal.release_one(stale.geometry, backend);
            }

            let geometry = backend.create_geometry(&drawable.shape)?;
            track(disposal, backend, ResourceKind::Geometry, geometry)?;
            let material_id = backend.create_material(&drawable.material)?;
            track(disposal, backend, ResourceKind::Material, material_id)?;
            self.uploads.insert(
                *entity,
                Upload {
                    shape: drawable.shape,
                    material: key,
                    geometry,
                    material_id,
                },
            );
        }

        let stale: Vec<EntityId> = self
            .uploads
            .keys()
            .filter(|e| !seen.contains(e))
            .copied()
            .collect();
        if !stale.is_empty() {
            debug!(count = stale.len(), "releasing stale uploads");
        }
        for entity in stale {
            if let Some(upload) = self.uploads.remove(&entity) {
                disposal.release_one(upload.material_id, backend);
                disposal.release_one(upload.geometry, backend);
            }
        }
        Ok(())
    }

    /// Builds a frame from already-synced uploads. Drawables not yet uploaded are skipped.
    pub fn collect(&self, world: &World) -> RenderFrame {
        let mut frame = RenderFrame {
            view_proj: self.camera.view_proj(),
            eye: self.camera.position,
            lighting: world.lighting(),
            background: world.background(),
            draws: Vec::new(),
        };
        for (entity, model, drawable) in world.drawables_3d() {
            let Some(upload) = self.uploads.get(&entity) else {
                continue;
            };
            let texture = drawable
                .material
                .texture
                .and_then(|key| self.textures.get(&key))
                .map(|t| t.id);
            frame.draws.push(DrawCall {
                geometry: upload.geometry,
                material: upload.material_id,
                texture,
                model,
                opacity: drawable.material.opacity,
            });
        }
        frame
    }

    pub fn render<B: RenderBackend + ?Sized>(
        &mut self,
        world: &World,
        backend: &mut B,
        disposal: &mut DisposalList,
    ) -> Result<(), RenderError> {
        self.sync(world, backend, disposal)?;
        let frame = self.collect(world);
        backend.render(&frame)
    }

    /// Forgets every upload. The resources themselves are released by the disposal list.
    pub fn clear(&mut self) {
        self.uploads.clear();
        self.textures.clear();
    }
}

fn track<B: RenderBackend + ?Sized>(
    disposal: &mut DisposalList,
    backend: &mut B,
    kind: ResourceKind,
    id: ResourceId,
) -> Result<(), RenderError> {
    if disposal.track(kind, id) {
        Ok(())
    } else {
        backend.release(id);
        Err(RenderError::Disposed)
    }
}
