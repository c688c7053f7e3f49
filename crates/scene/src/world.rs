use foundation::color::Rgb;
use foundation::handles::Handle;
use foundation::math::{Mat4, Vec3};

use crate::components::{Drawable3D, Transform};
use crate::entity::EntityId;
use crate::texture::{TextureImage, TextureKey};

/// Ambient fill plus one directional light.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Lighting {
    pub ambient_color: Rgb,
    pub ambient_intensity: f32,
    /// Position the directional light shines from, toward the origin.
    pub directional_from: Vec3,
    pub directional_color: Rgb,
    pub directional_intensity: f32,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient_color: Rgb::WHITE,
            ambient_intensity: 0.5,
            directional_from: Vec3::new(1.0, 1.0, 1.0),
            directional_color: Rgb::WHITE,
            directional_intensity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureSlot {
    pub image: TextureImage,
    /// Bumped whenever the image is replaced so uploads can be refreshed.
    pub revision: u32,
}

/// Entity store. Despawned slots are reused with a bumped generation, so a stale
/// `EntityId` never aliases the entity that took its slot.
#[derive(Debug, Default)]
pub struct World {
    alive: Vec<bool>,
    generations: Vec<u32>,
    free: Vec<u32>,
    transforms: Vec<Option<Transform>>,
    parents: Vec<Option<EntityId>>,
    drawables_3d: Vec<Option<Drawable3D>>,
    textures: Vec<TextureSlot>,
    lighting: Lighting,
    background: Rgb,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self) -> EntityId {
        let idx = match self.free.pop() {
            Some(idx) => idx as usize,
            None => {
                let idx = self.alive.len();
                self.alive.push(false);
                self.generations.push(0);
                self.transforms.push(None);
                self.parents.push(None);
                self.drawables_3d.push(None);
                idx
            }
        };
        self.alive[idx] = true;
        self.id_at(idx)
    }

    pub fn spawn_child(&mut self, parent: EntityId) -> EntityId {
        let id = self.spawn();
        self.parents[id.index() as usize] = Some(parent);
        id
    }

    /// Removes the entity and every descendant.
    pub fn despawn(&mut self, entity: EntityId) {
        let Some(idx) = self.slot(entity) else {
            return;
        };
        let children: Vec<EntityId> = self.children(entity);
        for child in children {
            self.despawn(child);
        }
        self.alive[idx] = false;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.transforms[idx] = None;
        self.parents[idx] = None;
        self.drawables_3d[idx] = None;
        self.free.push(idx as u32);
    }

    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.slot(entity).is_some()
    }

    pub fn entity_count(&self) -> usize {
        self.alive.iter().filter(|a| **a).count()
    }

    /// Slots ever allocated, live or free.
    pub fn slot_count(&self) -> usize {
        self.alive.len()
    }

    pub fn parent(&self, entity: EntityId) -> Option<EntityId> {
        self.slot(entity).and_then(|idx| self.parents[idx])
    }

    pub fn children(&self, entity: EntityId) -> Vec<EntityId> {
        self.parents
            .iter()
            .enumerate()
            .filter(|(idx, p)| **p == Some(entity) && self.alive[*idx])
            .map(|(idx, _)| self.id_at(idx))
            .collect()
    }

    pub fn set_transform(&mut self, entity: EntityId, transform: Transform) {
        if let Some(idx) = self.slot(entity) {
            self.transforms[idx] = Some(transform);
        }
    }

    pub fn transform(&self, entity: EntityId) -> Option<Transform> {
        self.slot(entity).and_then(|idx| self.transforms[idx])
    }

    pub fn transform_mut(&mut self, entity: EntityId) -> Option<&mut Transform> {
        let idx = self.slot(entity)?;
        self.transforms[idx].as_mut()
    }

    pub fn set_drawable_3d(&mut self, entity: EntityId, drawable: Drawable3D) {
        if let Some(idx) = self.slot(entity) {
            self.drawables_3d[idx] = Some(drawable);
        }
    }

    pub fn drawable_3d(&self, entity: EntityId) -> Option<&Drawable3D> {
        self.slot(entity).and_then(|idx| self.drawables_3d[idx].as_ref())
    }

    pub fn drawable_3d_mut(&mut self, entity: EntityId) -> Option<&mut Drawable3D> {
        let idx = self.slot(entity)?;
        self.drawables_3d[idx].as_mut()
    }

    /// Local transform composed with every ancestor's.
    pub fn world_matrix(&self, entity: EntityId) -> Mat4 {
        let local = self
            .transform(entity)
            .map(|t| t.matrix())
            .unwrap_or(Mat4::IDENTITY);
        match self.parent(entity) {
            Some(parent) => self.world_matrix(parent).mul(&local),
            None => local,
        }
    }

    pub fn drawables_3d(&self) -> Vec<(EntityId, Mat4, Drawable3D)> {
        let mut out = Vec::new();
        for (idx, drawable) in self.drawables_3d.iter().enumerate() {
            let Some(drawable) = drawable else { continue };
            if !self.alive[idx] || self.transforms[idx].is_none() {
                continue;
            }
            let id = self.id_at(idx);
            out.push((id, self.world_matrix(id), drawable.clone()));
        }
        out
    }

    pub fn add_texture(&mut self, image: TextureImage) -> TextureKey {
        let key = TextureKey(self.textures.len() as u32);
        self.textures.push(TextureSlot { image, revision: 0 });
        key
    }

    /// Swaps the image behind `key`; returns false for an unknown key.
    pub fn replace_texture(&mut self, key: TextureKey, image: TextureImage) -> bool {
        match self.textures.get_mut(key.0 as usize) {
            Some(slot) => {
                slot.image = image;
                slot.revision += 1;
                true
            }
            None => false,
        }
    }

    pub fn texture(&self, key: TextureKey) -> Option<&TextureSlot> {
        self.textures.get(key.0 as usize)
    }

    pub fn textures(&self) -> impl Iterator<Item = (TextureKey, &TextureSlot)> {
        self.textures
            .iter()
            .enumerate()
            .map(|(i, slot)| (TextureKey(i as u32), slot))
    }

    pub fn lighting(&self) -> Lighting {
        self.lighting
    }

    pub fn set_lighting(&mut self, lighting: Lighting) {
        self.lighting = lighting;
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    pub fn set_background(&mut self, color: Rgb) {
        self.background = color;
    }

    fn id_at(&self, idx: usize) -> EntityId {
        EntityId(Handle::new(idx as u32, self.generations[idx]))
    }

    /// Index of a live entity whose generation still matches.
    fn slot(&self, entity: EntityId) -> Option<usize> {
        let idx = entity.index() as usize;
        (self.alive.get(idx).copied().unwrap_or(false)
            && self.generations[idx] == entity.0.generation())
        .then_some(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::World;
    use crate::components::{Drawable3D, Material, Transform};
    use crate::texture::TextureImage;
    use foundation::color::Rgb;
    use foundation::math::Vec3;

    fn ball() -> Drawable3D {
        Drawable3D::sphere(1.0, 8, Material::basic(Rgb::WHITE))
    }

    #[test]
    fn spawn_and_collect_drawables() {
        let mut world = World::new();
        let entity = world.spawn();
        world.set_transform(entity, Transform::identity());
        world.set_drawable_3d(entity, ball());

        let drawables = world.drawables_3d();
        assert_eq!(drawables.len(), 1);
        assert_eq!(drawables[0].0, entity);
    }

    #[test]
    fn entities_without_transform_are_skipped() {
        let mut world = World::new();
        let entity = world.spawn();
        world.set_drawable_3d(entity, ball());
        assert!(world.drawables_3d().is_empty());
    }

    #[test]
    fn child_inherits_parent_transform() {
        let mut world = World::new();
        let parent = world.spawn();
        world.set_transform(parent, Transform::translate(Vec3::new(1.0, 0.0, 0.0)));
        let child = world.spawn_child(parent);
        world.set_transform(child, Transform::translate(Vec3::new(0.0, 2.0, 0.0)));

        let p = world.world_matrix(child).transform_point(Vec3::ZERO);
        assert_eq!(p, Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn despawn_removes_descendants() {
        let mut world = World::new();
        let root = world.spawn();
        let child = world.spawn_child(root);
        let grandchild = world.spawn_child(child);
        let other = world.spawn();
        for e in [root, child, grandchild, other] {
            world.set_transform(e, Transform::identity());
            world.set_drawable_3d(e, ball());
        }

        world.despawn(child);
        assert!(world.is_alive(root));
        assert!(!world.is_alive(child));
        assert!(!world.is_alive(grandchild));
        assert_eq!(world.entity_count(), 2);
        assert_eq!(world.drawables_3d().len(), 2);
    }

    #[test]
    fn despawned_slots_are_reused_with_new_generation() {
        let mut world = World::new();
        let root = world.spawn();
        world.set_transform(root, Transform::identity());
        let mut children = Vec::new();
        for _ in 0..1000 {
            for child in children.drain(..) {
                world.despawn(child);
            }
            for _ in 0..5 {
                let child = world.spawn_child(root);
                world.set_transform(child, Transform::identity());
                world.set_drawable_3d(child, ball());
                children.push(child);
            }
        }

        assert_eq!(world.entity_count(), 6);
        assert_eq!(world.slot_count(), 6);
        assert_eq!(world.children(root).len(), 5);
        assert_eq!(world.drawables_3d().len(), 5);
    }

    #[test]
    fn stale_id_does_not_alias_reused_slot() {
        let mut world = World::new();
        let old = world.spawn();
        world.set_transform(old, Transform::identity());
        world.despawn(old);

        let new = world.spawn();
        assert_eq!(new.index(), old.index());
        assert_ne!(new, old);
        assert!(!world.is_alive(old));
        assert!(world.transform(new).is_none());

        world.set_transform(old, Transform::translate(Vec3::new(1.0, 0.0, 0.0)));
        assert!(world.transform(new).is_none());
    }

    #[test]
    fn replacing_texture_bumps_revision() {
        let mut world = World::new();
        let key = world.add_texture(TextureImage::filled(1, 1, [0, 0, 0, 255]));
        assert_eq!(world.texture(key).map(|t| t.revision), Some(0));

        assert!(world.replace_texture(key, TextureImage::filled(2, 2, [9, 9, 9, 255])));
        let slot = world.texture(key).expect("slot");
        assert_eq!(slot.revision, 1);
        assert_eq!(slot.image.width(), 2);
    }
}
