use foundation::color::Rgb;
use foundation::math::{Vec3, project_to_sphere};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::World;
use crate::components::{Drawable3D, Material, Transform};
use crate::data::{DonationPoint, sanitized_amount};
use crate::entity::EntityId;
use crate::palette::category_color;
use crate::texture::TextureKey;
use crate::world::Lighting;

/// Geometry and shading of the donation globe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeLayout {
    pub radius: f64,
    pub segments: u32,
    pub shininess: f32,
    pub cloud_radius: f64,
    pub cloud_opacity: f32,
    pub marker_radius: f64,
    /// Amount that maps to a marker radius of 1.
    pub marker_amount_scale: f64,
    pub marker_min_size: f64,
    pub marker_max_size: f64,
    pub marker_segments: u32,
    pub marker_opacity: f32,
    pub background: Rgb,
    pub ambient: Rgb,
    pub ambient_intensity: f32,
    pub sun_position: [f64; 3],
}

impl Default for GlobeLayout {
    fn default() -> Self {
        Self {
            radius: 2.0,
            segments: 64,
            shininess: 100.0,
            cloud_radius: 2.03,
            cloud_opacity: 0.3,
            marker_radius: 2.1,
            marker_amount_scale: 1000.0,
            marker_min_size: 0.02,
            marker_max_size: 0.15,
            marker_segments: 16,
            marker_opacity: 0.8,
            background: Rgb::from_hex(0x000011),
            ambient: Rgb::from_hex(0x404040),
            ambient_intensity: 0.6,
            sun_position: [5.0, 3.0, 5.0],
        }
    }
}

impl GlobeLayout {
    /// Marker radius for a donation amount, always within `[min, max]`.
    pub fn marker_size(&self, amount: f64) -> f64 {
        let scale = if self.marker_amount_scale > 0.0 {
            self.marker_amount_scale
        } else {
            1.0
        };
        (sanitized_amount(amount) / scale).clamp(self.marker_min_size, self.marker_max_size)
    }

    pub fn lighting(&self) -> Lighting {
        let [x, y, z] = self.sun_position;
        Lighting {
            ambient_color: self.ambient,
            ambient_intensity: self.ambient_intensity,
            directional_from: Vec3::new(x, y, z),
            directional_color: Rgb::WHITE,
            directional_intensity: 1.0,
        }
    }
}

/// Entities of a built globe scene.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobeScene {
    pub globe: EntityId,
    pub clouds: EntityId,
    /// Parent of all markers; child of the globe so markers turn with it.
    pub marker_group: EntityId,
    pub markers: Vec<EntityId>,
}

pub fn build_globe(
    world: &mut World,
    layout: &GlobeLayout,
    donations: &[DonationPoint],
    earth: TextureKey,
    clouds: TextureKey,
) -> GlobeScene {
    world.set_background(layout.background);
    world.set_lighting(layout.lighting());

    let globe = world.spawn();
    world.set_transform(globe, Transform::identity());
    world.set_drawable_3d(
        globe,
        Drawable3D::sphere(
            layout.radius,
            layout.segments,
            Material::phong(Rgb::WHITE, layout.shininess).with_texture(earth),
        ),
    );

    let cloud_shell = world.spawn();
    world.set_transform(cloud_shell, Transform::identity());
    world.set_drawable_3d(
        cloud_shell,
        Drawable3D::sphere(
            layout.cloud_radius,
            layout.segments,
            Material::lambert(Rgb::WHITE)
                .with_texture(clouds)
                .translucent(layout.cloud_opacity),
        ),
    );

    let marker_group = world.spawn_child(globe);
    world.set_transform(marker_group, Transform::identity());

    let mut scene = GlobeScene {
        globe,
        clouds: cloud_shell,
        marker_group,
        markers: Vec::new(),
    };
    rebuild_markers(world, layout, &mut scene, donations);
    scene
}

/// Replaces every marker with one per donation.
pub fn rebuild_markers(
    world: &mut World,
    layout: &GlobeLayout,
    scene: &mut GlobeScene,
    donations: &[DonationPoint],
) {
    for marker in scene.markers.drain(..) {
        world.despawn(marker);
    }

    for donation in donations {
        let geo = donation.geo();
        let position = project_to_sphere(geo.lat_deg, geo.lng_deg, layout.marker_radius);
        let material = Material::basic(category_color(&donation.category))
            .translucent(layout.marker_opacity);

        let marker = world.spawn_child(scene.marker_group);
        world.set_transform(marker, Transform::translate(position));
        world.set_drawable_3d(
            marker,
            Drawable3D::sphere(
                layout.marker_size(donation.amount),
                layout.marker_segments,
                material,
            ),
        );
        scene.markers.push(marker);
    }
    debug!(markers = scene.markers.len(), "globe markers built");
}
