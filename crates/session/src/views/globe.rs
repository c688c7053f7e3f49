use foundation::math::{Vec2, Vec3};
use gpu::PerspectiveCamera;
use runtime::Frame;
use scene::World;
use scene::data::DonationPoint;
use scene::prefabs::{GlobeLayout, GlobeScene, build_globe, rebuild_markers};
use scene::texture::{
    AssetLoadError, TextureImage, TextureKey, TextureOrigin, procedural_clouds, procedural_earth,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fallback::{Fallback2D, fallback_markers};
use crate::views::SceneView;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    pub layout: GlobeLayout,
    pub fps_cap: Option<f64>,
    /// Radians added to the globe's yaw every frame.
    pub spin_per_frame: f64,
    pub cloud_spin_per_frame: f64,
    pub pointer_gain: f64,
    pub pointer_ease: f64,
    pub pulse_amplitude: f64,
    pub opacity_base: f32,
    pub opacity_amplitude: f32,
    pub camera_distance: f64,
    pub fov_deg: f64,
    pub near: f64,
    pub far: f64,
    pub texture_seed: u64,
    pub earth_texture_url: String,
    pub fallback_image_url: String,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            layout: GlobeLayout::default(),
            fps_cap: Some(30.0),
            spin_per_frame: 0.002,
            cloud_spin_per_frame: 0.003,
            pointer_gain: 0.3,
            pointer_ease: 0.05,
            pulse_amplitude: 0.3,
            opacity_base: 0.7,
            opacity_amplitude: 0.3,
            camera_distance: 5.0,
            fov_deg: 75.0,
            near: 0.1,
            far: 1000.0,
            texture_seed: 0x5eed,
            earth_texture_url:
                "https://raw.githubusercontent.com/mrdoob/three.js/dev/examples/textures/planets/earth_atmos_2048.jpg"
                    .to_string(),
            fallback_image_url:
                "https://upload.wikimedia.org/wikipedia/commons/8/80/World_map_-_low_resolution.svg"
                    .to_string(),
        }
    }
}

/// Rotating earth with one pulsing marker per donation.
#[derive(Debug)]
pub struct GlobeView {
    config: GlobeConfig,
    donations: Vec<DonationPoint>,
    scene: Option<GlobeScene>,
    earth: Option<TextureKey>,
    earth_origin: TextureOrigin,
    pending_earth: Option<TextureImage>,
    markers_dirty: bool,
}

impl GlobeView {
    pub fn new(config: GlobeConfig, donations: Vec<DonationPoint>) -> Self {
        Self {
            config,
            donations,
            scene: None,
            earth: None,
            earth_origin: TextureOrigin::Procedural,
            pending_earth: None,
            markers_dirty: false,
        }
    }

    pub fn config(&self) -> &GlobeConfig {
        &self.config
    }

    pub fn scene(&self) -> Option<&GlobeScene> {
        self.scene.as_ref()
    }

    pub fn donations(&self) -> &[DonationPoint] {
        &self.donations
    }

    pub fn earth_origin(&self) -> TextureOrigin {
        self.earth_origin
    }

    /// Replaces the data set; markers are rebuilt on the next frame.
    pub fn set_donations(&mut self, donations: Vec<DonationPoint>) {
        self.donations = donations;
        self.markers_dirty = true;
    }

    /// Result of the remote earth image load. A failure keeps the procedural texture.
    pub fn offer_earth_texture(&mut self, loaded: Result<TextureImage, AssetLoadError>) {
        match loaded {
            Ok(image) => self.pending_earth = Some(image),
            Err(error) => debug!(%error, "keeping procedural earth texture"),
        }
    }
}

impl SceneView for GlobeView {
    fn name(&self) -> &'static str {
        "globe"
    }

    fn fps_cap(&self) -> Option<f64> {
        self.config.fps_cap
    }

    fn camera(&self) -> PerspectiveCamera {
        PerspectiveCamera::look_at(
            Vec3::new(0.0, 0.0, self.config.camera_distance),
            Vec3::ZERO,
            self.config.fov_deg,
            self.config.near,
            self.config.far,
        )
    }

    fn build(&mut self, world: &mut World) {
        let seed = self.config.texture_seed;
        let earth_image = match self.pending_earth.take() {
            Some(image) => {
                self.earth_origin = TextureOrigin::Remote;
                image
            }
            None => procedural_earth(seed),
        };
        let earth = world.add_texture(earth_image);
        let clouds = world.add_texture(procedural_clouds(seed.wrapping_add(1)));
        self.earth = Some(earth);
        self.scene = Some(build_globe(
            world,
            &self.config.layout,
            &self.donations,
            earth,
            clouds,
        ));
        self.markers_dirty = false;
    }

    fn update(&mut self, world: &mut World) {
        if self.markers_dirty
            && let Some(scene) = self.scene.as_mut()
        {
            rebuild_markers(world, &self.config.layout, scene, &self.donations);
            self.markers_dirty = false;
        }
        if let Some(key) = self.earth
            && let Some(image) = self.pending_earth.take()
            && world.replace_texture(key, image)
        {
            self.earth_origin = TextureOrigin::Remote;
            debug!("remote earth texture applied");
        }
    }

    fn animate(&mut self, world: &mut World, frame: &Frame, pointer: Vec2) {
        let Some(scene) = &self.scene else {
            return;
        };
        let cfg = &self.config;
        let target = pointer * cfg.pointer_gain;

        for (entity, spin) in [
            (scene.globe, cfg.spin_per_frame),
            (scene.clouds, cfg.cloud_spin_per_frame),
        ] {
            if let Some(t) = world.transform_mut(entity) {
                t.rotation.y += spin;
                t.rotation.x += (target.y - t.rotation.x) * cfg.pointer_ease;
                t.rotation.y += (target.x - t.rotation.y) * cfg.pointer_ease;
            }
        }

        let time = frame.time.seconds();
        for (i, marker) in scene.markers.iter().enumerate() {
            let phase = i as f64;
            if let Some(t) = world.transform_mut(*marker) {
                t.scale = Vec3::splat(1.0 + (time + phase).sin() * cfg.pulse_amplitude);
            }
            if let Some(d) = world.drawable_3d_mut(*marker) {
                d.material.opacity =
                    cfg.opacity_base + (time * 2.0 + phase).sin() as f32 * cfg.opacity_amplitude;
            }
        }
    }

    fn fallback(&self) -> Option<Fallback2D> {
        Some(Fallback2D {
            image_url: self.config.fallback_image_url.clone(),
            markers: fallback_markers(&self.donations),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{GlobeConfig, GlobeView};
    use crate::views::SceneView;
    use foundation::math::{Vec2, Vec3};
    use foundation::time::Time;
    use runtime::Frame;
    use scene::World;
    use scene::data::DonationPoint;
    use scene::texture::{AssetLoadError, TextureImage, TextureOrigin};

    fn view(n: usize) -> (GlobeView, World) {
        let donations = (0..n)
            .map(|i| DonationPoint::new(i as f64, i as f64 * 10.0, 100.0, "health"))
            .collect();
        let mut v = GlobeView::new(GlobeConfig::default(), donations);
        let mut world = World::new();
        v.build(&mut world);
        (v, world)
    }

    #[test]
    fn builds_globe_with_procedural_textures() {
        let (v, world) = view(3);
        let scene = v.scene().expect("scene");
        assert_eq!(scene.markers.len(), 3);
        assert_eq!(world.textures().count(), 2);
        assert_eq!(v.earth_origin(), TextureOrigin::Procedural);
    }

    #[test]
    fn globe_spins_and_leans_toward_pointer() {
        let (mut v, mut world) = view(1);
        let globe = v.scene().expect("scene").globe;
        let frame = Frame::at(0, 0.0, Time::ZERO);
        v.animate(&mut world, &frame, Vec2::new(1.0, 1.0));

        let rot = world.transform(globe).expect("transform").rotation;
        // y: +0.002 then eased 5% toward 0.3.
        let expected_y = 0.002 + (0.3 - 0.002) * 0.05;
        assert!((rot.y - expected_y).abs() < 1e-12);
        assert!((rot.x - 0.3 * 0.05).abs() < 1e-12);
    }

    #[test]
    fn markers_pulse_in_scale_and_opacity() {
        let (mut v, mut world) = view(2);
        let markers = v.scene().expect("scene").markers.clone();
        let frame = Frame::at(0, 0.0, Time(std::f64::consts::FRAC_PI_2));
        v.animate(&mut world, &frame, Vec2::ZERO);

        let s0 = world.transform(markers[0]).expect("m0").scale;
        assert!((s0.x - 1.3).abs() < 1e-12);
        assert_eq!(s0, Vec3::splat(s0.x));
        let o0 = world.drawable_3d(markers[0]).expect("m0").material.opacity;
        // sin(pi) == 0 up to rounding.
        assert!((o0 - 0.7).abs() < 1e-6);
    }

    #[test]
    fn new_donations_rebuild_markers_on_update() {
        let (mut v, mut world) = view(2);
        v.set_donations(vec![DonationPoint::new(0.0, 0.0, 1.0, "water"); 5]);
        assert_eq!(v.scene().map(|s| s.markers.len()), Some(2));
        v.update(&mut world);
        assert_eq!(v.scene().map(|s| s.markers.len()), Some(5));
    }

    #[test]
    fn remote_texture_swaps_in_and_failures_are_ignored() {
        let (mut v, mut world) = view(0);
        v.offer_earth_texture(Err(AssetLoadError::Fetch("offline".into())));
        v.update(&mut world);
        assert_eq!(v.earth_origin(), TextureOrigin::Procedural);

        v.offer_earth_texture(Ok(TextureImage::filled(8, 4, [0, 0, 0, 255])));
        v.update(&mut world);
        assert_eq!(v.earth_origin(), TextureOrigin::Remote);
        let revisions: Vec<u32> = world.textures().map(|(_, s)| s.revision).collect();
        assert_eq!(revisions, vec![1, 0]);
    }

    #[test]
    fn fallback_lists_every_donation() {
        let (v, _) = view(4);
        let fallback = v.fallback().expect("fallback");
        assert_eq!(fallback.markers.len(), 4);
    }
}
