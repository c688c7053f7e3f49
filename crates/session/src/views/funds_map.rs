use foundation::math::{Vec2, Vec3};
use gpu::PerspectiveCamera;
use runtime::Frame;
use scene::World;
use scene::data::FundsDistribution;
use scene::prefabs::{FundsMapLayout, FundsMapScene, build_funds_map, rebuild_bars};
use serde::{Deserialize, Serialize};

use crate::views::SceneView;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundsMapConfig {
    pub layout: FundsMapLayout,
    pub fps_cap: Option<f64>,
    /// Radians the whole map turns every frame.
    pub spin_per_frame: f64,
    /// Horizontal bar pulse, as a fraction of the bar radius.
    pub pulse_amplitude: f64,
    pub camera_position: [f64; 3],
    pub fov_deg: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for FundsMapConfig {
    fn default() -> Self {
        Self {
            layout: FundsMapLayout::default(),
            fps_cap: None,
            spin_per_frame: 0.005,
            pulse_amplitude: 0.1,
            camera_position: [0.0, 5.0, 8.0],
            fov_deg: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Slowly turning 3D bar chart of where the funds went.
#[derive(Debug)]
pub struct FundsMapView {
    config: FundsMapConfig,
    distributions: Vec<FundsDistribution>,
    scene: Option<FundsMapScene>,
    dirty: bool,
}

impl FundsMapView {
    pub fn new(config: FundsMapConfig, distributions: Vec<FundsDistribution>) -> Self {
        Self {
            config,
            distributions,
            scene: None,
            dirty: false,
        }
    }

    pub fn scene(&self) -> Option<&FundsMapScene> {
        self.scene.as_ref()
    }

    pub fn set_distributions(&mut self, distributions: Vec<FundsDistribution>) {
        self.distributions = distributions;
        self.dirty = true;
    }
}

impl SceneView for FundsMapView {
    fn name(&self) -> &'static str {
        "funds-map"
    }

    fn fps_cap(&self) -> Option<f64> {
        self.config.fps_cap
    }

    fn camera(&self) -> PerspectiveCamera {
        let [x, y, z] = self.config.camera_position;
        PerspectiveCamera::look_at(
            Vec3::new(x, y, z),
            Vec3::ZERO,
            self.config.fov_deg,
            self.config.near,
            self.config.far,
        )
    }

    fn build(&mut self, world: &mut World) {
        self.scene = Some(build_funds_map(
            world,
            &self.config.layout,
            &self.distributions,
        ));
        self.dirty = false;
    }

    fn update(&mut self, world: &mut World) {
        if self.dirty
            && let Some(scene) = self.scene.as_mut()
        {
            rebuild_bars(world, &self.config.layout, scene, &self.distributions);
            self.dirty = false;
        }
    }

    fn animate(&mut self, world: &mut World, frame: &Frame, _pointer: Vec2) {
        let Some(scene) = &self.scene else {
            return;
        };
        if let Some(root) = world.transform_mut(scene.root) {
            root.rotation.y += self.config.spin_per_frame;
        }
        let time = frame.time.seconds();
        for (i, bar) in scene.bars.iter().enumerate() {
            let pulse = 1.0 + (time + i as f64).sin() * self.config.pulse_amplitude;
            if let Some(t) = world.transform_mut(*bar) {
                t.scale = Vec3::new(pulse, 1.0, pulse);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FundsMapConfig, FundsMapView};
    use crate::views::SceneView;
    use foundation::color::Rgb;
    use foundation::math::Vec2;
    use foundation::time::Time;
    use runtime::Frame;
    use scene::World;
    use scene::data::{Anchor, FundsDistribution};

    fn dists(amounts: &[f64]) -> Vec<FundsDistribution> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, a)| FundsDistribution {
                label: format!("d{i}"),
                amount: *a,
                color: Rgb::from_hex(0xea4335),
                anchor: Anchor { x: i as f64, z: 0.0 },
            })
            .collect()
    }

    #[test]
    fn map_turns_and_bars_pulse_sideways_only() {
        let mut v = FundsMapView::new(FundsMapConfig::default(), dists(&[1.0, 2.0]));
        let mut world = World::new();
        v.build(&mut world);
        let scene = v.scene().cloned().expect("scene");

        let frame = Frame::at(0, 0.0, Time(std::f64::consts::FRAC_PI_2));
        v.animate(&mut world, &frame, Vec2::ZERO);
        v.animate(&mut world, &frame, Vec2::ZERO);

        let root = world.transform(scene.root).expect("root");
        assert!((root.rotation.y - 0.01).abs() < 1e-12);
        let bar = world.transform(scene.bars[0]).expect("bar");
        assert!((bar.scale.x - 1.1).abs() < 1e-12);
        assert_eq!(bar.scale.y, 1.0);
        assert_eq!(bar.scale.x, bar.scale.z);
    }

    #[test]
    fn all_zero_amounts_build_flat_bars() {
        let mut v = FundsMapView::new(FundsMapConfig::default(), dists(&[0.0, 0.0, 0.0]));
        let mut world = World::new();
        v.build(&mut world);
        assert_eq!(v.scene().map(|s| s.heights.clone()), Some(vec![0.0; 3]));
    }

    #[test]
    fn updates_rebuild_bars() {
        let mut v = FundsMapView::new(FundsMapConfig::default(), dists(&[1.0]));
        let mut world = World::new();
        v.build(&mut world);
        v.set_distributions(dists(&[1.0, 2.0, 3.0]));
        v.update(&mut world);
        assert_eq!(v.scene().map(|s| s.bars.len()), Some(3));
    }
}
