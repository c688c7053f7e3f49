use std::f64::consts::FRAC_PI_2;

use foundation::color::Rgb;
use foundation::math::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::World;
use crate::components::{Drawable3D, Material, Shape3D, Transform};
use crate::data::{FundsDistribution, sanitized_amount};
use crate::entity::EntityId;
use crate::world::Lighting;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundsMapLayout {
    pub plane_width: f64,
    pub plane_depth: f64,
    pub plane_color: Rgb,
    pub plane_opacity: f32,
    pub grid_size: f64,
    pub grid_divisions: u32,
    pub grid_color: Rgb,
    /// Height of the tallest bar.
    pub max_bar_height: f64,
    pub bar_radius: f64,
    pub bar_segments: u32,
    pub bar_shininess: f32,
    pub bar_emissive_factor: f64,
    pub halo_radius: f64,
    pub halo_extra_height: f64,
    pub halo_opacity: f32,
    pub background: Rgb,
    pub ambient: Rgb,
    pub ambient_intensity: f32,
    pub sun_position: [f64; 3],
}

impl Default for FundsMapLayout {
    fn default() -> Self {
        Self {
            plane_width: 10.0,
            plane_depth: 6.0,
            plane_color: Rgb::from_hex(0x1f2937),
            plane_opacity: 0.1,
            grid_size: 10.0,
            grid_divisions: 10,
            grid_color: Rgb::from_hex(0x4b5563),
            max_bar_height: 3.0,
            bar_radius: 0.3,
            bar_segments: 32,
            bar_shininess: 30.0,
            bar_emissive_factor: 0.2,
            halo_radius: 0.35,
            halo_extra_height: 0.1,
            halo_opacity: 0.3,
            background: Rgb::from_hex(0x111827),
            ambient: Rgb::from_hex(0x404040),
            ambient_intensity: 0.5,
            sun_position: [1.0, 1.0, 1.0],
        }
    }
}

impl FundsMapLayout {
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

/// Bar heights proportional to amount, the largest equal to `max_height`.
///
/// The divisor is the largest amount when positive and 1 otherwise, so an all-zero set
/// yields flat bars rather than NaN.
pub fn bar_heights(distributions: &[FundsDistribution], max_height: f64) -> Vec<f64> {
    let amounts: Vec<f64> = distributions
        .iter()
        .map(|d| sanitized_amount(d.amount))
        .collect();
    let max = amounts.iter().copied().fold(0.0_f64, f64::max);
    let divisor = if max > 0.0 { max } else { 1.0 };
    amounts
        .iter()
        .map(|a| (a / divisor * max_height).clamp(0.0, max_height))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct FundsMapScene {
    /// Rotated as a whole by the view.
    pub root: EntityId,
    pub plane: EntityId,
    pub grid: EntityId,
    pub bars: Vec<EntityId>,
    pub halos: Vec<EntityId>,
    pub heights: Vec<f64>,
}

pub fn build_funds_map(
    world: &mut World,
    layout: &FundsMapLayout,
    distributions: &[FundsDistribution],
) -> FundsMapScene {
    world.set_background(layout.background);
    world.set_lighting(layout.lighting());

    let root = world.spawn();
    world.set_transform(root, Transform::identity());

    let plane = world.spawn_child(root);
    world.set_transform(
        plane,
        Transform::identity().with_rotation(Vec3::new(-FRAC_PI_2, 0.0, 0.0)),
    );
    world.set_drawable_3d(
        plane,
        Drawable3D::new(
            Shape3D::Plane {
                width: layout.plane_width,
                height: layout.plane_depth,
            },
            Material::basic(layout.plane_color)
                .translucent(layout.plane_opacity)
                .double_sided(),
        ),
    );

    let grid = world.spawn_child(root);
    world.set_transform(grid, Transform::identity());
    world.set_drawable_3d(
        grid,
        Drawable3D::new(
            Shape3D::Grid {
                size: layout.grid_size,
                divisions: layout.grid_divisions,
            },
            Material::basic(layout.grid_color),
        ),
    );

    let mut scene = FundsMapScene {
        root,
        plane,
        grid,
        bars: Vec::new(),
        halos: Vec::new(),
        heights: Vec::new(),
    };
    rebuild_bars(world, layout, &mut scene, distributions);
    scene
}

/// Replaces every bar and halo with one per distribution.
pub fn rebuild_bars(
    world: &mut World,
    layout: &FundsMapLayout,
    scene: &mut FundsMapScene,
    distributions: &[FundsDistribution],
) {
    for e in scene.bars.drain(..).chain(scene.halos.drain(..)) {
        world.despawn(e);
    }

    scene.heights = bar_heights(distributions, layout.max_bar_height);
    for (dist, height) in distributions.iter().zip(scene.heights.iter().copied()) {
        let center = Vec3::new(dist.anchor.x, height / 2.0, dist.anchor.z);

        let bar = world.spawn_child(scene.root);
        world.set_transform(bar, Transform::translate(center));
        world.set_drawable_3d(
            bar,
            Drawable3D::cylinder(
                layout.bar_radius,
                height,
                layout.bar_segments,
                Material::phong(dist.color, layout.bar_shininess)
                    .with_emissive(dist.color.scaled(layout.bar_emissive_factor)),
            ),
        );

        let halo = world.spawn_child(scene.root);
        world.set_transform(halo, Transform::translate(center));
        world.set_drawable_3d(
            halo,
            Drawable3D::cylinder(
                layout.halo_radius,
                height + layout.halo_extra_height,
                layout.bar_segments,
                Material::basic(dist.color).translucent(layout.halo_opacity),
            ),
        );

        scene.bars.push(bar);
        scene.halos.push(halo);
    }
    debug!(bars = scene.bars.len(), "funds map bars built");
}

#[cfg(test)]
mod tests {
    use super::{FundsMapLayout, bar_heights, build_funds_map, rebuild_bars};
    use crate::World;
    use crate::components::{Shading, Shape3D};
    use crate::data::{Anchor, FundsDistribution};
    use foundation::color::Rgb;
    use foundation::math::Vec3;
    use pretty_assertions::assert_eq;

    fn dist(label: &str, amount: f64, x: f64) -> FundsDistribution {
        FundsDistribution {
            label: label.to_string(),
            amount,
            color: Rgb::from_hex(0x34a853),
            anchor: Anchor { x, z: 0.0 },
        }
    }

    #[test]
    fn heights_are_proportional_and_capped() {
        let d = vec![dist("a", 50.0, 0.0), dist("b", 100.0, 1.0), dist("c", 25.0, 2.0)];
        assert_eq!(bar_heights(&d, 3.0), vec![1.5, 3.0, 0.75]);
    }

    #[test]
    fn all_zero_amounts_give_flat_bars() {
        let d = vec![dist("a", 0.0, 0.0), dist("b", 0.0, 1.0)];
        assert_eq!(bar_heights(&d, 3.0), vec![0.0, 0.0]);
        assert!(bar_heights(&[], 3.0).is_empty());
    }

    #[test]
    fn small_amounts_still_reach_full_height() {
        let d = vec![dist("a", 0.25, 0.0), dist("b", 0.5, 1.0)];
        assert_eq!(bar_heights(&d, 3.0), vec![1.5, 3.0]);
    }

    #[test]
    fn degenerate_amounts_are_flat() {
        let d = vec![dist("a", -10.0, 0.0), dist("b", f64::NAN, 1.0), dist("c", 4.0, 2.0)];
        assert_eq!(bar_heights(&d, 3.0), vec![0.0, 0.0, 3.0]);
    }

    #[test]
    fn builds_plane_grid_bars_and_halos() {
        let mut world = World::new();
        let layout = FundsMapLayout::default();
        let d = vec![dist("a", 10.0, -2.0), dist("b", 20.0, 2.0)];
        let scene = build_funds_map(&mut world, &layout, &d);

        assert_eq!(scene.bars.len(), 2);
        assert_eq!(scene.halos.len(), 2);
        assert_eq!(world.drawables_3d().len(), 6);

        let bar = world.drawable_3d(scene.bars[1]).expect("bar");
        assert!(matches!(bar.shape, Shape3D::Cylinder { radius, height, .. } if radius == 0.3 && height == 3.0));
        assert_eq!(bar.material.shading, Shading::Phong { shininess: 30.0 });
        assert_eq!(bar.material.emissive, Rgb::from_hex(0x34a853).scaled(0.2));

        let center = world.world_matrix(scene.bars[1]).transform_point(Vec3::ZERO);
        assert_eq!(center, Vec3::new(2.0, 1.5, 0.0));

        let halo = world.drawable_3d(scene.halos[1]).expect("halo");
        assert!(matches!(halo.shape, Shape3D::Cylinder { height, .. } if (height - 3.1).abs() < 1e-12));
        assert_eq!(halo.material.opacity, 0.3);
    }

    #[test]
    fn rebuild_with_empty_input_leaves_floor() {
        let mut world = World::new();
        let layout = FundsMapLayout::default();
        let mut scene = build_funds_map(&mut world, &layout, &[dist("a", 1.0, 0.0)]);
        rebuild_bars(&mut world, &layout, &mut scene, &[]);
        assert!(scene.bars.is_empty());
        assert_eq!(world.drawables_3d().len(), 2);
    }
}
