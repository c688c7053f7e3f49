use foundation::color::Rgb;
use foundation::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::particles::{Burst, BurstConfig, Emitter, Motion, Physics, Span, Termination};

/// Particles gathering into a tree canopy above a trunk, then fading out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeBurstConfig {
    pub width: f64,
    pub height: f64,
    pub count: usize,
    /// Half-extent of the square the particles start in.
    pub spread: f64,
    pub columns: usize,
    pub spacing_x: f64,
    pub spacing_y: f64,
    /// Fraction by which the top row is narrower than the bottom one.
    pub taper: f64,
    pub ease: f64,
    pub life_decay: f64,
    pub hue: Span,
    pub saturation: f64,
    pub lightness: f64,
    pub radius: f64,
    /// Trunk runs from `center.y + trunk_top` down to `center.y + trunk_bottom`.
    pub trunk_top: f64,
    pub trunk_bottom: f64,
    pub trunk_color: Rgb,
    pub trunk_width: f64,
    pub max_ticks: u64,
}

impl Default for TreeBurstConfig {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 400.0,
            count: 100,
            spread: 30.0,
            columns: 20,
            spacing_x: 15.0,
            spacing_y: 20.0,
            taper: 0.75,
            ease: 0.05,
            life_decay: 0.005,
            hue: Span::new(120.0, 180.0),
            saturation: 0.7,
            lightness: 0.5,
            radius: 3.0,
            trunk_top: 50.0,
            trunk_bottom: 150.0,
            trunk_color: Rgb::from_hex(0x8b4513),
            trunk_width: 8.0,
            max_ticks: 10_000,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Trunk {
    pub from: Vec2,
    pub to: Vec2,
    pub width: f64,
    pub color: Rgb,
}

impl TreeBurstConfig {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn trunk(&self) -> Trunk {
        let c = self.center();
        Trunk {
            from: Vec2::new(c.x, c.y + self.trunk_top),
            to: Vec2::new(c.x, c.y + self.trunk_bottom),
            width: self.trunk_width,
            color: self.trunk_color,
        }
    }

    /// One target per particle: rows of `columns` stacked upward from the center,
    /// each row narrower than the one below.
    pub fn canopy_targets(&self) -> Vec<Vec2> {
        let columns = self.columns.max(1);
        let rows = self.count.div_ceil(columns).max(1);
        let c = self.center();
        let mid = (columns - 1) as f64 / 2.0;
        (0..self.count)
            .map(|i| {
                let row = i / columns;
                let col = i % columns;
                let narrowing = if rows > 1 {
                    1.0 - self.taper.clamp(0.0, 1.0) * row as f64 / (rows - 1) as f64
                } else {
                    1.0
                };
                Vec2::new(
                    c.x + (col as f64 - mid) * self.spacing_x * narrowing,
                    c.y - row as f64 * self.spacing_y,
                )
            })
            .collect()
    }

    pub fn burst_config(&self) -> BurstConfig {
        BurstConfig {
            count: self.count,
            emitter: Emitter::Around {
                center: self.center(),
                spread: self.spread,
            },
            velocity_x: Span::fixed(0.0),
            velocity_y: Span::fixed(0.0),
            hue: self.hue,
            saturation: self.saturation,
            lightness: self.lightness,
            size: Span::fixed(self.radius),
            rotation_speed: Span::fixed(0.0),
            life_decay: self.life_decay,
            physics: Physics {
                gravity: 0.0,
                drag: 0.0,
            },
            motion: Motion::SeekTargets {
                targets: self.canopy_targets(),
                ease: self.ease,
            },
            termination: Termination::LifeExhausted,
            max_ticks: self.max_ticks,
        }
    }

    pub fn spawn(&self, seed: u64) -> Burst {
        Burst::spawn(self.burst_config(), seed)
    }
}
