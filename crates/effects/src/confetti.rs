use serde::{Deserialize, Serialize};

use crate::particles::{Burst, BurstConfig, Emitter, Motion, Physics, Span, Termination};

/// Celebration confetti raining from the top edge of the viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfettiConfig {
    pub count: usize,
    /// Spawn height; slightly above the visible area.
    pub start_y: f64,
    pub velocity_x: Span,
    pub velocity_y: Span,
    pub gravity: f64,
    pub size: Span,
    pub rotation_speed: Span,
    pub saturation: f64,
    pub lightness: f64,
    pub bottom_margin: f64,
    pub life_decay: f64,
    pub max_ticks: u64,
}

impl Default for ConfettiConfig {
    fn default() -> Self {
        Self {
            count: 150,
            start_y: -10.0,
            velocity_x: Span::new(-4.0, 4.0),
            velocity_y: Span::new(2.0, 5.0),
            gravity: 0.1,
            size: Span::new(3.0, 11.0),
            rotation_speed: Span::new(-0.1, 0.1),
            saturation: 0.7,
            lightness: 0.6,
            bottom_margin: 10.0,
            life_decay: 0.002,
            max_ticks: 10_000,
        }
    }
}

impl ConfettiConfig {
    pub fn burst_config(&self, width: f64, height: f64) -> BurstConfig {
        BurstConfig {
            count: self.count,
            emitter: Emitter::Line {
                width: width.max(0.0),
                y: self.start_y,
            },
            velocity_x: self.velocity_x,
            velocity_y: self.velocity_y,
            hue: Span::new(0.0, 360.0),
            saturation: self.saturation,
            lightness: self.lightness,
            size: self.size,
            rotation_speed: self.rotation_speed,
            life_decay: self.life_decay,
            physics: Physics {
                gravity: self.gravity,
                drag: 0.0,
            },
            motion: Motion::Ballistic,
            termination: Termination::OffBottomEdge {
                height: height.max(0.0),
                margin: self.bottom_margin,
            },
            max_ticks: self.max_ticks,
        }
    }

    pub fn spawn(&self, width: f64, height: f64, seed: u64) -> Burst {
        Burst::spawn(self.burst_config(width, height), seed)
    }
}
