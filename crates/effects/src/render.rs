use foundation::color::Rgb;
use foundation::math::Vec2;

use crate::particles::Burst;
use crate::tree::Trunk;

/// 2D drawing surface for particle bursts.
pub trait ParticleCanvas {
    fn clear(&mut self);
    /// Axis-aligned square of edge `size` centered on `center`, rotated by `rotation` rad.
    fn fill_rotated_rect(&mut self, center: Vec2, size: f64, rotation: f64, color: Rgb);
    fn fill_circle(&mut self, center: Vec2, radius: f64, color: Rgb, alpha: f64);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f64, color: Rgb);
}

pub fn draw_confetti<C: ParticleCanvas + ?Sized>(canvas: &mut C, burst: &Burst) {
    canvas.clear();
    for p in burst.particles() {
        canvas.fill_rotated_rect(p.position, p.size, p.rotation, p.color);
    }
}

/// Trunk first, then the canopy particles faded by their remaining life.
pub fn draw_tree<C: ParticleCanvas + ?Sized>(canvas: &mut C, burst: &Burst, trunk: &Trunk) {
    canvas.clear();
    canvas.stroke_line(trunk.from, trunk.to, trunk.width, trunk.color);
    for p in burst.particles() {
        canvas.fill_circle(p.position, p.size, p.color, p.life);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear,
    Rect {
        center: Vec2,
        size: f64,
        rotation: f64,
        color: Rgb,
    },
    Circle {
        center: Vec2,
        radius: f64,
        color: Rgb,
        alpha: f64,
    },
    Line {
        from: Vec2,
        to: Vec2,
        width: f64,
        color: Rgb,
    },
}

/// Canvas that keeps every operation since the last clear.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub ops: Vec<DrawOp>,
    pub clears: usize,
}

impl ParticleCanvas for RecordingCanvas {
    fn clear(&mut self) {
        self.ops.clear();
        self.ops.push(DrawOp::Clear);
        self.clears += 1;
    }

    fn fill_rotated_rect(&mut self, center: Vec2, size: f64, rotation: f64, color: Rgb) {
        self.ops.push(DrawOp::Rect {
            center,
            size,
            rotation,
            color,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f64, color: Rgb, alpha: f64) {
        self.ops.push(DrawOp::Circle {
            center,
            radius,
            color,
            alpha,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f64, color: Rgb) {
        self.ops.push(DrawOp::Line {
            from,
            to,
            width,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::{DrawOp, RecordingCanvas, draw_confetti, draw_tree};
    use crate::confetti::ConfettiConfig;
    use crate::tree::TreeBurstConfig;

    #[test]
    fn confetti_draws_one_rect_per_particle() {
        let burst = ConfettiConfig::default().spawn(300.0, 200.0, 1);
        let mut canvas = RecordingCanvas::default();
        draw_confetti(&mut canvas, &burst);
        assert_eq!(canvas.ops[0], DrawOp::Clear);
        let rects = canvas
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Rect { .. }))
            .count();
        assert_eq!(rects, 150);
    }

    #[test]
    fn tree_draws_trunk_then_faded_dots() {
        let cfg = TreeBurstConfig::default();
        let mut burst = cfg.spawn(2);
        for _ in 0..100 {
            burst.step();
        }
        let mut canvas = RecordingCanvas::default();
        draw_tree(&mut canvas, &burst, &cfg.trunk());

        assert!(matches!(canvas.ops[1], DrawOp::Line { width, .. } if width == 8.0));
        let alphas: Vec<f64> = canvas
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Circle { alpha, .. } => Some(*alpha),
                _ => None,
            })
            .collect();
        assert_eq!(alphas.len(), 100);
        assert!(alphas.iter().all(|a| (a - 0.5).abs() < 1e-9));
    }
}
