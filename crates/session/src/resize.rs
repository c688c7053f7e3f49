use foundation::math::Vec2;
use gpu::PhysicalSize;
use serde::{Deserialize, Serialize};

/// Device pixel ratios above this are rendered at this ratio.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Container size in CSS pixels plus the display's pixel ratio.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_pixel_ratio")]
    pub pixel_ratio: f64,
}

fn default_pixel_ratio() -> f64 {
    1.0
}

impl ContainerSize {
    pub fn new(width: f64, height: f64, pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            pixel_ratio,
        }
    }

    pub fn effective_pixel_ratio(&self) -> f64 {
        if self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0 {
            self.pixel_ratio.min(MAX_PIXEL_RATIO)
        } else {
            1.0
        }
    }

    /// Drawing-buffer size; each side at least one pixel.
    pub fn physical(&self) -> PhysicalSize {
        let ratio = self.effective_pixel_ratio();
        let side = |css: f64| {
            let px = (css * ratio).round();
            if px.is_finite() && px >= 1.0 {
                px.min(f64::from(u32::MAX)) as u32
            } else {
                1
            }
        };
        PhysicalSize::new(side(self.width), side(self.height))
    }

    /// Maps a pointer position to `[-1, 1]` across the container. Positions outside the
    /// container map beyond that range.
    pub fn normalized_pointer(&self, x: f64, y: f64) -> Vec2 {
        let norm = |v: f64, extent: f64| {
            if extent > 0.0 {
                (v / extent - 0.5) * 2.0
            } else {
                0.0
            }
        };
        Vec2::new(norm(x, self.width), norm(y, self.height))
    }
}

/// Coalesces container size changes until the next frame. The last observed size wins.
#[derive(Debug, Default)]
pub struct ResizeReactor {
    pending: Option<ContainerSize>,
    applied: Option<ContainerSize>,
    observed: u64,
}

impl ResizeReactor {
    pub fn new(initial: ContainerSize) -> Self {
        Self {
            pending: None,
            applied: Some(initial),
            observed: 0,
        }
    }

    pub fn observe(&mut self, size: ContainerSize) {
        self.observed += 1;
        self.pending = Some(size);
    }

    /// The size to apply this frame, if it differs from the one in effect.
    pub fn take_pending(&mut self) -> Option<ContainerSize> {
        let size = self.pending.take()?;
        if self.applied == Some(size) {
            return None;
        }
        self.applied = Some(size);
        Some(size)
    }

    pub fn current(&self) -> Option<ContainerSize> {
        self.applied
    }

    pub fn observed(&self) -> u64 {
        self.observed
    }
}

#[cfg(test)]
mod tests {
    use super::{ContainerSize, ResizeReactor};
    use foundation::math::Vec2;
    use gpu::PhysicalSize;

    #[test]
    fn pixel_ratio_is_capped() {
        let s = ContainerSize::new(400.0, 300.0, 3.0);
        assert_eq!(s.physical(), PhysicalSize::new(800, 600));
        let s = ContainerSize::new(400.0, 300.0, 1.5);
        assert_eq!(s.physical(), PhysicalSize::new(600, 450));
    }

    #[test]
    fn zero_sized_container_still_has_pixels() {
        let s = ContainerSize::new(0.0, f64::NAN, 1.0);
        assert_eq!(s.physical(), PhysicalSize::new(1, 1));
    }

    #[test]
    fn last_observed_size_wins() {
        let mut r = ResizeReactor::new(ContainerSize::new(100.0, 100.0, 1.0));
        r.observe(ContainerSize::new(200.0, 100.0, 1.0));
        r.observe(ContainerSize::new(300.0, 100.0, 1.0));
        assert_eq!(r.take_pending(), Some(ContainerSize::new(300.0, 100.0, 1.0)));
        assert_eq!(r.take_pending(), None);
        assert_eq!(r.observed(), 2);
    }

    #[test]
    fn unchanged_size_is_not_reapplied() {
        let initial = ContainerSize::new(100.0, 100.0, 1.0);
        let mut r = ResizeReactor::new(initial);
        r.observe(initial);
        assert_eq!(r.take_pending(), None);
    }

    #[test]
    fn pointer_is_normalized_to_container() {
        let s = ContainerSize::new(200.0, 100.0, 1.0);
        assert_eq!(s.normalized_pointer(0.0, 0.0), Vec2::new(-1.0, -1.0));
        assert_eq!(s.normalized_pointer(100.0, 50.0), Vec2::new(0.0, 0.0));
        assert_eq!(s.normalized_pointer(200.0, 100.0), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn pointer_outside_container_is_not_clamped() {
        let s = ContainerSize::new(200.0, 100.0, 1.0);
        assert_eq!(s.normalized_pointer(500.0, -50.0), Vec2::new(4.0, -2.0));
    }
}
