use foundation::time::Time;

/// Metadata for one admitted (rendered) frame.
///
/// Frames are produced by [`crate::AnimationLoop`] from host clock timestamps, or built
/// with a fixed step for headless replay.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based index of admitted frames (throttled ticks are not counted).
    pub index: u64,
    /// Seconds since the previous admitted frame (0 for the first one).
    pub dt_s: f64,
    /// Host time at the start of the frame.
    pub time: Time,
}

impl Frame {
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(index as f64 * dt_s),
        }
    }

    pub fn at(index: u64, dt_s: f64, time: Time) -> Self {
        Self { index, dt_s, time }
    }

    pub fn next(self) -> Self {
        Self::at(self.index + 1, self.dt_s, Time(self.time.0 + self.dt_s))
    }
}
