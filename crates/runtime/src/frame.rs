use foundation::time::Time;

/// Display refresh step used by hosts that do not supply their own.
pub const DEFAULT_DT_S: f64 = 1.0 / 60.0;

/// Deterministic frame metadata.
///
/// Native surfaces sample their animation timelines at `time`, so a run can be
/// replayed frame by frame without a wall clock.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Fixed delta time (seconds).
    pub dt_s: f64,
    /// Surface time at the start of the frame (seconds).
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

    pub fn first() -> Self {
        Self::new(0, DEFAULT_DT_S)
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1, self.dt_s)
    }

    /// Yields `count` consecutive frames starting after `self`.
    pub fn following(self, count: u64) -> impl Iterator<Item = Frame> {
        (1..=count).map(move |n| Self::new(self.index + n, self.dt_s))
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::first()
    }
}
