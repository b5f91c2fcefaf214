/// Engine time derived from the number of frames rendered so far.
///
/// Seconds are computed from the frame count rather than accumulated, so the
/// clock does not drift however long the engine runs.
#[derive(Debug, Clone, Copy)]
pub struct SampleClock {
    sample_rate: f32,
    frames: u64,
}

impl SampleClock {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            frames: 0,
        }
    }

    /// Seconds since the first frame.
    #[inline]
    pub fn now(&self) -> f64 {
        self.frames as f64 / self.sample_rate as f64
    }

    #[inline]
    pub fn advance(&mut self, frames: u64) {
        self.frames = self.frames.wrapping_add(frames);
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}
