use core::time::Duration;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// How long to sleep after a frame that took `elapsed`, to hold `target`.
///
/// Frame time is judged in whole milliseconds: a frame that finished inside
/// its first millisecond is not padded, nor is one that already overran the
/// target.
pub fn pacing_delay(elapsed: Duration, target: Duration) -> Option<Duration> {
    (elapsed.as_millis() > 0 && elapsed < target).then(|| target - elapsed)
}

#[cfg(not(target_arch = "wasm32"))]
pub struct FramePacer {
    target: Duration,
    start: Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl FramePacer {
    pub fn new(target: Duration) -> Self {
        Self {
            target,
            start: Instant::now(),
        }
    }

    pub fn begin(&mut self) {
        self.start = Instant::now();
    }

    pub fn finish(&self) -> Option<Duration> {
        pacing_delay(self.start.elapsed(), self.target)
    }
}

/// Counts frames over one second windows.
#[derive(Debug, Default)]
pub struct FpsCounter {
    frames: u32,
    window: f32,
}

impl FpsCounter {
    const WINDOW_SECS: f32 = 1.0;

    /// Records one frame. Returns the average rate once a window closes.
    pub fn tick(&mut self, delta: f32) -> Option<f32> {
        self.frames += 1;
        self.window += delta;
        if self.window < Self::WINDOW_SECS {
            return None;
        }
        let fps = self.frames as f32 / self.window;
        *self = Self::default();
        Some(fps)
    }
}
