use std::time::{Duration, Instant};

/// Weight of the newest frame in the smoothed framerate readout.
const SMOOTHING: f32 = 0.1;

pub struct Framepacer {
    frame_start: Instant,
    last_frametime: f32,
    smoothed_framerate: f32,
}

impl Framepacer {
    pub fn new() -> Self {
        Self {
            frame_start: Instant::now(),
            last_frametime: 0.0,
            smoothed_framerate: 0.0,
        }
    }

    pub fn begin_frame(&mut self) {
        self.frame_start = Instant::now();
    }

    /// Time spent in the frame that last completed.
    pub fn frametime(&self) -> f32 {
        self.last_frametime
    }

    pub fn framerate(&self) -> f32 {
        self.smoothed_framerate
    }

    /// Finishes the frame, sleeping away any slack below `limit_frametime`
    /// (pass 0 to disable the cap and rely on the swapchain's own pacing).
    pub fn end_frame(&mut self, limit_frametime: f32) {
        if limit_frametime > f32::EPSILON && limit_frametime.is_finite() {
            const ACCURACY: f32 = 0.0001; // 100 microseconds
            let elapsed = self.frame_start.elapsed().as_secs_f32();
            let sleep_time = limit_frametime - elapsed - ACCURACY;

            if sleep_time > 0.0 {
                std::thread::sleep(Duration::from_secs_f32(sleep_time));

                while self.frame_start.elapsed().as_secs_f32() < limit_frametime {
                    std::thread::yield_now();
                }
            }
        }

        self.last_frametime = self.frame_start.elapsed().as_secs_f32();
        let framerate = 1.0 / self.last_frametime.max(f32::EPSILON);
        if self.smoothed_framerate == 0.0 {
            self.smoothed_framerate = framerate;
        } else {
            self.smoothed_framerate += (framerate - self.smoothed_framerate) * SMOOTHING;
        }
    }
}
