/// Minimum gap between two detected beats.
pub const BEAT_COOLDOWN_MS: f32 = 200.0;

/// Per-frame timing and amplitude state for beat detection.
///
/// Time is fed in as a millisecond-of-second reading (0..=999); the frame
/// delta wraps across the second boundary.
#[derive(Debug, Clone)]
pub struct SignalTracker {
    prev_frame_ms: u32,
    frame_time: f32,
    app_time: f32,
    beat_check_timer: f32,
    running_average: f32,
}

impl SignalTracker {
    pub fn new(now_ms: u32) -> Self {
        Self {
            prev_frame_ms: now_ms % 1000,
            frame_time: 0.0,
            app_time: 0.0,
            beat_check_timer: 0.0,
            running_average: 0.0,
        }
    }

    /// Advance the clocks from the current millisecond-of-second reading.
    pub fn tick(&mut self, now_ms: u32) {
        let now_ms = now_ms % 1000;
        let mut dt = now_ms as f32 - self.prev_frame_ms as f32;
        if dt < 0.0 {
            dt += 1000.0;
        }
        self.frame_time = dt;
        self.app_time += dt;
        self.beat_check_timer += dt;
        self.prev_frame_ms = now_ms;
    }

    /// Check the summed spectrum against the running average, then fold the
    /// new sum into the average with a 3:1 weight toward the newest frame.
    /// Returns true when a beat fires (and resets the cooldown timer).
    pub fn detect_pulse(&mut self, spectrum: &[u8], threshold: f32) -> bool {
        let instant: f32 = spectrum.iter().map(|&v| v as f32).sum();
        let mut fired = false;
        if instant > self.running_average + threshold && self.beat_check_timer > BEAT_COOLDOWN_MS {
            fired = true;
            self.beat_check_timer = 0.0;
        }
        self.running_average = blend_running_average(self.running_average, instant);
        fired
    }

    pub fn frame_time(&self) -> f32 {
        self.frame_time
    }

    pub fn app_time(&self) -> f32 {
        self.app_time
    }

    pub fn running_average(&self) -> f32 {
        self.running_average
    }
}

/// The amplitude blend: not a true EMA, the newest sum carries triple weight.
pub fn blend_running_average(running: f32, instant: f32) -> f32 {
    (running + 3.0 * instant) / 4.0
}

/// Mean of the first `num_values` spectrum bytes (the bins the ring draws).
pub fn mean_of(spectrum: &[u8], num_values: usize) -> f32 {
    if num_values == 0 {
        return 0.0;
    }
    let n = num_values.min(spectrum.len());
    if n == 0 {
        return 0.0;
    }
    let sum: f32 = spectrum[..n].iter().map(|&v| v as f32).sum();
    sum / num_values as f32
}
