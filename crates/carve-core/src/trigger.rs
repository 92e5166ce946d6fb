//! Control-rate trigger primitives.

/// Rising-edge detector with hysteresis.
///
/// Fires once when the input reaches `high`, then stays armed-off until the
/// input falls back to `low` or below.
#[derive(Debug, Clone, Copy)]
pub struct SchmittTrigger {
    high_state: bool,
    low: f32,
    high: f32,
}

impl Default for SchmittTrigger {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

impl SchmittTrigger {
    pub fn new(low: f32, high: f32) -> Self {
        Self {
            high_state: false,
            low,
            high,
        }
    }

    /// Feed one sample. Returns `true` on a rising edge.
    #[inline]
    pub fn process(&mut self, input: f32) -> bool {
        if self.high_state {
            if input <= self.low {
                self.high_state = false;
            }
            false
        } else if input >= self.high {
            self.high_state = true;
            true
        } else {
            false
        }
    }
}

/// Fixed-duration pulse, timed in seconds so its width is independent of
/// the sample rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PulseGenerator {
    remaining: f32,
}

impl PulseGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or extend) a pulse lasting `duration` seconds.
    pub fn trigger(&mut self, duration: f32) {
        if duration > self.remaining {
            self.remaining = duration;
        }
    }

    /// Advance by `dt` seconds. Returns whether the pulse is high for this
    /// step.
    #[inline]
    pub fn process(&mut self, dt: f32) -> bool {
        if self.remaining > 0.0 {
            self.remaining -= dt;
            true
        } else {
            false
        }
    }
}
