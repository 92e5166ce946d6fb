//! Sampler engine configuration.

use crate::{Error, Result};

/// Configuration for the sampler engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerConfig {
    pub sample_rate: f64,
    /// Input voltage that maps to a full-scale (1.0) recorded sample.
    pub input_divisor: f32,
    /// Output voltage for a full-scale (1.0) played sample.
    pub output_gain: f32,
    /// Voltage of the end-of-cycle pulse while it is high.
    pub eoc_voltage: f32,
    /// Capacity of the butler command queue.
    pub butler_capacity: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            input_divisor: 10.0,
            output_gain: 5.0,
            eoc_voltage: 10.0,
            butler_capacity: 16,
        }
    }
}

impl SamplerConfig {
    pub fn with_sample_rate(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate < 8000.0 || self.sample_rate > 384000.0 {
            return Err(Error::InvalidConfig(format!(
                "sample_rate {} out of range (8000-384000 Hz)",
                self.sample_rate
            )));
        }
        if self.input_divisor <= 0.0 || self.output_gain <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "voltage scales must be positive (input_divisor={}, output_gain={})",
                self.input_divisor, self.output_gain
            )));
        }
        if self.butler_capacity == 0 {
            return Err(Error::InvalidConfig(
                "butler_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
