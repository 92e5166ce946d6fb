//! Engine fixtures: construction and frame-by-frame drivers.

use carve::prelude::*;
use std::time::{Duration, Instant};

/// Default test sample rate.
pub const TEST_SAMPLE_RATE: f32 = 48000.0;

/// Input voltage that records as full scale.
pub const FULL_SCALE_VOLTS: f32 = 10.0;

/// Engine without a butler; all file I/O runs inline.
pub fn test_sampler() -> Sampler {
    Sampler::without_butler(SamplerConfig::with_sample_rate(TEST_SAMPLE_RATE as f64))
        .expect("Failed to create test sampler")
}

/// Engine with a running butler thread.
pub fn test_sampler_with_butler() -> Sampler {
    Sampler::new(SamplerConfig::with_sample_rate(TEST_SAMPLE_RATE as f64))
        .expect("Failed to create test sampler")
}

/// Tick with no inputs patched.
pub fn idle(sampler: &mut Sampler, params: &Params) -> FrameOutputs {
    sampler.tick(params, &FrameInputs::default(), TEST_SAMPLE_RATE)
}

/// Record `samples` (normalized, left channel; right is inverted) and commit.
///
/// The record control is pressed on the first frame and again after the
/// last, so exactly `samples.len()` frames are captured.
pub fn record_signal(sampler: &mut Sampler, params: &Params, samples: &[f32]) {
    assert!(samples.len() >= 2, "record at least two frames");
    let mut p = *params;
    for (i, &s) in samples.iter().enumerate() {
        p.record = if i == 0 { 1.0 } else { 0.0 };
        let inputs = FrameInputs {
            in_l: s * FULL_SCALE_VOLTS,
            in_r: -s * FULL_SCALE_VOLTS,
            ..Default::default()
        };
        sampler.tick(&p, &inputs, TEST_SAMPLE_RATE);
    }
    p.record = 1.0;
    idle(sampler, &p);
    p.record = 0.0;
    idle(sampler, &p);
}

/// Send one trigger pulse (high frame then low frame) on the trigger input.
pub fn trigger(sampler: &mut Sampler, params: &Params) -> [FrameOutputs; 2] {
    let mut inputs = FrameInputs {
        trig: Some(10.0),
        ..Default::default()
    };
    let first = sampler.tick(params, &inputs, TEST_SAMPLE_RATE);
    inputs.trig = Some(0.0);
    let second = sampler.tick(params, &inputs, TEST_SAMPLE_RATE);
    [first, second]
}

/// Run `frames` ticks with the trigger input patched but low.
pub fn run_edge_mode(sampler: &mut Sampler, params: &Params, frames: usize) -> Vec<FrameOutputs> {
    let inputs = FrameInputs {
        trig: Some(0.0),
        ..Default::default()
    };
    (0..frames)
        .map(|_| sampler.tick(params, &inputs, TEST_SAMPLE_RATE))
        .collect()
}

/// Number of low-to-high transitions on the EOC output.
pub fn count_eoc_pulses(outputs: &[FrameOutputs]) -> usize {
    let mut was_high = false;
    let mut pulses = 0;
    for out in outputs {
        let high = out.eoc > 0.0;
        if high && !was_high {
            pulses += 1;
        }
        was_high = high;
    }
    pulses
}

/// Tick until `done` holds or the timeout passes.
pub fn tick_until(
    sampler: &mut Sampler,
    timeout: Duration,
    mut done: impl FnMut(&Sampler) -> bool,
) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        idle(sampler, &Params::default());
        if done(sampler) {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    false
}
