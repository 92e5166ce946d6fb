//! WAV reading and writing using hound.

use super::interleaved_to_frames;
use crate::{Error, Result};
use carve_core::Frame;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;

/// Returns `(frames, channels, native_rate)`.
pub(super) fn read(path: &Path) -> Result<(Vec<Frame>, u16, u32)> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<hound::Result<_>>()?,
        SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                return Err(Error::Decode(format!(
                    "unsupported bit depth {}",
                    spec.bits_per_sample
                )));
            }
            let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<hound::Result<_>>()?
        }
    };

    let frames = interleaved_to_frames(&samples, spec.channels as usize);
    Ok((frames, spec.channels, spec.sample_rate))
}

pub(super) fn write(path: &Path, frames: &[Frame], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for frame in frames {
        writer.write_sample(frame.left)?;
        writer.write_sample(frame.right)?;
    }
    writer.finalize()?;
    Ok(())
}
