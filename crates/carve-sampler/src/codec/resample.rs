//! Sample rate conversion using rubato.

use crate::{Error, Result};
use carve_core::Frame;
use rubato::{FftFixedIn, Resampler};

/// Resampling quality presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResampleQuality {
    /// Fast resampling (lower quality)
    Fast,
    /// Balanced quality/speed (default)
    #[default]
    Medium,
    /// High quality
    High,
}

impl ResampleQuality {
    fn chunk_size(&self) -> usize {
        match self {
            ResampleQuality::Fast => 512,
            ResampleQuality::Medium => 1024,
            ResampleQuality::High => 2048,
        }
    }

    fn sub_chunks(&self) -> usize {
        match self {
            ResampleQuality::Fast => 1,
            ResampleQuality::Medium => 2,
            ResampleQuality::High => 4,
        }
    }
}

/// Convert stereo frames from `source_rate` to `target_rate`.
///
/// The output holds `ceil(len * target / source)` frames, aligned with the
/// input: the resampler's output delay is trimmed from the front and the
/// filter is flushed so the tail survives.
pub fn resample_frames(
    frames: &[Frame],
    source_rate: u32,
    target_rate: u32,
    quality: ResampleQuality,
) -> Result<Vec<Frame>> {
    if source_rate == target_rate || frames.is_empty() {
        return Ok(frames.to_vec());
    }
    if source_rate == 0 || target_rate == 0 {
        return Err(Error::Resample(format!(
            "invalid rates {source_rate} -> {target_rate}"
        )));
    }

    let mut resampler = FftFixedIn::<f32>::new(
        source_rate as usize,
        target_rate as usize,
        quality.chunk_size(),
        quality.sub_chunks(),
        2,
    )?;

    let input_frames = frames.len();
    let expected_output_frames =
        (input_frames as f64 * target_rate as f64 / source_rate as f64).ceil() as usize;
    let delay = resampler.output_delay();
    let wanted = delay + expected_output_frames;

    let mut out_left = Vec::with_capacity(wanted + quality.chunk_size());
    let mut out_right = Vec::with_capacity(wanted + quality.chunk_size());

    let mut pos = 0;
    while pos < input_frames {
        let needed = resampler.input_frames_next();
        let copy = needed.min(input_frames - pos);

        // Last chunk is zero padded up to the fixed input size.
        let mut chunk_left = vec![0.0f32; needed];
        let mut chunk_right = vec![0.0f32; needed];
        for (i, frame) in frames[pos..pos + copy].iter().enumerate() {
            chunk_left[i] = frame.left;
            chunk_right[i] = frame.right;
        }

        let input_channels = vec![chunk_left, chunk_right];
        let output = resampler.process(&input_channels, None)?;
        out_left.extend_from_slice(&output[0]);
        out_right.extend_from_slice(&output[1]);

        pos += needed;
    }

    // Flush what is still inside the filter.
    while out_left.len() < wanted {
        let output = resampler.process_partial::<Vec<f32>>(None, None)?;
        if output[0].is_empty() {
            break;
        }
        out_left.extend_from_slice(&output[0]);
        out_right.extend_from_slice(&output[1]);
    }

    Ok(out_left
        .into_iter()
        .zip(out_right)
        .skip(delay)
        .take(expected_output_frames)
        .map(Frame::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_resample_needed() {
        let frames = vec![Frame::new(0.1, 0.2); 100];
        let out = resample_frames(&frames, 44100, 44100, ResampleQuality::Fast).unwrap();
        assert_eq!(out, frames);
    }

    #[test]
    fn test_upsample_length() {
        let frames = vec![Frame::mono(0.25); 4410];
        let out = resample_frames(&frames, 44100, 48000, ResampleQuality::Medium).unwrap();
        assert_eq!(out.len(), 4800);
    }

    #[test]
    fn test_downsample_length() {
        let frames = vec![Frame::mono(0.25); 9600];
        let out = resample_frames(&frames, 48000, 24000, ResampleQuality::Fast).unwrap();
        assert_eq!(out.len(), 4800);
    }

    #[test]
    fn test_upsample_keeps_impulse_aligned() {
        let mut frames = vec![Frame::default(); 4410];
        frames[100] = Frame::mono(1.0);
        let out = resample_frames(&frames, 44100, 48000, ResampleQuality::Medium).unwrap();
        assert_eq!(out.len(), 4800);

        let peak = out
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.left.abs().total_cmp(&b.1.left.abs()))
            .map(|(i, _)| i)
            .unwrap();
        // 100 * 48000 / 44100 = 108.8
        assert!((106..=112).contains(&peak), "impulse landed at {peak}");
    }

    #[test]
    fn test_upsample_keeps_tail() {
        let mut frames = vec![Frame::default(); 4410];
        for frame in &mut frames[4300..] {
            *frame = Frame::mono(0.5);
        }
        let out = resample_frames(&frames, 44100, 48000, ResampleQuality::Medium).unwrap();
        let tail = &out[out.len() - 50..];
        let mean = tail.iter().map(|f| f.left).sum::<f32>() / tail.len() as f32;
        assert!(mean > 0.4, "tail mean {mean}");
    }

    #[test]
    fn test_downsample_keeps_tail() {
        let mut frames = vec![Frame::default(); 9600];
        for frame in &mut frames[9000..] {
            *frame = Frame::mono(0.5);
        }
        let out = resample_frames(&frames, 48000, 24000, ResampleQuality::Fast).unwrap();
        assert_eq!(out.len(), 4800);
        let tail = &out[4700..4780];
        let mean = tail.iter().map(|f| f.left).sum::<f32>() / tail.len() as f32;
        assert!(mean > 0.4, "tail mean {mean}");
    }
}
