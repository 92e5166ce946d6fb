//! Decode / encode / resample service.
//!
//! Loading accepts two containers, picked by file extension:
//! `.wav` (read with hound) and `.aiff` (read with symphonia). Saving always
//! writes a stereo 32-bit float WAV. Decoded audio is resampled to the host
//! rate when the file's native rate differs.

mod aiff;
mod resample;
mod wav;

pub use resample::{resample_frames, ResampleQuality};

use crate::{Error, Result};
use carve_core::Frame;
use std::path::Path;

/// Container formats accepted by [`decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Aiff,
}

impl AudioFormat {
    /// Match a path's extension against the allow-list (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("wav") {
            Some(Self::Wav)
        } else if ext.eq_ignore_ascii_case("aiff") {
            Some(Self::Aiff)
        } else {
            None
        }
    }
}

/// Result of decoding a file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedSample {
    /// Stereo frames at the requested target rate.
    pub frames: Vec<Frame>,
    /// Channel count of the source file (0 when nothing was decoded).
    pub channels: u16,
    /// Native sample rate of the source file (0 when nothing was decoded).
    pub sample_rate: u32,
}

impl DecodedSample {
    /// "Nothing loaded".
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn sample_count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Decode `path` and resample it to `target_rate`.
///
/// Fails with [`Error::UnsupportedFormat`] before touching the file when the
/// extension is not on the allow-list.
pub fn decode(path: &Path, target_rate: u32) -> Result<DecodedSample> {
    let format = AudioFormat::from_path(path)
        .ok_or_else(|| Error::UnsupportedFormat(path.display().to_string()))?;

    let (frames, channels, sample_rate) = match format {
        AudioFormat::Wav => wav::read(path)?,
        AudioFormat::Aiff => aiff::read(path)?,
    };

    let frames = if sample_rate != target_rate && !frames.is_empty() {
        resample_frames(&frames, sample_rate, target_rate, ResampleQuality::default())?
    } else {
        frames
    };

    Ok(DecodedSample {
        frames,
        channels,
        sample_rate,
    })
}

/// Write `frames` as a stereo 32-bit float WAV.
pub fn encode(path: &Path, frames: &[Frame], sample_rate: u32) -> Result<()> {
    wav::write(path, frames, sample_rate)
}

/// Fold interleaved samples into stereo frames. Mono is duplicated to both
/// sides; channels past the second are dropped.
pub(crate) fn interleaved_to_frames(samples: &[f32], channels: usize) -> Vec<Frame> {
    match channels {
        0 => Vec::new(),
        1 => samples.iter().copied().map(Frame::mono).collect(),
        n => samples
            .chunks_exact(n)
            .map(|c| Frame::new(c[0], c[1]))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_allow_list() {
        assert_eq!(
            AudioFormat::from_path(Path::new("a/b/loop.WAV")),
            Some(AudioFormat::Wav)
        );
        assert_eq!(
            AudioFormat::from_path(Path::new("break.aiff")),
            Some(AudioFormat::Aiff)
        );
        assert_eq!(AudioFormat::from_path(Path::new("song.mp3")), None);
        assert_eq!(AudioFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_decode_rejects_unsupported_extension() {
        let result = decode(Path::new("/nonexistent/file.flac"), 44100);
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_decode_missing_wav_is_error() {
        assert!(decode(Path::new("/nonexistent/file.wav"), 44100).is_err());
    }

    #[test]
    fn test_interleaved_to_frames() {
        let mono = interleaved_to_frames(&[0.1, 0.2], 1);
        assert_eq!(mono, vec![Frame::mono(0.1), Frame::mono(0.2)]);

        let quad = interleaved_to_frames(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8], 4);
        assert_eq!(quad.len(), 2);
        assert_relative_eq!(quad[1].left, 0.5);
        assert_relative_eq!(quad[1].right, 0.6);
    }

    #[test]
    fn test_wav_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("take.wav");
        let frames: Vec<Frame> = (0..1000)
            .map(|i| {
                let t = i as f32 / 1000.0;
                Frame::new(t, -t)
            })
            .collect();

        encode(&path, &frames, 48000).unwrap();
        let decoded = decode(&path, 48000).unwrap();

        assert_eq!(decoded.sample_count(), frames.len());
        assert_eq!(decoded.channels, 2);
        assert_eq!(decoded.sample_rate, 48000);
        for (a, b) in frames.iter().zip(&decoded.frames) {
            assert_relative_eq!(a.left, b.left, epsilon = 1e-6);
            assert_relative_eq!(a.right, b.right, epsilon = 1e-6);
        }
    }
}
