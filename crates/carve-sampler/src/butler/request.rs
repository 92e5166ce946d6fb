//! Request/result types for Butler thread communication.

use crate::codec::{self, DecodedSample};
use crate::Error;
use carve_core::{Frame, SharedBuffers};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Command sent to the Butler thread.
#[derive(Debug)]
pub enum ButlerCommand {
    /// Decode a file at the given host rate.
    Load { path: PathBuf, target_rate: u32 },
    /// Encode the current play buffer.
    Save { path: PathBuf, sample_rate: u32 },
    /// Drop a buffer the real-time thread no longer needs.
    Retire(Vec<Frame>),
    Shutdown,
}

/// Result sent back to the engine.
#[derive(Debug)]
pub enum ButlerEvent {
    /// Replacement buffer ready to install. Empty when decoding failed.
    Loaded { path: PathBuf, sample: DecodedSample },
    /// Extension not on the allow-list; buffers must stay untouched.
    LoadRejected { path: PathBuf },
    Saved { path: PathBuf },
    SaveFailed { path: PathBuf, reason: String },
}

/// Decode `path` into an event for the engine to install.
pub(crate) fn run_load(path: PathBuf, target_rate: u32) -> ButlerEvent {
    match codec::decode(&path, target_rate) {
        Ok(sample) => {
            debug!(
                path = %path.display(),
                frames = sample.sample_count(),
                channels = sample.channels,
                native_rate = sample.sample_rate,
                "decoded sample"
            );
            ButlerEvent::Loaded { path, sample }
        }
        Err(Error::UnsupportedFormat(_)) => {
            warn!(path = %path.display(), "unsupported file extension, load skipped");
            ButlerEvent::LoadRejected { path }
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "decode failed, loading empty buffer");
            ButlerEvent::Loaded {
                path,
                sample: DecodedSample::empty(),
            }
        }
    }
}

/// Copy the play buffer under the lock, then encode without holding it.
pub(crate) fn run_save(buffers: &SharedBuffers, path: PathBuf, sample_rate: u32) -> ButlerEvent {
    let frames = buffers.lock().play().to_vec();
    match codec::encode(&path, &frames, sample_rate) {
        Ok(()) => {
            debug!(path = %path.display(), frames = frames.len(), "saved sample");
            ButlerEvent::Saved { path }
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "save failed");
            ButlerEvent::SaveFailed {
                path,
                reason: e.to_string(),
            }
        }
    }
}
