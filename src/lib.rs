//! # Carve - Real-time Slice/Loop Sampler
//!
//! Records a stereo signal, slices it by hand or by transient detection, and
//! plays it back through a trigger- or gate-driven loop window.
//!
//! ## Architecture
//!
//! Carve is an umbrella crate that coordinates:
//! - **carve-core** - Frames, slice tables, the shared buffer store, trigger primitives
//! - **carve-analysis** - Transient detection
//! - **carve-sampler** - The engine (playback, recording, edit intents, butler, codec)
//!
//! ## Quick Start
//!
//! ```no_run
//! use carve::prelude::*;
//!
//! let mut sampler = Sampler::new(SamplerConfig::with_sample_rate(44100.0))?;
//! sampler.load_blocking("break.wav")?;
//! sampler.detect_transients(1.0)?;
//!
//! let params = Params { slice_mode: true, read_mode: 1.0, ..Default::default() };
//! let inputs = FrameInputs { trig: Some(10.0), ..Default::default() };
//! let out = sampler.tick(&params, &inputs, 44100.0);
//! # let _ = out;
//! # Ok::<(), carve::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `default` / `full` - Everything enabled
//! - `sampler` - The sampler engine
//! - `analysis` - Transient detection
//! - `serialization` - Serde derives on analysis config types

/// Re-export of carve-core for direct access
pub use carve_core as core;

pub use carve_core::{Frame, SampleOffset, SamplerConfig, SharedBuffers, SliceIndex, SliceTable};

#[cfg(feature = "analysis")]
pub use carve_analysis as analysis;

#[cfg(feature = "sampler")]
pub use carve_sampler as sampler;

#[cfg(feature = "sampler")]
pub use carve_sampler::{
    EditIntent, FrameInputs, FrameOutputs, LoopWindow, Params, ReadMode, RecordMode, Sampler,
    SamplerHandle, SamplerState, TriggerMode,
};

mod error;
pub use error::{Error, Result};

/// Common imports.
pub mod prelude {
    pub use crate::{Error, Result};
    pub use carve_core::{Frame, SampleOffset, SamplerConfig, SliceIndex, SliceTable};

    #[cfg(feature = "analysis")]
    pub use carve_analysis::TransientDetector;

    #[cfg(feature = "sampler")]
    pub use carve_sampler::{
        EditIntent, FrameInputs, FrameOutputs, Params, ReadMode, Sampler, SamplerHandle,
        SamplerState,
    };
}
