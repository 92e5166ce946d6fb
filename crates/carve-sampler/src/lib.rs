//! Slice/loop sampler engine.
//!
//! Records a stereo input into a buffer and plays it back through a loop
//! window addressed by slice markers, under trigger or gate control.
//!
//! # Features
//!
//! - **Playback**: edge/level triggering with once, loop and ping-pong read modes
//! - **Recording**: replace or append, committed on the record trigger
//! - **Editing**: slice marker and slice deletion intents applied by the engine
//! - **Butler thread**: background load/save and buffer deallocation
//! - **Codec**: WAV and AIFF decode with resampling to the host rate
//!
//! # Example
//!
//! ```no_run
//! use carve_core::SamplerConfig;
//! use carve_sampler::{FrameInputs, Params, Sampler};
//!
//! let mut sampler = Sampler::new(SamplerConfig::with_sample_rate(48000.0))?;
//! sampler.handle().request_load("break.wav")?;
//!
//! let params = Params { read_mode: 1.0, ..Default::default() };
//! let inputs = FrameInputs { gate: Some(10.0), ..Default::default() };
//! let out = sampler.tick(&params, &inputs, 48000.0);
//! # let _ = out;
//! # Ok::<(), carve_sampler::Error>(())
//! ```

// Error types
pub mod error;
pub use error::{Error, Result};

// Main engine
mod sampler;
pub use sampler::{SampleInfo, Sampler};

mod handle;
pub use handle::SamplerHandle;

mod params;
pub use params::{FrameInputs, FrameOutputs, Params, ReadMode, RecordMode, TriggerMode};

mod state;
pub use state::SamplerState;

// Engine stages
pub mod edit;
pub mod loop_window;
pub mod playback;
pub mod recorder;

pub mod butler;
pub mod codec;

pub use edit::{EditIntent, EditOutcome};
pub use loop_window::{LoopWindow, WindowControls};
pub use playback::{PlayState, Playback};
