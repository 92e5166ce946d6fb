//! Core data model for the carve sampler.
//!
//! # Primary API
//!
//! - [`Frame`]: one stereo sample pair
//! - [`SliceTable`]: ordered slice boundaries, addressed by [`SliceIndex`]
//!   and holding [`SampleOffset`]s
//! - [`SharedBuffers`] / [`BufferSet`]: the play buffer, record buffer and
//!   slice table behind one lock
//! - [`SchmittTrigger`] / [`PulseGenerator`]: control-rate edge detection and
//!   timed pulses
//! - [`SamplerConfig`]: engine configuration
//!
//! # Example
//!
//! ```
//! use carve_core::{Frame, SharedBuffers, SampleOffset};
//!
//! let store = SharedBuffers::new();
//! {
//!     let mut buffers = store.lock();
//!     buffers.replace_play(vec![Frame::new(0.5, -0.5); 1024]);
//!     buffers.slices.insert_marker(SampleOffset(0));
//!     buffers.slices.insert_marker(SampleOffset(512));
//! }
//!
//! // Render actors never wait
//! if let Some(buffers) = store.try_lock() {
//!     assert_eq!(buffers.total_samples(), 1024);
//! };
//! ```

pub mod error;
pub use error::{Error, Result};

mod config;
pub use config::SamplerConfig;

mod frame;
pub use frame::Frame;

pub mod math;

mod slice;
pub use slice::{SampleOffset, SliceIndex, SliceTable};

mod store;
pub use store::{BufferGuard, BufferSet, SharedBuffers};

mod trigger;
pub use trigger::{PulseGenerator, SchmittTrigger};
