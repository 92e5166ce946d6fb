//! # Carve Analysis
//!
//! Offline analysis used to auto-slice a sample buffer.
//!
//! - **Transient detection**: windowed energy onsets snapped to the first
//!   zero crossing in the window
//!
//! Functions operate on plain `f32` sample streams - no framework
//! dependencies. Pass the left channel of a stereo buffer as an iterator to
//! avoid copying it.
//!
//! ## Example
//!
//! ```rust
//! use carve_analysis::TransientDetector;
//!
//! let mut samples = vec![0.0f32; 4096];
//! samples[2048..].fill(0.9);
//!
//! let detector = TransientDetector::new(1.0);
//! let boundaries = detector.detect(samples.iter().copied());
//! assert_eq!(boundaries, vec![0, 2048]);
//! ```

pub mod transient;

pub use transient::{DetectorConfig, TransientDetector, WindowStats, DEFAULT_WINDOW_SIZE};
