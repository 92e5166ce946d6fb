//! Active playback bounds, derived every frame.
//!
//! The window is never carried across frames as authoritative state: it is
//! recomputed from the slice table, the buffer length and the current
//! controls before each playback step.

use carve_core::math::{clamp, rescale};
use carve_core::{SliceIndex, SliceTable};

/// Control values that shape the window, each in 0-10.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowControls {
    pub slice_mode: bool,
    pub slice: f32,
    pub sample_start: f32,
    pub loop_length: f32,
    pub fade: f32,
}

impl Default for WindowControls {
    fn default() -> Self {
        Self {
            slice_mode: false,
            slice: 0.0,
            sample_start: 0.0,
            loop_length: 10.0,
            fade: 0.0,
        }
    }
}

/// Playback bounds with sub-sample precision.
///
/// Invariants: `sample_start + loop_length <= total_samples`,
/// `loop_length >= 1` for a non-empty buffer, and
/// `0 <= fade_length <= loop_length / 2`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopWindow {
    pub sample_start: f32,
    pub loop_length: f32,
    pub fade_length: f32,
    /// Slice the window was taken from.
    pub slice: SliceIndex,
}

impl LoopWindow {
    /// Collapsed window for an empty buffer.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Position one past the last playable frame.
    #[inline]
    pub fn end(&self) -> f32 {
        self.sample_start + self.loop_length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.loop_length <= 0.0
    }

    /// Derive the window for the current frame.
    pub fn compute(slices: &SliceTable, total_samples: usize, controls: &WindowControls) -> Self {
        if total_samples == 0 {
            return Self::empty();
        }

        let whole = (0, total_samples - 1);
        let (slice, (slice_start, slice_end)) = if controls.slice_mode && !slices.is_empty() {
            let index = slices.select(controls.slice);
            (index, slices.bounds(index, total_samples).unwrap_or(whole))
        } else {
            (SliceIndex(0), whole)
        };
        let slice_start = slice_start as f32;
        let slice_end = slice_end as f32;

        let sample_start = rescale(
            clamp(controls.sample_start, 0.0, 10.0),
            0.0,
            10.0,
            slice_start,
            slice_end,
        );
        let loop_length = clamp(
            rescale(
                clamp(controls.loop_length, 0.0, 10.0),
                0.0,
                10.0,
                0.0,
                slice_end - slice_start + 1.0,
            ),
            1.0,
            slice_end - sample_start + 1.0,
        );
        let fade_length = rescale(
            clamp(controls.fade, 0.0, 10.0),
            0.0,
            10.0,
            0.0,
            (loop_length / 2.0).floor(),
        );

        Self {
            sample_start,
            loop_length,
            fade_length,
            slice,
        }
    }
}
