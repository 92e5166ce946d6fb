//! Shared buffer store.
//!
//! The play buffer, record buffer and slice table live behind one
//! [`parking_lot::Mutex`]. The real-time processing call is the only writer
//! of their contents and takes the blocking [`SharedBuffers::lock`]; its
//! critical sections are O(1) or O(edit span). Render and background actors
//! read through [`SharedBuffers::try_lock`] / [`SharedBuffers::try_read`] and
//! skip their work for the cycle on contention. The lock is released when the
//! guard is dropped.

use crate::{Frame, SliceTable};
use parking_lot::{Mutex, MutexGuard};

/// Guard over the locked buffer set.
pub type BufferGuard<'a> = MutexGuard<'a, BufferSet>;

/// Everything the lock protects.
///
/// The play buffer is only reachable through methods that bump
/// [`BufferSet::generation`], so analysis computed against one generation can
/// be recognised as stale once the audio changes.
#[derive(Debug, Default)]
pub struct BufferSet {
    play: Vec<Frame>,
    pub record: Vec<Frame>,
    pub slices: SliceTable,
    generation: u64,
}

impl BufferSet {
    /// Number of frames in the play buffer.
    #[inline]
    pub fn total_samples(&self) -> usize {
        self.play.len()
    }

    #[inline]
    pub fn play(&self) -> &[Frame] {
        &self.play
    }

    /// Incremented on every change to the play buffer's contents.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the play buffer wholesale and reset the slice table.
    ///
    /// The previous buffer is handed back so the caller can free it outside
    /// the critical section.
    pub fn replace_play(&mut self, frames: Vec<Frame>) -> Vec<Frame> {
        self.generation += 1;
        self.slices.clear();
        std::mem::replace(&mut self.play, frames)
    }

    /// Empty the play buffer and the slice table together.
    pub fn clear(&mut self) -> Vec<Frame> {
        self.generation += 1;
        self.slices.clear();
        std::mem::take(&mut self.play)
    }

    /// Move the record buffer into the play buffer, leaving the record
    /// buffer empty. The old play allocation is reused for the next take.
    /// The slice table is reset to `[0]`.
    pub fn swap_in_record(&mut self) {
        self.generation += 1;
        std::mem::swap(&mut self.play, &mut self.record);
        self.record.clear();
        self.slices.reset();
    }

    /// Append the record buffer to the play buffer and empty it.
    pub fn append_record(&mut self) {
        self.generation += 1;
        self.play.append(&mut self.record);
    }

    /// Erase a span of frames. Out-of-range ends are clamped.
    pub fn erase(&mut self, span: std::ops::Range<usize>) {
        let end = span.end.min(self.play.len());
        let start = span.start.min(end);
        if start < end {
            self.generation += 1;
            self.play.drain(start..end);
        }
    }

    /// Frame at `index`, clamped to the buffer. Silence when empty.
    #[inline]
    pub fn frame_at(&self, index: usize) -> Frame {
        match self.play.len() {
            0 => Frame::silence(),
            len => self.play[index.min(len - 1)],
        }
    }

    /// Linearly interpolated frame at a fractional position.
    #[inline]
    pub fn interpolate(&self, position: f32) -> Frame {
        let position = position.max(0.0);
        let index = position as usize;
        let frac = position - index as f32;
        self.frame_at(index).lerp(self.frame_at(index + 1), frac)
    }
}

/// Mutual-exclusion wrapper around a [`BufferSet`].
#[derive(Debug, Default)]
pub struct SharedBuffers {
    inner: Mutex<BufferSet>,
}

impl SharedBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocking acquire. Only for short critical sections.
    #[inline]
    pub fn lock(&self) -> BufferGuard<'_> {
        self.inner.lock()
    }

    /// Non-blocking acquire. `None` when another actor holds the lock.
    #[inline]
    pub fn try_lock(&self) -> Option<BufferGuard<'_>> {
        self.inner.try_lock()
    }

    /// Run `f` against the buffers if the lock is free right now.
    pub fn try_read<R>(&self, f: impl FnOnce(&BufferSet) -> R) -> Option<R> {
        self.inner.try_lock().map(|guard| f(&guard))
    }
}
