//! Cloneable control surface for editor, render and loader threads.
//!
//! Nothing here blocks on the buffer store: reads use a non-blocking lock
//! attempt and report `None` on contention, and structural changes are
//! staged as intents for the engine to apply.

use crate::butler::{try_send, ButlerCommand};
use crate::edit::{EditIntent, EditSender, Selection};
use crate::{Error, Result};
use carve_analysis::TransientDetector;
use carve_core::{Frame, SampleOffset, SharedBuffers, SliceIndex, SliceTable};
use crossbeam_channel::Sender;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct SamplerHandle {
    buffers: Arc<SharedBuffers>,
    edits: EditSender,
    selection: Selection,
    butler: Option<Sender<ButlerCommand>>,
    sample_rate: Arc<AtomicU32>,
}

impl SamplerHandle {
    pub(crate) fn new(
        buffers: Arc<SharedBuffers>,
        edits: EditSender,
        selection: Selection,
        butler: Option<Sender<ButlerCommand>>,
        sample_rate: Arc<AtomicU32>,
    ) -> Self {
        Self {
            buffers,
            edits,
            selection,
            butler,
            sample_rate,
        }
    }

    /// Read the play buffer and slice table together, or `None` if the
    /// engine holds the lock right now.
    pub fn try_view<R>(&self, f: impl FnOnce(&[Frame], &SliceTable) -> R) -> Option<R> {
        self.buffers.try_read(|b| f(b.play(), &b.slices))
    }

    pub fn selected_slice(&self) -> Option<SliceIndex> {
        self.selection.get()
    }

    pub fn select_slice(&self, index: Option<SliceIndex>) {
        self.selection.set(index);
    }

    /// Stage an intent. Returns `false` if another is still pending.
    pub fn request_edit(&self, intent: EditIntent) -> bool {
        self.edits.submit(intent)
    }

    pub fn delete_selected(&self) -> bool {
        self.request_edit(EditIntent::DeleteSelected)
    }

    pub fn add_marker(&self, offset: SampleOffset) -> bool {
        self.request_edit(EditIntent::AddMarker(offset))
    }

    pub fn delete_marker(&self, offset: SampleOffset) -> bool {
        self.request_edit(EditIntent::DeleteMarker(offset))
    }

    pub fn clear(&self) -> bool {
        self.request_edit(EditIntent::Clear)
    }

    /// Copy the left channel under a lock attempt, analyze it without the
    /// lock, and stage the resulting slice table.
    ///
    /// Returns the number of slices found, or `None` when the store was busy
    /// or another intent is pending. The table is dropped by the engine if
    /// the buffer changed in the meantime.
    pub fn detect_transients(&self, threshold: f32) -> Option<usize> {
        let (left, generation) = self.buffers.try_read(|b| {
            let left: Vec<f32> = b.play().iter().map(|f| f.left).collect();
            (left, b.generation())
        })?;
        let boundaries = TransientDetector::new(threshold).detect(left);
        let table = SliceTable::from_offsets(boundaries).ok()?;
        let count = table.len();
        debug!(slices = count, threshold, "transient table staged");
        self.request_edit(EditIntent::ReplaceSlices { table, generation })
            .then_some(count)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.load(Ordering::Acquire)
    }

    /// Queue a background load at the current host rate.
    pub fn request_load(&self, path: impl AsRef<Path>) -> Result<()> {
        let command = ButlerCommand::Load {
            path: path.as_ref().to_path_buf(),
            target_rate: self.sample_rate(),
        };
        try_send(self.butler_sender()?, command)
    }

    /// Queue a background save of the current play buffer.
    pub fn request_save(&self, path: impl AsRef<Path>) -> Result<()> {
        let command = ButlerCommand::Save {
            path: path.as_ref().to_path_buf(),
            sample_rate: self.sample_rate(),
        };
        try_send(self.butler_sender()?, command)
    }

    fn butler_sender(&self) -> Result<&Sender<ButlerCommand>> {
        self.butler
            .as_ref()
            .ok_or_else(|| Error::Butler("engine has no butler thread".into()))
    }
}
