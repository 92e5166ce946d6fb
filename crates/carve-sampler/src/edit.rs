//! Edit intents staged by non-real-time actors and applied by the engine.
//!
//! The queue holds at most one pending intent. A second request made while
//! one is outstanding is refused, so repeated requests collapse into one.

use carve_core::{BufferSet, Frame, SampleOffset, SliceIndex, SliceTable};
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A structural change to the buffer store.
#[derive(Debug, Clone, PartialEq)]
pub enum EditIntent {
    /// Erase the selected slice's frames and its table entry.
    DeleteSelected,
    /// Insert a slice marker.
    AddMarker(SampleOffset),
    /// Remove a slice marker without touching the buffer.
    DeleteMarker(SampleOffset),
    /// Empty the buffer and the slice table.
    Clear,
    /// Install a slice table computed off-thread, if the buffer it was
    /// computed from is still the current one.
    ReplaceSlices { table: SliceTable, generation: u64 },
}

/// Result of [`apply`].
#[derive(Debug, PartialEq)]
pub enum EditOutcome {
    /// Nothing changed (duplicate marker, stale table, no selection...).
    Unchanged,
    SlicesChanged,
    /// Frames were erased.
    BufferChanged,
    /// Buffer emptied; the old frames are handed back for deallocation.
    Cleared(Vec<Frame>),
}

impl EditOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, EditOutcome::Unchanged)
    }
}

/// Single-slot intent queue, owned by the engine.
#[derive(Debug)]
pub struct EditQueue {
    tx: Sender<EditIntent>,
    rx: Receiver<EditIntent>,
}

impl Default for EditQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EditQueue {
    pub fn new() -> Self {
        let (tx, rx) = bounded(1);
        Self { tx, rx }
    }

    pub fn sender(&self) -> EditSender {
        EditSender {
            tx: self.tx.clone(),
        }
    }

    /// Take the pending intent, if any.
    #[inline]
    pub fn try_next(&self) -> Option<EditIntent> {
        match self.rx.try_recv() {
            Ok(intent) => Some(intent),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

/// Producer side of an [`EditQueue`].
#[derive(Debug, Clone)]
pub struct EditSender {
    tx: Sender<EditIntent>,
}

impl EditSender {
    /// Stage an intent. Returns `false` when one is already pending.
    pub fn submit(&self, intent: EditIntent) -> bool {
        match self.tx.try_send(intent) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

const NO_SELECTION: usize = usize::MAX;

/// Slice selected in the editor, shared between the UI and the engine.
#[derive(Debug, Clone)]
pub struct Selection(Arc<AtomicUsize>);

impl Default for Selection {
    fn default() -> Self {
        Self(Arc::new(AtomicUsize::new(NO_SELECTION)))
    }
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<SliceIndex> {
        match self.0.load(Ordering::Acquire) {
            NO_SELECTION => None,
            index => Some(SliceIndex(index)),
        }
    }

    pub fn set(&self, index: Option<SliceIndex>) {
        let raw = index.map_or(NO_SELECTION, SliceIndex::get);
        self.0.store(raw, Ordering::Release);
    }

    /// Read and clear in one step.
    pub fn take(&self) -> Option<SliceIndex> {
        match self.0.swap(NO_SELECTION, Ordering::AcqRel) {
            NO_SELECTION => None,
            index => Some(SliceIndex(index)),
        }
    }
}

/// Apply one intent to the locked store.
pub fn apply(intent: EditIntent, buffers: &mut BufferSet, selection: &Selection) -> EditOutcome {
    match intent {
        EditIntent::DeleteSelected => {
            let Some(index) = selection.take() else {
                return EditOutcome::Unchanged;
            };
            let total = buffers.total_samples();
            match buffers.slices.remove_slice(index, total) {
                Some(span) => {
                    buffers.erase(span);
                    EditOutcome::BufferChanged
                }
                None => EditOutcome::Unchanged,
            }
        }
        EditIntent::AddMarker(offset) => {
            if offset.get() >= buffers.total_samples() {
                return EditOutcome::Unchanged;
            }
            if buffers.slices.insert_marker(offset) {
                EditOutcome::SlicesChanged
            } else {
                EditOutcome::Unchanged
            }
        }
        EditIntent::DeleteMarker(offset) => {
            if buffers.slices.remove_marker(offset) {
                EditOutcome::SlicesChanged
            } else {
                EditOutcome::Unchanged
            }
        }
        EditIntent::Clear => {
            selection.set(None);
            buffers.record.clear();
            EditOutcome::Cleared(buffers.clear())
        }
        EditIntent::ReplaceSlices {
            mut table,
            generation,
        } => {
            if generation != buffers.generation() {
                return EditOutcome::Unchanged;
            }
            table.truncate_to(buffers.total_samples());
            buffers.slices = table;
            EditOutcome::SlicesChanged
        }
    }
}
