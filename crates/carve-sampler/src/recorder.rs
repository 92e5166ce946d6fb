//! Input capture and record commit.

use crate::params::RecordMode;
use carve_core::{BufferSet, Frame, SampleOffset, SchmittTrigger};

/// What a call to [`Recorder::process`] did besides capturing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordEvent {
    None,
    /// Recording armed on this frame.
    Started,
    /// Recording committed into the play buffer.
    Committed(RecordMode),
}

/// Toggles recording on each debounced rising edge of the record control
/// and appends one frame per tick to the record buffer while armed.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    armed: bool,
    trigger: SchmittTrigger,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Record indicator brightness.
    #[inline]
    pub fn light(&self) -> f32 {
        if self.armed {
            1.0
        } else {
            0.0
        }
    }

    /// Handle the record control and capture `input` for this frame.
    ///
    /// `input` is already normalized. Must be called with the store locked.
    pub fn process(
        &mut self,
        buffers: &mut BufferSet,
        control: f32,
        mode: RecordMode,
        input: Frame,
    ) -> RecordEvent {
        let mut event = RecordEvent::None;
        if self.trigger.process(control) {
            if self.armed {
                commit(buffers, mode);
                event = RecordEvent::Committed(mode);
            } else {
                event = RecordEvent::Started;
            }
            self.armed = !self.armed;
        }

        if self.armed {
            buffers.record.push(input);
        }
        event
    }
}

fn commit(buffers: &mut BufferSet, mode: RecordMode) {
    match mode {
        RecordMode::Replace => buffers.swap_in_record(),
        RecordMode::Append => {
            if buffers.record.is_empty() {
                return;
            }
            let join = buffers.total_samples();
            buffers.slices.append_boundary(SampleOffset(join));
            buffers.append_record();
        }
    }
}
