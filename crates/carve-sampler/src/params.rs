//! Per-frame call contract: knob values, patched inputs and outputs.
//!
//! Every control is the sum of its knob and its input voltage, clamped to the
//! knob's range. An input that is `None` is disconnected; disconnection of
//! the trigger and gate inputs selects the trigger mode.

use carve_core::math::clamp;

/// Knob and switch values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Params {
    /// Record button, 0-1.
    pub record: f32,
    /// Window start within the slice, 0-10.
    pub sample_start: f32,
    /// Window length as a share of the slice, 0-10.
    pub loop_length: f32,
    /// 0 = once, 1 = loop, 2 = ping-pong.
    pub read_mode: f32,
    /// Playback rate in frames per tick, -4..4.
    pub speed: f32,
    /// Fade as a share of half the window, 0-10.
    pub fade: f32,
    /// Slice selector, 0-10.
    pub slice: f32,
    /// Clear button, 0-1.
    pub clear: f32,
    /// Transient detection threshold, 0.01-10.
    pub threshold: f32,
    /// Slice mode switch. Also selects append (on) vs replace (off) recording.
    pub slice_mode: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            record: 0.0,
            sample_start: 0.0,
            loop_length: 10.0,
            read_mode: 0.0,
            speed: 1.0,
            fade: 0.0,
            slice: 0.0,
            clear: 0.0,
            threshold: 1.0,
            slice_mode: false,
        }
    }
}

/// Input voltages for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInputs {
    pub in_l: f32,
    pub in_r: f32,
    pub trig: Option<f32>,
    pub gate: Option<f32>,
    pub sample_start: Option<f32>,
    pub loop_length: Option<f32>,
    pub read_mode: Option<f32>,
    pub speed: Option<f32>,
    pub record: Option<f32>,
    pub fade: Option<f32>,
    pub slice: Option<f32>,
    pub clear: Option<f32>,
}

/// Output voltages for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameOutputs {
    pub out_l: f32,
    pub out_r: f32,
    /// End-of-cycle pulse voltage.
    pub eoc: f32,
    /// Record indicator brightness, 0-1.
    pub rec_light: f32,
}

/// Traversal policy for the loop window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    /// Play through once and stop.
    #[default]
    Once,
    /// Restart at the boundary.
    Loop,
    /// Reverse direction at each boundary.
    PingPong,
}

impl ReadMode {
    /// Round a 0-2 control value to a mode.
    pub fn from_control(value: f32) -> Self {
        match clamp(value, 0.0, 2.0).round() as u8 {
            0 => ReadMode::Once,
            1 => ReadMode::Loop,
            _ => ReadMode::PingPong,
        }
    }
}

/// How playback is started and held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMode {
    /// Neither trigger nor gate patched.
    Disabled,
    /// Rising edges on the trigger input start playback.
    Edge,
    /// Playback runs while the gate is high.
    Level,
}

/// Sample buffer write policy when a recording is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordMode {
    Replace,
    Append,
}

#[inline]
fn cv(input: Option<f32>) -> f32 {
    input.unwrap_or(0.0)
}

impl FrameInputs {
    /// Edge mode wins over level mode when both are patched.
    pub fn trigger_mode(&self) -> TriggerMode {
        if self.trig.is_some() {
            TriggerMode::Edge
        } else if self.gate.is_some() {
            TriggerMode::Level
        } else {
            TriggerMode::Disabled
        }
    }
}

impl Params {
    pub fn read_mode(&self, inputs: &FrameInputs) -> ReadMode {
        ReadMode::from_control(self.read_mode + cv(inputs.read_mode))
    }

    /// Net speed, unclamped.
    pub fn speed(&self, inputs: &FrameInputs) -> f32 {
        self.speed + cv(inputs.speed)
    }

    pub fn sample_start(&self, inputs: &FrameInputs) -> f32 {
        clamp(self.sample_start + cv(inputs.sample_start), 0.0, 10.0)
    }

    pub fn loop_length(&self, inputs: &FrameInputs) -> f32 {
        clamp(self.loop_length + cv(inputs.loop_length), 0.0, 10.0)
    }

    pub fn fade(&self, inputs: &FrameInputs) -> f32 {
        clamp(self.fade + cv(inputs.fade), 0.0, 10.0)
    }

    pub fn slice(&self, inputs: &FrameInputs) -> f32 {
        clamp(self.slice + cv(inputs.slice), 0.0, 10.0)
    }

    pub fn record(&self, inputs: &FrameInputs) -> f32 {
        self.record + cv(inputs.record)
    }

    pub fn clear(&self, inputs: &FrameInputs) -> f32 {
        self.clear + cv(inputs.clear)
    }

    pub fn record_mode(&self) -> RecordMode {
        if self.slice_mode {
            RecordMode::Append
        } else {
            RecordMode::Replace
        }
    }
}
