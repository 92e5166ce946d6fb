//! Playback state machine.
//!
//! Advances a fractional read position through the [`LoopWindow`] once per
//! frame, under one of two trigger modes and three read modes, and renders
//! the interpolated output frame.

use crate::loop_window::LoopWindow;
use crate::params::{ReadMode, TriggerMode};
use carve_core::math::{clamp, rescale};
use carve_core::{BufferSet, Frame, PulseGenerator, SchmittTrigger};

/// Gate voltage above which level mode plays.
pub const GATE_THRESHOLD: f32 = 0.1;

/// Fades shorter than this many samples are not applied.
pub const MIN_FADE_SAMPLES: f32 = 1000.0;

/// End-of-cycle pulse width in sample periods.
pub const EOC_PULSE_SAMPLES: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    #[default]
    Stopped,
    Playing,
}

/// Per-frame inputs to [`Playback::process`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackControls {
    pub trigger_mode: TriggerMode,
    /// Trigger input voltage (edge mode).
    pub trig: f32,
    /// Gate input voltage (level mode).
    pub gate: f32,
    pub read_mode: ReadMode,
    /// Net speed (knob + CV).
    pub speed: f32,
    /// Slice control value, present only when the slice input is patched.
    pub scrub: Option<f32>,
    /// Number of entries in the slice table.
    pub slice_count: usize,
}

impl Default for PlaybackControls {
    fn default() -> Self {
        Self {
            trigger_mode: TriggerMode::Disabled,
            trig: 0.0,
            gate: 0.0,
            read_mode: ReadMode::Once,
            speed: 1.0,
            scrub: None,
            slice_count: 0,
        }
    }
}

/// Read-head state.
#[derive(Debug, Clone)]
pub struct Playback {
    state: PlayState,
    sample_pos: f32,
    speed_factor: f32,
    /// Set while playing; consumed by the first stop so each pass emits one
    /// end-of-cycle pulse.
    eoc_armed: bool,
    trig: SchmittTrigger,
    gate_was_high: bool,
    eoc_pulse: PulseGenerator,
    sample_rate: f32,
}

impl Playback {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            state: PlayState::Stopped,
            sample_pos: 0.0,
            speed_factor: 1.0,
            eoc_armed: false,
            trig: SchmittTrigger::default(),
            gate_was_high: false,
            eoc_pulse: PulseGenerator::new(),
            sample_rate,
        }
    }

    #[inline]
    pub fn state(&self) -> PlayState {
        self.state
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    #[inline]
    pub fn position(&self) -> f32 {
        self.sample_pos
    }

    #[inline]
    pub fn speed_factor(&self) -> f32 {
        self.speed_factor
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    /// Move to the start of the traversal for the given speed sign.
    pub fn init_position(&mut self, window: &LoopWindow, speed: f32) {
        self.sample_pos = if speed >= 0.0 {
            window.sample_start
        } else {
            window.end()
        };
        self.speed_factor = 1.0;
    }

    /// Run one frame of trigger handling and position advancement.
    pub fn process(&mut self, controls: &PlaybackControls, window: &LoopWindow) {
        match controls.trigger_mode {
            TriggerMode::Disabled => {
                self.state = PlayState::Stopped;
            }
            TriggerMode::Edge => {
                if self.trig.process(controls.trig) {
                    self.init_position(window, controls.speed);
                    if controls.slice_count == 1 {
                        if let Some(scrub) = controls.scrub {
                            self.sample_pos = scrub_position(window, scrub);
                        }
                    }
                    self.state = PlayState::Playing;
                } else if self.is_playing() {
                    self.advance(controls.read_mode, controls.speed, window);
                }
            }
            TriggerMode::Level => {
                let high = controls.gate > GATE_THRESHOLD;
                if !high {
                    self.state = PlayState::Stopped;
                } else if let Some(scrub) = controls.scrub {
                    self.sample_pos = scrub_position(window, scrub);
                    self.state = PlayState::Playing;
                } else if !self.gate_was_high {
                    self.init_position(window, controls.speed);
                    self.state = PlayState::Playing;
                } else if self.is_playing() {
                    self.advance(controls.read_mode, controls.speed, window);
                }
                self.gate_was_high = high;
            }
        }
        if controls.trigger_mode != TriggerMode::Level {
            self.gate_was_high = false;
        }

        self.sample_pos = clamp(self.sample_pos, window.sample_start, window.end());
        if self.is_playing() {
            self.eoc_armed = true;
        }
    }

    fn advance(&mut self, read_mode: ReadMode, speed: f32, window: &LoopWindow) {
        let velocity = self.speed_factor * speed;
        let at_start = self.sample_pos <= window.sample_start;
        let at_end = self.sample_pos >= window.end();
        let at_boundary = (velocity >= 0.0 && at_end) || (velocity < 0.0 && at_start);

        match read_mode {
            ReadMode::Once if at_boundary => {
                self.state = PlayState::Stopped;
                if self.eoc_armed {
                    self.eoc_pulse.trigger(EOC_PULSE_SAMPLES / self.sample_rate);
                    self.eoc_armed = false;
                }
            }
            ReadMode::Loop if at_boundary => self.init_position(window, speed),
            ReadMode::PingPong => {
                if (at_end && velocity > 0.0) || (at_start && velocity < 0.0) {
                    self.speed_factor = -self.speed_factor;
                }
                self.sample_pos += self.speed_factor * speed;
            }
            _ => self.sample_pos += velocity,
        }
    }

    /// Fade gain at the current position.
    pub fn fade_coefficient(&self, window: &LoopWindow) -> f32 {
        let fade = window.fade_length;
        if fade <= MIN_FADE_SAMPLES {
            return 1.0;
        }
        let from_start = self.sample_pos - window.sample_start;
        let to_end = window.end() - self.sample_pos;
        if from_start < fade {
            rescale(from_start, 0.0, fade, 0.0, 1.0)
        } else if to_end < fade {
            rescale(to_end, fade, 0.0, 1.0, 0.0)
        } else {
            1.0
        }
    }

    /// Interpolated, faded output frame. Silence when stopped or empty.
    pub fn render(&self, buffers: &BufferSet, window: &LoopWindow) -> Frame {
        if !self.is_playing() || buffers.total_samples() == 0 {
            return Frame::silence();
        }
        buffers
            .interpolate(self.sample_pos)
            .scaled(self.fade_coefficient(window))
    }

    /// Advance the end-of-cycle pulse by `dt` seconds; true while high.
    pub fn eoc(&mut self, dt: f32) -> bool {
        self.eoc_pulse.process(dt)
    }
}

fn scrub_position(window: &LoopWindow, control: f32) -> f32 {
    window.sample_start + rescale(clamp(control, 0.0, 10.0), 0.0, 10.0, 0.0, 1.0) * window.loop_length
}
