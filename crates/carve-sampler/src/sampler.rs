//! The sampler engine: one [`Sampler::tick`] per audio frame.

use crate::butler::{run_load, run_save, ButlerCommand, ButlerEvent, ButlerThread};
use crate::edit::{self, EditIntent, EditOutcome, EditQueue, Selection};
use crate::handle::SamplerHandle;
use crate::loop_window::{LoopWindow, WindowControls};
use crate::params::{FrameInputs, FrameOutputs, Params};
use crate::playback::{Playback, PlaybackControls};
use crate::recorder::{RecordEvent, Recorder};
use crate::state::SamplerState;
use crate::{Error, Result};
use carve_analysis::TransientDetector;
use carve_core::{BufferSet, Frame, SamplerConfig, SchmittTrigger, SharedBuffers, SliceTable};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Metadata about the sample currently in the play buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleInfo {
    /// File the buffer was loaded from or last saved to.
    pub path: Option<PathBuf>,
    pub file_name: String,
    pub extension: String,
    /// Channel count of the source file.
    pub channels: u16,
    /// Native rate of the source file.
    pub native_rate: u32,
}

impl SampleInfo {
    fn from_path(path: PathBuf, channels: u16, native_rate: u32) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path: Some(path),
            file_name,
            extension,
            channels,
            native_rate,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Real-time sampler/looper engine.
///
/// The engine is the only writer of the shared buffers. Other threads talk to
/// it through a [`SamplerHandle`].
pub struct Sampler {
    config: SamplerConfig,
    buffers: Arc<SharedBuffers>,
    edits: EditQueue,
    selection: Selection,
    playback: Playback,
    recorder: Recorder,
    window: LoopWindow,
    clear_trigger: SchmittTrigger,
    butler: Option<ButlerThread>,
    butler_tx: Option<Sender<ButlerCommand>>,
    events: Option<Receiver<ButlerEvent>>,
    info: SampleInfo,
    sample_rate: Arc<AtomicU32>,
}

impl Sampler {
    /// Create an engine with a running butler thread.
    pub fn new(config: SamplerConfig) -> Result<Self> {
        let mut sampler = Self::without_butler(config)?;
        let mut butler = ButlerThread::new(config.butler_capacity, Arc::clone(&sampler.buffers));
        butler.start();
        sampler.butler_tx = Some(butler.command_sender());
        sampler.events = Some(butler.events());
        sampler.butler = Some(butler);
        Ok(sampler)
    }

    /// Create an engine that does all file I/O inline.
    pub fn without_butler(config: SamplerConfig) -> Result<Self> {
        config.validate()?;
        let edits = EditQueue::new();
        Ok(Self {
            config,
            buffers: Arc::new(SharedBuffers::new()),
            edits,
            selection: Selection::new(),
            playback: Playback::new(config.sample_rate as f32),
            recorder: Recorder::new(),
            window: LoopWindow::empty(),
            clear_trigger: SchmittTrigger::default(),
            butler: None,
            butler_tx: None,
            events: None,
            info: SampleInfo::default(),
            sample_rate: Arc::new(AtomicU32::new(config.sample_rate.round() as u32)),
        })
    }

    pub fn handle(&self) -> SamplerHandle {
        SamplerHandle::new(
            Arc::clone(&self.buffers),
            self.edits.sender(),
            self.selection.clone(),
            self.butler_tx.clone(),
            Arc::clone(&self.sample_rate),
        )
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub fn has_butler(&self) -> bool {
        self.butler.as_ref().is_some_and(ButlerThread::is_running)
    }

    pub fn info(&self) -> &SampleInfo {
        &self.info
    }

    pub fn last_path(&self) -> Option<&Path> {
        self.info.path.as_deref()
    }

    /// Host sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.load(Ordering::Acquire)
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_armed()
    }

    /// Window used on the last tick.
    pub fn loop_window(&self) -> LoopWindow {
        self.window
    }

    pub fn buffers(&self) -> &Arc<SharedBuffers> {
        &self.buffers
    }

    pub fn total_samples(&self) -> usize {
        self.buffers.lock().total_samples()
    }

    pub fn slices(&self) -> SliceTable {
        self.buffers.lock().slices.clone()
    }

    /// Process one audio frame.
    pub fn tick(&mut self, params: &Params, inputs: &FrameInputs, sample_rate: f32) -> FrameOutputs {
        self.playback.set_sample_rate(sample_rate);

        let event = self.events.as_ref().and_then(|rx| rx.try_recv().ok());
        let clear_pressed = self.clear_trigger.process(params.clear(inputs));
        let intent = self.edits.try_next();

        let mut buffers = self.buffers.lock();

        // Frames the butler could not take are dropped after the lock is released.
        let unloaded = event.and_then(|event| {
            install_event(&mut buffers, &mut self.info, self.butler_tx.as_ref(), event)
        });
        let edited = intent.and_then(|intent| {
            apply_edit(
                intent,
                &mut buffers,
                &mut self.info,
                &self.selection,
                self.butler_tx.as_ref(),
            )
        });
        // The clear button bypasses the edit slot so a staged UI edit cannot swallow it.
        let cleared = if clear_pressed {
            apply_edit(
                EditIntent::Clear,
                &mut buffers,
                &mut self.info,
                &self.selection,
                self.butler_tx.as_ref(),
            )
        } else {
            None
        };

        let input = Frame::new(inputs.in_l, inputs.in_r).scaled(1.0 / self.config.input_divisor);
        match self
            .recorder
            .process(&mut buffers, params.record(inputs), params.record_mode(), input)
        {
            RecordEvent::Started => debug!("recording started"),
            RecordEvent::Committed(mode) => {
                if mode == crate::params::RecordMode::Replace {
                    self.info.reset();
                }
                debug!(?mode, frames = buffers.total_samples(), "recording committed");
            }
            RecordEvent::None => {}
        }

        let controls = WindowControls {
            slice_mode: params.slice_mode,
            slice: params.slice(inputs),
            sample_start: params.sample_start(inputs),
            loop_length: params.loop_length(inputs),
            fade: params.fade(inputs),
        };
        self.window = LoopWindow::compute(&buffers.slices, buffers.total_samples(), &controls);

        let playback_controls = PlaybackControls {
            trigger_mode: inputs.trigger_mode(),
            trig: inputs.trig.unwrap_or(0.0),
            gate: inputs.gate.unwrap_or(0.0),
            read_mode: params.read_mode(inputs),
            speed: params.speed(inputs),
            scrub: inputs.slice.map(|_| controls.slice),
            slice_count: buffers.slices.len(),
        };
        self.playback.process(&playback_controls, &self.window);
        let frame = self.playback.render(&buffers, &self.window);
        drop(buffers);
        drop((unloaded, edited, cleared));

        let eoc = self.playback.eoc(1.0 / sample_rate);
        let out = frame.scaled(self.config.output_gain);
        FrameOutputs {
            out_l: out.left,
            out_r: out.right,
            eoc: if eoc { self.config.eoc_voltage } else { 0.0 },
            rec_light: self.recorder.light(),
        }
    }

    /// Decode `path` on the calling thread and install it.
    ///
    /// Returns the new frame count. A file that fails to decode installs an
    /// empty buffer. An unsupported extension clears the path metadata and
    /// leaves the buffers untouched.
    pub fn load_blocking(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref().to_path_buf();
        let event = run_load(path.clone(), self.sample_rate());
        let rejected = matches!(event, ButlerEvent::LoadRejected { .. });

        let mut buffers = self.buffers.lock();
        let unloaded = install_event(&mut buffers, &mut self.info, self.butler_tx.as_ref(), event);
        let total = buffers.total_samples();
        drop(buffers);
        drop(unloaded);
        if rejected {
            return Err(Error::UnsupportedFormat(path.display().to_string()));
        }
        Ok(total)
    }

    /// Load through the butler when one is running, inline otherwise.
    pub fn request_load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        match &self.butler_tx {
            Some(tx) => crate::butler::try_send(
                tx,
                ButlerCommand::Load {
                    path: path.as_ref().to_path_buf(),
                    target_rate: self.sample_rate(),
                },
            ),
            None => self.load_blocking(path).map(|_| ()),
        }
    }

    /// Encode the play buffer to `path` on the calling thread.
    pub fn save_blocking(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let event = run_save(&self.buffers, path.as_ref().to_path_buf(), self.sample_rate());
        let failure = match &event {
            ButlerEvent::SaveFailed { reason, .. } => Some(reason.clone()),
            _ => None,
        };
        let mut buffers = self.buffers.lock();
        install_event(&mut buffers, &mut self.info, self.butler_tx.as_ref(), event);
        match failure {
            Some(reason) => Err(Error::Encode(reason)),
            None => Ok(()),
        }
    }

    /// React to a host sample-rate change by reloading the last file.
    pub fn set_sample_rate(&mut self, sample_rate: f32) -> Result<()> {
        let rate = sample_rate.round() as u32;
        let previous = self.sample_rate.swap(rate, Ordering::AcqRel);
        self.playback.set_sample_rate(sample_rate);
        self.config.sample_rate = sample_rate as f64;
        if previous == rate {
            return Ok(());
        }
        info!(from = previous, to = rate, "sample rate changed");
        match self.info.path.clone() {
            Some(path) => self.request_load(path),
            None => Ok(()),
        }
    }

    /// [`Sampler::detect_transients`] at the threshold knob's setting.
    pub fn detect_transients_with(&mut self, params: &Params) -> Result<usize> {
        self.detect_transients(params.threshold)
    }

    /// Run transient detection on the calling thread and replace the slice
    /// table. Holds the store lock for the whole analysis.
    pub fn detect_transients(&mut self, threshold: f32) -> Result<usize> {
        let detector = TransientDetector::new(threshold);
        let mut buffers = self.buffers.lock();
        let boundaries = detector.detect(buffers.play().iter().map(|f| f.left));
        buffers.slices = SliceTable::from_offsets(boundaries)?;
        debug!(slices = buffers.slices.len(), threshold, "transients detected");
        Ok(buffers.slices.len())
    }

    pub fn state(&self) -> SamplerState {
        let buffers = self.buffers.lock();
        SamplerState::capture(self.info.path.as_deref(), &buffers.slices)
    }

    /// Rebuild from persisted state: reload the file, then the slice markers.
    pub fn restore(&mut self, state: &SamplerState) {
        if let Some(path) = state.path() {
            if let Err(e) = self.load_blocking(&path) {
                warn!(path = %path.display(), error = %e, "restore load failed");
            }
        }
        let mut buffers = self.buffers.lock();
        let total = buffers.total_samples();
        if total > 0 {
            buffers.slices = state.slice_table(total);
        }
    }
}

/// Hand `frames` to the butler for deallocation. Returns them when there is
/// no butler or its queue is full; the caller drops them outside the lock.
fn retire(butler: Option<&Sender<ButlerCommand>>, frames: Vec<Frame>) -> Option<Vec<Frame>> {
    if frames.capacity() == 0 {
        return None;
    }
    let Some(tx) = butler else {
        return Some(frames);
    };
    match tx.try_send(ButlerCommand::Retire(frames)) {
        Ok(()) => None,
        Err(TrySendError::Full(ButlerCommand::Retire(frames)))
        | Err(TrySendError::Disconnected(ButlerCommand::Retire(frames))) => Some(frames),
        Err(_) => None,
    }
}

fn apply_edit(
    intent: EditIntent,
    buffers: &mut BufferSet,
    info: &mut SampleInfo,
    selection: &Selection,
    butler: Option<&Sender<ButlerCommand>>,
) -> Option<Vec<Frame>> {
    match edit::apply(intent, buffers, selection) {
        EditOutcome::Cleared(old) => {
            info.reset();
            debug!("buffer cleared");
            retire(butler, old)
        }
        EditOutcome::BufferChanged => {
            debug!(frames = buffers.total_samples(), "slice deleted");
            None
        }
        EditOutcome::SlicesChanged | EditOutcome::Unchanged => None,
    }
}

fn install_event(
    buffers: &mut BufferSet,
    info: &mut SampleInfo,
    butler: Option<&Sender<ButlerCommand>>,
    event: ButlerEvent,
) -> Option<Vec<Frame>> {
    match event {
        ButlerEvent::Loaded { path, sample } => {
            let old = buffers.replace_play(sample.frames);
            info!(
                path = %path.display(),
                frames = buffers.total_samples(),
                "sample installed"
            );
            *info = SampleInfo::from_path(path, sample.channels, sample.sample_rate);
            retire(butler, old)
        }
        ButlerEvent::LoadRejected { .. } => {
            info.reset();
            None
        }
        ButlerEvent::Saved { path } => {
            if info.path.as_ref() != Some(&path) {
                *info = SampleInfo::from_path(path, 2, info.native_rate);
            }
            None
        }
        ButlerEvent::SaveFailed { path, reason } => {
            warn!(path = %path.display(), %reason, "save failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use carve_core::SliceIndex;

    const SR: f32 = 44100.0;

    fn engine() -> Sampler {
        Sampler::without_butler(SamplerConfig::default()).unwrap()
    }

    fn record(sampler: &mut Sampler, params: &Params, input: &[f32]) {
        let mut p = *params;
        p.record = 1.0;
        for (i, &v) in input.iter().enumerate() {
            if i == 1 {
                p.record = 0.0;
            }
            let inputs = FrameInputs {
                in_l: v,
                in_r: -v,
                ..Default::default()
            };
            sampler.tick(&p, &inputs, SR);
        }
        p.record = 1.0;
        sampler.tick(&p, &FrameInputs::default(), SR);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SamplerConfig {
            sample_rate: 1.0,
            ..Default::default()
        };
        assert!(Sampler::without_butler(config).is_err());
    }

    #[test]
    fn test_record_then_play_scaled() {
        let mut sampler = engine();
        let params = Params::default();
        record(&mut sampler, &params, &[10.0, 5.0, 2.5, 0.0]);
        assert_eq!(sampler.total_samples(), 4);
        assert_eq!(sampler.slices().offsets(), &[0]);

        let mut inputs = FrameInputs {
            trig: Some(10.0),
            ..Default::default()
        };
        let out = sampler.tick(&params, &inputs, SR);
        assert_relative_eq!(out.out_l, 5.0);
        assert_relative_eq!(out.out_r, -5.0);

        inputs.trig = Some(0.0);
        let out = sampler.tick(&params, &inputs, SR);
        assert_relative_eq!(out.out_l, 2.5);
    }

    #[test]
    fn test_clear_input_empties_buffer() {
        let mut sampler = engine();
        let params = Params::default();
        record(&mut sampler, &params, &[1.0; 16]);
        assert_eq!(sampler.total_samples(), 16);

        let inputs = FrameInputs {
            clear: Some(10.0),
            ..Default::default()
        };
        sampler.tick(&params, &inputs, SR);
        assert_eq!(sampler.total_samples(), 0);
        assert!(sampler.slices().is_empty());
        assert_eq!(sampler.loop_window(), LoopWindow::empty());
    }

    #[test]
    fn test_clear_press_wins_over_staged_edit() {
        let mut sampler = engine();
        let params = Params::default();
        record(&mut sampler, &params, &[1.0; 100]);
        assert!(sampler.handle().add_marker(carve_core::SampleOffset(50)));

        let inputs = FrameInputs {
            clear: Some(10.0),
            ..Default::default()
        };
        sampler.tick(&params, &inputs, SR);
        assert_eq!(sampler.total_samples(), 0);
        assert!(sampler.slices().is_empty());

        // The staged marker was consumed on the same frame.
        sampler.tick(&params, &FrameInputs::default(), SR);
        assert!(sampler.slices().is_empty());
    }

    #[test]
    fn test_retire_hands_back_frames_without_butler() {
        assert!(retire(None, Vec::new()).is_none());
        let leftover = retire(None, vec![Frame::mono(1.0); 4]);
        assert_eq!(leftover.map(|v| v.len()), Some(4));

        let (tx, rx) = crossbeam_channel::bounded(1);
        assert!(retire(Some(&tx), vec![Frame::mono(1.0); 2]).is_none());
        let leftover = retire(Some(&tx), vec![Frame::mono(1.0); 3]);
        assert_eq!(leftover.map(|v| v.len()), Some(3));
        assert!(matches!(rx.try_recv(), Ok(ButlerCommand::Retire(v)) if v.len() == 2));
    }

    #[test]
    fn test_edit_applied_on_next_tick() {
        let mut sampler = engine();
        let params = Params {
            slice_mode: false,
            ..Default::default()
        };
        record(&mut sampler, &params, &[1.0; 300]);
        let handle = sampler.handle();
        assert!(handle.add_marker(carve_core::SampleOffset(100)));
        assert_eq!(sampler.slices().offsets(), &[0]);
        sampler.tick(&params, &FrameInputs::default(), SR);
        assert_eq!(sampler.slices().offsets(), &[0, 100]);

        handle.select_slice(Some(SliceIndex(1)));
        assert!(handle.delete_selected());
        sampler.tick(&params, &FrameInputs::default(), SR);
        assert_eq!(sampler.slices().offsets(), &[0]);
        assert_eq!(sampler.total_samples(), 100);
        assert_eq!(handle.selected_slice(), None);
    }

    #[test]
    fn test_slice_mode_window_follows_slice_control() {
        let mut sampler = engine();
        record(&mut sampler, &Params::default(), &[1.0; 400]);
        sampler.handle().add_marker(carve_core::SampleOffset(100));
        let params = Params {
            slice_mode: true,
            slice: 10.0,
            read_mode: 1.0,
            ..Default::default()
        };
        sampler.tick(&params, &FrameInputs::default(), SR);
        let window = sampler.loop_window();
        assert_eq!(window.slice, SliceIndex(1));
        assert_relative_eq!(window.sample_start, 100.0);
        assert_relative_eq!(window.loop_length, 300.0);
    }

    #[test]
    fn test_detect_transients_inline() {
        let mut sampler = engine();
        let mut input = vec![0.0; 10_000];
        input.extend(std::iter::repeat(10.0).take(1000));
        record(&mut sampler, &Params::default(), &input);
        let count = sampler.detect_transients(1.0).unwrap();
        assert_eq!(count, 2);
        let offsets = sampler.slices().offsets().to_vec();
        assert_eq!(offsets[0], 0);
        assert!(offsets[1] >= 10_000 && offsets[1] < 11_000);
    }

    #[test]
    fn test_detect_transients_uses_threshold_knob() {
        let mut sampler = engine();
        let mut input = vec![0.0; 2048];
        input.extend(std::iter::repeat(1.0).take(1024));
        record(&mut sampler, &Params::default(), &input);

        // 1 V records as 0.1, so each loud window scores an energy of 1.0.
        let quiet = Params {
            threshold: 0.5,
            ..Default::default()
        };
        assert_eq!(sampler.detect_transients_with(&quiet).unwrap(), 2);

        let deaf = Params {
            threshold: 5.0,
            ..Default::default()
        };
        assert_eq!(sampler.detect_transients_with(&deaf).unwrap(), 1);
        assert_eq!(sampler.slices().offsets(), &[0]);
    }

    #[test]
    fn test_rejected_load_keeps_buffer() {
        let mut sampler = engine();
        record(&mut sampler, &Params::default(), &[1.0; 8]);
        assert!(matches!(
            sampler.load_blocking("drums.ogg"),
            Err(Error::UnsupportedFormat(_))
        ));
        assert_eq!(sampler.total_samples(), 8);
        assert_eq!(sampler.last_path(), None);
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let mut sampler = engine();
        record(&mut sampler, &Params::default(), &[1.0; 8]);
        assert_eq!(sampler.load_blocking("/nonexistent/take.wav").unwrap(), 0);
        assert_eq!(sampler.info().file_name, "take.wav");
        assert_eq!(sampler.info().extension, "wav");

        let out = sampler.tick(
            &Params::default(),
            &FrameInputs {
                trig: Some(10.0),
                ..Default::default()
            },
            SR,
        );
        assert_eq!(out.out_l, 0.0);
        assert_eq!(sampler.loop_window(), LoopWindow::empty());
    }

    #[test]
    fn test_save_load_restore() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("take.wav");

        let mut sampler = engine();
        let input: Vec<f32> = (0..500).map(|i| (i as f32 / 50.0).sin() * 8.0).collect();
        record(&mut sampler, &Params::default(), &input);
        sampler.save_blocking(&path).unwrap();
        assert_eq!(sampler.last_path(), Some(path.as_path()));
        sampler.handle().add_marker(carve_core::SampleOffset(123));
        sampler.tick(&Params::default(), &FrameInputs::default(), SR);

        let state = sampler.state();
        assert_eq!(state.slices, vec![123]);

        let mut restored = engine();
        restored.restore(&state);
        assert_eq!(restored.total_samples(), 500);
        assert_eq!(restored.slices().offsets(), &[0, 123]);
        assert_eq!(restored.info().channels, 2);
    }

    #[test]
    fn test_sample_rate_change_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let frames: Vec<Frame> = (0..4410).map(|i| Frame::mono((i as f32 * 0.01).sin())).collect();
        crate::codec::encode(&path, &frames, 44100).unwrap();

        let mut sampler = engine();
        assert_eq!(sampler.load_blocking(&path).unwrap(), 4410);
        sampler.set_sample_rate(48000.0).unwrap();
        assert_eq!(sampler.sample_rate(), 48000);
        assert_eq!(sampler.total_samples(), 4800);
    }
}
