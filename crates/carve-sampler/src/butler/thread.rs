//! Butler thread: decodes, encodes and frees buffers off the audio thread.

use super::request::{run_load, run_save, ButlerCommand, ButlerEvent};
use crate::{Error, Result};
use carve_core::SharedBuffers;
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thread_priority::ThreadPriority;
use tracing::{debug, trace};

const IDLE_POLL: Duration = Duration::from_millis(20);

/// Owner of the butler thread and both ends of its channels.
pub struct ButlerThread {
    command_tx: Sender<ButlerCommand>,
    command_rx: Option<Receiver<ButlerCommand>>,
    event_tx: Sender<ButlerEvent>,
    event_rx: Receiver<ButlerEvent>,
    buffers: Arc<SharedBuffers>,
    thread_handle: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl ButlerThread {
    pub fn new(channel_capacity: usize, buffers: Arc<SharedBuffers>) -> Self {
        let (command_tx, command_rx) = bounded(channel_capacity);
        let (event_tx, event_rx) = unbounded();
        Self {
            command_tx,
            command_rx: Some(command_rx),
            event_tx,
            event_rx,
            buffers,
            thread_handle: None,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn command_sender(&self) -> Sender<ButlerCommand> {
        self.command_tx.clone()
    }

    pub fn events(&self) -> Receiver<ButlerEvent> {
        self.event_rx.clone()
    }

    /// Queue a command without blocking.
    pub fn send(&self, command: ButlerCommand) -> Result<()> {
        try_send(&self.command_tx, command)
    }

    pub fn is_running(&self) -> bool {
        self.thread_handle.is_some()
    }

    pub fn start(&mut self) {
        if self.thread_handle.is_some() {
            return;
        }
        let Some(rx) = self.command_rx.take() else {
            return;
        };
        let events = self.event_tx.clone();
        let buffers = Arc::clone(&self.buffers);
        let shutdown = Arc::clone(&self.shutdown);

        let handle = thread::Builder::new()
            .name("carve-butler".into())
            .spawn(move || {
                let _ = thread_priority::set_current_thread_priority(ThreadPriority::Min);
                butler_loop(rx, events, buffers, shutdown);
            })
            .expect("Failed to spawn butler thread");

        self.thread_handle = Some(handle);
    }

    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        let _ = self.command_tx.try_send(ButlerCommand::Shutdown);

        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ButlerThread {
    fn drop(&mut self) {
        self.stop();
    }
}

pub(crate) fn try_send(tx: &Sender<ButlerCommand>, command: ButlerCommand) -> Result<()> {
    tx.try_send(command).map_err(|e| match e {
        TrySendError::Full(_) => Error::Butler("command queue full".into()),
        TrySendError::Disconnected(_) => Error::Butler("butler thread not running".into()),
    })
}

fn butler_loop(
    rx: Receiver<ButlerCommand>,
    events: Sender<ButlerEvent>,
    buffers: Arc<SharedBuffers>,
    shutdown: Arc<AtomicBool>,
) {
    debug!("butler started");
    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        let command = match rx.recv_timeout(IDLE_POLL) {
            Ok(command) => command,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };
        let event = match command {
            ButlerCommand::Shutdown => break,
            ButlerCommand::Load { path, target_rate } => run_load(path, target_rate),
            ButlerCommand::Save { path, sample_rate } => run_save(&buffers, path, sample_rate),
            ButlerCommand::Retire(frames) => {
                trace!(frames = frames.len(), "retired buffer");
                drop(frames);
                continue;
            }
        };
        if events.send(event).is_err() {
            break;
        }
    }
    debug!("butler stopped");
}
