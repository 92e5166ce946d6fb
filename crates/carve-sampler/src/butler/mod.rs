//! Background worker for file I/O and deallocation.

mod request;
mod thread;

pub use request::{ButlerCommand, ButlerEvent};
pub(crate) use request::{run_load, run_save};
pub(crate) use thread::try_send;
pub use thread::ButlerThread;
