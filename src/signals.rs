//! Signal relay: child-termination reaping and interrupt interception.
//!
//! No work happens inside a signal handler. `SIGCHLD` is delivered through
//! `signal_hook`'s self-pipe to a dedicated thread, which reaps under the job
//! table mutex and forwards completions over a channel; the main loop prints
//! them. `SIGINT` only sets a flag, so an interrupt aimed at a foreground child
//! does not terminate the interpreter.

use crate::jobs::{self, JobEvent, SharedJobTable};
use signal_hook::consts::{SIGCHLD, SIGINT};
use signal_hook::iterator::{Handle, Signals};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

pub struct SignalRelay {
    events: Receiver<JobEvent>,
    interrupted: Arc<AtomicBool>,
    handle: Handle,
    worker: Option<JoinHandle<()>>,
}

impl SignalRelay {
    /// Installs both handlers and starts the reaping thread.
    pub fn install(jobs: SharedJobTable) -> io::Result<Self> {
        let interrupted = Arc::new(AtomicBool::new(false));
        signal_hook::flag::register(SIGINT, Arc::clone(&interrupted))?;

        let mut signals = Signals::new([SIGCHLD])?;
        let handle = signals.handle();
        let (tx, events) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("mysh-reaper".into())
            .spawn(move || {
                for _ in signals.forever() {
                    let finished = jobs::lock(&jobs).reap();
                    for event in finished {
                        if tx.send(event).is_err() {
                            return;
                        }
                    }
                }
            })?;
        log::debug!("signal relay installed");

        Ok(Self {
            events,
            interrupted,
            handle,
            worker: Some(worker),
        })
    }

    /// Completions reaped since the last call, without blocking.
    pub fn drain(&self) -> Vec<JobEvent> {
        self.events.try_iter().collect()
    }

    /// Whether an interrupt arrived since the last call.
    pub fn take_interrupt(&self) -> bool {
        self.interrupted.swap(false, Ordering::Relaxed)
    }
}

impl Drop for SignalRelay {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
