//! Write channel
//!
//! A named execution channel backed by one worker thread. Every job sent
//! to it runs on that thread, in submission order, so writes routed through
//! it never overlap. Callers block until their job has run.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Sender};

use crate::error::{CqlPipeError, Result};

type Job = Box<dyn FnOnce() + Send>;

pub struct WriteChannel {
    name: String,
    sender: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl WriteChannel {
    /// Spawn the worker thread for channel `name`
    pub fn spawn(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let (sender, receiver) = channel::unbounded::<Job>();

        let worker = thread::Builder::new()
            .name(format!("write-channel-{name}"))
            .spawn(move || {
                // Ends once every sender is dropped
                for job in receiver {
                    job();
                }
            })?;

        tracing::debug!("Write channel '{}' started", name);

        Ok(Self {
            name,
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run `action` on the channel thread and wait for its result
    pub fn execute<F>(&self, action: F) -> Result<()>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| CqlPipeError::Channel(format!("channel '{}' is closed", self.name)))?;

        let (reply_tx, reply_rx) = channel::bounded(1);
        let channel_name = self.name.clone();
        let job: Job = Box::new(move || {
            // A panicking job fails its caller only; the worker keeps serving
            let outcome = panic::catch_unwind(AssertUnwindSafe(action)).unwrap_or_else(|payload| {
                let message = panic_message(payload.as_ref());
                tracing::error!("Write channel '{}' job panicked: {}", channel_name, message);
                Err(CqlPipeError::Channel(format!(
                    "channel '{channel_name}' job panicked: {message}"
                )))
            });
            // The caller may have given up waiting; nothing to do then
            let _ = reply_tx.send(outcome);
        });

        sender.send(job).map_err(|_| {
            CqlPipeError::Channel(format!("channel '{}' worker has stopped", self.name))
        })?;

        reply_rx.recv().map_err(|_| {
            CqlPipeError::Channel(format!("channel '{}' dropped a job", self.name))
        })?
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

impl fmt::Debug for WriteChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteChannel").field("name", &self.name).finish()
    }
}

impl Drop for WriteChannel {
    fn drop(&mut self) {
        // Closing the sender lets the worker drain and exit
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("Write channel '{}' worker panicked", self.name);
            }
        }
    }
}
