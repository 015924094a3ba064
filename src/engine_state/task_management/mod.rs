//! # Task Management System
//!
//! This module owns the single background worker thread of the engine.
//!
//! ## Architecture Overview
//!
//! - `Task`: a unit of work the worker repeats, see [`task::Task`]
//! - `GenerationWorker`: the thread handle plus the running flag it polls
//!
//! The worker is a polling loop. There is no channel or condition variable
//! between the render thread and the worker: work arrives through shared state
//! owned by the task, and the worker sleeps for a fixed backoff whenever the task
//! finds nothing to do.
//!
//! ## Shutdown
//!
//! 1. The owner clears the running flag
//! 2. The worker finishes the item it is processing, if any
//! 3. The worker observes the flag and exits its loop
//! 4. The owner joins the thread
//!
//! After `shutdown()` returns, the task has been dropped and can no longer touch
//! shared state.

pub mod task;

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use log::{debug, info};
use task::Task;

use super::voxels::world::WorldError;

/// Name given to the background generation thread.
pub const WORKER_THREAD_NAME: &str = "chunk-generator";

/// Handle to the background worker thread.
///
/// # Fields
/// - `running`: cleared to ask the worker to stop
/// - `handle`: the thread, `None` once joined
#[derive(Debug)]
pub struct GenerationWorker {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl GenerationWorker {
    /// Spawns the worker thread and starts running `task`.
    ///
    /// # Arguments
    /// * `task` - The work to repeat; moved onto the worker thread
    /// * `idle_backoff` - How long to sleep when `task` reports no work
    ///
    /// # Returns
    /// The running worker, or [`WorldError::WorkerSpawn`] if the OS refused the thread.
    pub fn spawn<T>(mut task: T, idle_backoff: Duration) -> Result<Self, WorldError>
    where
        T: Task + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let worker_running = Arc::clone(&running);

        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                info!("Generation worker started");
                let mut processed = 0usize;
                while worker_running.load(Ordering::Acquire) {
                    if task.run_once() {
                        processed += 1;
                    } else {
                        thread::sleep(idle_backoff);
                    }
                }
                info!("Generation worker stopped after {} items", processed);
            })
            .map_err(WorldError::WorkerSpawn)?;

        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Whether the worker thread is alive and has not been asked to stop.
    ///
    /// A worker whose task panicked is not running, even before it is joined.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
            && self
                .handle
                .as_ref()
                .is_some_and(|handle| !handle.is_finished())
    }

    /// Clears the running flag and joins the worker thread.
    ///
    /// Idempotent: later calls return `Ok(())` without doing anything.
    ///
    /// # Returns
    /// [`WorldError::WorkerPanicked`] if the worker thread panicked.
    pub fn shutdown(&mut self) -> Result<(), WorldError> {
        self.running.store(false, Ordering::Release);

        match self.handle.take() {
            Some(handle) => {
                debug!("Joining generation worker");
                handle.join().map_err(|_| WorldError::WorkerPanicked)
            }
            None => Ok(()),
        }
    }
}

impl Drop for GenerationWorker {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            log::error!("Generation worker shutdown failed: {}", err);
        }
    }
}
