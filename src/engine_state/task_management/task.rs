//! # Task Trait
//!
//! The unit of work a background worker repeats until it is stopped.
//!
//! ## Task Lifecycle
//! 1. A `Task` is moved into a worker with `GenerationWorker::spawn()`
//! 2. The worker calls `run_once()` in a loop while its running flag is set
//! 3. When `run_once()` reports no work, the worker sleeps for its idle backoff
//! 4. The task is dropped on the worker thread when the loop exits
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be moved onto the worker thread
//! - All state shared with other threads must be synchronized by the task itself

/// A repeatable unit of background work.
pub trait Task: Send {
    /// Performs at most one item of work.
    ///
    /// # Returns
    /// `true` if an item was processed, `false` if there was nothing to do.
    fn run_once(&mut self) -> bool;
}
