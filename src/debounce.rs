//! Last-call-wins debouncing on top of tokio timers.
//!
//! Each [`Debouncer::schedule`] call supersedes the previous one. A
//! superseded action never runs, even if its timer already elapsed and the
//! task is about to call it: every task carries the generation it was
//! scheduled under and re-checks it while holding the generation lock.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::debug;

/// Handle to one scheduled action. Cancelling it has no effect once a newer
/// call has superseded the action or after it has run.
#[derive(Debug)]
pub struct TaskHandle {
    abort: AbortHandle,
    generation: Arc<Mutex<u64>>,
    scheduled: u64,
}

impl TaskHandle {
    /// Stop the action from running. Returns whether it was still waiting.
    pub fn cancel(&self) -> bool {
        let mut current = lock(&self.generation);
        if *current != self.scheduled {
            return false;
        }
        *current += 1;
        self.abort.abort();
        true
    }

    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}

/// Coalesces bursts of `schedule` calls into one delayed action
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    generation: Arc<Mutex<u64>>,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(Mutex::new(0)),
            pending: None,
        }
    }

    /// Run `action` once `delay` has passed without another call to
    /// `schedule` or `cancel`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, action: F) -> TaskHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let scheduled = self.supersede();
        let generation = Arc::clone(&self.generation);
        let delay = self.delay;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut current = lock(&generation);
            if *current == scheduled {
                debug!(generation = scheduled, "debounced action fired");
                action();
                // a fired action can no longer be cancelled through its handle
                *current += 1;
            }
        });

        let task = TaskHandle {
            abort: handle.abort_handle(),
            generation: Arc::clone(&self.generation),
            scheduled,
        };
        self.pending = Some(handle);
        task
    }

    /// Drop the pending action, if any. Returns whether one was still waiting.
    pub fn cancel(&mut self) -> bool {
        let was_pending = self.is_pending();
        self.supersede();
        was_pending
    }

    /// An action is scheduled and has not fired yet
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    fn supersede(&mut self) -> u64 {
        let next = {
            let mut generation = lock(&self.generation);
            *generation += 1;
            *generation
        };
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        next
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

fn lock(generation: &Mutex<u64>) -> MutexGuard<'_, u64> {
    generation.lock().unwrap_or_else(PoisonError::into_inner)
}
