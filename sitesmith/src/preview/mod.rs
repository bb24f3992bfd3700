//! Live-preview update scheduling
//!
//! Rapid form edits are far cheaper than a preview re-render, so edits
//! are coalesced twice before they reach the renderer: per-field edits
//! merge in a [`FieldBatcher`] over a short batch window, and whole
//! snapshots are debounced and change-detected by the
//! [`PreviewScheduler`].

pub mod batcher;
pub mod scheduler;

pub use batcher::FieldBatcher;
pub use scheduler::{PreviewScheduler, SchedulerState, UpdateStrategy};

/// Single-slot cancellable timer
///
/// Holds at most one scheduled task; rescheduling aborts the previous
/// one, so no two timers coexist for the same owner.
#[derive(Debug, Default)]
pub(crate) struct TimerSlot {
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TimerSlot {
    /// Replace the scheduled task, aborting any previous one
    pub(crate) fn reschedule(&mut self, handle: tokio::task::JoinHandle<()>) {
        self.cancel();
        self.handle = Some(handle);
    }

    /// Abort the scheduled task, if any
    pub(crate) fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
