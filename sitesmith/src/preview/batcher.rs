//! Batched per-field form updates
//!
//! Editing one field at a time would emit one snapshot per keystroke.
//! The batcher accumulates per-field edits into a single merged map
//! and delivers it once per batch window.

use super::TimerSlot;
use crate::form::{FieldValue, FormData};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;

struct State {
    batch: FormData,
    timer: TimerSlot,
}

struct Inner {
    state: Mutex<State>,
    window: Duration,
    on_flush: Box<dyn Fn(FormData) + Send + Sync>,
}

impl Inner {
    fn flush(&self) {
        let mut state = self.state.lock();
        if state.batch.is_empty() {
            return;
        }
        let updates = std::mem::take(&mut state.batch);
        state.timer.cancel();
        drop(state);
        (self.on_flush)(updates);
    }
}

/// Coalesces per-field edits over a short batch window
///
/// Updates to the same field within a window overwrite each other; the
/// flush callback receives one merged map per window.
pub struct FieldBatcher {
    inner: Arc<Inner>,
}

impl FieldBatcher {
    /// Create a batcher with the given window and flush callback
    pub fn new(window: Duration, on_flush: impl Fn(FormData) + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    batch: FormData::new(),
                    timer: TimerSlot::default(),
                }),
                window,
                on_flush: Box::new(on_flush),
            }),
        }
    }

    /// Add one field edit to the batch and (re)start the window timer
    pub fn batch_update(&self, name: impl Into<String>, value: FieldValue) {
        let mut state = self.inner.state.lock();
        state.batch.insert(name.into(), value);
        self.restart_window(&mut state);
    }

    /// Merge several field edits at once and (re)start the window timer
    pub fn batch_update_many(&self, updates: FormData) {
        let mut state = self.inner.state.lock();
        state.batch.extend(updates);
        self.restart_window(&mut state);
    }

    /// Deliver the merged batch now
    ///
    /// An empty batch is not delivered.
    pub fn flush(&self) {
        self.inner.flush();
    }

    /// Discard the batch without delivering it
    pub fn clear(&self) {
        let mut state = self.inner.state.lock();
        state.batch.clear();
        state.timer.cancel();
    }

    /// Whether edits are waiting for the window to elapse
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.inner.state.lock().batch.is_empty()
    }

    fn restart_window(&self, state: &mut State) {
        let weak = Arc::downgrade(&self.inner);
        let window = self.inner.window;
        state.timer.reschedule(tokio::spawn(flush_after(weak, window)));
    }
}

async fn flush_after(inner: Weak<Inner>, window: Duration) {
    tokio::time::sleep(window).await;
    if let Some(inner) = inner.upgrade() {
        inner.flush();
    }
}
