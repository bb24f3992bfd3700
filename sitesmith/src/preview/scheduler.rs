//! Debounced, change-detected preview updates

use super::TimerSlot;
use crate::form::FormData;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::trace;

/// When a queued snapshot is handed to the update callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStrategy {
    /// Apply as soon as it is queued
    Immediate,
    /// Apply after a quiet period; re-queueing restarts the timer
    Debounced(Duration),
    /// Hold until [`PreviewScheduler::force_update`]
    Manual,
}

/// Observable scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Nothing pending
    Idle,
    /// A snapshot is stored and waiting
    PendingDebounce,
    /// The update callback is running
    Applying,
}

struct State {
    pending: Option<FormData>,
    last_applied: Option<FormData>,
    phase: SchedulerState,
    update_count: u64,
    timer: TimerSlot,
}

struct Inner {
    state: Mutex<State>,
    strategy: UpdateStrategy,
    on_update: Box<dyn Fn(&FormData) + Send + Sync>,
}

impl Inner {
    fn apply(&self) {
        let mut state = self.state.lock();
        let Some(snapshot) = state.pending.take() else {
            state.phase = SchedulerState::Idle;
            return;
        };

        state.phase = SchedulerState::Applying;
        (self.on_update)(&snapshot);
        state.last_applied = Some(snapshot);
        state.update_count += 1;
        state.phase = SchedulerState::Idle;
    }
}

/// Debounces form snapshots before they trigger a preview re-render
///
/// Queueing a snapshot that is structurally equal to the last applied
/// one is a no-op: re-entering a previously applied value must not
/// re-trigger work. The debounce timer is single-flight per scheduler.
///
/// The update callback must not call back into the scheduler.
pub struct PreviewScheduler {
    inner: Arc<Inner>,
}

impl PreviewScheduler {
    /// Create a scheduler with the given strategy and update callback
    pub fn new(
        strategy: UpdateStrategy,
        on_update: impl Fn(&FormData) + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    pending: None,
                    last_applied: None,
                    phase: SchedulerState::Idle,
                    update_count: 0,
                    timer: TimerSlot::default(),
                }),
                strategy,
                on_update: Box::new(on_update),
            }),
        }
    }

    /// Queue a snapshot for application
    ///
    /// Structurally unchanged snapshots are dropped; otherwise the
    /// snapshot becomes the single pending update and the strategy
    /// decides when it is applied.
    pub fn queue_update(&self, snapshot: FormData) {
        let inner = &self.inner;
        let mut state = inner.state.lock();

        if state.last_applied.as_ref() == Some(&snapshot) {
            trace!("snapshot unchanged since last apply, skipping");
            state.pending = None;
            state.timer.cancel();
            state.phase = SchedulerState::Idle;
            return;
        }

        state.pending = Some(snapshot);
        state.phase = SchedulerState::PendingDebounce;

        match inner.strategy {
            UpdateStrategy::Immediate => {
                drop(state);
                inner.apply();
            }
            UpdateStrategy::Debounced(delay) => {
                let weak = Arc::downgrade(inner);
                state.timer.reschedule(tokio::spawn(fire_after(weak, delay)));
            }
            UpdateStrategy::Manual => {}
        }
    }

    /// Cancel any pending timer and apply the pending snapshot now
    pub fn force_update(&self) {
        self.inner.state.lock().timer.cancel();
        self.inner.apply();
    }

    /// Discard the pending snapshot without applying it
    pub fn cancel_update(&self) {
        let mut state = self.inner.state.lock();
        state.timer.cancel();
        state.pending = None;
        state.phase = SchedulerState::Idle;
    }

    /// Cancel, then also forget the last applied snapshot and counter
    pub fn reset(&self) {
        let mut state = self.inner.state.lock();
        state.timer.cancel();
        state.pending = None;
        state.last_applied = None;
        state.update_count = 0;
        state.phase = SchedulerState::Idle;
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.inner.state.lock().phase
    }

    /// Whether a snapshot is stored and waiting
    #[must_use]
    pub fn has_pending_changes(&self) -> bool {
        self.inner.state.lock().pending.is_some()
    }

    /// How many snapshots have been applied
    #[must_use]
    pub fn update_count(&self) -> u64 {
        self.inner.state.lock().update_count
    }
}

async fn fire_after(inner: Weak<Inner>, delay: Duration) {
    tokio::time::sleep(delay).await;
    // a dropped scheduler must not fire its callback
    if let Some(inner) = inner.upgrade() {
        inner.apply();
    }
}
