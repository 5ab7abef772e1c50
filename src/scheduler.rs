// Copyright 2026 Daniel Pelikan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Delayed event delivery behind an injectable clock.
//!
//! Everything time-based in the application (demo connect, connect delay,
//! auto-replies) goes through [`Scheduler`]. Production uses
//! [`TokioScheduler`]; tests drive [`ManualScheduler`] in virtual time.

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::debug;

use crate::events::AppEvent;

/// Source of time and delayed events.
pub trait Scheduler: Send + Sync {
    /// Current wall-clock time as seen by this scheduler.
    fn now(&self) -> DateTime<Local>;

    /// Deliver `event` to the event loop after `delay`.
    ///
    /// The returned handle owns the task: dropping it cancels delivery.
    fn schedule(&self, delay: Duration, event: AppEvent) -> TaskHandle;
}

/// Handle to a scheduled event.
#[derive(Debug)]
pub struct TaskHandle {
    cancelled: Arc<AtomicBool>,
    abort: Option<AbortHandle>,
}

impl TaskHandle {
    fn new(cancelled: Arc<AtomicBool>, abort: Option<AbortHandle>) -> Self {
        Self { cancelled, abort }
    }

    /// Cancel delivery. Has no effect once the event was delivered.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(abort) = &self.abort {
            abort.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Scheduler backed by the tokio timer wheel.
pub struct TokioScheduler {
    events: mpsc::UnboundedSender<AppEvent>,
    runtime: Handle,
}

impl TokioScheduler {
    /// Create a scheduler on the current runtime.
    ///
    /// Must be called from within a tokio runtime context.
    pub fn new(events: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            events,
            runtime: Handle::current(),
        }
    }
}

impl Scheduler for TokioScheduler {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn schedule(&self, delay: Duration, event: AppEvent) -> TaskHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();
        let events = self.events.clone();

        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            // The abort may race with the wake-up; the flag closes the gap.
            if flag.load(Ordering::SeqCst) {
                return;
            }
            if let Err(e) = events.send(event) {
                debug!("Event loop closed, dropping scheduled event: {:?}", e.0);
            }
        });

        TaskHandle::new(cancelled, Some(task.abort_handle()))
    }
}

struct PendingTask {
    due: Duration,
    seq: u64,
    event: AppEvent,
    cancelled: Arc<AtomicBool>,
}

struct ManualState {
    origin: DateTime<Local>,
    elapsed: Duration,
    next_seq: u64,
    pending: Vec<PendingTask>,
}

/// Virtual-time scheduler.
///
/// Nothing fires on its own; [`ManualScheduler::advance`] moves the clock
/// forward and hands back every event that came due, in due-time order
/// (ties broken by scheduling order).
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::starting_at(Local::now())
    }

    /// Create a scheduler whose clock starts at `origin`.
    pub fn starting_at(origin: DateTime<Local>) -> Self {
        Self {
            state: Mutex::new(ManualState {
                origin,
                elapsed: Duration::ZERO,
                next_seq: 0,
                pending: Vec::new(),
            }),
        }
    }

    /// Virtual time elapsed since creation.
    pub fn elapsed(&self) -> Duration {
        self.state.lock().elapsed
    }

    /// Number of scheduled events that are neither delivered nor cancelled.
    pub fn pending_count(&self) -> usize {
        self.state
            .lock()
            .pending
            .iter()
            .filter(|task| !task.cancelled.load(Ordering::SeqCst))
            .count()
    }

    /// Advance the clock by `by` and return the events that came due.
    pub fn advance(&self, by: Duration) -> Vec<AppEvent> {
        let mut state = self.state.lock();
        state.elapsed += by;
        let now = state.elapsed;

        let (mut due, rest): (Vec<_>, Vec<_>) = state
            .pending
            .drain(..)
            .filter(|task| !task.cancelled.load(Ordering::SeqCst))
            .partition(|task| task.due <= now);
        state.pending = rest;

        due.sort_by_key(|task| (task.due, task.seq));
        due.into_iter().map(|task| task.event).collect()
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> DateTime<Local> {
        let state = self.state.lock();
        let offset = chrono::Duration::from_std(state.elapsed).unwrap_or(chrono::Duration::zero());
        state.origin + offset
    }

    fn schedule(&self, delay: Duration, event: AppEvent) -> TaskHandle {
        let mut state = self.state.lock();
        let cancelled = Arc::new(AtomicBool::new(false));
        let seq = state.next_seq;
        state.next_seq += 1;
        let due = state.elapsed + delay;
        state.pending.push(PendingTask {
            due,
            seq,
            event,
            cancelled: cancelled.clone(),
        });
        TaskHandle::new(cancelled, None)
    }
}
