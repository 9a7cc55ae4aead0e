//! Timer scheduling for the controllers
//!
//! Controllers never sleep. They ask a [`Scheduler`] to deliver a [`Timer`]
//! after a delay, and whoever drives the [`crate::app::App`] hands fired
//! timers back through `App::on_timer`. Two implementations exist:
//!
//! - [`TokioScheduler`]: spawns a sleeping task per timer and delivers
//!   `(TimerId, Timer)` pairs on an unbounded channel
//! - [`ManualScheduler`]: records timers so tests decide when they fire
//!
//! A timer that was cancelled can still be observed by the driver if it
//! fired concurrently; [`Scheduler::fired`] reports whether a delivery is
//! still live so stale ones are dropped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Identifier of a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// What a timer means when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    /// Automatic session creation retry
    SessionRetry {
        /// 1-based retry number
        attempt: u32,
    },
    /// Periodic favorites refresh
    FavoritesPoll,
    /// Restart the session after an unknown chat id was dropped
    InvalidSessionReload,
}

/// Source of delayed timer deliveries
pub trait Scheduler: Send + std::fmt::Debug {
    /// Deliver `timer` after `delay`
    fn schedule(&mut self, delay: Duration, timer: Timer) -> TimerId;

    /// Cancel a pending timer; unknown ids are ignored
    fn cancel(&mut self, id: TimerId);

    /// Cancel every pending timer
    fn cancel_all(&mut self);

    /// Acknowledge a delivery; returns false when the timer was cancelled
    fn fired(&mut self, id: TimerId) -> bool;
}

/// Tokio-backed scheduler used by the terminal driver
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use pokegpt::scheduler::{Scheduler, Timer, TokioScheduler};
///
/// # #[tokio::main]
/// # async fn main() {
/// let (mut scheduler, mut fired) = TokioScheduler::new();
/// let id = scheduler.schedule(Duration::from_millis(1), Timer::FavoritesPoll);
/// let (got, timer) = fired.recv().await.unwrap();
/// assert_eq!(got, id);
/// assert_eq!(timer, Timer::FavoritesPoll);
/// assert!(scheduler.fired(id));
/// # }
/// ```
#[derive(Debug)]
pub struct TokioScheduler {
    next_id: u64,
    pending: HashMap<TimerId, JoinHandle<()>>,
    tx: mpsc::UnboundedSender<(TimerId, Timer)>,
}

impl TokioScheduler {
    /// Create a scheduler and the receiver fired timers arrive on
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(TimerId, Timer)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                next_id: 0,
                pending: HashMap::new(),
                tx,
            },
            rx,
        )
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, delay: Duration, timer: Timer) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the driver shut down.
            let _ = tx.send((id, timer));
        });
        self.pending.insert(id, handle);
        tracing::debug!("Scheduled {:?} as {:?} in {:?}", timer, id, delay);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(handle) = self.pending.remove(&id) {
            handle.abort();
            tracing::debug!("Cancelled {:?}", id);
        }
    }

    fn cancel_all(&mut self) {
        for (_, handle) in self.pending.drain() {
            handle.abort();
        }
    }

    fn fired(&mut self, id: TimerId) -> bool {
        self.pending.remove(&id).is_some()
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// A timer recorded by [`ManualScheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTimer {
    /// Timer identifier
    pub id: TimerId,
    /// Requested delay
    pub delay: Duration,
    /// Timer payload
    pub timer: Timer,
}

/// Deterministic scheduler for tests
///
/// Cloning shares the underlying record, so a test can keep a handle while
/// the application owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    inner: Arc<Mutex<ManualState>>,
}

#[derive(Debug, Default)]
struct ManualState {
    next_id: u64,
    pending: Vec<ScheduledTimer>,
}

impl ManualScheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Timers scheduled and not yet fired or cancelled, in scheduling order
    pub fn pending(&self) -> Vec<ScheduledTimer> {
        self.lock().pending.clone()
    }

    /// First pending timer matching `predicate`
    pub fn find(&self, predicate: impl Fn(&Timer) -> bool) -> Option<ScheduledTimer> {
        self.lock()
            .pending
            .iter()
            .find(|scheduled| predicate(&scheduled.timer))
            .copied()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration, timer: Timer) -> TimerId {
        let mut state = self.lock();
        state.next_id += 1;
        let id = TimerId(state.next_id);
        state.pending.push(ScheduledTimer { id, delay, timer });
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.lock().pending.retain(|scheduled| scheduled.id != id);
    }

    fn cancel_all(&mut self) {
        self.lock().pending.clear();
    }

    fn fired(&mut self, id: TimerId) -> bool {
        let mut state = self.lock();
        let before = state.pending.len();
        state.pending.retain(|scheduled| scheduled.id != id);
        state.pending.len() != before
    }
}
