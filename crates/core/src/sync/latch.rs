use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tokio::sync::Notify;

use super::Deadline;

/// How a latch wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchOutcome {
    /// The latch was opened
    Opened,
    /// The timeout elapsed first
    TimedOut,
    /// The latch was closed without ever opening
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LatchState {
    Pending,
    Open,
    Closed,
}

/// One-shot signal marking the first successful load of a push cache
///
/// A pending latch settles exactly once, either opened (a value is
/// available) or closed (the cache was disposed first). Later calls to
/// `open`/`close` are ignored.
#[derive(Debug)]
pub struct InitLatch {
    state: Mutex<LatchState>,
    changed: Condvar,
    notify: Notify,
}

impl Default for InitLatch {
    fn default() -> Self {
        Self { state: Mutex::new(LatchState::Pending), changed: Condvar::new(), notify: Notify::new() }
    }
}

impl InitLatch {
    /// Create a pending latch
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a pending latch; returns whether this call opened it
    pub fn open(&self) -> bool {
        self.settle(LatchState::Open)
    }

    /// Close a pending latch; returns whether this call closed it
    pub fn close(&self) -> bool {
        self.settle(LatchState::Closed)
    }

    /// Whether the latch has been opened
    pub fn is_open(&self) -> bool {
        *self.state.lock() == LatchState::Open
    }

    fn settle(&self, to: LatchState) -> bool {
        {
            let mut state = self.state.lock();
            if *state != LatchState::Pending {
                return false;
            }
            *state = to;
        }
        self.changed.notify_all();
        self.notify.notify_waiters();
        true
    }

    fn outcome(state: LatchState) -> Option<LatchOutcome> {
        match state {
            LatchState::Pending => None,
            LatchState::Open => Some(LatchOutcome::Opened),
            LatchState::Closed => Some(LatchOutcome::Closed),
        }
    }

    /// Block the calling thread until the latch settles or `timeout` elapses
    ///
    /// `None` waits indefinitely.
    pub fn wait_blocking(&self, timeout: Option<Duration>) -> LatchOutcome {
        let deadline = Deadline::after(timeout);
        let mut state = self.state.lock();
        loop {
            if let Some(outcome) = Self::outcome(*state) {
                return outcome;
            }
            match deadline.instant() {
                Some(at) => {
                    if self.changed.wait_until(&mut state, at).timed_out() {
                        return Self::outcome(*state).unwrap_or(LatchOutcome::TimedOut);
                    }
                }
                None => self.changed.wait(&mut state),
            }
        }
    }

    /// Suspend until the latch settles or `timeout` elapses
    pub async fn wait(&self, timeout: Option<Duration>) -> LatchOutcome {
        let settled = async {
            loop {
                let notified = self.notify.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();
                let state = *self.state.lock();
                if let Some(outcome) = Self::outcome(state) {
                    return outcome;
                }
                notified.await;
            }
        };

        match Deadline::after(timeout).tokio_instant() {
            Some(at) => tokio::time::timeout_at(at, settled).await.unwrap_or(LatchOutcome::TimedOut),
            None => settled.await,
        }
    }
}
