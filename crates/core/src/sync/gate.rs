use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tokio::sync::Notify;

use super::Deadline;

/// Timeout-bounded mutual exclusion for the reload critical section
///
/// At most one [`GatePermit`] exists at a time. Waiters give up after their
/// timeout instead of queueing behind a slow load; the permit is released
/// when dropped, including during unwinding.
#[derive(Debug, Default)]
pub struct SingleFlightGate {
    held: Mutex<bool>,
    released: Condvar,
    notify: Notify,
}

/// Proof of holding the gate; releases it on drop
#[derive(Debug)]
#[must_use = "the gate is released as soon as the permit is dropped"]
pub struct GatePermit<'a> {
    gate: &'a SingleFlightGate,
}

impl SingleFlightGate {
    /// Create an open gate
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the gate if nobody holds it
    pub fn try_acquire(&self) -> Option<GatePermit<'_>> {
        let mut held = self.held.lock();
        if *held {
            return None;
        }
        *held = true;
        Some(GatePermit { gate: self })
    }

    /// Block the calling thread until the gate is free or `timeout` elapses
    ///
    /// `None` waits indefinitely.
    pub fn acquire_blocking(&self, timeout: Option<Duration>) -> Option<GatePermit<'_>> {
        let deadline = Deadline::after(timeout);
        let mut held = self.held.lock();
        while *held {
            match deadline.instant() {
                Some(at) => {
                    if self.released.wait_until(&mut held, at).timed_out() && *held {
                        return None;
                    }
                }
                None => self.released.wait(&mut held),
            }
        }
        *held = true;
        Some(GatePermit { gate: self })
    }

    /// Suspend until the gate is free or `timeout` elapses
    ///
    /// `None` waits indefinitely. Dropping the future abandons the wait
    /// without taking the gate.
    pub async fn acquire(&self, timeout: Option<Duration>) -> Option<GatePermit<'_>> {
        let wait = async {
            loop {
                let notified = self.notify.notified();
                tokio::pin!(notified);
                // Register before checking so a release in between is not missed.
                notified.as_mut().enable();
                if let Some(permit) = self.try_acquire() {
                    return permit;
                }
                notified.await;
            }
        };

        match Deadline::after(timeout).tokio_instant() {
            Some(at) => tokio::time::timeout_at(at, wait).await.ok(),
            None => Some(wait.await),
        }
    }

    /// Whether some caller currently holds the gate
    pub fn is_held(&self) -> bool {
        *self.held.lock()
    }

    fn release(&self) {
        *self.held.lock() = false;
        self.released.notify_one();
        self.notify.notify_waiters();
    }
}

impl Drop for GatePermit<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for sync::gate.
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    use super::*;

    /// Validates `SingleFlightGate::try_acquire` behavior for the permit
    /// drop scenario.
    ///
    /// Assertions:
    /// - Ensures a second acquisition fails while the permit lives.
    /// - Ensures the gate is free again once the permit is dropped.
    #[test]
    fn test_permit_releases_on_drop() {
        let gate = SingleFlightGate::new();

        let permit = gate.try_acquire();
        assert!(permit.is_some());
        assert!(gate.try_acquire().is_none());

        drop(permit);
        assert!(!gate.is_held());
        assert!(gate.try_acquire().is_some());
    }

    /// Validates `SingleFlightGate::acquire_blocking` behavior for the
    /// bounded wait scenario.
    ///
    /// Assertions:
    /// - Ensures the waiter gives up after roughly its timeout.
    #[test]
    fn test_blocking_acquire_times_out() {
        let gate = SingleFlightGate::new();
        let _held = gate.try_acquire();

        let started = Instant::now();
        let permit = gate.acquire_blocking(Some(Duration::from_millis(50)));

        assert!(permit.is_none());
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    /// Validates `SingleFlightGate::acquire_blocking` behavior when the
    /// holder releases during the wait.
    ///
    /// Assertions:
    /// - Ensures the waiting thread obtains the gate.
    #[test]
    fn test_blocking_waiter_wakes_on_release() {
        let gate = Arc::new(SingleFlightGate::new());
        let (acquired_tx, acquired_rx) = std::sync::mpsc::channel();
        let holder = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || {
                let _permit = gate.try_acquire().expect("gate starts free");
                acquired_tx.send(()).expect("receiver alive");
                thread::sleep(Duration::from_millis(30));
            })
        };
        acquired_rx.recv().expect("holder acquired the gate");
        assert!(gate.is_held());

        let permit = gate.acquire_blocking(None);

        assert!(permit.is_some());
        holder.join().expect("holder panicked");
    }

    /// Validates mutual exclusion across threads.
    ///
    /// Assertions:
    /// - Confirms no two threads are ever inside the critical section.
    #[test]
    fn test_mutual_exclusion() {
        let gate = Arc::new(SingleFlightGate::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let (gate, inside, max_inside) =
                    (Arc::clone(&gate), Arc::clone(&inside), Arc::clone(&max_inside));
                thread::spawn(move || {
                    for _ in 0..50 {
                        let _permit = gate.acquire_blocking(None).expect("unbounded wait");
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_inside.fetch_max(now, Ordering::SeqCst);
                        inside.fetch_sub(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().expect("worker panicked");
        }
        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    }

    /// Validates `SingleFlightGate::acquire` behavior for async waiters.
    ///
    /// Assertions:
    /// - Ensures a timed-out async waiter gets `None`.
    /// - Ensures an async waiter is woken by a release.
    #[tokio::test(flavor = "multi_thread")]
    async fn test_async_acquire() {
        let gate = Arc::new(SingleFlightGate::new());
        let permit = gate.try_acquire().expect("gate starts free");

        assert!(gate.acquire(Some(Duration::from_millis(20))).await.is_none());

        let waiter = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.acquire(Some(Duration::from_secs(5))).await.is_some() })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(permit);

        assert!(waiter.await.expect("waiter panicked"));
    }

    /// Validates release on unwinding.
    ///
    /// Assertions:
    /// - Ensures a panic inside the critical section frees the gate.
    #[test]
    fn test_release_on_panic() {
        let gate = SingleFlightGate::new();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _permit = gate.try_acquire().expect("gate starts free");
            panic!("loader blew up");
        }));

        assert!(result.is_err());
        assert!(!gate.is_held());
    }
}
