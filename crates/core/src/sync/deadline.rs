use std::time::{Duration, Instant};

/// Absolute end of a bounded wait; unbounded when the timeout is `None` or
/// too large to represent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Deadline(Option<Instant>);

impl Deadline {
    pub(crate) fn after(timeout: Option<Duration>) -> Self {
        Self(timeout.and_then(|timeout| Instant::now().checked_add(timeout)))
    }

    pub(crate) fn instant(self) -> Option<Instant> {
        self.0
    }

    pub(crate) fn tokio_instant(self) -> Option<tokio::time::Instant> {
        self.0.map(tokio::time::Instant::from_std)
    }
}
