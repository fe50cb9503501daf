//! Immutable cache snapshots and the cell that publishes them
//!
//! A [`CacheSlot`] is never modified after construction. Loads and
//! invalidations build a new slot and swap it into the [`SlotCell`] under a
//! short write lock, so a reader holding an `Arc<CacheSlot<T>>` always sees a
//! complete snapshot, and every reader after a publication sees that slot or
//! a later one.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

/// How long a slot may be served without reloading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Fresh while `now` is strictly before the instant
    FreshUntil(Instant),
    /// Must be reloaded by the next reader
    Expired,
    /// Fresh until another slot replaces it
    UntilReplaced,
}

impl Freshness {
    /// Whether a slot with this freshness may be served at `now`
    pub fn is_fresh_at(&self, now: Instant) -> bool {
        match self {
            Self::FreshUntil(deadline) => now < *deadline,
            Self::Expired => false,
            Self::UntilReplaced => true,
        }
    }
}

/// Snapshot of the cached value plus its freshness metadata
#[derive(Debug)]
pub struct CacheSlot<T> {
    value: Arc<T>,
    freshness: Freshness,
    retry_budget: Option<Duration>,
    loaded_at: Option<Instant>,
    generation: u64,
}

impl<T> CacheSlot<T> {
    /// The cached value
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Freshness recorded when the slot was published
    pub fn freshness(&self) -> Freshness {
        self.freshness
    }

    /// Gate timeout for the reader that finds this slot stale (`None` waits
    /// indefinitely)
    pub fn retry_budget(&self) -> Option<Duration> {
        self.retry_budget
    }

    /// When the value was loaded; `None` for the caller-supplied placeholder
    pub fn loaded_at(&self) -> Option<Instant> {
        self.loaded_at
    }

    /// Whether this slot still holds the construction-time placeholder
    pub fn is_placeholder(&self) -> bool {
        self.loaded_at.is_none()
    }

    /// Publication sequence number, strictly increasing per cell
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether this slot may be served at `now`
    pub fn is_fresh_at(&self, now: Instant) -> bool {
        self.freshness.is_fresh_at(now)
    }
}

/// Single current slot with atomic whole-snapshot replacement
#[derive(Debug)]
pub(crate) struct SlotCell<T> {
    current: RwLock<Arc<CacheSlot<T>>>,
}

impl<T> SlotCell<T> {
    /// Seed the cell with a placeholder at generation zero
    pub(crate) fn new(placeholder: T, freshness: Freshness, retry_budget: Option<Duration>) -> Self {
        let slot = CacheSlot {
            value: Arc::new(placeholder),
            freshness,
            retry_budget,
            loaded_at: None,
            generation: 0,
        };
        Self { current: RwLock::new(Arc::new(slot)) }
    }

    /// Current snapshot
    pub(crate) fn load(&self) -> Arc<CacheSlot<T>> {
        Arc::clone(&self.current.read())
    }

    /// Replace the current slot with a freshly loaded value
    pub(crate) fn publish(
        &self,
        value: T,
        freshness: Freshness,
        retry_budget: Option<Duration>,
        loaded_at: Instant,
    ) -> Arc<CacheSlot<T>> {
        let mut current = self.current.write();
        let slot = Arc::new(CacheSlot {
            value: Arc::new(value),
            freshness,
            retry_budget,
            loaded_at: Some(loaded_at),
            generation: current.generation + 1,
        });
        *current = Arc::clone(&slot);
        slot
    }

    /// Replace the current slot with an expired copy sharing the same value
    pub(crate) fn expire(&self) -> Arc<CacheSlot<T>> {
        let mut current = self.current.write();
        let slot = Arc::new(CacheSlot {
            value: Arc::clone(&current.value),
            freshness: Freshness::Expired,
            retry_budget: current.retry_budget,
            loaded_at: current.loaded_at,
            generation: current.generation + 1,
        });
        *current = Arc::clone(&slot);
        slot
    }
}
