//! Shared test helpers for `itemcache` integration tests.
//!
//! Fixtures cover the value shapes the clone strategies care about (nested
//! owned children, shared `Arc` children, timestamps) plus loaders and an
//! error sink that record what the caches did.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use itemcache::{BoxedError, DeepCopy, LoadError, LoadErrorSink, LoadResult};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Child object nested inside [`CacheableObject`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub label: String,
    pub weights: Vec<u32>,
}

impl DeepCopy for Child {
    fn deep_copy(&self) -> Self {
        Self { label: self.label.deep_copy(), weights: self.weights.deep_copy() }
    }
}

/// Value with a nested graph and a creation timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheableObject {
    pub value: u32,
    pub created_at: SystemTime,
    pub child: Arc<Child>,
}

impl CacheableObject {
    pub fn new(value: u32) -> Self {
        Self {
            value,
            created_at: SystemTime::now(),
            child: Arc::new(Child { label: format!("child-{}", value), weights: vec![value, 1] }),
        }
    }

    /// Whether `other` shares no heap allocation with `self`
    pub fn shares_nothing_with(&self, other: &Self) -> bool {
        !std::ptr::eq(self, other)
            && !Arc::ptr_eq(&self.child, &other.child)
            && self.child.weights.as_ptr() != other.child.weights.as_ptr()
    }
}

impl DeepCopy for CacheableObject {
    fn deep_copy(&self) -> Self {
        Self {
            value: self.value,
            created_at: self.created_at.deep_copy(),
            child: self.child.deep_copy(),
        }
    }
}

/// Counter returning 125, 150, 175, ... on successive loads
#[derive(Debug, Clone, Default)]
pub struct CounterSource {
    calls: Arc<AtomicU32>,
}

impl CounterSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> u32 {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        100 + 25 * n
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Blocking loader closure over this counter
    pub fn blocking(&self) -> impl Fn(&CancellationToken) -> LoadResult<u32> + Send + Sync + 'static {
        let source = self.clone();
        move |_cancel: &CancellationToken| Ok(source.next())
    }

    /// Blocking loader that sleeps for `delay` before counting
    pub fn blocking_slow(
        &self,
        delay: Duration,
    ) -> impl Fn(&CancellationToken) -> LoadResult<u32> + Send + Sync + 'static {
        let source = self.clone();
        move |_cancel: &CancellationToken| {
            std::thread::sleep(delay);
            Ok(source.next())
        }
    }
}

/// Error sink that keeps every report
#[derive(Debug, Default)]
pub struct RecordingSink {
    reports: Mutex<Vec<(String, String, String)>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(&self) -> usize {
        self.reports.lock().len()
    }

    /// `(cache, error, context)` of every report so far
    pub fn reports(&self) -> Vec<(String, String, String)> {
        self.reports.lock().clone()
    }
}

impl LoadErrorSink for RecordingSink {
    fn load_failed(&self, cache: &str, error: &LoadError, context: &str) {
        self.reports.lock().push((cache.to_string(), error.to_string(), context.to_string()));
    }
}

pub fn failure(message: &str) -> BoxedError {
    BoxedError::from(message.to_string())
}
