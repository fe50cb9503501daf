//! Copy isolation for values handed out by the caches
//!
//! Every read returns `cloner.deep_clone(&current)`, so a caller can mutate
//! its result without disturbing the cached copy or anyone else's. The
//! strategy is fixed when the cache is built:
//!
//! - [`SharedCloner`]: plain `Clone`. For `Arc`-wrapped or otherwise shared
//!   values every caller gets the same underlying object. Only safe for
//!   immutable data or single-threaded use.
//! - [`StructuralCloner`]: serialize the value graph and rebuild it with
//!   `serde`. Fails per call with [`CloneError::Incompatible`] when the graph
//!   cannot be serialized and with [`CloneError::Lossy`] when the rebuilt
//!   value differs from the source.
//! - [`DelegatedCloner`]: the type copies itself through [`DeepCopy`]. The
//!   capability is a trait bound, so a type without it cannot be used to
//!   build a cache at all.
//!
//! [`OptionalCloner`] wraps any of them so that `None` is returned as-is
//! without calling into the inner strategy.

mod delegated;
mod optional;
mod shared;
mod structural;

use std::fmt;

pub use delegated::{DeepCopy, DelegatedCloner};
pub use optional::OptionalCloner;
pub use shared::SharedCloner;
pub use structural::StructuralCloner;

use crate::error::CloneError;

/// Result of a single clone operation
pub type CloneResult<T> = Result<T, CloneError>;

/// Strategy families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloneStrategy {
    /// No isolation; returns shallow clones
    Shared,
    /// Serialization round trip
    Structural,
    /// The value's own [`DeepCopy`] implementation
    Delegated,
}

impl fmt::Display for CloneStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shared => write!(f, "shared"),
            Self::Structural => write!(f, "structural"),
            Self::Delegated => write!(f, "delegated"),
        }
    }
}

/// Produces an independent copy of a cached value
///
/// Implementations are stateless and shared across threads.
pub trait DeepCloner<T>: Send + Sync {
    /// Copy `value`
    ///
    /// # Errors
    /// Returns [`CloneError`] when the value cannot be copied with this
    /// strategy.
    fn deep_clone(&self, value: &T) -> CloneResult<T>;

    /// Which strategy family this cloner belongs to
    fn strategy(&self) -> CloneStrategy;

    /// Wrap this cloner so `None` short-circuits
    fn optional(self) -> OptionalCloner<Self>
    where
        Self: Sized,
    {
        OptionalCloner::new(self)
    }
}

impl<T, C> DeepCloner<T> for std::sync::Arc<C>
where
    C: DeepCloner<T> + ?Sized,
{
    fn deep_clone(&self, value: &T) -> CloneResult<T> {
        (**self).deep_clone(value)
    }

    fn strategy(&self) -> CloneStrategy {
        (**self).strategy()
    }
}
