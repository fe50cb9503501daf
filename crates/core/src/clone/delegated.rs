use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use super::{CloneResult, CloneStrategy, DeepCloner};

/// A type that knows how to produce an independent copy of itself
///
/// Unlike `Clone`, implementations must not share any mutable sub-object with
/// the source. The container impls below recurse into their elements; the
/// `Arc` impl allocates a fresh `Arc` around a deep copy of the pointee.
pub trait DeepCopy: Sized {
    /// Produce a copy sharing nothing mutable with `self`
    fn deep_copy(&self) -> Self;
}

/// Delegates to the value's own [`DeepCopy`] implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct DelegatedCloner;

impl<T> DeepCloner<T> for DelegatedCloner
where
    T: DeepCopy,
{
    fn deep_clone(&self, value: &T) -> CloneResult<T> {
        Ok(value.deep_copy())
    }

    fn strategy(&self) -> CloneStrategy {
        CloneStrategy::Delegated
    }
}

macro_rules! deep_copy_by_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl DeepCopy for $ty {
                fn deep_copy(&self) -> Self {
                    *self
                }
            }
        )*
    };
}

deep_copy_by_value!(
    bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64,
    Duration, Instant, SystemTime,
);

impl DeepCopy for String {
    fn deep_copy(&self) -> Self {
        self.clone()
    }
}

impl<T: DeepCopy> DeepCopy for Option<T> {
    fn deep_copy(&self) -> Self {
        self.as_ref().map(DeepCopy::deep_copy)
    }
}

impl<T: DeepCopy> DeepCopy for Vec<T> {
    fn deep_copy(&self) -> Self {
        self.iter().map(DeepCopy::deep_copy).collect()
    }
}

impl<T: DeepCopy> DeepCopy for Box<T> {
    fn deep_copy(&self) -> Self {
        Box::new((**self).deep_copy())
    }
}

impl<T: DeepCopy> DeepCopy for Arc<T> {
    fn deep_copy(&self) -> Self {
        Arc::new((**self).deep_copy())
    }
}

impl<K, V> DeepCopy for HashMap<K, V>
where
    K: DeepCopy + Eq + Hash,
    V: DeepCopy,
{
    fn deep_copy(&self) -> Self {
        self.iter().map(|(k, v)| (k.deep_copy(), v.deep_copy())).collect()
    }
}

impl<K, V> DeepCopy for BTreeMap<K, V>
where
    K: DeepCopy + Ord,
    V: DeepCopy,
{
    fn deep_copy(&self) -> Self {
        self.iter().map(|(k, v)| (k.deep_copy(), v.deep_copy())).collect()
    }
}
