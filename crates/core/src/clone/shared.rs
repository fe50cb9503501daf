use super::{CloneResult, CloneStrategy, DeepCloner};

/// Hands out `value.clone()` without any isolation guarantee
///
/// For owned plain data this is already a deep copy. For `Arc<U>` or
/// anything holding interior-shared state, every caller sees the same
/// object: mutations through interior mutability become visible to all
/// readers and to the cache itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct SharedCloner;

impl<T> DeepCloner<T> for SharedCloner
where
    T: Clone,
{
    fn deep_clone(&self, value: &T) -> CloneResult<T> {
        Ok(value.clone())
    }

    fn strategy(&self) -> CloneStrategy {
        CloneStrategy::Shared
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_shared_arc_is_same_reference() {
        let value = Arc::new(vec![1, 2, 3]);

        let copy = SharedCloner.deep_clone(&value).expect("shared clone");

        assert!(Arc::ptr_eq(&value, &copy));
        assert_eq!(DeepCloner::<Arc<Vec<i32>>>::strategy(&SharedCloner), CloneStrategy::Shared);
    }
}
