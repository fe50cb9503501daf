use super::{CloneResult, CloneStrategy, DeepCloner};

/// Adapts a cloner for `Option<T>`, passing `None` through untouched
///
/// The inner strategy is never invoked for an absent value, which matters
/// for strategies that cannot represent absence on their own.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionalCloner<C> {
    inner: C,
}

impl<C> OptionalCloner<C> {
    /// Wrap `inner`
    pub const fn new(inner: C) -> Self {
        Self { inner }
    }
}

impl<T, C> DeepCloner<Option<T>> for OptionalCloner<C>
where
    C: DeepCloner<T>,
{
    fn deep_clone(&self, value: &Option<T>) -> CloneResult<Option<T>> {
        match value {
            None => Ok(None),
            Some(inner) => self.inner.deep_clone(inner).map(Some),
        }
    }

    fn strategy(&self) -> CloneStrategy {
        DeepCloner::<T>::strategy(&self.inner)
    }
}
