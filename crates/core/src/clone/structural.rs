use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{CloneResult, CloneStrategy, DeepCloner};
use crate::error::CloneError;

/// Deep copy through a `serde` round trip
///
/// The value is serialized into an intermediate `serde_json::Value` tree and
/// deserialized back, so the result shares no allocation with the source.
/// Graphs that cannot make the trip (maps with non-string keys, fields whose
/// `Serialize` impl refuses, such as handles to OS resources) fail at clone
/// time rather than being silently truncated.
///
/// A JSON tree cannot tell `Some(None)` from `None`, so every copy is
/// compared with its source and a mismatch is reported as
/// [`CloneError::Lossy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralCloner;

impl StructuralCloner {
    fn incompatible<T>(source: serde_json::Error) -> CloneError {
        CloneError::Incompatible { type_name: std::any::type_name::<T>(), source }
    }
}

impl<T> DeepCloner<T> for StructuralCloner
where
    T: Serialize + DeserializeOwned + PartialEq,
{
    fn deep_clone(&self, value: &T) -> CloneResult<T> {
        let tree = serde_json::to_value(value).map_err(Self::incompatible::<T>)?;
        let copy: T = serde_json::from_value(tree).map_err(Self::incompatible::<T>)?;
        if copy != *value {
            return Err(CloneError::Lossy { type_name: std::any::type_name::<T>() });
        }
        Ok(copy)
    }

    fn strategy(&self) -> CloneStrategy {
        CloneStrategy::Structural
    }
}
