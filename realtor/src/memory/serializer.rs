//! State encoding for durable checkpointers.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::memory::CheckpointError;

/// Encodes and decodes checkpoint state.
pub trait Serializer<S>: Send + Sync {
    fn serialize(&self, state: &S) -> Result<Vec<u8>, CheckpointError>;
    fn deserialize(&self, bytes: &[u8]) -> Result<S, CheckpointError>;
}

/// JSON encoding via serde_json.
pub struct JsonSerializer<S> {
    _marker: PhantomData<fn() -> S>,
}

impl<S> JsonSerializer<S> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<S> Default for JsonSerializer<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Serializer<S> for JsonSerializer<S>
where
    S: Serialize + DeserializeOwned,
{
    fn serialize(&self, state: &S) -> Result<Vec<u8>, CheckpointError> {
        serde_json::to_vec(state).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<S, CheckpointError> {
        serde_json::from_slice(bytes).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_payload_is_a_serialization_error() {
        let s = JsonSerializer::<Vec<String>>::new();
        assert!(matches!(
            s.deserialize(b"{not json"),
            Err(CheckpointError::Serialization(_))
        ));
    }
}
