use crate::error::{RecordError, RecordResult};
use dataimport_types::Key;

/// Turns a record's serialized payload into prepared data.
///
/// The engine holds one decoder for a whole import call and hands it to
/// every record. Implementations must be shareable across the worker
/// threads used for parallel deserialization.
pub trait PayloadDecoder: Send + Sync {
    fn decode(&self, key: &Key, raw: &[u8]) -> RecordResult<serde_json::Value>;
}

/// Decodes payloads serialized as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPayloadDecoder;

impl PayloadDecoder for JsonPayloadDecoder {
    fn decode(&self, key: &Key, raw: &[u8]) -> RecordResult<serde_json::Value> {
        serde_json::from_slice(raw).map_err(|e| RecordError::Decode {
            key: key.clone(),
            message: e.to_string(),
        })
    }
}
