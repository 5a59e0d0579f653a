use dataimport_types::{Key, keys};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Configuration for the import engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Key of the record whose payload is the project data context.
    pub project_key: Key,
    /// Batches with more records than this are deserialized on worker
    /// threads. Only applies to non-synchronous imports.
    pub parallel_threshold: usize,
    /// Worker threads used for parallel deserialization.
    pub deserialize_workers: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            project_key: keys::PROJECT,
            parallel_threshold: 64,
            deserialize_workers: std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
        }
    }
}

impl ImportConfig {
    /// Number of deserialization workers to use for a batch of `records`.
    pub(crate) fn workers_for(&self, records: usize, synchronous: bool) -> usize {
        if synchronous || records <= self.parallel_threshold {
            1
        } else {
            self.deserialize_workers.clamp(1, records.max(1))
        }
    }
}
