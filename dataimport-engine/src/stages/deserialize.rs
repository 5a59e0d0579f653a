//! Payload preparation for every record of the tree.

use crate::error::ImportFault;
use dataimport_record::{PayloadDecoder, Record};
use std::sync::Arc;
use tracing::{debug, warn};

/// Prepares one record, attributing any failure to it alone.
pub(crate) fn prepare(record: &Record, decoder: &dyn PayloadDecoder) -> Result<(), ImportFault> {
    record
        .ensure_deserialized(decoder)
        .map(|_| ())
        .map_err(|e| ImportFault::from_record(record.id(), e))
}

/// Prepares `records` (pre-order) and returns the ones that are ready, in
/// the same order, together with the faults of the ones that are not.
///
/// With more than one worker, records are split into contiguous chunks
/// prepared on scoped threads; all of them are joined before returning.
pub(crate) fn run(
    records: &[Arc<Record>],
    decoder: &dyn PayloadDecoder,
    workers: usize,
) -> (Vec<Arc<Record>>, Vec<ImportFault>) {
    let outcomes: Vec<Result<(), ImportFault>> = if workers <= 1 {
        records.iter().map(|r| prepare(r, decoder)).collect()
    } else {
        debug!(records = records.len(), workers, "Preparing records in parallel");
        let chunk_size = records.len().div_ceil(workers);
        std::thread::scope(|s| {
            let handles: Vec<_> = records
                .chunks(chunk_size)
                .map(|chunk| {
                    let handle = s.spawn(move || {
                        chunk
                            .iter()
                            .map(|r| prepare(r, decoder))
                            .collect::<Vec<_>>()
                    });
                    (chunk, handle)
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|(chunk, handle)| {
                    handle.join().unwrap_or_else(|_| {
                        chunk
                            .iter()
                            .map(|r| {
                                Err(ImportFault::Integrity {
                                    record: Some(r.id()),
                                    key: r.key().clone(),
                                    detail: "preparation worker panicked".to_string(),
                                })
                            })
                            .collect()
                    })
                })
                .collect()
        })
    };

    let mut ready = Vec::with_capacity(records.len());
    let mut faults = Vec::new();
    for (record, outcome) in records.iter().zip(outcomes) {
        match outcome {
            Ok(()) => ready.push(Arc::clone(record)),
            Err(fault) => {
                warn!(record = %record.id(), key = %record.key(), "Excluding record from import: {fault}");
                faults.push(fault);
            }
        }
    }
    (ready, faults)
}
