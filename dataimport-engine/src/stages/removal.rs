//! Orphan removal, one handler at a time in registry order.

use super::guarded;
use super::orphans::PendingRemoval;
use crate::error::{ImportFault, Stage};
use crate::handler::ModifiableModel;
use crate::report::HandlerRun;
use dataimport_types::ProjectData;
use std::time::Instant;
use tracing::debug;

/// Materializes each pending supplier right before its handler's removal,
/// so removal of one handler always completes before the next begins.
pub(crate) fn run<M: ModifiableModel>(
    pending: Vec<PendingRemoval<'_, '_, M>>,
    project: Option<&ProjectData>,
    model: &mut M,
    faults: &mut Vec<ImportFault>,
) -> Vec<HandlerRun> {
    let mut runs = Vec::with_capacity(pending.len());
    for PendingRemoval { dispatch, supplier } in pending {
        let entry = dispatch.entry;
        let handler = entry.handler();
        let started = Instant::now();

        let orphans = match guarded(Stage::ComputeOrphans, entry, || supplier(&*model)) {
            Ok(orphans) => orphans,
            Err(fault) => {
                faults.push(fault);
                continue;
            }
        };
        let count = orphans.len();
        let to_ignore = dispatch.batch.to_ignore();

        match guarded(Stage::RemoveData, entry, || {
            handler.remove_data(orphans, &to_ignore, project, model)
        }) {
            Ok(()) => {
                let elapsed = started.elapsed();
                debug!(
                    key = %entry.key(),
                    handler = entry.name(),
                    orphans = count,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Removed orphan data"
                );
                runs.push(HandlerRun {
                    key: entry.key().clone(),
                    handler: entry.name().to_string(),
                    count,
                    elapsed,
                });
            }
            Err(fault) => faults.push(fault),
        }
    }
    runs
}
