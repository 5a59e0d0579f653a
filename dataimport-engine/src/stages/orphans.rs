//! Orphan discovery. Pure: nothing here mutates the model.

use super::{Dispatch, guarded};
use crate::error::{ImportFault, Stage};
use crate::handler::{ModifiableModel, OrphanSupplier};
use dataimport_types::ProjectData;
use tracing::debug;

/// A handler whose orphans are known how to compute but not yet computed.
pub(crate) struct PendingRemoval<'a, 'r, M: ModifiableModel> {
    pub dispatch: &'a Dispatch<'r, M>,
    pub supplier: OrphanSupplier<'a, M>,
}

/// Asks every dispatched handler, in registry order, for its orphan
/// supplier. A handler that fails here is left out of the removal stage.
pub(crate) fn run<'a, 'r, M: ModifiableModel>(
    dispatches: &'a [Dispatch<'r, M>],
    project: Option<&'a ProjectData>,
    model: &M,
    faults: &mut Vec<ImportFault>,
) -> Vec<PendingRemoval<'a, 'r, M>> {
    let mut pending = Vec::with_capacity(dispatches.len());
    for dispatch in dispatches {
        let entry = dispatch.entry;
        debug!(
            key = %entry.key(),
            handler = entry.name(),
            records = dispatch.batch.to_import.len(),
            "Computing orphan data"
        );

        let handler = entry.handler();
        let to_import = dispatch.batch.to_import.as_slice();
        match guarded(Stage::ComputeOrphans, entry, || {
            handler.compute_orphans(to_import, project, model)
        }) {
            Ok(supplier) => pending.push(PendingRemoval { dispatch, supplier }),
            Err(fault) => faults.push(fault),
        }
    }
    pending
}
