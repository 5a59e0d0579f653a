//! Import and post-processing.

use super::{Dispatch, guarded};
use crate::error::{ImportFault, Stage};
use crate::handler::ModifiableModel;
use crate::report::HandlerRun;
use dataimport_types::{Key, ProjectData};
use std::collections::HashSet;
use std::time::Instant;
use tracing::debug;

/// Order in which dispatches import: registry order, except that a key
/// waits until every key its records nest under has been imported.
///
/// Only keys imported in this call count as parents. The nearest such
/// ancestor of each record is used, skipping ancestors of the same key. If
/// the parent relation is cyclic, the first pending key in registry order
/// goes next.
pub(crate) fn import_order<M: ModifiableModel>(dispatches: &[Dispatch<'_, M>]) -> Vec<usize> {
    let importing: HashSet<&Key> = dispatches
        .iter()
        .filter(|d| !d.batch.to_import.is_empty())
        .map(|d| d.entry.key())
        .collect();

    let parents: Vec<HashSet<Key>> = dispatches
        .iter()
        .map(|d| {
            let own = d.entry.key();
            d.batch
                .to_import
                .iter()
                .filter_map(|record| {
                    let mut current = record.parent();
                    while let Some(ancestor) = current {
                        let key = ancestor.key();
                        if key != own && importing.contains(key) {
                            return Some(key.clone());
                        }
                        current = ancestor.parent();
                    }
                    None
                })
                .collect()
        })
        .collect();

    let mut remaining: Vec<usize> = (0..dispatches.len())
        .filter(|&i| !dispatches[i].batch.to_import.is_empty())
        .collect();
    let mut done: HashSet<&Key> = HashSet::new();
    let mut order = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        let next = remaining
            .iter()
            .position(|&i| parents[i].iter().all(|k| done.contains(k)))
            .unwrap_or(0);
        let index = remaining.remove(next);
        done.insert(dispatches[index].entry.key());
        order.push(index);
    }
    order
}

/// Imports every dispatch with records to import, then post-processes the
/// ones that succeeded in the same order.
///
/// The project context is withheld from the handler owning `project_key`.
pub(crate) fn run<M: ModifiableModel>(
    dispatches: &[Dispatch<'_, M>],
    project: Option<&ProjectData>,
    project_key: &Key,
    model: &mut M,
    faults: &mut Vec<ImportFault>,
) -> Vec<HandlerRun> {
    let mut runs = Vec::new();
    let mut succeeded = Vec::new();

    for index in import_order(dispatches) {
        let dispatch = &dispatches[index];
        let entry = dispatch.entry;
        let handler = entry.handler();
        let to_import = dispatch.batch.to_import.as_slice();
        let context = if entry.key() == project_key { None } else { project };

        let started = Instant::now();
        match guarded(Stage::ImportData, entry, || {
            handler.import_data(to_import, context, model)
        }) {
            Ok(()) => {
                let elapsed = started.elapsed();
                debug!(
                    key = %entry.key(),
                    handler = entry.name(),
                    records = to_import.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Imported data"
                );
                runs.push(HandlerRun {
                    key: entry.key().clone(),
                    handler: entry.name().to_string(),
                    count: to_import.len(),
                    elapsed,
                });
                succeeded.push((index, context));
            }
            Err(fault) => faults.push(fault),
        }
    }

    for (index, context) in succeeded {
        let dispatch = &dispatches[index];
        let handler = dispatch.entry.handler();
        if let Err(fault) = guarded(Stage::PostProcess, dispatch.entry, || {
            handler.post_process(&dispatch.batch.to_import, context, model)
        }) {
            faults.push(fault);
        }
    }
    runs
}
