//! The four phases of an import call.
//!
//! 1. [`deserialize`]: prepare every record payload, isolating failures.
//! 2. [`orphans`]: per key, discover stale model entries (no mutation).
//! 3. [`removal`]: per key, remove the discovered orphans.
//! 4. [`import`]: per key, create or update model entries, then post-process.
//!
//! Stages 2 to 4 walk the same dispatch list, built once from the registry
//! order.

pub(crate) mod deserialize;
pub(crate) mod import;
pub(crate) mod orphans;
pub(crate) mod removal;

use crate::error::{ImportFault, Stage};
use crate::handler::{HandlerResult, ModifiableModel};
use crate::registry::{HandlerEntry, HandlerRegistry};
use dataimport_record::Record;
use dataimport_types::Key;
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::debug;

/// The prepared records of one key, split by the ignored flag.
pub(crate) struct KeyBatch {
    pub to_import: Vec<Arc<Record>>,
    pub ignored: Vec<Arc<Record>>,
}

impl KeyBatch {
    fn split(records: Vec<Arc<Record>>) -> Self {
        let (ignored, to_import) = records.into_iter().partition(|r| r.is_ignored());
        Self { to_import, ignored }
    }

    /// Records whose model entries must not be removed as orphans.
    pub fn to_ignore(&self) -> Vec<Arc<Record>> {
        self.to_import.iter().chain(&self.ignored).cloned().collect()
    }
}

/// A handler paired with the records it will receive.
pub(crate) struct Dispatch<'r, M: ModifiableModel> {
    pub entry: &'r HandlerEntry<M>,
    pub batch: KeyBatch,
}

/// Pairs handlers with their record groups, in registry order.
///
/// Groups left without a handler are returned as unhandled keys; their
/// records take no further part in the import.
pub(crate) fn plan<'r, M: ModifiableModel>(
    registry: &'r HandlerRegistry<M>,
    mut groups: BTreeMap<Key, Vec<Arc<Record>>>,
) -> (Vec<Dispatch<'r, M>>, Vec<Key>) {
    let dispatches = registry
        .ordered_handlers()
        .into_iter()
        .filter_map(|entry| {
            groups.remove(entry.key()).map(|records| Dispatch {
                entry,
                batch: KeyBatch::split(records),
            })
        })
        .collect();

    let unhandled: Vec<Key> = groups.into_keys().collect();
    for key in &unhandled {
        debug!(key = %key, "No data handler registered, skipping key");
    }
    (dispatches, unhandled)
}

/// Runs one handler operation, turning both errors and panics into a
/// handler fault.
pub(crate) fn guarded<M, T>(
    stage: Stage,
    entry: &HandlerEntry<M>,
    op: impl FnOnce() -> HandlerResult<T>,
) -> Result<T, ImportFault>
where
    M: ModifiableModel,
{
    let message = match panic::catch_unwind(AssertUnwindSafe(op)) {
        Ok(Ok(value)) => return Ok(value),
        Ok(Err(e)) => format!("{e:#}"),
        Err(cause) => format!("panicked: {}", describe_panic(cause.as_ref())),
    };
    Err(ImportFault::Handler {
        key: entry.key().clone(),
        handler: entry.name().to_string(),
        stage,
        message,
    })
}

fn describe_panic(cause: &(dyn Any + Send)) -> String {
    cause
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| cause.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}
