use dataimport_record::Record;
use dataimport_types::{Key, ProjectData};
use std::sync::Arc;

/// Result type for handler-authored operations.
pub type HandlerResult<T> = anyhow::Result<T>;

/// The mutable target model an import writes into.
///
/// The engine never looks inside the model. It only threads it through to
/// handlers, and names the entry type handlers hand back as orphans.
pub trait ModifiableModel {
    /// A previously imported model entry that may have to be removed.
    type Entry;
}

/// Deferred orphan computation returned by [`DataHandler::compute_orphans`].
///
/// Invoked exactly once, during the removal stage, with read access to the
/// model. Suppliers of handlers that are never reached are dropped unused.
pub type OrphanSupplier<'a, M> =
    Box<dyn FnOnce(&M) -> HandlerResult<Vec<<M as ModifiableModel>::Entry>> + 'a>;

/// A supplier that finds nothing to remove.
pub fn no_orphans<'a, M: ModifiableModel>() -> OrphanSupplier<'a, M> {
    Box::new(|_: &M| -> HandlerResult<Vec<M::Entry>> { Ok(Vec::new()) })
}

/// A supplier that yields entries already known at discovery time.
pub fn orphans_from<'a, M>(entries: Vec<M::Entry>) -> OrphanSupplier<'a, M>
where
    M: ModifiableModel,
    M::Entry: 'a,
{
    Box::new(move |_: &M| -> HandlerResult<Vec<M::Entry>> { Ok(entries) })
}

/// Per-key import logic.
///
/// One handler owns one [`Key`]. The engine hands it every prepared record
/// of that key and never touches the model itself.
///
/// Only [`import_data`](Self::import_data) is required. Handlers that never
/// remove stale entries can keep the default orphan computation, which finds
/// nothing.
pub trait DataHandler<M: ModifiableModel>: Send + Sync {
    /// The key whose records this handler imports.
    fn target_key(&self) -> Key;

    /// Name used in logs and fault reports.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Relative priority; lower runs first. Defaults to the key's weight.
    fn priority(&self) -> i32 {
        self.target_key().processing_weight()
    }

    /// Discovers which previously imported entries have no counterpart in
    /// `to_import`. Must not mutate the model.
    ///
    /// `project` is `None` when the batch carries no project data context.
    fn compute_orphans<'a>(
        &'a self,
        to_import: &'a [Arc<Record>],
        project: Option<&'a ProjectData>,
        model: &M,
    ) -> HandlerResult<OrphanSupplier<'a, M>> {
        let _ = (to_import, project, model);
        Ok(no_orphans())
    }

    /// Removes the materialized orphans. `to_ignore` lists records of this
    /// key that are present in the batch (imported or ignored); their
    /// entries must survive.
    fn remove_data(
        &self,
        to_remove: Vec<M::Entry>,
        to_ignore: &[Arc<Record>],
        project: Option<&ProjectData>,
        model: &mut M,
    ) -> HandlerResult<()> {
        let _ = (to_remove, to_ignore, project, model);
        Ok(())
    }

    /// Creates or updates model entries for `to_import`.
    ///
    /// `project` is `None` when this handler owns the project key itself.
    fn import_data(
        &self,
        to_import: &[Arc<Record>],
        project: Option<&ProjectData>,
        model: &mut M,
    ) -> HandlerResult<()>;

    /// Called once every import of the call has finished, for handlers whose
    /// own import succeeded.
    fn post_process(
        &self,
        imported: &[Arc<Record>],
        project: Option<&ProjectData>,
        model: &mut M,
    ) -> HandlerResult<()> {
        let _ = (imported, project, model);
        Ok(())
    }
}
