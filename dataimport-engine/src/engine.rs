//! Import engine: the single entry point of an import call.

use crate::config::ImportConfig;
use crate::error::{ImportFault, ImportResult};
use crate::handler::ModifiableModel;
use crate::registry::HandlerRegistry;
use crate::report::ImportReport;
use crate::stages::{self, deserialize, import, orphans, removal};
use dataimport_record::traversal::{group_by_key, pre_order};
use dataimport_record::{JsonPayloadDecoder, PayloadDecoder, Record};
use dataimport_types::ProjectData;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Applies record trees to a target model through registered handlers.
///
/// Holds no state across calls apart from its registry, configuration and
/// decoder.
pub struct ImportEngine<M: ModifiableModel> {
    registry: HandlerRegistry<M>,
    config: ImportConfig,
    decoder: Arc<dyn PayloadDecoder>,
}

impl<M: ModifiableModel> ImportEngine<M> {
    /// Creates an engine that decodes payloads as JSON.
    pub fn new(registry: HandlerRegistry<M>, config: ImportConfig) -> Self {
        Self::with_decoder(registry, config, Arc::new(JsonPayloadDecoder))
    }

    /// Creates an engine with a custom payload decoder.
    pub fn with_decoder(
        registry: HandlerRegistry<M>,
        config: ImportConfig,
        decoder: Arc<dyn PayloadDecoder>,
    ) -> Self {
        Self {
            registry,
            config,
            decoder,
        }
    }

    pub fn registry(&self) -> &HandlerRegistry<M> {
        &self.registry
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Prepares a single record's payload. Idempotent; a failure is
    /// attributed to this record only.
    pub fn ensure_record_ready(&self, record: &Record) -> Result<(), ImportFault> {
        deserialize::prepare(record, self.decoder.as_ref())
    }

    /// Imports the trees under `roots` into `model`.
    ///
    /// Runs every stage to completion. Faults are contained per record or
    /// per handler and returned together in
    /// [`ImportError::Partial`](crate::ImportError::Partial); whatever
    /// succeeded stays applied to the model.
    ///
    /// When `synchronous` is false, large batches are deserialized on worker
    /// threads. Model stages always run on the calling thread, one handler
    /// at a time.
    pub fn import_data(
        &self,
        roots: &[Arc<Record>],
        model: &mut M,
        synchronous: bool,
    ) -> ImportResult<ImportReport> {
        let mut report = ImportReport::default();
        if roots.is_empty() {
            debug!("Nothing to import");
            return Ok(report);
        }

        let records = pre_order(roots);
        report.records_seen = records.len();

        let workers = self.config.workers_for(records.len(), synchronous);
        let (ready, faults) = deserialize::run(&records, self.decoder.as_ref(), workers);
        report.records_prepared = ready.len();
        report.faults.extend(faults);

        let project = self.project_context(roots, &mut report);
        let (dispatches, unhandled) = stages::plan(&self.registry, group_by_key(&ready));
        report.unhandled_keys = unhandled;

        info!(
            records = report.records_seen,
            prepared = report.records_prepared,
            handlers = dispatches.len(),
            synchronous,
            "Starting import"
        );

        let pending = orphans::run(&dispatches, project.as_ref(), model, &mut report.faults);
        report.removals = removal::run(pending, project.as_ref(), model, &mut report.faults);

        report.imports = import::run(
            &dispatches,
            project.as_ref(),
            &self.config.project_key,
            model,
            &mut report.faults,
        );

        if report.is_clean() {
            info!(imported = report.imports.len(), "Import finished");
        } else {
            warn!(
                imported = report.imports.len(),
                faults = report.faults.len(),
                "Import finished with faults"
            );
        }
        report.into_result()
    }

    /// Reads the project data context of the batch from the project record
    /// enclosing the first root.
    fn project_context(&self, roots: &[Arc<Record>], report: &mut ImportReport) -> Option<ProjectData> {
        let project_key = &self.config.project_key;
        let enclosing = |root: &Arc<Record>| {
            if root.key() == project_key {
                Some((Arc::clone(root), true))
            } else {
                root.find_parent(project_key).map(|record| (record, false))
            }
        };

        let Some((record, submitted)) = roots.first().and_then(enclosing) else {
            debug!("No project data context for this batch");
            return None;
        };
        for (other, _) in roots.iter().skip(1).filter_map(enclosing) {
            if other.id() != record.id() {
                debug!(
                    used = %record.id(),
                    other = %other.id(),
                    "Roots belong to different project records, using the first"
                );
            }
        }

        if let Err(fault) = self.ensure_record_ready(&record) {
            debug!(record = %record.id(), "Project record is not ready: {fault}");
            // Submitted records already had their faults collected.
            if !submitted {
                report.push_fault(fault);
            }
            return None;
        }

        let payload = record.payload()?;
        match ProjectData::from_value(payload) {
            Ok(project) => Some(project),
            Err(e) => {
                report.push_fault(ImportFault::Integrity {
                    record: Some(record.id()),
                    key: record.key().clone(),
                    detail: e.to_string(),
                });
                None
            }
        }
    }
}
