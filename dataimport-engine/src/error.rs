//! Error types for the import engine.
//!
//! Faults are collected per record or per handler and never abort sibling
//! work. An import call that collected any fault returns them all at once
//! in [`ImportError::Partial`], together with everything that succeeded.

use crate::report::ImportReport;
use dataimport_record::RecordError;
use dataimport_types::{Key, RecordId};
use std::fmt;
use thiserror::Error;

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// The pipeline stage a handler fault happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ComputeOrphans,
    RemoveData,
    ImportData,
    PostProcess,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ComputeOrphans => "compute_orphans",
            Stage::RemoveData => "remove_data",
            Stage::ImportData => "import_data",
            Stage::PostProcess => "post_process",
        };
        f.write_str(name)
    }
}

/// A contained failure, attributed to one record or one handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportFault {
    /// A single record failed to prepare its payload.
    #[error("record {record} ({key}) failed to prepare: {source}")]
    Record {
        record: RecordId,
        key: Key,
        #[source]
        source: RecordError,
    },

    /// A handler operation returned an error or panicked.
    #[error("handler {handler} failed in {stage} for {key}: {message}")]
    Handler {
        key: Key,
        handler: String,
        stage: Stage,
        message: String,
    },

    /// A record or handler reached a stage without the state it requires.
    #[error("integrity check failed for {key}: {detail}")]
    Integrity {
        record: Option<RecordId>,
        key: Key,
        detail: String,
    },
}

impl ImportFault {
    /// Classifies a record preparation failure.
    ///
    /// Decoder failures are record faults; a record that has no payload at
    /// all, or whose prepared payload cannot be read, is an integrity fault.
    pub fn from_record(record: RecordId, error: RecordError) -> Self {
        let key = error.key().clone();
        match error {
            RecordError::Decode { .. } | RecordError::Panicked { .. } => ImportFault::Record {
                record,
                key,
                source: error,
            },
            RecordError::MissingPayload(_)
            | RecordError::NotPrepared(_)
            | RecordError::Shape { .. } => ImportFault::Integrity {
                record: Some(record),
                key,
                detail: error.to_string(),
            },
        }
    }

    /// The key the fault is attributed to.
    pub fn key(&self) -> &Key {
        match self {
            ImportFault::Record { key, .. }
            | ImportFault::Handler { key, .. }
            | ImportFault::Integrity { key, .. } => key,
        }
    }

    /// The record the fault is attributed to, if any.
    pub fn record(&self) -> Option<RecordId> {
        match self {
            ImportFault::Record { record, .. } => Some(*record),
            ImportFault::Integrity { record, .. } => *record,
            ImportFault::Handler { .. } => None,
        }
    }
}

/// Errors returned by [`ImportEngine::import_data`](crate::ImportEngine::import_data).
#[derive(Debug, Error)]
pub enum ImportError {
    /// The import ran to completion but some records or handlers failed.
    #[error("import completed with {} fault(s)", .0.faults().len())]
    Partial(ImportReport),
}

impl ImportError {
    /// The report of the partially successful import.
    pub fn report(&self) -> &ImportReport {
        match self {
            ImportError::Partial(report) => report,
        }
    }

    pub fn into_report(self) -> ImportReport {
        match self {
            ImportError::Partial(report) => report,
        }
    }
}

/// Errors that can occur while registering handlers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("key {key} is already handled by {existing}")]
    DuplicateKey { key: Key, existing: String },
}
