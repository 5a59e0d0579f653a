use crate::error::{ImportError, ImportFault, ImportResult};
use dataimport_types::Key;
use std::time::Duration;

/// One handler invocation that completed without a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerRun {
    pub key: Key,
    pub handler: String,
    /// Records passed in (import) or orphans removed (removal).
    pub count: usize,
    pub elapsed: Duration,
}

/// Outcome of an import call.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub(crate) records_seen: usize,
    pub(crate) records_prepared: usize,
    pub(crate) removals: Vec<HandlerRun>,
    pub(crate) imports: Vec<HandlerRun>,
    pub(crate) unhandled_keys: Vec<Key>,
    pub(crate) faults: Vec<ImportFault>,
}

impl ImportReport {
    /// Records reached by the tree walk.
    pub fn records_seen(&self) -> usize {
        self.records_seen
    }

    /// Records whose payload was prepared successfully.
    pub fn records_prepared(&self) -> usize {
        self.records_prepared
    }

    /// Successful removals, in the order they ran.
    pub fn removals(&self) -> &[HandlerRun] {
        &self.removals
    }

    /// Successful imports, in the order they ran.
    pub fn imports(&self) -> &[HandlerRun] {
        &self.imports
    }

    /// Keys that had records but no registered handler.
    pub fn unhandled_keys(&self) -> &[Key] {
        &self.unhandled_keys
    }

    pub fn faults(&self) -> &[ImportFault] {
        &self.faults
    }

    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }

    pub(crate) fn push_fault(&mut self, fault: ImportFault) {
        self.faults.push(fault);
    }

    /// `Ok(self)` when no fault was collected.
    pub fn into_result(self) -> ImportResult<Self> {
        if self.is_clean() {
            Ok(self)
        } else {
            Err(ImportError::Partial(self))
        }
    }
}
