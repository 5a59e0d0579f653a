//! Shared test helpers for engine tests.

#![allow(dead_code)]

use dataimport_engine::{
    DataHandler, HandlerRegistry, HandlerResult, ImportConfig, ImportEngine, ModifiableModel,
    OrphanSupplier, Stage, orphans_from,
};
use dataimport_record::{Record, RecordBuilder};
use dataimport_types::{Key, ProjectData, RecordId, keys};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

pub const K1: Key = Key::from_static("k1", 1);
pub const K2: Key = Key::from_static("k2", 2);

/// Call trace shared by every handler of a test, e.g. `"b.importData"`.
pub type Trace = Arc<Mutex<Vec<String>>>;

pub fn trace() -> Trace {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn snapshot(trace: &Trace) -> Vec<String> {
    trace.lock().unwrap().clone()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ── Model ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportCall {
    pub handler: String,
    pub records: Vec<RecordId>,
    /// External name of the project context the handler received.
    pub project: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveCall {
    pub handler: String,
    pub to_remove: Vec<String>,
    pub to_ignore: Vec<RecordId>,
}

/// In-memory target model: named entries per data type plus a log of the
/// handler calls that reached it.
#[derive(Debug, Default)]
pub struct TestModel {
    pub entries: BTreeMap<String, BTreeSet<String>>,
    pub imports: Vec<ImportCall>,
    pub removals: Vec<RemoveCall>,
    pub post_processed: Vec<String>,
    pub mutations: usize,
}

impl TestModel {
    pub fn with_entries(key: &Key, names: &[&str]) -> Self {
        let mut model = Self::default();
        model.entries.insert(
            key.data_type().to_string(),
            names.iter().map(|n| n.to_string()).collect(),
        );
        model
    }

    pub fn entry_names(&self, key: &Key) -> Vec<String> {
        self.entries
            .get(key.data_type())
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl ModifiableModel for TestModel {
    type Entry = String;
}

// ── Records ──────────────────────────────────────────────────────

pub fn project_root() -> RecordBuilder {
    project_named("demo")
}

pub fn project_named(external_name: &str) -> RecordBuilder {
    let data = ProjectData::new("test", external_name, "/work/demo", "/work/demo");
    RecordBuilder::serialized(keys::PROJECT, &data).unwrap()
}

pub fn named(key: Key, name: &str) -> RecordBuilder {
    RecordBuilder::new(key).raw(format!(r#"{{"name":"{name}"}}"#))
}

pub fn broken(key: Key) -> RecordBuilder {
    RecordBuilder::new(key).raw("{ not json")
}

pub fn ids(records: &[Arc<Record>]) -> Vec<RecordId> {
    records.iter().map(|r| r.id()).collect()
}

pub fn engine(registry: HandlerRegistry<TestModel>) -> ImportEngine<TestModel> {
    ImportEngine::new(registry, ImportConfig::default())
}

// ── Trace handler ────────────────────────────────────────────────

/// Records every call in the shared trace; can be told to fail or panic in
/// one stage.
pub struct TraceHandler {
    label: &'static str,
    key: Key,
    priority: Option<i32>,
    trace: Trace,
    fail_in: Option<Stage>,
    panic_in: Option<Stage>,
}

impl TraceHandler {
    pub fn new(label: &'static str, key: Key, trace: &Trace) -> Self {
        Self {
            label,
            key,
            priority: None,
            trace: Arc::clone(trace),
            fail_in: None,
            panic_in: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn failing_in(mut self, stage: Stage) -> Self {
        self.fail_in = Some(stage);
        self
    }

    pub fn panicking_in(mut self, stage: Stage) -> Self {
        self.panic_in = Some(stage);
        self
    }

    fn enter(&self, op: &str, stage: Stage) -> HandlerResult<()> {
        self.trace
            .lock()
            .unwrap()
            .push(format!("{}.{}", self.label, op));
        if self.panic_in == Some(stage) {
            panic!("{} blew up in {}", self.label, op);
        }
        if self.fail_in == Some(stage) {
            anyhow::bail!("{} refused {}", self.label, op);
        }
        Ok(())
    }
}

impl DataHandler<TestModel> for TraceHandler {
    fn target_key(&self) -> Key {
        self.key.clone()
    }

    fn name(&self) -> &str {
        self.label
    }

    fn priority(&self) -> i32 {
        self.priority.unwrap_or(self.key.processing_weight())
    }

    fn compute_orphans<'a>(
        &'a self,
        _to_import: &'a [Arc<Record>],
        _project: Option<&'a ProjectData>,
        _model: &TestModel,
    ) -> HandlerResult<OrphanSupplier<'a, TestModel>> {
        self.enter("computeOrphanData", Stage::ComputeOrphans)?;
        Ok(orphans_from(Vec::new()))
    }

    fn remove_data(
        &self,
        to_remove: Vec<String>,
        to_ignore: &[Arc<Record>],
        _project: Option<&ProjectData>,
        model: &mut TestModel,
    ) -> HandlerResult<()> {
        self.enter("removeData", Stage::RemoveData)?;
        model.mutations += 1;
        model.removals.push(RemoveCall {
            handler: self.label.to_string(),
            to_remove,
            to_ignore: ids(to_ignore),
        });
        Ok(())
    }

    fn import_data(
        &self,
        to_import: &[Arc<Record>],
        project: Option<&ProjectData>,
        model: &mut TestModel,
    ) -> HandlerResult<()> {
        self.enter("importData", Stage::ImportData)?;
        model.mutations += 1;
        model.imports.push(ImportCall {
            handler: self.label.to_string(),
            records: ids(to_import),
            project: project.map(|p| p.external_name.clone()),
        });
        Ok(())
    }

    fn post_process(
        &self,
        _imported: &[Arc<Record>],
        _project: Option<&ProjectData>,
        model: &mut TestModel,
    ) -> HandlerResult<()> {
        self.enter("postProcess", Stage::PostProcess)?;
        model.post_processed.push(self.label.to_string());
        Ok(())
    }
}

// ── Entry handler ────────────────────────────────────────────────

/// Keeps `model.entries[key]` in sync with the `/name` of each record,
/// removing entries that no longer appear.
pub struct EntryHandler {
    key: Key,
}

impl EntryHandler {
    pub fn new(key: Key) -> Self {
        Self { key }
    }

    fn names(records: &[Arc<Record>]) -> BTreeSet<String> {
        records
            .iter()
            .filter_map(|r| r.get_str("/name"))
            .map(str::to_string)
            .collect()
    }
}

impl DataHandler<TestModel> for EntryHandler {
    fn target_key(&self) -> Key {
        self.key.clone()
    }

    fn compute_orphans<'a>(
        &'a self,
        to_import: &'a [Arc<Record>],
        _project: Option<&'a ProjectData>,
        _model: &TestModel,
    ) -> HandlerResult<OrphanSupplier<'a, TestModel>> {
        Ok(Box::new(move |model: &TestModel| -> HandlerResult<Vec<String>> {
            let present = Self::names(to_import);
            Ok(model
                .entry_names(&self.key)
                .into_iter()
                .filter(|name| !present.contains(name))
                .collect())
        }))
    }

    fn remove_data(
        &self,
        to_remove: Vec<String>,
        to_ignore: &[Arc<Record>],
        _project: Option<&ProjectData>,
        model: &mut TestModel,
    ) -> HandlerResult<()> {
        let keep = Self::names(to_ignore);
        let entries = model
            .entries
            .entry(self.key.data_type().to_string())
            .or_default();
        for name in to_remove.iter().filter(|n| !keep.contains(*n)) {
            entries.remove(name);
        }
        model.mutations += 1;
        Ok(())
    }

    fn import_data(
        &self,
        to_import: &[Arc<Record>],
        _project: Option<&ProjectData>,
        model: &mut TestModel,
    ) -> HandlerResult<()> {
        let names = Self::names(to_import);
        model
            .entries
            .entry(self.key.data_type().to_string())
            .or_default()
            .extend(names);
        model.mutations += 1;
        Ok(())
    }
}
