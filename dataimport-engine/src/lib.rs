//! Phased import engine for dataimport.
//!
//! Takes record trees produced by external system connectors and applies
//! them to a target model through per-key [`DataHandler`]s.
//!
//! # Import Process
//!
//! 1. **Walk**: collect every record, parents before children
//! 2. **Deserialize**: prepare each payload once; a failing record is
//!    reported and left out, its siblings carry on
//! 3. **Resolve orphans**: per key in registry order, each handler returns a
//!    deferred supplier of stale model entries
//! 4. **Remove**: per key in registry order, materialize and remove orphans
//! 5. **Import**: per key in registry order (parents first), create or
//!    update model entries, then post-process
//!
//! Registry order is priority ascending, ties broken by registration order.
//!
//! # Example
//!
//! ```
//! use dataimport_engine::{
//!     DataHandler, HandlerRegistry, HandlerResult, ImportConfig, ImportEngine, ModifiableModel,
//! };
//! use dataimport_record::{Record, RecordBuilder};
//! use dataimport_types::{Key, ProjectData, keys};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Modules(Vec<String>);
//!
//! impl ModifiableModel for Modules {
//!     type Entry = String;
//! }
//!
//! struct ModuleHandler;
//!
//! impl DataHandler<Modules> for ModuleHandler {
//!     fn target_key(&self) -> Key {
//!         keys::MODULE
//!     }
//!
//!     fn import_data(
//!         &self,
//!         to_import: &[Arc<Record>],
//!         _project: Option<&ProjectData>,
//!         model: &mut Modules,
//!     ) -> HandlerResult<()> {
//!         for record in to_import {
//!             model.0.push(record.get_str("/name").unwrap_or_default().to_string());
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register(ModuleHandler).unwrap();
//! let engine = ImportEngine::new(registry, ImportConfig::default());
//!
//! let project = ProjectData::new("gradle", "demo", "/work/demo", "/work/demo");
//! let root = RecordBuilder::serialized(keys::PROJECT, &project)
//!     .unwrap()
//!     .child(RecordBuilder::new(keys::MODULE).raw(r#"{"name":"core"}"#))
//!     .build();
//!
//! let mut model = Modules::default();
//! engine.import_data(&[root], &mut model, true).unwrap();
//! assert_eq!(model.0, vec!["core".to_string()]);
//! ```

mod config;
mod engine;
mod error;
mod handler;
mod registry;
mod report;
mod stages;

pub use config::ImportConfig;
pub use engine::ImportEngine;
pub use error::{ImportError, ImportFault, ImportResult, RegistryError, Stage};
pub use handler::{
    DataHandler, HandlerResult, ModifiableModel, OrphanSupplier, no_orphans, orphans_from,
};
pub use registry::{HandlerEntry, HandlerRegistry};
pub use report::{HandlerRun, ImportReport};
