//! Core type definitions for dataimport.
//!
//! This crate defines the plugin-agnostic types shared by the record tree
//! and the import engine:
//! - [`Key`] record type identifiers and the well-known [`keys`]
//! - [`RecordId`] identifiers (UUID v7)
//! - [`ProjectData`], the project-level context of an import batch

mod ids;
mod key;
mod project;

pub use ids::RecordId;
pub use key::{Key, keys};
pub use project::ProjectData;

/// Result type for reading typed data out of record payloads.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reading typed data out of record payloads.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The payload does not have the shape of the requested type.
    #[error("malformed {what}: {source}")]
    Malformed {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
