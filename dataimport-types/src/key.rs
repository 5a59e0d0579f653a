//! Record type identifiers.
//!
//! A [`Key`] names the kind of payload a record carries and how early that
//! kind is processed relative to others. Two records sharing a key are
//! handled by the same data handler.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

/// Weighted, totally ordered record type identifier.
///
/// Keys order by `processing_weight` first and `data_type` second, so two
/// distinct keys never compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    data_type: Cow<'static, str>,
    processing_weight: i32,
}

impl Key {
    /// Creates a key for a runtime-named data type.
    #[must_use]
    pub fn new(data_type: impl Into<String>, processing_weight: i32) -> Self {
        Self {
            data_type: Cow::Owned(data_type.into()),
            processing_weight,
        }
    }

    /// Creates a key in a `const` context.
    #[must_use]
    pub const fn from_static(data_type: &'static str, processing_weight: i32) -> Self {
        Self {
            data_type: Cow::Borrowed(data_type),
            processing_weight,
        }
    }

    /// Returns the data type name.
    #[must_use]
    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    /// Returns the processing weight. Lower weights are processed first.
    #[must_use]
    pub const fn processing_weight(&self) -> i32 {
        self.processing_weight
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        self.processing_weight
            .cmp(&other.processing_weight)
            .then_with(|| self.data_type.cmp(&other.data_type))
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.data_type, self.processing_weight)
    }
}

/// Well-known keys produced by external system connectors.
pub mod keys {
    use super::Key;

    /// Root record carrying the [`ProjectData`](crate::ProjectData) context.
    pub const PROJECT: Key = Key::from_static("project", 10);
    pub const MODULE: Key = Key::from_static("module", 20);
    pub const CONTENT_ROOT: Key = Key::from_static("content_root", 30);
    pub const LIBRARY: Key = Key::from_static("library", 40);
    pub const MODULE_DEPENDENCY: Key = Key::from_static("module_dependency", 50);
    pub const LIBRARY_DEPENDENCY: Key = Key::from_static("library_dependency", 60);
    pub const TASK: Key = Key::from_static("task", 70);
}
