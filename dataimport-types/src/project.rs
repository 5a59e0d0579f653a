use serde::{Deserialize, Serialize};

/// Project-level data context shared by every record of an import batch.
///
/// Carried as the payload of the [`keys::PROJECT`](crate::keys::PROJECT)
/// record at the root of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectData {
    /// Id of the external system that produced the tree (e.g. "gradle").
    pub owner: String,
    pub external_name: String,
    pub external_project_path: String,
    /// Path of the project the external one is linked into.
    pub linked_external_project_path: String,
}

impl ProjectData {
    pub fn new(
        owner: impl Into<String>,
        external_name: impl Into<String>,
        external_project_path: impl Into<String>,
        linked_external_project_path: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            external_name: external_name.into(),
            external_project_path: external_project_path.into(),
            linked_external_project_path: linked_external_project_path.into(),
        }
    }

    /// Decodes project data from a prepared record payload.
    pub fn from_value(value: &serde_json::Value) -> crate::Result<Self> {
        Self::deserialize(value).map_err(|source| crate::Error::Malformed {
            what: "project data",
            source,
        })
    }
}
