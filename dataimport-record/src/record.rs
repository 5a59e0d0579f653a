//! The record tree.
//!
//! Records are built bottom-up by a [`RecordBuilder`] and frozen into
//! `Arc<Record>` nodes. Each node owns its children and holds a `Weak` link
//! to its parent, so a built tree can never contain a cycle.

use crate::decoder::PayloadDecoder;
use crate::error::{RecordError, RecordResult};
use dataimport_types::{Key, RecordId};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock, Weak};
use tracing::{debug, warn};

/// A typed, keyed payload node in an import tree.
#[derive(Debug)]
pub struct Record {
    id: RecordId,
    key: Key,
    raw: Option<Vec<u8>>,
    ignored: bool,
    parent: Weak<Record>,
    /// Set at build time; survives the parent being dropped.
    has_parent: bool,
    children: Vec<Arc<Record>>,
    /// Outcome of the one and only preparation attempt.
    prepared: OnceLock<RecordResult<serde_json::Value>>,
}

impl Record {
    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Whether the producer asked for this record (or an ancestor) to be
    /// left out of the import.
    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    /// Returns the enclosing record, or `None` for a root.
    pub fn parent(&self) -> Option<Arc<Record>> {
        self.parent.upgrade()
    }

    /// Whether the record was built as the root of its tree.
    pub fn is_root(&self) -> bool {
        !self.has_parent
    }

    /// Child records in the order the producer added them.
    pub fn children(&self) -> &[Arc<Record>] {
        &self.children
    }

    /// Serialized payload bytes, if the producer supplied any.
    pub fn raw_payload(&self) -> Option<&[u8]> {
        self.raw.as_deref()
    }

    /// Prepares the payload for use, decoding it on the first call.
    ///
    /// The decoder runs at most once per record, even when several threads
    /// race on the same record; every later call returns the memoized
    /// outcome, including a memoized failure. A panicking decoder is caught
    /// here and recorded as [`RecordError::Panicked`].
    pub fn ensure_deserialized(
        &self,
        decoder: &dyn PayloadDecoder,
    ) -> RecordResult<&serde_json::Value> {
        self.prepared
            .get_or_init(|| self.prepare(decoder))
            .as_ref()
            .map_err(Clone::clone)
    }

    fn prepare(&self, decoder: &dyn PayloadDecoder) -> RecordResult<serde_json::Value> {
        let Some(raw) = self.raw.as_deref() else {
            warn!(record = %self.id, key = %self.key, "Record has no payload to prepare");
            return Err(RecordError::MissingPayload(self.key.clone()));
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| decoder.decode(&self.key, raw)))
            .unwrap_or_else(|cause| {
                Err(RecordError::Panicked {
                    key: self.key.clone(),
                    message: panic_message(cause.as_ref()),
                })
            });

        match &outcome {
            Ok(_) => debug!(record = %self.id, key = %self.key, bytes = raw.len(), "Prepared record payload"),
            Err(e) => warn!(record = %self.id, key = %self.key, error = %e, "Record payload preparation failed"),
        }
        outcome
    }

    /// Whether preparation has been attempted, successfully or not.
    pub fn is_deserialized(&self) -> bool {
        self.prepared.get().is_some()
    }

    /// Prepared payload, or `None` if preparation has not run or failed.
    pub fn payload(&self) -> Option<&serde_json::Value> {
        self.prepared.get().and_then(|outcome| outcome.as_ref().ok())
    }

    /// Deserializes the prepared payload into a typed value.
    pub fn data_as<T: DeserializeOwned>(&self) -> RecordResult<T> {
        let value = self
            .payload()
            .ok_or_else(|| RecordError::NotPrepared(self.key.clone()))?;
        T::deserialize(value).map_err(|e| RecordError::Shape {
            key: self.key.clone(),
            message: e.to_string(),
        })
    }

    /// Extract a string value from the prepared payload using a JSON pointer (e.g., "/name").
    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        self.payload()?.pointer(pointer).and_then(|v| v.as_str())
    }

    /// Nearest ancestor carrying `key`, not including this record.
    pub fn find_parent(&self, key: &Key) -> Option<Arc<Record>> {
        let mut current = self.parent();
        while let Some(record) = current {
            if record.key() == key {
                return Some(record);
            }
            current = record.parent();
        }
        None
    }
}

fn panic_message(cause: &(dyn Any + Send)) -> String {
    if let Some(s) = cause.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = cause.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Builds a record tree.
///
/// ```
/// use dataimport_record::RecordBuilder;
/// use dataimport_types::keys;
/// use serde_json::json;
///
/// let root = RecordBuilder::new(keys::PROJECT)
///     .value(json!({"name": "demo"}))
///     .child(RecordBuilder::new(keys::MODULE).raw(br#"{"name":"core"}"#.to_vec()))
///     .build();
///
/// assert_eq!(root.children().len(), 1);
/// assert!(root.children()[0].parent().is_some());
/// ```
#[derive(Debug)]
pub struct RecordBuilder {
    key: Key,
    raw: Option<Vec<u8>>,
    value: Option<serde_json::Value>,
    ignored: bool,
    children: Vec<RecordBuilder>,
}

impl RecordBuilder {
    /// Starts a record without a payload.
    pub fn new(key: Key) -> Self {
        Self {
            key,
            raw: None,
            value: None,
            ignored: false,
            children: Vec::new(),
        }
    }

    /// Starts a record whose payload is `data` serialized as JSON bytes.
    pub fn serialized<T: Serialize>(key: Key, data: &T) -> serde_json::Result<Self> {
        Ok(Self::new(key).raw(serde_json::to_vec(data)?))
    }

    /// Sets the serialized payload, decoded lazily by the engine.
    pub fn raw(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.raw = Some(bytes.into());
        self.value = None;
        self
    }

    /// Sets an already prepared payload; no decoding will take place.
    pub fn value(mut self, value: serde_json::Value) -> Self {
        self.value = Some(value);
        self.raw = None;
        self
    }

    /// Marks the record and its whole subtree as ignored.
    pub fn ignored(mut self, ignored: bool) -> Self {
        self.ignored = ignored;
        self
    }

    pub fn child(mut self, child: RecordBuilder) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = RecordBuilder>) -> Self {
        self.children.extend(children);
        self
    }

    /// Freezes the builder into a root record.
    pub fn build(self) -> Arc<Record> {
        self.build_under(None, false)
    }

    fn build_under(self, parent: Option<Weak<Record>>, parent_ignored: bool) -> Arc<Record> {
        let RecordBuilder {
            key,
            raw,
            value,
            ignored,
            children,
        } = self;
        let ignored = ignored || parent_ignored;

        Arc::new_cyclic(|me| Record {
            id: RecordId::new(),
            key,
            raw,
            ignored,
            has_parent: parent.is_some(),
            parent: parent.unwrap_or_default(),
            children: children
                .into_iter()
                .map(|child| child.build_under(Some(me.clone()), ignored))
                .collect(),
            prepared: match value {
                Some(v) => OnceLock::from(Ok(v)),
                None => OnceLock::new(),
            },
        })
    }
}
