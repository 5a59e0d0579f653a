//! Tree walks over record forests.

use crate::record::Record;
use dataimport_types::Key;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Returns every record reachable from `roots`, parents before children,
/// siblings in insertion order.
pub fn pre_order(roots: &[Arc<Record>]) -> Vec<Arc<Record>> {
    let mut out = Vec::new();
    let mut stack: Vec<Arc<Record>> = roots.iter().rev().cloned().collect();
    while let Some(record) = stack.pop() {
        stack.extend(record.children().iter().rev().cloned());
        out.push(record);
    }
    out
}

/// Groups records by key. Within a group, records keep pre-order discovery
/// order.
pub fn group_by_key(records: &[Arc<Record>]) -> BTreeMap<Key, Vec<Arc<Record>>> {
    let mut groups: BTreeMap<Key, Vec<Arc<Record>>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.key().clone())
            .or_default()
            .push(Arc::clone(record));
    }
    groups
}
