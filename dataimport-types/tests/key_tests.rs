use dataimport_types::{Key, keys};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet};

// ── Construction ─────────────────────────────────────────────────

#[test]
fn key_accessors() {
    let key = Key::new("artifact", 42);
    assert_eq!(key.data_type(), "artifact");
    assert_eq!(key.processing_weight(), 42);
}

#[test]
fn static_and_owned_keys_are_equal() {
    let owned = Key::new("project", 10);
    assert_eq!(owned, keys::PROJECT);

    let mut set = HashSet::new();
    set.insert(owned);
    assert!(set.contains(&keys::PROJECT));
}

#[test]
fn display_includes_weight() {
    assert_eq!(keys::MODULE.to_string(), "module#20");
}

// ── Ordering ─────────────────────────────────────────────────────

#[test]
fn lower_weight_sorts_first() {
    assert!(keys::PROJECT < keys::MODULE);
    assert!(keys::MODULE < keys::LIBRARY_DEPENDENCY);
}

#[test]
fn equal_weight_sorts_by_name() {
    let a = Key::new("alpha", 5);
    let b = Key::new("beta", 5);
    assert!(a < b);
    assert_ne!(a, b);
}

#[test]
fn well_known_keys_are_strictly_increasing() {
    let ordered = [
        keys::PROJECT,
        keys::MODULE,
        keys::CONTENT_ROOT,
        keys::LIBRARY,
        keys::MODULE_DEPENDENCY,
        keys::LIBRARY_DEPENDENCY,
        keys::TASK,
    ];
    for pair in ordered.windows(2) {
        assert!(pair[0] < pair[1], "{} should precede {}", pair[0], pair[1]);
    }
}

// ── Serialization ────────────────────────────────────────────────

#[test]
fn serialization_roundtrip() {
    let json = serde_json::to_string(&keys::LIBRARY).unwrap();
    let parsed: Key = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, keys::LIBRARY);
}

#[test]
fn deserializes_from_field_names() {
    let parsed: Key =
        serde_json::from_str(r#"{"data_type":"task","processing_weight":70}"#).unwrap();
    assert_eq!(parsed, keys::TASK);
}

// ── Properties ───────────────────────────────────────────────────

fn key_strategy() -> impl Strategy<Value = Key> {
    ("[a-z]{1,8}", -100i32..100).prop_map(|(name, weight)| Key::new(name, weight))
}

proptest! {
    /// Equality and ordering agree: cmp == Equal iff ==
    #[test]
    fn ordering_is_consistent_with_eq(a in key_strategy(), b in key_strategy()) {
        prop_assert_eq!(a.cmp(&b) == std::cmp::Ordering::Equal, a == b);
    }

    /// A sorted set of keys never places a heavier key before a lighter one.
    #[test]
    fn sorted_keys_respect_weight(list in prop::collection::vec(key_strategy(), 0..20)) {
        let sorted: Vec<Key> = list.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
        for pair in sorted.windows(2) {
            prop_assert!(pair[0].processing_weight() <= pair[1].processing_weight());
        }
    }
}
