//! Multi-step scenarios over committed state.

use snapshot_validation_webhook::crd::{VolumeGroupSnapshotClass, VolumeSnapshotClass};
use snapshot_validation_webhook::webhooks::policies::{REASON_DEFAULT_CONFLICT, REASON_LIST_FAILED};

use crate::mock_store::MockClassStore;

fn group_class(name: &str, driver: &str, is_default: bool) -> VolumeGroupSnapshotClass {
    VolumeGroupSnapshotClass::new(name, driver).with_default(is_default)
}

#[test]
fn test_first_default_on_empty_cluster_allowed() {
    let store = MockClassStore::new();

    let result = store.apply(group_class("A", "d1", true));
    assert!(result.allowed);
    assert!(store.get("A").is_some());
}

#[test]
fn test_second_default_same_driver_denied() {
    let store = MockClassStore::new();
    assert!(store.apply(group_class("A", "d1", true)).allowed);

    let result = store.apply(group_class("B", "d1", true));
    assert!(!result.allowed);
    assert_eq!(result.reason.as_deref(), Some(REASON_DEFAULT_CONFLICT));
    assert!(result.message().contains("A"));
    assert!(result.message().contains("d1"));
    assert!(store.get("B").is_none());
}

#[test]
fn test_default_for_other_driver_allowed() {
    let store = MockClassStore::new();
    assert!(store.apply(group_class("A", "d1", true)).allowed);

    assert!(store.apply(group_class("B", "d2", true)).allowed);
}

#[test]
fn test_noop_resave_of_default_allowed() {
    let store = MockClassStore::new();
    assert!(store.apply(group_class("A", "d1", true)).allowed);

    assert!(store.apply(group_class("A", "d1", true)).allowed);
}

#[test]
fn test_driver_change_conflicts_with_new_driver_default() {
    let store = MockClassStore::new();
    assert!(store.apply(group_class("A", "d1", true)).allowed);
    assert!(store.apply(group_class("C", "d2", true)).allowed);

    let result = store.apply(group_class("A", "d2", true));
    assert!(!result.allowed);
    assert_eq!(
        result.message(),
        "default group snapshot class: C already exists for driver: d2"
    );
    assert_eq!(store.get("A").unwrap().driver, "d1");
}

#[test]
fn test_read_failure_denies_regardless_of_state() {
    let store = MockClassStore::new();
    store.fail_reads("the server is currently unable to handle the request");

    // No real conflict exists, the claim is still unverifiable.
    let result = store.apply(group_class("A", "d1", true));
    assert!(!result.allowed);
    assert_eq!(result.reason.as_deref(), Some(REASON_LIST_FAILED));
    assert_eq!(
        result.message(),
        "the server is currently unable to handle the request"
    );

    store.restore_reads();
    assert!(store.apply(group_class("A", "d1", true)).allowed);
}

#[test]
fn test_non_default_create_allowed_during_read_failure() {
    let store = MockClassStore::new();
    store.seed(group_class("A", "d1", true));
    store.fail_reads("unavailable");

    assert!(store.apply(group_class("B", "d1", false)).allowed);
}

#[test]
fn test_handover_of_default_between_classes() {
    let store = MockClassStore::new();
    assert!(store.apply(group_class("old", "d1", true)).allowed);
    assert!(store.apply(group_class("new", "d1", false)).allowed);

    // Promoting while the old default is still marked is rejected
    assert!(!store.apply(group_class("new", "d1", true)).allowed);

    // Demote first, then promote
    assert!(store.apply(group_class("old", "d1", false)).allowed);
    assert!(store.apply(group_class("new", "d1", true)).allowed);

    let defaults = store.defaults_by_driver();
    assert_eq!(defaults.get("d1"), Some(&vec!["new".to_string()]));
}

#[test]
fn test_delete_frees_default_slot() {
    let store = MockClassStore::new();
    assert!(store.apply(group_class("A", "d1", true)).allowed);

    assert!(store.delete("A").allowed);
    assert!(store.apply(group_class("B", "d1", true)).allowed);
}

#[test]
fn test_delete_allowed_during_read_failure() {
    let store = MockClassStore::new();
    store.seed(group_class("A", "d1", true));
    store.fail_reads("unavailable");

    assert!(store.delete("A").allowed);
    assert!(store.get("A").is_none());
}

#[test]
fn test_preexisting_duplicates_not_audited() {
    let store = MockClassStore::new();
    store.seed(group_class("A", "d1", true));
    store.seed(group_class("B", "d1", true));

    // Re-saving an existing default is a no-op for the rule
    assert!(store.apply(group_class("B", "d1", true)).allowed);

    // A new claim reports the first conflict in name order
    let result = store.apply(group_class("C", "d1", true));
    assert_eq!(
        result.message(),
        "default group snapshot class: A already exists for driver: d1"
    );
}

#[test]
fn test_snapshot_and_group_classes_are_independent() {
    let snapshots = MockClassStore::<VolumeSnapshotClass>::new();
    let groups = MockClassStore::<VolumeGroupSnapshotClass>::new();

    assert!(groups.apply(group_class("A", "d1", true)).allowed);
    assert!(
        snapshots
            .apply(VolumeSnapshotClass::new("A", "d1").with_default(true))
            .allowed
    );

    let result = snapshots.apply(VolumeSnapshotClass::new("B", "d1").with_default(true));
    assert_eq!(
        result.message(),
        "default snapshot class: A already exists for driver: d1"
    );
}
