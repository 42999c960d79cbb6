// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Property-based tests for the default-class policy.
//!
//! Uses proptest to generate random request sequences and verify that the
//! committed state never holds two defaults for one driver.

#[path = "../functional/mock_store.rs"]
#[allow(dead_code)]
mod mock_store;

use proptest::prelude::*;

use mock_store::MockClassStore;
use snapshot_validation_webhook::crd::{DefaultClass, VolumeGroupSnapshotClass};

/// A single write or delete submitted to the store.
#[derive(Debug, Clone)]
enum Request {
    Apply {
        name: String,
        driver: String,
        is_default: bool,
    },
    Delete {
        name: String,
    },
}

/// Strategy for class names from a small pool so updates happen often.
fn any_name() -> impl Strategy<Value = String> {
    prop_oneof![Just("a"), Just("b"), Just("c"), Just("d")].prop_map(String::from)
}

/// Strategy for drivers, including the empty driver.
fn any_driver() -> impl Strategy<Value = String> {
    prop_oneof![Just("d1"), Just("d2"), Just("")].prop_map(String::from)
}

fn any_request() -> impl Strategy<Value = Request> {
    prop_oneof![
        4 => (any_name(), any_driver(), any::<bool>()).prop_map(|(name, driver, is_default)| {
            Request::Apply { name, driver, is_default }
        }),
        1 => any_name().prop_map(|name| Request::Delete { name }),
    ]
}

fn class(name: &str, driver: &str, is_default: bool) -> VolumeGroupSnapshotClass {
    VolumeGroupSnapshotClass::new(name, driver).with_default(is_default)
}

proptest! {
    /// Property: at most one default per driver after any honored sequence.
    #[test]
    fn test_at_most_one_default_per_driver(requests in prop::collection::vec(any_request(), 1..40)) {
        let store = MockClassStore::<VolumeGroupSnapshotClass>::new();

        for request in requests {
            match request {
                Request::Apply { name, driver, is_default } => {
                    store.apply(class(&name, &driver, is_default));
                }
                Request::Delete { name } => {
                    store.delete(&name);
                }
            }

            for (driver, names) in store.defaults_by_driver() {
                prop_assert!(names.len() <= 1, "driver {:?} has defaults {:?}", driver, names);
            }
        }
    }

    /// Property: non-default writes are always allowed, whatever exists.
    #[test]
    fn test_non_default_always_allowed(
        existing in prop::collection::vec((any_name(), any_driver(), any::<bool>()), 0..8),
        name in any_name(),
        driver in any_driver(),
        reads_fail in any::<bool>(),
    ) {
        let store = MockClassStore::new();
        for (n, d, is_default) in existing {
            store.seed(class(&n, &d, is_default));
        }
        if reads_fail {
            store.fail_reads("unavailable");
        }

        prop_assert!(store.apply(class(&name, &driver, false)).allowed);
    }

    /// Property: a failing read denies every fresh default claim.
    #[test]
    fn test_read_failure_denies_fresh_claims(
        existing in prop::collection::vec((any_name(), any_driver(), any::<bool>()), 0..8),
        driver in any_driver(),
    ) {
        let store = MockClassStore::new();
        for (n, d, is_default) in existing {
            store.seed(class(&n, &d, is_default));
        }
        store.fail_reads("unavailable");

        let result = store.apply(class("fresh", &driver, true));
        prop_assert!(!result.allowed);
        prop_assert_eq!(result.message(), "unavailable");
    }

    /// Property: re-saving a committed default for the same driver is allowed.
    #[test]
    fn test_default_resave_allowed(
        name in any_name(),
        driver in any_driver(),
        reads_fail in any::<bool>(),
    ) {
        let store = MockClassStore::new();
        store.seed(class(&name, &driver, true));
        if reads_fail {
            store.fail_reads("unavailable");
        }

        let result = store.apply(class(&name, &driver, true));
        prop_assert!(result.allowed);
        prop_assert!(store.get(&name).unwrap().is_default());
    }

    /// Property: decisions are deterministic for the same state and request.
    #[test]
    fn test_decision_deterministic(
        existing in prop::collection::vec((any_name(), any_driver(), any::<bool>()), 0..8),
        driver in any_driver(),
    ) {
        let store = MockClassStore::new();
        for (n, d, is_default) in existing {
            store.seed(class(&n, &d, is_default));
        }

        // "fresh" is never committed, so both calls see the same state
        let first = store.apply(class("fresh", &driver, true));
        if first.allowed {
            store.delete("fresh");
        }
        let second = store.apply(class("fresh", &driver, true));
        prop_assert_eq!(first, second);
    }
}
