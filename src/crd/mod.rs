//! Snapshot class resource definitions.
//!
//! The CRDs themselves are installed by the CSI external-snapshotter; this
//! module only mirrors the fields the webhook reads.
//!
//! - `VolumeSnapshotClass`: `snapshot.storage.k8s.io/v1`
//! - `VolumeGroupSnapshotClass`: `groupsnapshot.storage.k8s.io/v1beta1`

mod group_snapshot_class;
mod snapshot_class;

pub use group_snapshot_class::*;
pub use snapshot_class::*;

use std::collections::BTreeMap;

use kube::Resource;
use serde::{Deserialize, Serialize};

/// What happens to the backing snapshot when its content object is deleted.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum DeletionPolicy {
    #[default]
    Delete,
    Retain,
}

impl std::fmt::Display for DeletionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeletionPolicy::Delete => write!(f, "Delete"),
            DeletionPolicy::Retain => write!(f, "Retain"),
        }
    }
}

/// A class kind that can be marked as the cluster-wide default for its driver.
///
/// The string annotation is normalized here into a `bool` so the admission
/// policy never compares annotation values itself.
pub trait DefaultClass: Resource<DynamicType = ()> {
    /// Annotation key whose value `"true"` marks the default class.
    const DEFAULT_ANNOTATION: &'static str;

    /// Human-readable kind used in denial messages, e.g. "group snapshot class".
    const KIND_LABEL: &'static str;

    /// Plural resource name as it appears in admission requests.
    const PLURAL: &'static str;

    /// CSI driver this class configures.
    fn driver(&self) -> &str;

    /// Object name, empty if unset.
    fn name(&self) -> &str {
        self.meta().name.as_deref().unwrap_or_default()
    }

    /// Whether this class claims default status for its driver.
    fn is_default(&self) -> bool {
        is_default_annotation(self.meta().annotations.as_ref(), Self::DEFAULT_ANNOTATION)
    }
}

/// Returns true only when `key` is present with the exact value `"true"`.
pub fn is_default_annotation(annotations: Option<&BTreeMap<String, String>>, key: &str) -> bool {
    annotations
        .and_then(|a| a.get(key))
        .is_some_and(|v| v == "true")
}
