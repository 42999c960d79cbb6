//! VolumeGroupSnapshotClass resource.
//!
//! Example:
//! ```yaml
//! apiVersion: groupsnapshot.storage.k8s.io/v1beta1
//! kind: VolumeGroupSnapshotClass
//! metadata:
//!   name: csi-hostpath-groupsnapclass
//!   annotations:
//!     groupsnapshot.storage.kubernetes.io/is-default-class: "true"
//! driver: hostpath.csi.k8s.io
//! deletionPolicy: Delete
//! ```

use std::collections::BTreeMap;

use k8s_openapi::ClusterResourceScope;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};

use super::{DefaultClass, DeletionPolicy};

/// Annotation marking a group snapshot class as the default for its driver.
pub const IS_DEFAULT_GROUP_SNAPSHOT_CLASS_ANNOTATION: &str =
    "groupsnapshot.storage.kubernetes.io/is-default-class";

/// Parameters for creating group snapshots with a specific CSI driver.
///
/// Cluster-scoped. The driver and parameters live at the top level of the
/// object rather than under a `spec`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeGroupSnapshotClass {
    #[serde(default)]
    pub metadata: ObjectMeta,

    /// Name of the CSI driver that handles this class.
    pub driver: String,

    /// Opaque driver-specific parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<BTreeMap<String, String>>,

    pub deletion_policy: DeletionPolicy,
}

impl VolumeGroupSnapshotClass {
    /// Create a class with the given name and driver and no annotations.
    pub fn new(name: &str, driver: &str) -> Self {
        Self {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            driver: driver.to_string(),
            parameters: None,
            deletion_policy: DeletionPolicy::Delete,
        }
    }

    /// Set or clear the default-class annotation.
    pub fn with_default(mut self, is_default: bool) -> Self {
        let annotations = self.metadata.annotations.get_or_insert_with(BTreeMap::new);
        if is_default {
            annotations.insert(
                IS_DEFAULT_GROUP_SNAPSHOT_CLASS_ANNOTATION.to_string(),
                "true".to_string(),
            );
        } else {
            annotations.remove(IS_DEFAULT_GROUP_SNAPSHOT_CLASS_ANNOTATION);
        }
        self
    }
}

impl k8s_openapi::Resource for VolumeGroupSnapshotClass {
    const API_VERSION: &'static str = "groupsnapshot.storage.k8s.io/v1beta1";
    const GROUP: &'static str = "groupsnapshot.storage.k8s.io";
    const KIND: &'static str = "VolumeGroupSnapshotClass";
    const VERSION: &'static str = "v1beta1";
    const URL_PATH_SEGMENT: &'static str = "volumegroupsnapshotclasses";
    type Scope = ClusterResourceScope;
}

impl k8s_openapi::Metadata for VolumeGroupSnapshotClass {
    type Ty = ObjectMeta;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

impl DefaultClass for VolumeGroupSnapshotClass {
    const DEFAULT_ANNOTATION: &'static str = IS_DEFAULT_GROUP_SNAPSHOT_CLASS_ANNOTATION;
    const KIND_LABEL: &'static str = "group snapshot class";
    const PLURAL: &'static str = "volumegroupsnapshotclasses";

    fn driver(&self) -> &str {
        &self.driver
    }
}
