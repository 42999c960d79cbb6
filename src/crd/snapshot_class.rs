//! VolumeSnapshotClass resource.

use std::collections::BTreeMap;

use k8s_openapi::ClusterResourceScope;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};

use super::{DefaultClass, DeletionPolicy};

/// Annotation marking a snapshot class as the default for its driver.
pub const IS_DEFAULT_SNAPSHOT_CLASS_ANNOTATION: &str =
    "snapshot.storage.kubernetes.io/is-default-class";

/// Parameters for creating volume snapshots with a specific CSI driver.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSnapshotClass {
    #[serde(default)]
    pub metadata: ObjectMeta,

    pub driver: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<BTreeMap<String, String>>,

    pub deletion_policy: DeletionPolicy,
}

impl VolumeSnapshotClass {
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

    pub fn with_default(mut self, is_default: bool) -> Self {
        let annotations = self.metadata.annotations.get_or_insert_with(BTreeMap::new);
        if is_default {
            annotations.insert(
                IS_DEFAULT_SNAPSHOT_CLASS_ANNOTATION.to_string(),
                "true".to_string(),
            );
        } else {
            annotations.remove(IS_DEFAULT_SNAPSHOT_CLASS_ANNOTATION);
        }
        self
    }
}

impl k8s_openapi::Resource for VolumeSnapshotClass {
    const API_VERSION: &'static str = "snapshot.storage.k8s.io/v1";
    const GROUP: &'static str = "snapshot.storage.k8s.io";
    const KIND: &'static str = "VolumeSnapshotClass";
    const VERSION: &'static str = "v1";
    const URL_PATH_SEGMENT: &'static str = "volumesnapshotclasses";
    type Scope = ClusterResourceScope;
}

impl k8s_openapi::Metadata for VolumeSnapshotClass {
    type Ty = ObjectMeta;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

impl DefaultClass for VolumeSnapshotClass {
    const DEFAULT_ANNOTATION: &'static str = IS_DEFAULT_SNAPSHOT_CLASS_ANNOTATION;
    const KIND_LABEL: &'static str = "snapshot class";
    const PLURAL: &'static str = "volumesnapshotclasses";

    fn driver(&self) -> &str {
        &self.driver
    }
}
