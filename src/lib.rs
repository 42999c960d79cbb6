//! snapshot-validation-webhook library crate
//!
//! Validating admission webhook that keeps at most one default
//! VolumeSnapshotClass and VolumeGroupSnapshotClass per CSI driver.

pub mod config;
pub mod crd;
pub mod error;
pub mod health;
pub mod lister;
pub mod webhooks;

pub use error::{Error, ListError, Result};
pub use health::HealthState;
pub use lister::{ClassLister, StoreLister};
pub use webhooks::{
    WEBHOOK_CERT_PATH, WEBHOOK_KEY_PATH, WEBHOOK_PORT, WebhookState, run_webhook_server,
};

use std::future::Future;
use std::sync::Arc;

use futures::StreamExt;
use kube::runtime::watcher::Config as WatcherConfig;
use kube::runtime::{WatchStreamExt, reflector, watcher};
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use tracing::{error, warn};

/// Create a Kubernetes client from the in-cluster or kubeconfig environment
pub async fn kube_client() -> Result<Client> {
    Ok(Client::try_default().await?)
}

/// Create the default watcher configuration for the class caches.
///
/// - `any_semantic()`: serve the initial list from the API server cache
fn default_watcher_config() -> WatcherConfig {
    WatcherConfig::default().any_semantic()
}

/// Build a reflector-backed lister for one class kind.
///
/// Returns the lister and the future that drives the watch. The future must
/// be spawned; the lister reports `NotSynced` until the initial list lands.
/// Watch errors are retried with the default backoff and only logged.
pub fn class_reflector<K>(
    api: Api<K>,
    kind: &'static str,
) -> (Arc<StoreLister<K>>, impl Future<Output = ()> + Send + 'static)
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + std::fmt::Debug + Send + Sync + 'static,
{
    let (reader, writer) = reflector::store();
    let stream = reflector(writer, watcher(api, default_watcher_config()))
        .default_backoff()
        .touched_objects();
    let lister = Arc::new(StoreLister::new(reader, kind));

    let drive = async move {
        stream
            .for_each(move |result| async move {
                if let Err(e) = result {
                    warn!(kind, error = %e, "Watch error, retrying");
                }
            })
            .await;
        // This should never complete in normal operation
        error!(kind, "Watch stream ended unexpectedly");
    };

    (lister, drive)
}
