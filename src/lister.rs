//! Read-only access to the committed snapshot classes.
//!
//! The admission policy only ever sees the `ClassLister` trait. In the
//! running webhook it is backed by a reflector cache; tests substitute an
//! in-memory list.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use kube::Resource;
use kube::runtime::reflector::Store;

use crate::error::ListError;

/// Enumerates every committed object of one class kind, across all drivers.
pub trait ClassLister<K>: Send + Sync {
    fn list(&self) -> Result<Vec<Arc<K>>, ListError>;
}

/// Lister backed by a reflector store.
///
/// Reports `ListError::NotSynced` until the initial watch list has been
/// applied to the store, so an empty cache is never mistaken for "no classes".
pub struct StoreLister<K>
where
    K: Resource<DynamicType = ()> + Clone + 'static,
{
    store: Store<K>,
    synced: Arc<AtomicBool>,
    kind: &'static str,
}

impl<K> StoreLister<K>
where
    K: Resource<DynamicType = ()> + Clone + 'static,
{
    pub fn new(store: Store<K>, kind: &'static str) -> Self {
        Self {
            store,
            synced: Arc::new(AtomicBool::new(false)),
            kind,
        }
    }

    /// Wait until the store has received its initial list, then mark it synced.
    ///
    /// Returns false if the reflector writer was dropped before syncing.
    pub async fn wait_until_synced(&self) -> bool {
        match self.store.wait_until_ready().await {
            Ok(()) => {
                self.synced.store(true, Ordering::SeqCst);
                true
            }
            Err(_) => false,
        }
    }

    pub fn is_synced(&self) -> bool {
        self.synced.load(Ordering::SeqCst)
    }
}

impl<K> ClassLister<K> for StoreLister<K>
where
    K: Resource<DynamicType = ()> + Clone + Send + Sync + 'static,
{
    fn list(&self) -> Result<Vec<Arc<K>>, ListError> {
        if !self.is_synced() {
            return Err(ListError::NotSynced { kind: self.kind });
        }
        Ok(self.store.state())
    }
}
