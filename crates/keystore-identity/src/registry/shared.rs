//! Concurrent handle over the registry.

use super::{normalize_lookup_address, Registry, ServiceInfo};
use crate::error::IdentityError;
use crate::keystore::KeystoreRecord;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Shared, cloneable keystore registry.
///
/// Readers take the lock in shared mode and only wait on an in-progress
/// [`set_keystores`](Self::set_keystores). No I/O happens under the lock.
#[derive(Debug, Clone)]
pub struct KeystoreRegistry {
    inner: Arc<RwLock<Registry>>,
    info: Arc<ServiceInfo>,
}

impl Default for KeystoreRegistry {
    fn default() -> Self {
        Self::new(ServiceInfo::default())
    }
}

impl KeystoreRegistry {
    /// Create an empty registry reporting the given metadata.
    pub fn new(info: ServiceInfo) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Registry::new())),
            info: Arc::new(info),
        }
    }

    /// Replace the whole registry with `keystores`.
    ///
    /// Every record is listed and indexed, an empty address included; callers
    /// drop skipped directory entries before this point. Calling this again
    /// with the same input leaves every query result unchanged.
    pub async fn set_keystores(&self, keystores: Vec<KeystoreRecord>) {
        let mut registry = self.inner.write().await;
        *registry = Registry::from_keystores(keystores);

        info!(
            addresses = registry.addresses().len(),
            indexed = registry.count(),
            "Registry replaced"
        );
    }

    /// Display addresses in load order.
    pub async fn list_addresses(&self) -> Vec<String> {
        self.inner.read().await.addresses().to_vec()
    }

    /// Raw keystore bytes for `address`.
    ///
    /// Returns [`IdentityError::MalformedAddress`] for input without a `0x`
    /// prefix and [`IdentityError::NotFound`] for an unknown address.
    pub async fn lookup(&self, address: &str) -> Result<Vec<u8>, IdentityError> {
        let key = normalize_lookup_address(address)?;

        let registry = self.inner.read().await;
        match registry.get(&key) {
            Some(record) => Ok(record.raw.clone()),
            None => {
                debug!(address = %key, "Keystore not found");
                Err(IdentityError::NotFound(address.to_string()))
            }
        }
    }

    /// Static service metadata.
    pub fn info(&self) -> &ServiceInfo {
        &self.info
    }

    /// Number of indexed keystores.
    pub async fn count(&self) -> usize {
        self.inner.read().await.count()
    }

    pub async fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.inner.read().await.loaded_at()
    }
}
