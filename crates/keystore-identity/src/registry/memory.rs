//! In-memory registry snapshot.

use super::{display_address, index_key};
use crate::keystore::KeystoreRecord;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Keystore index built from one bulk load.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// Display addresses in load order
    addresses: Vec<String>,
    /// Records indexed by lowercase `0x` address
    records: HashMap<String, KeystoreRecord>,
    /// When the registry was last replaced
    loaded_at: Option<DateTime<Utc>>,
}

impl Registry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from loaded records.
    ///
    /// Every record is listed and indexed, including one with an empty
    /// address. When two records share an index key the later one replaces the
    /// earlier in the index, while both stay in the address list.
    pub fn from_keystores(keystores: Vec<KeystoreRecord>) -> Self {
        let mut addresses = Vec::with_capacity(keystores.len());
        let mut records = HashMap::with_capacity(keystores.len());

        for record in keystores {
            let address = display_address(&record.address);
            let key = index_key(&address);
            addresses.push(address);
            records.insert(key, record);
        }

        Self {
            addresses,
            records,
            loaded_at: Some(Utc::now()),
        }
    }

    /// Get a record by index key.
    pub fn get(&self, key: &str) -> Option<&KeystoreRecord> {
        self.records.get(key)
    }

    /// Display addresses in load order.
    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    /// Number of indexed keystores.
    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }
}
