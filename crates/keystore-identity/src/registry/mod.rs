//! Address-indexed keystore registry.

mod memory;
mod shared;

pub use memory::Registry;
pub use shared::KeystoreRegistry;

use crate::error::IdentityError;
use serde::Serialize;

/// Prefix carried by every address at the API boundary.
pub const ADDRESS_PREFIX: &str = "0x";

/// Static service metadata returned by `/api/v1/info`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    pub version: String,
    pub provider_name: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            version: "1.0".into(),
            provider_name: "Acme".into(),
        }
    }
}

/// Display form of a stored address: always `0x` + the address as loaded.
///
/// The prefix is added even when the stored address already has one.
pub fn display_address(address: &str) -> String {
    format!("{}{}", ADDRESS_PREFIX, address)
}

/// Index key for a display address.
pub fn index_key(display: &str) -> String {
    display.to_lowercase()
}

/// Normalize a caller-supplied address into an index key.
///
/// The input is lowercased first, so `0X…` is accepted. Anything without the
/// prefix is malformed and never reaches the index.
pub fn normalize_lookup_address(address: &str) -> Result<String, IdentityError> {
    let key = address.to_lowercase();
    if !key.starts_with(ADDRESS_PREFIX) {
        return Err(IdentityError::MalformedAddress(address.to_string()));
    }
    Ok(key)
}
