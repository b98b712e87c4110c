//! Keystore records and the directory loader.

mod loader;

pub use loader::load_keystores;

use serde_json::{Map, Value};

/// Name of the only keystore field the service reads.
const ADDRESS_FIELD: &str = "address";

/// One keystore file as loaded from disk.
///
/// Only the `address` field of the file is interpreted. The full file content
/// is kept in `raw` and served back byte-for-byte.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeystoreRecord {
    /// Account address exactly as found in the file (no `0x` added)
    pub address: String,

    /// Original file bytes
    pub raw: Vec<u8>,
}

impl KeystoreRecord {
    /// Build a record from raw keystore JSON, extracting its address.
    ///
    /// The field name matches case-insensitively, with an exact `address`
    /// key taking precedence. A document of `null`, an object without the
    /// field, or a `null` field all give an empty address. Bytes that are not
    /// JSON, a non-object document, or a non-string address are errors.
    pub fn from_json(raw: Vec<u8>) -> Result<Self, serde_json::Error> {
        let address = match serde_json::from_slice::<Value>(&raw)? {
            Value::Null => String::new(),
            document => {
                let fields: Map<String, Value> = serde_json::from_value(document)?;
                let field = fields.get(ADDRESS_FIELD).or_else(|| {
                    fields
                        .iter()
                        .find(|(name, _)| name.eq_ignore_ascii_case(ADDRESS_FIELD))
                        .map(|(_, value)| value)
                });

                match field {
                    Some(value) => {
                        serde_json::from_value::<Option<String>>(value.clone())?.unwrap_or_default()
                    }
                    None => String::new(),
                }
            }
        };

        Ok(Self { address, raw })
    }
}
