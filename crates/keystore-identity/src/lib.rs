//! Keystore Identity - read-only HTTP directory of account keystores.
//!
//! The service:
//! - Loads one keystore JSON file per account from a directory at startup
//! - Indexes keystores by case-insensitive `0x` address
//! - Serves the address list and raw keystore files over `/api/v1`

pub mod api;
pub mod config;
pub mod error;
pub mod keystore;
pub mod registry;

pub use config::Config;
pub use error::IdentityError;
pub use keystore::{load_keystores, KeystoreRecord};
pub use registry::{KeystoreRegistry, Registry, ServiceInfo};
