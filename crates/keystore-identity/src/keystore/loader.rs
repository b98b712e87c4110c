//! Loads every keystore file in a directory.

use super::KeystoreRecord;
use crate::error::IdentityError;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// Load all keystores from `dir`.
///
/// Entries are processed in file-name order. The result has one element per
/// directory entry: a subdirectory is not descended into and yields `None` in
/// its position. The first unreadable or unparseable file aborts the whole
/// load.
pub async fn load_keystores(
    dir: impl AsRef<Path>,
) -> Result<Vec<Option<KeystoreRecord>>, IdentityError> {
    let dir = dir.as_ref();
    let directory_error = |source: std::io::Error| IdentityError::Directory {
        path: dir.to_path_buf(),
        source,
    };

    info!(path = %dir.display(), "Loading keystores");

    let mut read_dir = fs::read_dir(dir).await.map_err(directory_error)?;
    let mut entries = Vec::new();
    while let Some(entry) = read_dir.next_entry().await.map_err(directory_error)? {
        entries.push(entry);
    }
    entries.sort_by_key(|entry| entry.file_name());

    let mut keystores = Vec::with_capacity(entries.len());
    for entry in entries {
        let path = entry.path();

        let file_type = entry
            .file_type()
            .await
            .map_err(|e| IdentityError::file(&path, e))?;
        if file_type.is_dir() {
            debug!(path = %path.display(), "Skipping subdirectory");
            keystores.push(None);
            continue;
        }

        let raw = fs::read(&path)
            .await
            .map_err(|e| IdentityError::file(&path, e))?;
        let record = KeystoreRecord::from_json(raw).map_err(|e| IdentityError::file(&path, e))?;

        debug!(path = %path.display(), address = %record.address, "Loaded keystore");
        keystores.push(Some(record));
    }

    info!(
        "Loaded {} keystore entries from {}",
        keystores.len(),
        dir.display()
    );

    Ok(keystores)
}
