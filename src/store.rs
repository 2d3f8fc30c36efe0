//! Vector store persistence.
//!
//! The store is a single JSON array of [`EmbeddingRecord`]s. It is deleted
//! at the start of every reset and written once, in full, at the end. There
//! is no locking: a search that overlaps a reset may find the file missing
//! or see a partial write.

use std::path::Path;

use crate::error::{Error, Result};
use crate::models::EmbeddingRecord;

pub async fn load_store(path: &Path) -> Result<Vec<EmbeddingRecord>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::StoreMissing(path.to_path_buf()))
        }
        Err(e) => return Err(Error::io(path, e)),
    };

    serde_json::from_slice(&bytes).map_err(|source| Error::StoreInvalid {
        path: path.to_path_buf(),
        source,
    })
}

/// Remove the store file. Returns whether a file was there.
pub async fn delete_store(path: &Path) -> Result<bool> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Serialize every record and write the file in one go.
pub async fn save_store(path: &Path, records: &[EmbeddingRecord]) -> Result<()> {
    let json = serde_json::to_vec(records)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::io(parent, e))?;
    }
    tokio::fs::write(path, json)
        .await
        .map_err(|e| Error::io(path, e))
}
