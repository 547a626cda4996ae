use crate::utils::error::{MaintError, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// `<store>.backup`, next to the store file.
pub fn backup_path(store_path: &Path) -> PathBuf {
    let mut name = OsString::from(store_path.as_os_str());
    name.push(".backup");
    PathBuf::from(name)
}

/// Copies the store file byte-for-byte to its backup path, replacing any
/// earlier backup.
pub fn snapshot(store_path: &Path) -> Result<PathBuf> {
    if !store_path.is_file() {
        return Err(MaintError::StoreNotFound {
            path: store_path.to_path_buf(),
        });
    }

    let target = backup_path(store_path);
    tracing::info!("Creating backup of the database at {}...", target.display());
    fs::copy(store_path, &target).map_err(|source| MaintError::BackupFailed {
        path: target.clone(),
        source,
    })?;
    tracing::info!("Backup created.");

    Ok(target)
}
