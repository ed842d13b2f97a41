// SPDX-License-Identifier: MIT

//! Per-entity JSON file store: one file per id under a 0700 directory,
//! written atomically via write-then-rename.

use crate::error::StorageError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

pub struct EntityStore<T> {
    dir: PathBuf,
    _marker: PhantomData<T>,
}

impl<T> EntityStore<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Open (creating if needed) the directory backing this store, locking
    /// it down to owner-only access.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io { path: dir.clone(), source })?;
        lock_down(&dir)?;
        Ok(Self { dir, _marker: PhantomData })
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn tmp_path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json.tmp"))
    }

    /// Serialize `value` to a sibling temp file then rename it over the
    /// final path, so a reader never observes a partial write.
    pub fn save(&self, id: &str, value: &T) -> Result<(), StorageError> {
        let path = self.path_for(id);
        let tmp_path = self.tmp_path_for(id);
        let body = serde_json::to_vec_pretty(value)
            .map_err(|source| StorageError::Serde { id: id.to_string(), source })?;
        fs::write(&tmp_path, &body).map_err(|source| StorageError::Io { path: tmp_path.clone(), source })?;
        fs::rename(&tmp_path, &path).map_err(|source| StorageError::Io { path, source })
    }

    pub fn load(&self, id: &str) -> Result<T, StorageError> {
        let path = self.path_for(id);
        let body = fs::read(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound { dir: self.dir.clone(), id: id.to_string() }
            } else {
                StorageError::Io { path: path.clone(), source }
            }
        })?;
        serde_json::from_slice(&body).map_err(|source| StorageError::Serde { id: id.to_string(), source })
    }

    pub fn delete(&self, id: &str) -> Result<(), StorageError> {
        let path = self.path_for(id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    pub fn exists(&self, id: &str) -> bool {
        self.path_for(id).is_file()
    }

    /// Every id with a persisted file. Order is filesystem-dependent.
    pub fn list_ids(&self) -> Result<Vec<String>, StorageError> {
        let entries =
            fs::read_dir(&self.dir).map_err(|source| StorageError::Io { path: self.dir.clone(), source })?;
        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StorageError::Io { path: self.dir.clone(), source })?;
            let file_name = entry.file_name();
            if let Some(id) = file_name.to_string_lossy().strip_suffix(".json") {
                ids.push(id.to_string());
            }
        }
        Ok(ids)
    }
}

#[cfg(unix)]
fn lock_down(dir: &Path) -> Result<(), StorageError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(dir, fs::Permissions::from_mode(0o700))
        .map_err(|source| StorageError::Io { path: dir.to_path_buf(), source })
}

#[cfg(not(unix))]
fn lock_down(_dir: &Path) -> Result<(), StorageError> {
    Ok(())
}

#[cfg(test)]
#[path = "entity_store_tests.rs"]
mod tests;
