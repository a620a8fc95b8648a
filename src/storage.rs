//! Durable credential slot.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session store is the only writer. The slot holds the raw token string;
//! a missing or blank slot means "logged out".

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::StorageError;
use crate::net::types::Credential;

/// Persistence for the single credential slot.
pub trait CredentialStore: Send + Sync {
    /// Read the persisted credential, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the slot exists but cannot be read.
    fn load(&self) -> Result<Option<Credential>, StorageError>;

    /// Overwrite the slot with `credential`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the slot cannot be written.
    fn save(&self, credential: &Credential) -> Result<(), StorageError>;

    /// Empty the slot. Clearing an already empty slot succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the slot exists but cannot be removed.
    fn clear(&self) -> Result<(), StorageError>;
}

// =============================================================================
// FILE
// =============================================================================

/// Credential slot backed by a single file.
#[derive(Clone, Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io { path: self.path.display().to_string(), source }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                Ok((!token.is_empty()).then(|| Credential::new(token)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&self, credential: &Credential) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let mut file = open_owner_only(&self.path).map_err(|e| self.io_error(e))?;
        file.write_all(credential.as_str().as_bytes())
            .map_err(|e| self.io_error(e))
    }

    fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// Open `path` for overwriting, readable and writable by the owner only.
///
/// A new file is created with mode 0600; an existing one is narrowed to 0600
/// before anything is written to it.
fn open_owner_only(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(file)
}

// =============================================================================
// MEMORY
// =============================================================================

/// In-process slot; survives only as long as the value.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot pre-filled with a persisted credential.
    #[must_use]
    pub fn with_credential(credential: Credential) -> Self {
        Self { slot: Mutex::new(Some(credential)) }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Credential>> {
        self.slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credential>, StorageError> {
        Ok(self.lock().clone())
    }

    fn save(&self, credential: &Credential) -> Result<(), StorageError> {
        *self.lock() = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.lock() = None;
        Ok(())
    }
}

impl<T: CredentialStore + ?Sized> CredentialStore for std::sync::Arc<T> {
    fn load(&self) -> Result<Option<Credential>, StorageError> {
        (**self).load()
    }

    fn save(&self, credential: &Credential) -> Result<(), StorageError> {
        (**self).save(credential)
    }

    fn clear(&self) -> Result<(), StorageError> {
        (**self).clear()
    }
}
