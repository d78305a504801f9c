//! Authoritative key -> sound mapping.
//!
//! Written only from the app thread (add/delete/reassign), read from the
//! global listener thread on every key press. An `RwLock` around the whole map
//! keeps each read consistent with a complete write.

use crate::{AppError, AppResult, BindingId, KeyId};

use std::{
    collections::HashMap,
    panic::Location,
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use error_location::ErrorLocation;
use tracing::{debug, error, instrument};

/// What a key resolves to: the sound and the clip to play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredSound {
    /// Bound sound.
    pub binding_id: BindingId,
    /// Clip played on key press.
    pub file_path: PathBuf,
}

/// Cloneable handle to the shared key registry.
#[derive(Debug, Clone, Default)]
pub struct KeyBindingRegistry {
    entries: Arc<RwLock<HashMap<KeyId, RegisteredSound>>>,
}

impl KeyBindingRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `key` to `binding_id`.
    ///
    /// Rebinding a key to the sound that already holds it refreshes the entry.
    /// A key held by a different sound is rejected with `AlreadyBound` and the
    /// existing entry is left untouched.
    #[track_caller]
    #[instrument(skip(self, file_path))]
    pub fn bind(&self, key: KeyId, binding_id: BindingId, file_path: &Path) -> AppResult<()> {
        let mut entries = self.write();

        if let Some(existing) = entries.get(&key).filter(|e| e.binding_id != binding_id) {
            return Err(AppError::AlreadyBound {
                key,
                bound_to: existing.binding_id,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        debug!(key = %key, binding_id = %binding_id, "Key bound");
        entries.insert(
            key,
            RegisteredSound {
                binding_id,
                file_path: file_path.to_path_buf(),
            },
        );

        Ok(())
    }

    /// Remove the mapping for `key`, if any.
    pub fn unbind(&self, key: &KeyId) {
        if let Some(removed) = self.write().remove(key) {
            debug!(key = %key, binding_id = %removed.binding_id, "Key unbound");
        }
    }

    /// Sound currently bound to `key`.
    #[cfg(test)]
    pub fn lookup(&self, key: &KeyId) -> Option<BindingId> {
        self.read().get(key).map(|entry| entry.binding_id)
    }

    /// Sound and clip path bound to `key`.
    pub fn resolve(&self, key: &KeyId) -> Option<RegisteredSound> {
        self.read().get(key).cloned()
    }

    /// True when `key` is held by a sound other than `binding_id`.
    pub fn is_bound_elsewhere(&self, key: &KeyId, binding_id: BindingId) -> bool {
        self.read()
            .get(key)
            .is_some_and(|entry| entry.binding_id != binding_id)
    }

    /// Number of bound keys.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// True when no key is bound.
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A poisoned lock still holds a complete map: every write is a single
    // insert or remove.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<KeyId, RegisteredSound>> {
        self.entries.read().unwrap_or_else(|e| {
            error!("Key registry lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<KeyId, RegisteredSound>> {
        self.entries.write().unwrap_or_else(|e| {
            error!("Key registry lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }
}
