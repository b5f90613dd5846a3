use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use keyring::Entry;
use thiserror::Error;

/// Keychain service name all entries are filed under
const SERVICE_NAME: &str = "outfitter";

/// The three independently stored credential entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKey {
    AccessToken,
    RefreshToken,
    Email,
}

impl CredentialKey {
    pub const ALL: [CredentialKey; 3] = [
        CredentialKey::AccessToken,
        CredentialKey::RefreshToken,
        CredentialKey::Email,
    ];

    /// Storage key name
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKey::AccessToken => "jwt",
            CredentialKey::RefreshToken => "refresh_token",
            CredentialKey::Email => "email",
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Keychain access failed for '{key}': {source}")]
    Keyring {
        key: &'static str,
        #[source]
        source: keyring::Error,
    },
}

/// Durable key-value storage for credentials.
///
/// Deleting an entry that does not exist succeeds.
pub trait CredentialBackend: Send + Sync {
    fn get(&self, key: CredentialKey) -> Result<Option<String>, StoreError>;
    fn set(&self, key: CredentialKey, value: &str) -> Result<(), StoreError>;
    fn delete(&self, key: CredentialKey) -> Result<(), StoreError>;
}

impl<T: CredentialBackend + ?Sized> CredentialBackend for Arc<T> {
    fn get(&self, key: CredentialKey) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: CredentialKey, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: CredentialKey) -> Result<(), StoreError> {
        (**self).delete(key)
    }
}

/// Credentials kept in the OS keychain, one entry per key.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: CredentialKey) -> Result<Entry, StoreError> {
        Entry::new(&self.service, key.as_str()).map_err(|source| StoreError::Keyring {
            key: key.as_str(),
            source,
        })
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new(SERVICE_NAME)
    }
}

impl CredentialBackend for KeyringStore {
    fn get(&self, key: CredentialKey) -> Result<Option<String>, StoreError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(source) => Err(StoreError::Keyring {
                key: key.as_str(),
                source,
            }),
        }
    }

    fn set(&self, key: CredentialKey, value: &str) -> Result<(), StoreError> {
        self.entry(key)?
            .set_password(value)
            .map_err(|source| StoreError::Keyring {
                key: key.as_str(),
                source,
            })
    }

    fn delete(&self, key: CredentialKey) -> Result<(), StoreError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(source) => Err(StoreError::Keyring {
                key: key.as_str(),
                source,
            }),
        }
    }
}

/// Process-local store, for tests and hosts without a keychain
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<CredentialKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<CredentialKey, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CredentialBackend for MemoryStore {
    fn get(&self, key: CredentialKey) -> Result<Option<String>, StoreError> {
        Ok(self.entries().get(&key).cloned())
    }

    fn set(&self, key: CredentialKey, value: &str) -> Result<(), StoreError> {
        self.entries().insert(key, value.to_string());
        Ok(())
    }

    fn delete(&self, key: CredentialKey) -> Result<(), StoreError> {
        self.entries().remove(&key);
        Ok(())
    }
}
