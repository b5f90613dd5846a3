//! Authentication module for managing user sessions and credentials.
//!
//! This module provides:
//! - `CredentialBackend`: get/set/delete of the three stored entries
//!   (`jwt`, `refresh_token`, `email`), backed by the OS keychain via
//!   `KeyringStore` or by `MemoryStore`
//! - `SessionManager`: the authentication gate and the refresh-on-expiry
//!   retry policy for protected calls
//!
//! No expiry timestamp is kept locally. An expired access token is only
//! discovered when the server rejects a protected call.

pub mod credentials;
pub mod session;

pub use credentials::{CredentialBackend, CredentialKey, KeyringStore, MemoryStore, StoreError};
pub use session::{SessionError, SessionManager};
