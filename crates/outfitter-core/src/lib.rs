//! Core library for outfitter, a client for an outfit-recommendation service.
//!
//! - `api`: JSON-over-HTTP client for the backend (`ApiClient`, `RemoteApi`)
//! - `auth`: credential storage and the session manager with its
//!   refresh-on-expiry retry policy
//! - `config`: backend URL and user preferences
//! - `models`: tokens, garment types, chat turns and galleries
//! - `screens`: headless controllers for the login, register, capture,
//!   chat and profile screens

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod screens;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiClient, ApiError, RemoteApi};
pub use auth::{CredentialBackend, KeyringStore, MemoryStore, SessionError, SessionManager};
pub use config::{ApiConfig, Config};
