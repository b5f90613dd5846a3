//! Data models for the outfitter service.
//!
//! This module contains the wire and view types shared by the API client,
//! the session manager and the screen controllers:
//!
//! - `AuthTokens`: access/refresh token pair returned by login and register
//! - `GarmentType`: the closed set of categories attached to an upload
//! - `ChatTurn`, `ChatRole`, `ChatReply`: conversation state and server replies
//! - `Gallery`: per-garment cursor over the images of an outfit reply

pub mod auth;
pub mod chat;
pub mod garment;

pub use auth::AuthTokens;
pub use chat::{image_mime_type, ChatReply, ChatRole, ChatTurn, Gallery, ImagesByType};
pub use garment::{GarmentType, UnknownGarmentType};
