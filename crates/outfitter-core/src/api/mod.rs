//! REST API client module for the outfitter backend.
//!
//! This module provides the `RemoteApi` trait describing the five calls the
//! client makes, and `ApiClient`, its JSON-over-HTTP implementation against a
//! single configured base endpoint.
//!
//! Protected calls carry the access token in the request body (`jwt` or
//! `jwtString`) rather than in an Authorization header.

pub mod client;
pub mod error;
pub mod remote;

pub use client::ApiClient;
pub use error::{ApiError, EMAIL_EXISTS_CODE, EXPIRED_TOKEN_CODE};
pub use remote::RemoteApi;
