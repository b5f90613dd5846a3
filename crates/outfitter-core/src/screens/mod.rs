//! Headless screen controllers.
//!
//! Each screen holds its own view state and talks to the backend through
//! `Services`. Nothing is shared between screens except what flows through
//! the credential store.
//!
//! - `auth_gate`: picks the region (sign-in flow or main app) to show
//! - `LoginScreen`, `RegisterScreen`: sign-in flow
//! - `CaptureScreen`: garment photo + type, uploaded with token refresh
//! - `ChatScreen`: outfit conversation and image gallery
//! - `ProfileScreen`: account email and sign-out

pub mod capture;
pub mod chat;
pub mod login;
pub mod profile;
pub mod register;

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::api::{ApiError, RemoteApi};
use crate::auth::{CredentialBackend, SessionError, SessionManager};

pub use capture::CaptureScreen;
pub use chat::ChatScreen;
pub use login::LoginScreen;
pub use profile::ProfileScreen;
pub use register::RegisterScreen;

/// Session manager over a shared, type-erased credential store
pub type SharedSession = SessionManager<Arc<dyn CredentialBackend>>;

/// Backend and session handles handed to every screen.
/// Clone is cheap - both halves are reference counted.
#[derive(Clone)]
pub struct Services {
    pub api: Arc<dyn RemoteApi>,
    pub session: Arc<SharedSession>,
}

impl Services {
    pub fn new(api: Arc<dyn RemoteApi>, store: Arc<dyn CredentialBackend>) -> Self {
        Self {
            api,
            session: Arc::new(SessionManager::new(store)),
        }
    }
}

/// Where the app should be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Main app region (chat, capture, profile)
    Main,
    /// Login form, optionally pre-filled
    Login { email: Option<String> },
    Register,
}

impl Route {
    pub fn is_auth_flow(&self) -> bool {
        matches!(self, Route::Login { .. } | Route::Register)
    }
}

/// Redirect decision for the current route: signed-out users are sent to
/// the login form, signed-in users are taken out of the sign-in flow.
/// `None` means stay.
pub fn auth_gate(session: &SharedSession, current: &Route) -> Option<Route> {
    let signed_in = session.is_authenticated();
    match (signed_in, current.is_auth_flow()) {
        (false, false) => Some(Route::Login { email: None }),
        (true, true) => Some(Route::Main),
        _ => None,
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Email and password required")]
    MissingCredentials,

    #[error("Take a photo of the garment first")]
    MissingPhoto,

    #[error("Choose a garment type first")]
    MissingGarmentType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Required input is missing
    Validation,
    /// No reply from the server
    Network,
    /// The user has to sign in again
    Authentication,
    /// The server refused the request
    Server,
}

/// User-facing message produced by a failed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    fn new(kind: NoticeKind, title: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.to_string(),
            message: message.into(),
        }
    }

    pub fn validation(error: ValidationError) -> Self {
        Self::new(NoticeKind::Validation, "Missing information", error.to_string())
    }

    /// Transport failures get a network notice; anything else shows the
    /// server's code, or `fallback` when it sent none.
    pub fn from_api(title: &str, error: &ApiError, fallback: &str) -> Self {
        if let ApiError::NetworkError(e) = error {
            return Self::new(NoticeKind::Network, "Network error", e.to_string());
        }
        Self::new(NoticeKind::Server, title, error.code().unwrap_or(fallback))
    }

    pub fn from_session(title: &str, error: &SessionError, fallback: &str) -> Self {
        match error {
            SessionError::Api(e) => Self::from_api(title, e, fallback),
            SessionError::MissingCredential(_) => {
                Self::new(NoticeKind::Authentication, "Not signed in", error.to_string())
            }
            SessionError::AuthenticationFailed => {
                Self::new(NoticeKind::Authentication, "Session expired", error.to_string())
            }
            SessionError::Store(e) => {
                warn!(error = %e, "Credential store failure");
                Self::new(NoticeKind::Server, title, error.to_string())
            }
        }
    }

    pub fn requires_sign_in(&self) -> bool {
        self.kind == NoticeKind::Authentication
    }
}
