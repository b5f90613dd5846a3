use serde_json::Value;
use thiserror::Error;

/// Server error code signalling that the access token has expired
pub const EXPIRED_TOKEN_CODE: &str = "expired_jwt";

/// Server error code returned by `/register` for an address already in use
pub const EMAIL_EXISTS_CODE: &str = "email_exists";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access token expired")]
    ExpiredToken,

    #[error("{}", describe_rejection(.status, .code))]
    Server { status: u16, code: Option<String> },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

fn describe_rejection(status: &u16, code: &Option<String>) -> String {
    match code {
        Some(code) => format!("Server rejected request ({}): {}", status, code),
        None => format!("Server rejected request: status {}", status),
    }
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Build the error for a non-success reply. The server reports failures
    /// as `{"status": "ERROR", "ERROR": "<code>"}`; the expiry code is lifted
    /// into its own variant so the session layer can refresh on it.
    pub fn from_reply(status: u16, body: &Value) -> Self {
        match body.get("ERROR").and_then(Value::as_str) {
            Some(EXPIRED_TOKEN_CODE) => ApiError::ExpiredToken,
            Some(code) => ApiError::Server {
                status,
                code: Some(code.to_string()),
            },
            None => ApiError::Server { status, code: None },
        }
    }

    /// Server-supplied error code, if the failure carried one
    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::ExpiredToken => Some(EXPIRED_TOKEN_CODE),
            ApiError::Server { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// True when no usable reply came back (connection, DNS, timeout, body read)
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::NetworkError(_))
    }

    pub fn is_email_exists(&self) -> bool {
        self.code() == Some(EMAIL_EXISTS_CODE)
    }
}
