//! API client for communicating with the outfitter backend.
//!
//! Every call is a JSON `POST` against the configured base URL. The server
//! signals success with status 201 and failure with a body of the form
//! `{"status": "ERROR", "ERROR": "<code>"}`.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::models::{AuthTokens, ChatReply, ChatTurn, GarmentType};

use super::{ApiError, RemoteApi};

// ============================================================================
// Constants
// ============================================================================

/// Status the backend answers with when a call succeeded
const SUCCESS_STATUS: u16 = 201;

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    #[serde(rename = "jwt")]
    access_token: &'a str,
    #[serde(rename = "refreshToken")]
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(rename = "jwt")]
    access_token: String,
}

#[derive(Debug, Serialize)]
struct UploadRequest<'a> {
    jwt: &'a str,
    img: String,
    #[serde(rename = "type")]
    garment: GarmentType,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    convo: &'a [ChatTurn],
    #[serde(rename = "jwtString")]
    jwt_string: Option<&'a str>,
}

/// Status code and body of a backend reply. Bodies that are not JSON are
/// kept as `Value::Null` so the status still decides the outcome.
#[derive(Debug)]
struct Reply {
    status: u16,
    body: Value,
    is_json: bool,
}

impl Reply {
    fn parse(status: u16, text: &str) -> Self {
        match serde_json::from_str(text) {
            Ok(body) => Self {
                status,
                body,
                is_json: true,
            },
            Err(_) => {
                if !text.trim().is_empty() {
                    debug!(status, body = %ApiError::truncate_body(text), "Non-JSON response body");
                }
                Self {
                    status,
                    body: Value::Null,
                    is_json: false,
                }
            }
        }
    }

    fn is_created(&self) -> bool {
        self.status == SUCCESS_STATUS
    }

    fn into_error(self) -> ApiError {
        ApiError::from_reply(self.status, &self.body)
    }

    /// Login and register both answer `{jwt, refreshToken}` on success
    fn into_tokens(self) -> Result<AuthTokens, ApiError> {
        if !self.is_created() {
            return Err(self.into_error());
        }
        let tokens: AuthTokens = serde_json::from_value(self.body)
            .map_err(|e| ApiError::InvalidResponse(format!("Missing tokens: {}", e)))?;
        if tokens.access_token.is_empty() || tokens.refresh_token.is_empty() {
            return Err(ApiError::InvalidResponse("Empty token in auth response".to_string()));
        }
        Ok(tokens)
    }

    fn into_access_token(self) -> Result<String, ApiError> {
        if !self.is_created() {
            return Err(self.into_error());
        }
        let refreshed: RefreshResponse = serde_json::from_value(self.body)
            .map_err(|e| ApiError::InvalidResponse(format!("Missing jwt: {}", e)))?;
        if refreshed.access_token.is_empty() {
            return Err(ApiError::InvalidResponse("Empty jwt in refresh response".to_string()));
        }
        Ok(refreshed.access_token)
    }

    fn into_unit(self) -> Result<(), ApiError> {
        if self.is_created() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }

    /// The chat endpoint does not use the 201 convention; the body shape
    /// decides. Any JSON body is a reply (an `ERROR` body is just an
    /// unexpected one); a body that is not JSON is a failure.
    fn into_chat_reply(self) -> Result<ChatReply, ApiError> {
        if !self.is_json {
            return Err(ApiError::InvalidResponse(format!(
                "Chat reply is not JSON (status {})",
                self.status
            )));
        }
        Ok(ChatReply::from_body(&self.body))
    }
}

// ============================================================================
// Client
// ============================================================================

/// HTTP client for the outfitter backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
}

impl ApiClient {
    /// Create a new API client for the given backend
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Reply, ApiError> {
        let url = self.config.endpoint(path);

        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(endpoint = path, error = %e, "Request failed");
                ApiError::from(e)
            })?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        debug!(endpoint = path, status, "Response received");

        Ok(Reply::parse(status, &text))
    }
}

#[async_trait]
impl RemoteApi for ApiClient {
    async fn login(&self, email: &str, password: &str) -> Result<AuthTokens, ApiError> {
        self.post("login", &CredentialsRequest { email, password })
            .await?
            .into_tokens()
    }

    async fn register(&self, email: &str, password: &str) -> Result<AuthTokens, ApiError> {
        self.post("register", &CredentialsRequest { email, password })
            .await?
            .into_tokens()
    }

    async fn refresh(&self, access_token: &str, refresh_token: &str) -> Result<String, ApiError> {
        let body = RefreshRequest {
            access_token,
            refresh_token,
        };
        self.post("updatejwt", &body).await?.into_access_token()
    }

    async fn upload_garment(
        &self,
        access_token: &str,
        image: &[u8],
        garment: GarmentType,
    ) -> Result<(), ApiError> {
        debug!(garment = %garment, bytes = image.len(), "Uploading garment");
        let body = UploadRequest {
            jwt: access_token,
            img: STANDARD.encode(image),
            garment,
        };
        self.post("pushdb", &body).await?.into_unit()
    }

    async fn chat(
        &self,
        conversation: &[ChatTurn],
        access_token: Option<&str>,
    ) -> Result<ChatReply, ApiError> {
        let body = ChatRequest {
            convo: conversation,
            jwt_string: access_token,
        };
        self.post("chat", &body).await?.into_chat_reply()
    }
}
