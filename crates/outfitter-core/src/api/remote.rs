use async_trait::async_trait;

use crate::models::{AuthTokens, ChatReply, ChatTurn, GarmentType};

use super::ApiError;

/// The calls the client issues against the backend.
///
/// `ApiClient` is the HTTP implementation; the session manager and screen
/// controllers only depend on this trait.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// `POST /login`
    async fn login(&self, email: &str, password: &str) -> Result<AuthTokens, ApiError>;

    /// `POST /register`
    async fn register(&self, email: &str, password: &str) -> Result<AuthTokens, ApiError>;

    /// `POST /updatejwt`, returning the new access token
    async fn refresh(&self, access_token: &str, refresh_token: &str) -> Result<String, ApiError>;

    /// `POST /pushdb`
    async fn upload_garment(
        &self,
        access_token: &str,
        image: &[u8],
        garment: GarmentType,
    ) -> Result<(), ApiError>;

    /// `POST /chat` with the whole conversation so far
    async fn chat(
        &self,
        conversation: &[ChatTurn],
        access_token: Option<&str>,
    ) -> Result<ChatReply, ApiError>;
}
