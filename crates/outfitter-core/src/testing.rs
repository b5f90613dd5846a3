//! Scripted `RemoteApi` for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{ApiError, RemoteApi};
use crate::models::{AuthTokens, ChatReply, ChatTurn, GarmentType};

/// Replies are queued per endpoint and handed out in order; every call is
/// recorded as a short string such as `login:a@b.com` or `refresh:J0:R1`.
#[derive(Default)]
pub struct MockApi {
    calls: Mutex<Vec<String>>,
    login: Mutex<VecDeque<Result<AuthTokens, ApiError>>>,
    register: Mutex<VecDeque<Result<AuthTokens, ApiError>>>,
    refresh: Mutex<VecDeque<Result<String, ApiError>>>,
    upload: Mutex<VecDeque<Result<(), ApiError>>>,
    chat: Mutex<VecDeque<Result<ChatReply, ApiError>>>,
    last_conversation: Mutex<Vec<ChatTurn>>,
    slow_refresh: bool,
}

pub fn tokens(access: &str, refresh: &str) -> AuthTokens {
    AuthTokens {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
    }
}

pub fn server_error(code: &str) -> ApiError {
    ApiError::Server {
        status: 400,
        code: Some(code.to_string()),
    }
}

/// Transport failure from a request reqwest refuses to send
pub async fn network_error() -> ApiError {
    ApiError::NetworkError(reqwest::get("not a url").await.unwrap_err())
}

fn next<T>(queue: &Mutex<VecDeque<T>>, endpoint: &str) -> T {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| panic!("unexpected {} call", endpoint))
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `refresh` yield to the scheduler once before answering
    pub fn with_slow_refresh(mut self) -> Self {
        self.slow_refresh = true;
        self
    }

    pub fn push_login(&self, reply: Result<AuthTokens, ApiError>) {
        self.login.lock().unwrap().push_back(reply);
    }

    pub fn push_register(&self, reply: Result<AuthTokens, ApiError>) {
        self.register.lock().unwrap().push_back(reply);
    }

    pub fn push_refresh(&self, reply: Result<String, ApiError>) {
        self.refresh.lock().unwrap().push_back(reply);
    }

    pub fn push_upload(&self, reply: Result<(), ApiError>) {
        self.upload.lock().unwrap().push_back(reply);
    }

    pub fn push_chat(&self, reply: Result<ChatReply, ApiError>) {
        self.chat.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn refresh_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.starts_with("refresh:"))
            .count()
    }

    pub fn last_conversation(&self) -> Vec<ChatTurn> {
        self.last_conversation.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RemoteApi for MockApi {
    async fn login(&self, email: &str, _password: &str) -> Result<AuthTokens, ApiError> {
        self.record(format!("login:{}", email));
        next(&self.login, "login")
    }

    async fn register(&self, email: &str, _password: &str) -> Result<AuthTokens, ApiError> {
        self.record(format!("register:{}", email));
        next(&self.register, "register")
    }

    async fn refresh(&self, access_token: &str, refresh_token: &str) -> Result<String, ApiError> {
        self.record(format!("refresh:{}:{}", access_token, refresh_token));
        if self.slow_refresh {
            tokio::task::yield_now().await;
        }
        next(&self.refresh, "refresh")
    }

    async fn upload_garment(
        &self,
        access_token: &str,
        image: &[u8],
        garment: GarmentType,
    ) -> Result<(), ApiError> {
        self.record(format!("upload:{}:{}:{}", access_token, garment, image.len()));
        next(&self.upload, "upload")
    }

    async fn chat(
        &self,
        conversation: &[ChatTurn],
        access_token: Option<&str>,
    ) -> Result<ChatReply, ApiError> {
        self.record(format!(
            "chat:{}:{}",
            conversation.len(),
            access_token.unwrap_or("-")
        ));
        *self.last_conversation.lock().unwrap() = conversation.to_vec();
        next(&self.chat, "chat")
    }
}
