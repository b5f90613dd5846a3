use std::future::Future;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::{ApiError, RemoteApi};

use super::credentials::{CredentialBackend, CredentialKey, StoreError};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Not signed in: no {0} stored")]
    MissingCredential(&'static str),

    #[error("Session expired - please sign in again")]
    AuthenticationFailed,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    /// Request never got a usable reply
    pub fn is_transport(&self) -> bool {
        matches!(self, SessionError::Api(e) if e.is_transport())
    }

    /// The user has to sign in again
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            SessionError::MissingCredential(_) | SessionError::AuthenticationFailed
        )
    }
}

/// Session state on top of a credential store.
///
/// The signed-in check only looks for a stored refresh token; whether the
/// server still accepts it is learned when a protected call is made.
pub struct SessionManager<S> {
    store: S,
    /// Serializes refreshes so concurrent expired calls share one
    refresh_lock: Mutex<()>,
}

impl<S: CredentialBackend> SessionManager<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// True iff a refresh token is stored. A store failure counts as signed out.
    pub fn is_authenticated(&self) -> bool {
        match self.store.get(CredentialKey::RefreshToken) {
            Ok(token) => token.is_some(),
            Err(e) => {
                warn!(error = %e, "Failed to read refresh token");
                false
            }
        }
    }

    /// Persist a freshly issued token pair and the account email
    pub fn save_session(
        &self,
        access_token: &str,
        refresh_token: &str,
        email: &str,
    ) -> Result<(), SessionError> {
        self.store.set(CredentialKey::AccessToken, access_token)?;
        self.store.set(CredentialKey::RefreshToken, refresh_token)?;
        self.store.set(CredentialKey::Email, email)?;
        info!("Session saved");
        Ok(())
    }

    /// Remove all three entries. Every delete is attempted even if an
    /// earlier one fails; the first failure is returned.
    pub fn clear_session(&self) -> Result<(), SessionError> {
        let mut first_error = None;
        for key in CredentialKey::ALL {
            if let Err(e) = self.store.delete(key) {
                warn!(key = key.as_str(), error = %e, "Failed to delete credential");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => {
                info!("Session cleared");
                Ok(())
            }
        }
    }

    pub fn access_token(&self) -> Result<Option<String>, SessionError> {
        Ok(self.store.get(CredentialKey::AccessToken)?)
    }

    pub fn email(&self) -> Result<Option<String>, SessionError> {
        Ok(self.store.get(CredentialKey::Email)?)
    }

    fn require(&self, key: CredentialKey, what: &'static str) -> Result<String, SessionError> {
        self.store
            .get(key)?
            .ok_or(SessionError::MissingCredential(what))
    }

    /// Run a protected call with the stored access token.
    ///
    /// If the server answers with the expiry sentinel, the access token is
    /// refreshed once and the call retried once with the new token. Any other
    /// outcome of the first attempt is returned as is. A failed refresh ends
    /// in `AuthenticationFailed` without a retry.
    pub async fn call_with_refresh<A, T, F, Fut>(
        &self,
        api: &A,
        request: F,
    ) -> Result<T, SessionError>
    where
        A: RemoteApi + ?Sized,
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let access_token = self.require(CredentialKey::AccessToken, "access token")?;
        self.require(CredentialKey::RefreshToken, "refresh token")?;

        match request(access_token.clone()).await {
            Err(ApiError::ExpiredToken) => {
                debug!("Access token expired, refreshing");
            }
            other => return other.map_err(SessionError::from),
        }

        let fresh_token = self.refresh_access_token(api, &access_token).await?;

        match request(fresh_token).await {
            Err(ApiError::ExpiredToken) => {
                warn!("Server rejected the refreshed access token");
                Err(SessionError::AuthenticationFailed)
            }
            other => other.map_err(SessionError::from),
        }
    }

    /// Obtain a replacement for `rejected`. If another caller already
    /// replaced it while this one waited for the lock, the stored token is
    /// reused and no request is sent.
    async fn refresh_access_token<A>(&self, api: &A, rejected: &str) -> Result<String, SessionError>
    where
        A: RemoteApi + ?Sized,
    {
        let _guard = self.refresh_lock.lock().await;

        let refresh_token = self.require(CredentialKey::RefreshToken, "refresh token")?;
        if let Some(current) = self.store.get(CredentialKey::AccessToken)? {
            if current != rejected {
                debug!("Access token already refreshed by a concurrent call");
                return Ok(current);
            }
        }

        match api.refresh(rejected, &refresh_token).await {
            Ok(fresh) => {
                self.store.set(CredentialKey::AccessToken, &fresh)?;
                info!("Access token refreshed");
                Ok(fresh)
            }
            Err(e) if e.is_transport() => Err(e.into()),
            Err(e) => {
                warn!(error = %e, "Token refresh rejected");
                Err(SessionError::AuthenticationFailed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    use super::*;
    use crate::auth::MemoryStore;
    use crate::testing::{network_error, MockApi};

    fn signed_in(access: &str) -> SessionManager<MemoryStore> {
        let session = SessionManager::new(MemoryStore::new());
        session.save_session(access, "R1", "a@b.com").unwrap();
        session
    }

    /// Protected call that accepts only `valid` and reports expiry otherwise
    struct Endpoint {
        valid: &'static str,
        seen: StdMutex<Vec<String>>,
    }

    impl Endpoint {
        fn accepting(valid: &'static str) -> Self {
            Self {
                valid,
                seen: StdMutex::new(Vec::new()),
            }
        }

        fn call(&self, token: String) -> std::future::Ready<Result<String, ApiError>> {
            let result = if token == self.valid {
                Ok(format!("ok:{}", token))
            } else {
                Err(ApiError::ExpiredToken)
            };
            self.seen.lock().unwrap().push(token);
            std::future::ready(result)
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[test]
    fn test_save_then_clear_toggles_authentication() {
        let session = SessionManager::new(MemoryStore::new());
        assert!(!session.is_authenticated());

        for _ in 0..3 {
            session.save_session("J1", "R1", "a@b.com").unwrap();
            assert!(session.is_authenticated());
            assert_eq!(session.email().unwrap().as_deref(), Some("a@b.com"));

            session.clear_session().unwrap();
            assert!(!session.is_authenticated());
            for key in CredentialKey::ALL {
                assert_eq!(session.store().get(key).unwrap(), None);
            }
        }
    }

    #[test]
    fn test_authentication_is_refresh_token_presence_only() {
        let session = SessionManager::new(MemoryStore::new());
        session.store().set(CredentialKey::AccessToken, "J1").unwrap();
        assert!(!session.is_authenticated());

        session.store().set(CredentialKey::RefreshToken, "revoked").unwrap();
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_success_first_try_skips_refresh() {
        let session = signed_in("J1");
        let api = MockApi::new();
        let endpoint = Endpoint::accepting("J1");

        let result = session
            .call_with_refresh(&api, |token| endpoint.call(token))
            .await
            .unwrap();

        assert_eq!(result, "ok:J1");
        assert_eq!(endpoint.seen(), vec!["J1"]);
        assert_eq!(api.refresh_count(), 0);
    }

    #[tokio::test]
    async fn test_expired_token_refreshes_and_retries_once() {
        let session = signed_in("J0");
        let api = MockApi::new();
        api.push_refresh(Ok("J1".to_string()));
        let endpoint = Endpoint::accepting("J1");

        let result = session
            .call_with_refresh(&api, |token| endpoint.call(token))
            .await
            .unwrap();

        assert_eq!(result, "ok:J1");
        assert_eq!(endpoint.seen(), vec!["J0", "J1"]);
        assert_eq!(api.calls(), vec!["refresh:J0:R1"]);
        assert_eq!(session.access_token().unwrap().as_deref(), Some("J1"));
        assert_eq!(
            session.store().get(CredentialKey::RefreshToken).unwrap().as_deref(),
            Some("R1")
        );
    }

    #[tokio::test]
    async fn test_refresh_rejected_is_authentication_failure_without_retry() {
        let session = signed_in("J0");
        let api = MockApi::new();
        api.push_refresh(Err(ApiError::Server { status: 401, code: None }));
        let endpoint = Endpoint::accepting("J1");

        let err = session
            .call_with_refresh(&api, |token| endpoint.call(token))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::AuthenticationFailed));
        assert!(err.is_authentication());
        assert!(!err.is_transport());
        assert_eq!(endpoint.seen(), vec!["J0"]);
        assert_eq!(api.refresh_count(), 1);
        assert_eq!(session.access_token().unwrap().as_deref(), Some("J0"));
    }

    #[tokio::test]
    async fn test_refresh_transport_failure_stays_transport_error() {
        let session = signed_in("J0");
        let api = MockApi::new();
        api.push_refresh(Err(network_error().await));
        let endpoint = Endpoint::accepting("J1");

        let err = session
            .call_with_refresh(&api, |token| endpoint.call(token))
            .await
            .unwrap_err();

        assert!(err.is_transport());
        assert!(!err.is_authentication());
        assert_eq!(endpoint.seen(), vec!["J0"]);
        assert_eq!(api.refresh_count(), 1);
        assert_eq!(session.access_token().unwrap().as_deref(), Some("J0"));
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_retry_still_expired_stops_after_one_refresh() {
        let session = signed_in("J0");
        let api = MockApi::new();
        api.push_refresh(Ok("J1".to_string()));
        let endpoint = Endpoint::accepting("never");

        let err = session
            .call_with_refresh(&api, |token| endpoint.call(token))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::AuthenticationFailed));
        assert_eq!(endpoint.seen(), vec!["J0", "J1"]);
        assert_eq!(api.refresh_count(), 1);
    }

    #[tokio::test]
    async fn test_non_expiry_failure_is_returned_without_refresh() {
        let session = signed_in("J1");
        let api = MockApi::new();
        let attempts = AtomicUsize::new(0);

        let err = session
            .call_with_refresh(&api, |_token| {
                attempts.fetch_add(1, Ordering::SeqCst);
                std::future::ready(Err::<(), _>(ApiError::Server {
                    status: 400,
                    code: Some("bad_image".to_string()),
                }))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Api(ref e) if e.code() == Some("bad_image")));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(api.refresh_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_tokens_fail_before_any_request() {
        let api = MockApi::new();
        let endpoint = Endpoint::accepting("J1");

        let session = SessionManager::new(MemoryStore::new());
        let err = session
            .call_with_refresh(&api, |token| endpoint.call(token))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::MissingCredential("access token")));

        session.store().set(CredentialKey::AccessToken, "J1").unwrap();
        let err = session
            .call_with_refresh(&api, |token| endpoint.call(token))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::MissingCredential("refresh token")));

        assert!(endpoint.seen().is_empty());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_expired_calls_share_one_refresh() {
        let session = signed_in("J0");
        let api = MockApi::new().with_slow_refresh();
        api.push_refresh(Ok("J1".to_string()));
        let endpoint = Endpoint::accepting("J1");

        let (a, b) = futures::join!(
            session.call_with_refresh(&api, |token| endpoint.call(token)),
            session.call_with_refresh(&api, |token| endpoint.call(token)),
        );

        assert_eq!(a.unwrap(), "ok:J1");
        assert_eq!(b.unwrap(), "ok:J1");
        assert_eq!(api.refresh_count(), 1);
        assert_eq!(endpoint.seen(), vec!["J0", "J0", "J1", "J1"]);
    }
}
