use tracing::{debug, error, info};

use super::{Notice, Route, Services, ValidationError};

/// Account creation form.
#[derive(Debug, Default)]
pub struct RegisterScreen {
    pub email: String,
    pub password: String,
}

impl RegisterScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the account and sign in.
    ///
    /// An `email_exists` rejection is retried as a login with the same
    /// credentials. If the server rejects that login too, the user is routed
    /// to the login form with the email pre-filled instead of seeing a
    /// registration error. A transport failure is reported as a notice.
    pub async fn submit(&mut self, services: &Services) -> Result<Route, Notice> {
        let email = self.email.trim().to_string();
        if email.is_empty() || self.password.is_empty() {
            return Err(Notice::validation(ValidationError::MissingCredentials));
        }

        let tokens = match services.api.register(&email, &self.password).await {
            Ok(tokens) => tokens,
            Err(e) if e.is_email_exists() => {
                info!("Email already registered, trying login");
                match services.api.login(&email, &self.password).await {
                    Ok(tokens) => tokens,
                    Err(e) if e.is_transport() => {
                        error!(error = %e, "Login after registration failed");
                        return Err(Notice::from_api("Registration failed", &e, "Please try again."));
                    }
                    Err(e) => {
                        debug!(error = %e, "Login with registration credentials failed");
                        self.password.clear();
                        return Ok(Route::Login { email: Some(email) });
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "Registration failed");
                return Err(Notice::from_api("Registration failed", &e, "Please try again."));
            }
        };

        services
            .session
            .save_session(&tokens.access_token, &tokens.refresh_token, &email)
            .map_err(|e| Notice::from_session("Registration failed", &e, "Could not save session."))?;
        self.password.clear();
        info!("Registration successful");
        Ok(Route::Main)
    }
}
