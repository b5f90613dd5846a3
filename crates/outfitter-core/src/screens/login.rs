use tracing::{error, info};

use super::{Notice, Route, Services, ValidationError};

/// Sign-in form.
#[derive(Debug, Default)]
pub struct LoginScreen {
    pub email: String,
    pub password: String,
}

impl LoginScreen {
    /// Open the form, optionally pre-filled with an email
    pub fn new(email: Option<String>) -> Self {
        Self {
            email: email.unwrap_or_default(),
            password: String::new(),
        }
    }

    /// Attempt login with the credentials from the form. On success the
    /// session is saved and the password cleared.
    pub async fn submit(&mut self, services: &Services) -> Result<Route, Notice> {
        let email = self.email.trim().to_string();
        if email.is_empty() || self.password.is_empty() {
            return Err(Notice::validation(ValidationError::MissingCredentials));
        }

        match services.api.login(&email, &self.password).await {
            Ok(tokens) => {
                services
                    .session
                    .save_session(&tokens.access_token, &tokens.refresh_token, &email)
                    .map_err(|e| Notice::from_session("Login failed", &e, "Could not save session."))?;
                self.password.clear();
                info!("Login successful");
                Ok(Route::Main)
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                Err(Notice::from_api("Login failed", &e, "Check your credentials."))
            }
        }
    }
}
