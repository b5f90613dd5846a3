use tracing::warn;

use super::{Notice, Route, Services};

/// Account details and sign-out.
#[derive(Debug, Default)]
pub struct ProfileScreen {
    pub email: Option<String>,
}

impl ProfileScreen {
    /// Read the signed-in email from the credential store
    pub fn load(services: &Services) -> Self {
        let email = services.session.email().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read stored email");
            None
        });
        Self { email }
    }

    pub fn display_email(&self) -> &str {
        self.email.as_deref().unwrap_or("(unknown)")
    }

    /// Remove every stored credential and go back to the login form
    pub fn sign_out(&mut self, services: &Services) -> Result<Route, Notice> {
        services
            .session
            .clear_session()
            .map_err(|e| Notice::from_session("Sign out failed", &e, "Please try again."))?;
        self.email = None;
        Ok(Route::Login { email: None })
    }
}
