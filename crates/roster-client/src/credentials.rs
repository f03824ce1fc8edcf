//! Platform credentials

use crate::error::{ClientError, ClientResult};
use secrecy::{ExposeSecret, Secret};

/// Tenant plus one of the two supported login methods
#[derive(Debug, Clone)]
pub struct Credentials {
    pub tenant: String,
    pub email: String,
    pub password: Option<Secret<String>>,
    pub access_token: Option<Secret<String>>,
}

/// The login flow selected for a run
#[derive(Debug, Clone, Copy)]
pub enum AuthMode<'a> {
    /// `email` + `password` against the v1 endpoint
    Password(&'a Secret<String>),
    /// `email` + `accesstoken` against the v2 endpoint
    AccessToken(&'a Secret<String>),
}

impl Credentials {
    /// Pick the login flow; a non-empty password wins over a token
    ///
    /// # Errors
    /// Returns `Configuration` if the tenant or email is blank, or if neither
    /// a password nor an access token is set
    pub fn auth_mode(&self) -> ClientResult<AuthMode<'_>> {
        if self.tenant.trim().is_empty() {
            return Err(ClientError::Configuration(
                "tenant identifier is not set".to_string(),
            ));
        }
        if self.email.trim().is_empty() {
            return Err(ClientError::Configuration("email is not set".to_string()));
        }

        if let Some(password) = non_empty(self.password.as_ref()) {
            return Ok(AuthMode::Password(password));
        }
        if let Some(token) = non_empty(self.access_token.as_ref()) {
            return Ok(AuthMode::AccessToken(token));
        }
        Err(ClientError::Configuration(
            "either a password or an access token is required".to_string(),
        ))
    }
}

fn non_empty(secret: Option<&Secret<String>>) -> Option<&Secret<String>> {
    secret.filter(|s| !s.expose_secret().is_empty())
}
