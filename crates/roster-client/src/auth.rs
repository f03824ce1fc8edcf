//! Session authenticator
//!
//! Exchanges credentials for a bearer token once per run. The token is taken
//! from a `token` cookie when the platform sets one, otherwise from the
//! `token` field of the JSON body.

use crate::credentials::{AuthMode, Credentials};
use crate::endpoints::Endpoints;
use crate::error::{ClientError, ClientResult};
use crate::transport::HttpTransport;
use reqwest::header::{HeaderMap, SET_COOKIE};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

const TOKEN_COOKIE: &str = "token";

/// Bearer token for the current run
#[derive(Debug, Clone)]
pub struct SessionToken(Secret<String>);

impl SessionToken {
    #[must_use]
    pub fn new(token: String) -> Self {
        Self(Secret::new(token))
    }

    /// Raw token value for the `Authorization` header
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

#[derive(Deserialize)]
struct TokenBody {
    #[serde(default)]
    token: Option<String>,
}

/// Log in and return the session token
///
/// Uses the password flow when a password is set, else the access-token flow.
/// Never retried.
///
/// # Errors
/// - `Configuration` if no usable credentials are set
/// - `Authentication` on a non-success response
/// - `MissingToken` if neither the cookie nor the body carries a token
pub async fn authenticate(
    transport: &HttpTransport,
    endpoints: &Endpoints,
    credentials: &Credentials,
) -> ClientResult<SessionToken> {
    let email = credentials.email.as_str();
    let (url, flow, form) = match credentials.auth_mode()? {
        AuthMode::Password(password) => (
            endpoints.auth_v1.as_str(),
            "password",
            [("email", email), ("password", password.expose_secret().as_str())],
        ),
        AuthMode::AccessToken(token) => (
            endpoints.auth_v2.as_str(),
            "access-token",
            [("email", email), ("accesstoken", token.expose_secret().as_str())],
        ),
    };

    tracing::info!(url, flow, "Authenticating");
    let response = transport.post_form(url, &form).await?;
    let status = response.status();
    let cookie_token = token_from_cookies(response.headers());
    let body = response.text().await?;

    if !status.is_success() {
        tracing::error!(%status, body = %body, "Authentication failed");
        return Err(ClientError::Authentication {
            status: status.as_u16(),
            body,
        });
    }

    let token = cookie_token
        .or_else(|| token_from_body(&body))
        .ok_or(ClientError::MissingToken)?;
    tracing::info!(flow, "Authenticated");
    Ok(SessionToken::new(token))
}

fn token_from_cookies(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|cookie| cookie.split(';').next()?.split_once('='))
        .find(|(name, value)| name.trim() == TOKEN_COOKIE && !value.trim().is_empty())
        .map(|(_, value)| value.trim().to_string())
}

fn token_from_body(body: &str) -> Option<String> {
    serde_json::from_str::<TokenBody>(body)
        .ok()?
        .token
        .filter(|t| !t.is_empty())
}
