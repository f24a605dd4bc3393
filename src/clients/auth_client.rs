//! Supabase authentication client module
//!
//! Resolves access tokens into [`Session`] values and signs users in with
//! email and password.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use crate::core::config::{AppConfig, service_url};
use crate::core::session::{Session, SessionProvider};
use crate::errors::GatewayError;

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: Uuid,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: UserResponse,
}

/// Auth errors come back as either `{error_description}` or `{msg}`.
#[derive(Debug, Default, Deserialize)]
struct AuthErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

impl AuthErrorBody {
    fn into_message(self, status: StatusCode) -> String {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .unwrap_or_else(|| format!("HTTP {status}"))
    }
}

pub struct AuthClient {
    http: Client,
    auth_url: Url,
    anon_key: String,
    access_token: Option<String>,
}

impl AuthClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the base URL
    /// cannot be extended with the auth path.
    pub fn new(config: &AppConfig) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| GatewayError::HttpError(format!("Failed to build HTTP client: {e}")))?;
        let auth_url = service_url(&config.supabase_url, "auth/v1/")?;

        Ok(Self {
            http,
            auth_url,
            anon_key: config.supabase_anon_key.clone(),
            access_token: config.access_token.clone(),
        })
    }

    /// Replaces the token resolved by [`SessionProvider::current_session`].
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.auth_url
            .join(path)
            .map_err(|e| GatewayError::ConfigError(format!("auth endpoint {path}: {e}")))
    }

    /// Looks up the user owning `access_token`.
    ///
    /// An expired or rejected token yields `Session::Anonymous`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn session_for_token(&self, access_token: &str) -> Result<Session, GatewayError> {
        let resp = self
            .http
            .get(self.endpoint("user")?)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| GatewayError::HttpError(format!("Failed to fetch user: {e}")))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(%status, "Access token rejected; continuing without session");
            return Ok(Session::Anonymous);
        }
        if !status.is_success() {
            let body: AuthErrorBody = resp.json().await.unwrap_or_default();
            return Err(GatewayError::AuthError(body.into_message(status)));
        }

        let user: UserResponse = resp
            .json()
            .await
            .map_err(|e| GatewayError::DecodeError(format!("user JSON parse error: {e}")))?;
        Ok(Session::authenticated(user.id, user.email, access_token))
    }

    /// # Errors
    ///
    /// Returns `GatewayError::AuthError` when the credentials are refused.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, GatewayError> {
        let mut url = self.endpoint("token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let resp = self
            .http
            .post(url)
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| GatewayError::HttpError(format!("Failed to sign in: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body: AuthErrorBody = resp.json().await.unwrap_or_default();
            return Err(GatewayError::AuthError(body.into_message(status)));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| GatewayError::DecodeError(format!("token JSON parse error: {e}")))?;
        info!(user_id = %token.user.id, "Signed in");
        Ok(Session::authenticated(
            token.user.id,
            token.user.email,
            token.access_token,
        ))
    }
}

#[async_trait]
impl SessionProvider for AuthClient {
    async fn current_session(&self) -> Result<Session, GatewayError> {
        match &self.access_token {
            Some(token) => self.session_for_token(token).await,
            None => Ok(Session::Anonymous),
        }
    }
}
