//! Authenticated identity handed to every gateway operation.

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::GatewayError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    /// Bearer token forwarded to the store so row-level policies apply.
    #[serde(skip_serializing)]
    pub access_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(AuthUser),
}

impl Session {
    #[must_use]
    pub fn authenticated(id: Uuid, email: Option<String>, access_token: impl Into<String>) -> Self {
        Session::Authenticated(AuthUser {
            id,
            email,
            access_token: access_token.into(),
        })
    }

    #[must_use]
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            Session::Authenticated(user) => Some(user),
            Session::Anonymous => None,
        }
    }

    /// # Errors
    ///
    /// Returns `GatewayError::NoSession` for an anonymous session.
    pub fn require_user(&self) -> Result<&AuthUser, GatewayError> {
        self.user().ok_or(GatewayError::NoSession)
    }
}

/// Source of the current authenticated identity.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Resolves the current session; `Session::Anonymous` signals absence.
    async fn current_session(&self) -> Result<Session, GatewayError>;
}

#[async_trait]
impl SessionProvider for Session {
    async fn current_session(&self) -> Result<Session, GatewayError> {
        Ok(self.clone())
    }
}
