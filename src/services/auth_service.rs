//! Domain service for accounts: signup, signin and the current user.

use serde::Serialize;
use thiserror::Error;

use crate::auth::TokenError;
use crate::domain::{Role, UnknownRole, UserId};

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("Failed! Username is already in use!")]
    DuplicateUsername,

    #[error("Failed! Email is already in use!")]
    DuplicateEmail,

    /// A unique index rejected the insert; the column is not reported.
    #[error("Failed! Username or email is already in use!")]
    DuplicateAccount,

    #[error("Failed! {0}")]
    UnknownRole(#[from] UnknownRole),

    #[error("Invalid username or password!")]
    InvalidCredentials,

    #[error("User Not found.")]
    UserNotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Signup input after the transport layer has pulled it out of the body.
#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Requested role names. Empty means [`Role::DEFAULT`].
    pub roles: Vec<String>,
}

/// Successful signin: the profile plus a freshly issued bearer token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninResult {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// Authority strings, e.g. `ROLE_USER`
    pub roles: Vec<String>,
    pub access_token: String,
    #[serde(skip)]
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
    pub created_at: String,
}

#[must_use]
pub fn authorities(roles: &[Role]) -> Vec<String> {
    roles.iter().map(|r| r.authority().to_string()).collect()
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Registers a user with the requested roles (or the default role).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DuplicateUsername`] / [`AuthError::DuplicateEmail`]
    /// when the identity is taken and [`AuthError::UnknownRole`] for a role
    /// name outside the fixed set.
    async fn signup(&self, account: NewAccount) -> Result<UserInfo, AuthError>;

    /// Verifies credentials and issues a token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown user or a
    /// wrong password.
    async fn signin(&self, username: &str, password: &str) -> Result<SigninResult, AuthError>;

    /// Profile of the token holder.
    async fn me(&self, user_id: UserId) -> Result<UserInfo, AuthError>;
}
