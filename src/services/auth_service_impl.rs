//! `SeaORM` implementation of the `AuthService` trait.

use crate::auth::{PasswordService, TokenService};
use crate::db::{RegisterError, Store};
use crate::domain::{Role, UserId};
use crate::services::auth_service::{
    AuthError, AuthService, NewAccount, SigninResult, UserInfo, authorities,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

pub struct SeaOrmAuthService {
    store: Store,
    passwords: PasswordService,
    tokens: Arc<TokenService>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, passwords: PasswordService, tokens: Arc<TokenService>) -> Self {
        Self {
            store,
            passwords,
            tokens,
        }
    }
}

/// Parses requested role names, falling back to the default role.
fn resolve_roles(requested: &[String]) -> Result<Vec<Role>, AuthError> {
    if requested.is_empty() {
        return Ok(vec![Role::DEFAULT]);
    }

    let mut roles = requested
        .iter()
        .map(|name| name.parse::<Role>())
        .collect::<Result<Vec<_>, _>>()?;
    roles.sort();
    roles.dedup();
    Ok(roles)
}

fn validate_account(account: &NewAccount) -> Result<(), AuthError> {
    if account.username.trim().is_empty()
        || account.email.trim().is_empty()
        || account.password.is_empty()
    {
        return Err(AuthError::Validation(
            "Content can not be empty!".to_string(),
        ));
    }

    if !account.email.contains('@') {
        return Err(AuthError::Validation("Email is not valid!".to_string()));
    }

    Ok(())
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn signup(&self, account: NewAccount) -> Result<UserInfo, AuthError> {
        validate_account(&account)?;
        let roles = resolve_roles(&account.roles)?;

        let username = account.username.trim();
        let email = account.email.trim();

        if self.store.username_exists(username).await? {
            return Err(AuthError::DuplicateUsername);
        }
        if self.store.email_exists(email).await? {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = self.passwords.hash(&account.password).await?;

        let user = self
            .store
            .register_user(username, email, &password_hash, &roles)
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent signup for the same identity
                RegisterError::DuplicateUser => AuthError::DuplicateAccount,
                RegisterError::Database(err) => AuthError::from(err),
            })?;

        metrics::counter!("auth_signup_total").increment(1);
        info!(user_id = %user.id, username = %user.username, ?roles, "User registered");

        Ok(UserInfo {
            id: user.id,
            username: user.username,
            email: user.email,
            roles: authorities(&roles),
            created_at: user.created_at,
        })
    }

    async fn signin(&self, username: &str, password: &str) -> Result<SigninResult, AuthError> {
        // Signup stores the trimmed name.
        let username = username.trim();

        let Some((user, password_hash)) = self.store.get_user_with_password(username).await?
        else {
            metrics::counter!("auth_signin_total", "outcome" => "unknown_user").increment(1);
            return Err(AuthError::InvalidCredentials);
        };

        if !self.passwords.verify(password, &password_hash).await? {
            metrics::counter!("auth_signin_total", "outcome" => "bad_password").increment(1);
            return Err(AuthError::InvalidCredentials);
        }

        let roles = self.store.get_user_roles(user.id).await?;
        let issued = self.tokens.issue(user.id, &roles)?;

        metrics::counter!("auth_signin_total", "outcome" => "success").increment(1);
        info!(user_id = %user.id, "User signed in");

        Ok(SigninResult {
            id: user.id,
            username: user.username,
            email: user.email,
            roles: authorities(&roles),
            access_token: issued.token,
            expires_at: issued.expires_at,
        })
    }

    async fn me(&self, user_id: UserId) -> Result<UserInfo, AuthError> {
        let user = self
            .store
            .get_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        let roles = self.store.get_user_roles(user_id).await?;

        Ok(UserInfo {
            id: user.id,
            username: user.username,
            email: user.email,
            roles: authorities(&roles),
            created_at: user.created_at,
        })
    }
}
