use axum::{
    Extension, Json,
    extract::{Request, State, rejection::JsonRejection},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

use super::{ApiError, AppState, MessageResponse, SigninRequest, SignupRequest};
use crate::auth::{ACCESS_TOKEN_COOKIE, ACCESS_TOKEN_HEADER};
use crate::domain::{Role, UserId};
use crate::services::{AuthError, NewAccount, SigninResult, UserInfo};

/// Identity extracted from a verified token, available to handlers as an
/// `Extension`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: UserId,
    pub roles: Vec<Role>,
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(_)
            | AuthError::DuplicateUsername
            | AuthError::DuplicateEmail
            | AuthError::DuplicateAccount
            | AuthError::UnknownRole(_) => ApiError::ValidationError(err.to_string()),
            AuthError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            AuthError::UserNotFound => ApiError::NotFound(err.to_string()),
            AuthError::Database(msg) => ApiError::DatabaseError(msg),
            AuthError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Token lookup order:
/// 1. `Authorization: Bearer <token>`
/// 2. `x-access-token` header
/// 3. `accessToken` cookie (set by signin)
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    if let Some(token) = headers.get(ACCESS_TOKEN_HEADER)
        && let Ok(token_str) = token.to_str()
        && !token_str.trim().is_empty()
    {
        return Some(token_str.trim().to_string());
    }

    CookieJar::from_headers(headers)
        .get(ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// Rejects the request with 401 unless it carries a valid token. On success
/// the caller's [`AuthUser`] is attached to the request.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_token(request.headers()) else {
        return Err(ApiError::unauthorized("No token provided!"));
    };

    let claims = state
        .tokens
        .verify(&token)
        .map_err(|e| ApiError::unauthorized(e.to_string()))?;

    tracing::Span::current().record("user_id", tracing::field::display(claims.id));

    request.extensions_mut().insert(AuthUser {
        id: claims.id,
        roles: claims.roles,
    });

    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(payload) = payload?;

    let account = NewAccount {
        username: payload.username.unwrap_or_default(),
        email: payload.email.unwrap_or_default(),
        password: payload.password.unwrap_or_default(),
        roles: payload.roles.unwrap_or_default(),
    };

    state.auth_service.signup(account).await?;

    Ok(Json(MessageResponse::new(
        "User was registered successfully!",
    )))
}

/// POST /auth/signin
/// Returns the profile and token, and sets the `accessToken` cookie.
pub async fn signin(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    payload: Result<Json<SigninRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<SigninResult>), ApiError> {
    let Json(payload) = payload?;

    let (Some(username), Some(password)) = (payload.username, payload.password) else {
        return Err(ApiError::validation("Username and password are required!"));
    };
    if username.trim().is_empty() || password.is_empty() {
        return Err(ApiError::validation("Username and password are required!"));
    }

    let result = state.auth_service.signin(&username, &password).await?;

    let max_age = time::Duration::seconds(state.tokens.ttl().num_seconds());
    let cookie = Cookie::build((ACCESS_TOKEN_COOKIE, result.access_token.clone()))
        .http_only(true)
        .secure(state.config.server.secure_cookies)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age);

    Ok((jar.add(cookie), Json(result)))
}

/// POST /auth/signout
/// Clears the cookie. Bearer tokens stay valid until they expire.
pub async fn signout(jar: CookieJar) -> impl IntoResponse {
    let removal = Cookie::build(ACCESS_TOKEN_COOKIE).path("/");
    (
        jar.remove(removal),
        Json(MessageResponse::new("You've been signed out!")),
    )
}

/// GET /auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserInfo>, ApiError> {
    let info = state.auth_service.me(user.id).await?;
    Ok(Json(info))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer abc"));
        headers.insert(ACCESS_TOKEN_HEADER, HeaderValue::from_static("def"));
        headers.insert("Cookie", HeaderValue::from_static("accessToken=ghi"));

        assert_eq!(extract_token(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn falls_back_to_header_then_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_TOKEN_HEADER, HeaderValue::from_static("def"));
        headers.insert("Cookie", HeaderValue::from_static("accessToken=ghi"));
        assert_eq!(extract_token(&headers).as_deref(), Some("def"));

        let mut headers = HeaderMap::new();
        headers.insert(
            "Cookie",
            HeaderValue::from_static("theme=dark; accessToken=ghi"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("ghi"));
    }

    #[test]
    fn missing_token() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert_eq!(extract_token(&headers), None);
        assert_eq!(extract_token(&HeaderMap::new()), None);
    }

    #[test]
    fn auth_errors_map_to_status() {
        assert!(matches!(
            ApiError::from(AuthError::InvalidCredentials),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from(AuthError::DuplicateEmail),
            ApiError::ValidationError(_)
        ));
        let err = ApiError::from(AuthError::DuplicateAccount);
        assert!(matches!(err, ApiError::ValidationError(_)));
        assert_eq!(err.message(), "Failed! Username or email is already in use!");
        assert!(matches!(
            ApiError::from(AuthError::UserNotFound),
            ApiError::NotFound(_)
        ));
    }
}
