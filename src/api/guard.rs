//! Role checks for routes that need more than a valid token.
//!
//! Mounted with `route_layer(from_fn_with_state(permission, require_permission))`
//! underneath [`auth_middleware`](super::auth::auth_middleware), so presence and
//! validity are already settled when this runs.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::ApiError;
use super::auth::AuthUser;
use crate::domain::{Permission, role::any_grants};

const fn denial_message(permission: Permission) -> &'static str {
    match permission {
        Permission::ViewUserBoard => "Require User Role!",
        Permission::ViewModeratorBoard => "Require Moderator or Admin Role!",
        Permission::ViewAdminBoard
        | Permission::ListAllIncidents
        | Permission::DeleteAllIncidents
        | Permission::ViewMetrics => "Require Admin Role!",
    }
}

pub async fn require_permission(
    State(permission): State<Permission>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(user) = request.extensions().get::<AuthUser>() else {
        return Err(ApiError::unauthorized("No token provided!"));
    };

    if !any_grants(&user.roles, permission) {
        tracing::debug!(user_id = %user.id, ?permission, "Permission denied");
        return Err(ApiError::forbidden(denial_message(permission)));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Role, UserId};
    use axum::{Router, body::Body, http::StatusCode, middleware, routing::get};
    use tower::ServiceExt;

    fn guarded(permission: Permission, user: Option<AuthUser>) -> Router {
        let router = Router::new()
            .route("/", get(|| async { "ok" }))
            .route_layer(middleware::from_fn_with_state(
                permission,
                require_permission,
            ));

        match user {
            Some(user) => router.layer(axum::Extension(user)),
            None => router,
        }
    }

    async fn status(router: Router) -> StatusCode {
        router
            .oneshot(
                axum::http::Request::builder()
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
            .status()
    }

    fn user_with(roles: &[Role]) -> AuthUser {
        AuthUser {
            id: UserId::new(1),
            roles: roles.to_vec(),
        }
    }

    #[tokio::test]
    async fn admin_passes_admin_guard() {
        let router = guarded(Permission::ListAllIncidents, Some(user_with(&[Role::Admin])));
        assert_eq!(status(router).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn user_is_forbidden_from_admin_guard() {
        let router = guarded(Permission::ViewAdminBoard, Some(user_with(&[Role::User])));
        assert_eq!(status(router).await, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn moderator_board_accepts_moderators() {
        let router = guarded(
            Permission::ViewModeratorBoard,
            Some(user_with(&[Role::User, Role::Moderator])),
        );
        assert_eq!(status(router).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_identity_is_unauthorized() {
        let router = guarded(Permission::ViewUserBoard, None);
        assert_eq!(status(router).await, StatusCode::UNAUTHORIZED);
    }
}
