mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::{PASSWORD, spawn_app};
use incident_tracker::domain::{Role, UserId};
use serde_json::json;

#[tokio::test]
async fn signup_then_signin_issues_token_for_that_user() {
    let app = spawn_app().await;

    let response = app.signup("alice", &[]).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "User was registered successfully!");

    let response = app.signin("alice", PASSWORD).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["username"], "alice");
    assert_eq!(response.body["email"], "alice@example.com");
    assert_eq!(response.body["roles"], json!(["ROLE_USER"]));

    let token = response.body["accessToken"].as_str().unwrap();
    let claims = app.tokens.verify(token).unwrap();
    let user_id = response.body["id"].as_i64().unwrap();
    assert_eq!(i64::from(claims.id.value()), user_id);
    assert_eq!(claims.roles, vec![Role::User]);

    let cookie = response.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("accessToken="));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn wrong_password_is_rejected_without_token() {
    let app = spawn_app().await;
    app.signup("bob", &[]).await;

    let response = app.signin("bob", "not-the-password").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.body.get("accessToken").is_none());
    assert!(response.headers.get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn unknown_user_cannot_sign_in() {
    let app = spawn_app().await;

    let response = app.signin("ghost", PASSWORD).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signup_validation() {
    let app = spawn_app().await;

    let response = app
        .post("/api/auth/signup", None, json!({ "username": "carol" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Content can not be empty!");

    let response = app
        .post(
            "/api/auth/signup",
            None,
            json!({
                "username": "carol",
                "email": "carol@example.com",
                "password": PASSWORD,
                "roles": ["superuser"],
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["message"],
        "Failed! Role does not exist = superuser"
    );

    // Rejected signups leave nothing behind.
    let response = app.signup("carol", &[]).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn duplicate_identity_is_rejected() {
    let app = spawn_app().await;
    app.signup("dave", &[]).await;

    let response = app.signup("dave", &[]).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Failed! Username is already in use!");

    let response = app
        .post(
            "/api/auth/signup",
            None,
            json!({
                "username": "dave2",
                "email": "dave@example.com",
                "password": PASSWORD,
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Failed! Email is already in use!");
}

#[tokio::test]
async fn surrounding_whitespace_in_username_is_ignored() {
    let app = spawn_app().await;

    let response = app
        .post(
            "/api/auth/signup",
            None,
            json!({
                "username": " frank ",
                "email": "frank@example.com",
                "password": PASSWORD,
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.signin(" frank ", PASSWORD).await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["username"], "frank");

    let response = app.signin("frank", PASSWORD).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn requested_roles_are_assigned() {
    let app = spawn_app().await;
    app.signup("erin", &["moderator", "user"]).await;

    let response = app.signin("erin", PASSWORD).await;
    assert_eq!(
        response.body["roles"],
        json!(["ROLE_USER", "ROLE_MODERATOR"])
    );
}

#[tokio::test]
async fn me_returns_token_holder() {
    let app = spawn_app().await;
    let token = app.token_for("frank", &["admin"]).await;

    let response = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["username"], "frank");
    assert_eq!(response.body["roles"], json!(["ROLE_ADMIN"]));
    assert!(response.body["createdAt"].is_string());
}

#[tokio::test]
async fn token_is_accepted_from_header_and_cookie() {
    let app = spawn_app().await;
    let token = app.token_for("gina", &[]).await;

    let response = app
        .send(
            Request::builder()
                .uri("/api/auth/me")
                .header("x-access-token", &token)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .send(
            Request::builder()
                .uri("/api/auth/me")
                .header(header::COOKIE, format!("accessToken={token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn invalid_and_expired_tokens_are_unauthorized() {
    let app = spawn_app().await;

    let response = app.get("/api/auth/me", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "No token provided!");

    let response = app.get("/api/auth/me", Some("garbage")).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let expired = app
        .tokens
        .issue_with_ttl(UserId::new(1), &[Role::Admin], chrono::Duration::hours(-2))
        .unwrap();
    let response = app
        .get("/api/incidents/admin/all", Some(&expired.token))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signout_clears_cookie() {
    let app = spawn_app().await;

    let response = app.post("/api/auth/signout", None, json!({})).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "You've been signed out!");

    let cookie = response.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("accessToken="));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn boards_follow_role_table() {
    let app = spawn_app().await;
    let user = app.token_for("henry", &[]).await;
    let moderator = app.token_for("iris", &["moderator"]).await;
    let admin = app.token_for("jack", &["admin"]).await;

    let response = app.get("/api/test/all", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "Public Content.");

    assert_eq!(app.get("/api/test/user", Some(&user)).await.status, StatusCode::OK);
    assert_eq!(
        app.get("/api/test/mod", Some(&user)).await.status,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        app.get("/api/test/mod", Some(&moderator)).await.status,
        StatusCode::OK
    );
    assert_eq!(
        app.get("/api/test/admin", Some(&moderator)).await.status,
        StatusCode::FORBIDDEN
    );

    let response = app.get("/api/test/admin", Some(&admin)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "Admin Content.");

    let response = app.get("/api/test/admin", Some(&user)).await;
    assert_eq!(response.body["message"], "Require Admin Role!");

    // Presence is checked before role.
    assert_eq!(
        app.get("/api/test/admin", None).await.status,
        StatusCode::UNAUTHORIZED
    );
}
