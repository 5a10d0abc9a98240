//! Role-gated content endpoints used by the frontend to probe access.

/// GET /test/all
pub async fn public_board() -> &'static str {
    "Public Content."
}

/// GET /test/user
pub async fn user_board() -> &'static str {
    "User Content."
}

/// GET /test/mod
pub async fn moderator_board() -> &'static str {
    "Moderator Content."
}

/// GET /test/admin
pub async fn admin_board() -> &'static str {
    "Admin Content."
}
