//! Credential primitives: password hashing and bearer tokens.

pub mod password;
pub mod token;

pub use password::PasswordService;
pub use token::{Claims, IssuedToken, TokenError, TokenService};

/// Cookie set by signin and read back by the auth middleware.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Legacy header some clients send the token in.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";
