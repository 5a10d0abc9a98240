pub mod incident;
pub mod role;
pub mod user;
