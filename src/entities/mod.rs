pub mod prelude;

pub mod incidents;
pub mod roles;
pub mod user_roles;
pub mod users;
