pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, NewAccount, SigninResult, UserInfo};
pub use auth_service_impl::SeaOrmAuthService;

pub mod incident_service;
pub mod incident_service_impl;
pub use incident_service::{
    Incident, IncidentError, IncidentInput, IncidentService, IncidentStats,
};
pub use incident_service_impl::SeaOrmIncidentService;
