use serde::{Deserialize, Serialize};

/// `{"message": ...}` body used for confirmations and errors alike.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub roles: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct SigninRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Raw listing filters. Parsed by
/// [`parse_incident_filter`](super::validation::parse_incident_filter) so bad
/// values produce a 400 with a readable message.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct IncidentQuery {
    pub title: Option<String>,
    pub year: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
    pub published: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
}
