//! Domain service for incident records.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{IncidentCounts, IncidentFilter};
use crate::domain::IncidentId;
use crate::entities::incidents;

#[derive(Debug, Error)]
pub enum IncidentError {
    #[error("Cannot find Incident with id={0}.")]
    NotFound(IncidentId),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for IncidentError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for IncidentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Incident as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: IncidentId,
    pub title: String,
    pub description: Option<String>,
    pub published: bool,
    pub year: Option<i32>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
    pub date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<incidents::Model> for Incident {
    fn from(model: incidents::Model) -> Self {
        Self {
            id: IncidentId::new(model.id),
            title: model.title,
            description: model.description,
            published: model.published,
            year: model.year,
            kind: model.kind,
            status: model.status,
            date: model.date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Body of create and update requests. Every field is optional on the wire;
/// create requires `title`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub published: Option<bool>,
    pub year: Option<i32>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusCount {
    pub status: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct YearCount {
    pub year: Option<i32>,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IncidentStats {
    pub total: u64,
    pub published: u64,
    pub unpublished: u64,
    pub by_type: Vec<TypeCount>,
    pub by_status: Vec<StatusCount>,
    pub by_year: Vec<YearCount>,
}

impl From<IncidentCounts> for IncidentStats {
    fn from(counts: IncidentCounts) -> Self {
        Self {
            total: counts.total,
            published: counts.published,
            unpublished: counts.unpublished,
            by_type: counts
                .by_type
                .into_iter()
                .map(|(kind, count)| TypeCount { kind, count })
                .collect(),
            by_status: counts
                .by_status
                .into_iter()
                .map(|(status, count)| StatusCount { status, count })
                .collect(),
            by_year: counts
                .by_year
                .into_iter()
                .map(|(year, count)| YearCount { year, count })
                .collect(),
        }
    }
}

#[async_trait::async_trait]
pub trait IncidentService: Send + Sync {
    /// Creates an incident. Missing `published`, `status` and `date` get
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`IncidentError::Validation`] for a missing or blank title.
    async fn create(&self, input: IncidentInput) -> Result<Incident, IncidentError>;

    async fn get(&self, id: IncidentId) -> Result<Incident, IncidentError>;

    async fn list(&self, filter: IncidentFilter) -> Result<Vec<Incident>, IncidentError>;

    async fn list_published(&self) -> Result<Vec<Incident>, IncidentError>;

    /// Applies the present fields and returns the updated incident.
    async fn update(&self, id: IncidentId, input: IncidentInput)
    -> Result<Incident, IncidentError>;

    async fn delete(&self, id: IncidentId) -> Result<(), IncidentError>;

    /// Removes every incident and returns how many were deleted.
    async fn delete_all(&self) -> Result<u64, IncidentError>;

    async fn stats(&self) -> Result<IncidentStats, IncidentError>;
}
