use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::{parse_incident_filter, validate_incident_id};
use super::{ApiError, AppState, IncidentQuery, MessageResponse};
use crate::services::{Incident, IncidentError, IncidentInput, IncidentStats};

impl From<IncidentError> for ApiError {
    fn from(err: IncidentError) -> Self {
        match err {
            IncidentError::NotFound(id) => ApiError::not_found("Incident", id),
            IncidentError::Validation(msg) => ApiError::ValidationError(msg),
            IncidentError::Database(msg) => ApiError::DatabaseError(msg),
            IncidentError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

/// POST /incidents
pub async fn create_incident(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<IncidentInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Incident>), ApiError> {
    let Json(input) = payload?;
    let incident = state.incident_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(incident)))
}

/// GET /incidents?title=&year=&type=&status=&published=
pub async fn list_incidents(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IncidentQuery>,
) -> Result<Json<Vec<Incident>>, ApiError> {
    let filter = parse_incident_filter(&query)?;
    let incidents = state.incident_service.list(filter).await?;
    Ok(Json(incidents))
}

/// GET /incidents/admin/all
/// Same filters as the regular listing, except `published` is ignored.
pub async fn list_all_incidents(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IncidentQuery>,
) -> Result<Json<Vec<Incident>>, ApiError> {
    let filter = parse_incident_filter(&IncidentQuery {
        published: None,
        ..query
    })?;

    let incidents = state.incident_service.list(filter).await?;
    Ok(Json(incidents))
}

/// GET /incidents/public/published
pub async fn list_published(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Incident>>, ApiError> {
    let incidents = state.incident_service.list_published().await?;
    Ok(Json(incidents))
}

/// GET /incidents/public/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<IncidentStats>, ApiError> {
    let stats = state.incident_service.stats().await?;
    Ok(Json(stats))
}

/// GET /incidents/{id}
pub async fn get_incident(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<Incident>, ApiError> {
    let Path(id) = id?;
    let id = validate_incident_id(id)?;
    let incident = state.incident_service.get(id).await?;
    Ok(Json(incident))
}

/// PUT /incidents/{id}
pub async fn update_incident(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<IncidentInput>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = id?;
    let id = validate_incident_id(id)?;
    let Json(input) = payload?;

    state.incident_service.update(id, input).await?;

    Ok(Json(MessageResponse::new("Incident was updated successfully.")))
}

/// DELETE /incidents/{id}
pub async fn delete_incident(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = id?;
    let id = validate_incident_id(id)?;
    state.incident_service.delete(id).await?;

    Ok(Json(MessageResponse::new("Incident was deleted successfully!")))
}

/// DELETE /incidents
pub async fn delete_all_incidents(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = state.incident_service.delete_all().await?;

    Ok(Json(MessageResponse::new(format!(
        "{} Incidents were deleted successfully!",
        deleted
    ))))
}
