//! `SeaORM` implementation of the `IncidentService` trait.

use crate::api::ApiError;
use crate::api::validation::{validate_date, validate_title, validate_year};
use crate::db::{DEFAULT_STATUS, IncidentFilter, IncidentPatch, NewIncident, Store};
use crate::domain::IncidentId;
use crate::services::incident_service::{
    Incident, IncidentError, IncidentInput, IncidentService, IncidentStats,
};
use async_trait::async_trait;
use tracing::info;

pub struct SeaOrmIncidentService {
    store: Store,
}

impl SeaOrmIncidentService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

fn validation(err: ApiError) -> IncidentError {
    IncidentError::Validation(err.message().to_string())
}

/// Trims free text and drops it when nothing is left.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn new_incident(input: IncidentInput) -> Result<NewIncident, IncidentError> {
    let title = validate_title(input.title.as_deref()).map_err(validation)?;

    if let Some(year) = input.year {
        validate_year(year).map_err(validation)?;
    }

    let date = match non_blank(input.date) {
        Some(date) => validate_date(&date).map_err(validation)?,
        None => chrono::Utc::now().to_rfc3339(),
    };

    Ok(NewIncident {
        title,
        description: input.description,
        published: input.published.unwrap_or(false),
        year: input.year,
        kind: non_blank(input.kind),
        status: non_blank(input.status).unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        date,
    })
}

fn incident_patch(input: IncidentInput) -> Result<IncidentPatch, IncidentError> {
    let title = match input.title {
        Some(title) => Some(validate_title(Some(&title)).map_err(validation)?),
        None => None,
    };

    if let Some(year) = input.year {
        validate_year(year).map_err(validation)?;
    }

    let date = match input.date {
        Some(date) => Some(validate_date(date.trim()).map_err(validation)?),
        None => None,
    };

    let patch = IncidentPatch {
        title,
        description: input.description,
        published: input.published,
        year: input.year,
        // Blank values leave the stored column as it is.
        kind: non_blank(input.kind),
        status: non_blank(input.status),
        date,
    };

    if patch.is_empty() {
        return Err(IncidentError::Validation(
            "Content can not be empty!".to_string(),
        ));
    }

    Ok(patch)
}

#[async_trait]
impl IncidentService for SeaOrmIncidentService {
    async fn create(&self, input: IncidentInput) -> Result<Incident, IncidentError> {
        let incident = new_incident(input)?;
        let model = self.store.create_incident(incident).await?;

        info!(incident_id = model.id, title = %model.title, "Incident created");
        Ok(Incident::from(model))
    }

    async fn get(&self, id: IncidentId) -> Result<Incident, IncidentError> {
        self.store
            .get_incident(id)
            .await?
            .map(Incident::from)
            .ok_or(IncidentError::NotFound(id))
    }

    async fn list(&self, filter: IncidentFilter) -> Result<Vec<Incident>, IncidentError> {
        let rows = self.store.list_incidents(&filter).await?;
        Ok(rows.into_iter().map(Incident::from).collect())
    }

    async fn list_published(&self) -> Result<Vec<Incident>, IncidentError> {
        let filter = IncidentFilter {
            published: Some(true),
            ..IncidentFilter::default()
        };
        self.list(filter).await
    }

    async fn update(
        &self,
        id: IncidentId,
        input: IncidentInput,
    ) -> Result<Incident, IncidentError> {
        let patch = incident_patch(input)?;

        let model = self
            .store
            .update_incident(id, patch)
            .await?
            .ok_or(IncidentError::NotFound(id))?;

        info!(incident_id = %id, "Incident updated");
        Ok(Incident::from(model))
    }

    async fn delete(&self, id: IncidentId) -> Result<(), IncidentError> {
        if !self.store.delete_incident(id).await? {
            return Err(IncidentError::NotFound(id));
        }

        info!(incident_id = %id, "Incident deleted");
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64, IncidentError> {
        let deleted = self.store.delete_all_incidents().await?;
        info!(deleted, "All incidents deleted");
        Ok(deleted)
    }

    async fn stats(&self) -> Result<IncidentStats, IncidentError> {
        let counts = self.store.incident_counts().await?;
        Ok(IncidentStats::from(counts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_applies_defaults() {
        let input = IncidentInput {
            title: Some("  Outage  ".to_string()),
            kind: Some("technical".to_string()),
            ..IncidentInput::default()
        };

        let incident = new_incident(input).unwrap();
        assert_eq!(incident.title, "Outage");
        assert!(!incident.published);
        assert_eq!(incident.status, "open");
        assert!(chrono::DateTime::parse_from_rfc3339(&incident.date).is_ok());
        assert_eq!(incident.kind.as_deref(), Some("technical"));
    }

    #[test]
    fn create_requires_title() {
        let err = new_incident(IncidentInput::default()).unwrap_err();
        assert_eq!(err.to_string(), "Title cannot be empty!");

        let input = IncidentInput {
            title: Some("   ".to_string()),
            ..IncidentInput::default()
        };
        assert!(new_incident(input).is_err());
    }

    #[test]
    fn explicit_status_and_date_are_kept() {
        let input = IncidentInput {
            title: Some("Leak".to_string()),
            status: Some("closed".to_string()),
            date: Some("2024-03-01".to_string()),
            published: Some(true),
            ..IncidentInput::default()
        };

        let incident = new_incident(input).unwrap();
        assert_eq!(incident.status, "closed");
        assert_eq!(incident.date, "2024-03-01T00:00:00+00:00");
        assert!(incident.published);
    }

    #[test]
    fn empty_update_is_rejected() {
        assert!(matches!(
            incident_patch(IncidentInput::default()),
            Err(IncidentError::Validation(_))
        ));
    }

    #[test]
    fn update_rejects_blank_title() {
        let input = IncidentInput {
            title: Some(String::new()),
            ..IncidentInput::default()
        };
        assert!(incident_patch(input).is_err());
    }

    #[test]
    fn blank_kind_and_status_do_not_reach_the_patch() {
        let input = IncidentInput {
            kind: Some(String::new()),
            status: Some("  ".to_string()),
            ..IncidentInput::default()
        };
        assert!(matches!(
            incident_patch(input),
            Err(IncidentError::Validation(_))
        ));

        let input = IncidentInput {
            kind: Some(" hardware ".to_string()),
            status: Some(String::new()),
            ..IncidentInput::default()
        };
        let patch = incident_patch(input).unwrap();
        assert_eq!(patch.kind.as_deref(), Some("hardware"));
        assert!(patch.status.is_none());
    }

    #[test]
    fn partial_update_only_touches_given_fields() {
        let input = IncidentInput {
            published: Some(true),
            ..IncidentInput::default()
        };
        let patch = incident_patch(input).unwrap();
        assert_eq!(patch.published, Some(true));
        assert!(patch.title.is_none());
        assert!(patch.status.is_none());
    }
}
