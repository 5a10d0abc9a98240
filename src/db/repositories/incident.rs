use crate::domain::IncidentId;
use crate::entities::{incidents, prelude::*};
use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

/// Status given to incidents created without one
pub const DEFAULT_STATUS: &str = "open";

/// Values for a new incident row. Defaults are resolved by the caller.
#[derive(Debug, Clone)]
pub struct NewIncident {
    pub title: String,
    pub description: Option<String>,
    pub published: bool,
    pub year: Option<i32>,
    pub kind: Option<String>,
    pub status: String,
    pub date: String,
}

/// Partial update; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct IncidentPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub published: Option<bool>,
    pub year: Option<i32>,
    pub kind: Option<String>,
    pub status: Option<String>,
    pub date: Option<String>,
}

impl IncidentPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.published.is_none()
            && self.year.is_none()
            && self.kind.is_none()
            && self.status.is_none()
            && self.date.is_none()
    }
}

/// Listing criteria; every present field is ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncidentFilter {
    /// Substring match on the title
    pub title: Option<String>,
    pub year: Option<i32>,
    pub kind: Option<String>,
    pub status: Option<String>,
    pub published: Option<bool>,
}

impl IncidentFilter {
    fn condition(&self) -> Condition {
        let mut cond = Condition::all();

        if let Some(title) = &self.title {
            let pattern = format!("%{}%", escape_like(title));
            cond = cond.add(incidents::Column::Title.like(LikeExpr::new(pattern).escape('\\')));
        }
        if let Some(year) = self.year {
            cond = cond.add(incidents::Column::Year.eq(year));
        }
        if let Some(kind) = &self.kind {
            cond = cond.add(incidents::Column::Kind.eq(kind.as_str()));
        }
        if let Some(status) = &self.status {
            cond = cond.add(incidents::Column::Status.eq(status.as_str()));
        }
        if let Some(published) = self.published {
            cond = cond.add(incidents::Column::Published.eq(published));
        }

        cond
    }
}

/// Escapes LIKE metacharacters so user input matches literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Raw aggregate counts. Group keys are `None` for rows with a NULL column.
#[derive(Debug, Clone, Default)]
pub struct IncidentCounts {
    pub total: u64,
    pub published: u64,
    pub unpublished: u64,
    pub by_type: Vec<(Option<String>, i64)>,
    pub by_status: Vec<(Option<String>, i64)>,
    pub by_year: Vec<(Option<i32>, i64)>,
}

pub struct IncidentRepository {
    conn: DatabaseConnection,
}

impl IncidentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, incident: NewIncident) -> Result<incidents::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let model = incidents::ActiveModel {
            title: Set(incident.title),
            description: Set(incident.description),
            published: Set(incident.published),
            year: Set(incident.year),
            kind: Set(incident.kind),
            status: Set(Some(incident.status)),
            date: Set(Some(incident.date)),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert incident")?;

        Ok(model)
    }

    pub async fn get(&self, id: IncidentId) -> Result<Option<incidents::Model>> {
        Incidents::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query incident")
    }

    pub async fn list(&self, filter: &IncidentFilter) -> Result<Vec<incidents::Model>> {
        Incidents::find()
            .filter(filter.condition())
            .order_by_asc(incidents::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list incidents")
    }

    /// Returns the updated row, or `None` when no incident has this id.
    pub async fn update(
        &self,
        id: IncidentId,
        patch: IncidentPatch,
    ) -> Result<Option<incidents::Model>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: incidents::ActiveModel = existing.into();
        if let Some(title) = patch.title {
            active.title = Set(title);
        }
        if let Some(description) = patch.description {
            active.description = Set(Some(description));
        }
        if let Some(published) = patch.published {
            active.published = Set(published);
        }
        if let Some(year) = patch.year {
            active.year = Set(Some(year));
        }
        if let Some(kind) = patch.kind {
            active.kind = Set(Some(kind));
        }
        if let Some(status) = patch.status {
            active.status = Set(Some(status));
        }
        if let Some(date) = patch.date {
            active.date = Set(Some(date));
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update incident")?;

        Ok(Some(updated))
    }

    pub async fn delete(&self, id: IncidentId) -> Result<bool> {
        let result = Incidents::delete_by_id(id.value())
            .exec(&self.conn)
            .await
            .context("Failed to delete incident")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn delete_all(&self) -> Result<u64> {
        let result = Incidents::delete_many()
            .exec(&self.conn)
            .await
            .context("Failed to delete incidents")?;

        Ok(result.rows_affected)
    }

    pub async fn counts(&self) -> Result<IncidentCounts> {
        let total = Incidents::find().count(&self.conn).await?;

        let published = Incidents::find()
            .filter(incidents::Column::Published.eq(true))
            .count(&self.conn)
            .await?;

        let unpublished = Incidents::find()
            .filter(incidents::Column::Published.eq(false))
            .count(&self.conn)
            .await?;

        let by_type: Vec<(Option<String>, i64)> = Incidents::find()
            .select_only()
            .column(incidents::Column::Kind)
            .column_as(Expr::col(incidents::Column::Id).count(), "count")
            .group_by(incidents::Column::Kind)
            .order_by_asc(incidents::Column::Kind)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to group incidents by type")?;

        let by_status: Vec<(Option<String>, i64)> = Incidents::find()
            .select_only()
            .column(incidents::Column::Status)
            .column_as(Expr::col(incidents::Column::Id).count(), "count")
            .group_by(incidents::Column::Status)
            .order_by_asc(incidents::Column::Status)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to group incidents by status")?;

        let by_year: Vec<(Option<i32>, i64)> = Incidents::find()
            .select_only()
            .column(incidents::Column::Year)
            .column_as(Expr::col(incidents::Column::Id).count(), "count")
            .group_by(incidents::Column::Year)
            .order_by_asc(incidents::Column::Year)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to group incidents by year")?;

        Ok(IncidentCounts {
            total,
            published,
            unpublished,
            by_type,
            by_status,
            by_year,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("outage"), "outage");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("disk_full"), "disk\\_full");
        assert_eq!(escape_like(r"C:\temp"), r"C:\\temp");
    }
}
