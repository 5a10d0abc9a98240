use crate::domain::Role;
use crate::entities::{prelude::*, roles};
use anyhow::Result;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, Set};
use tracing::debug;

/// Repository for the fixed `roles` table
pub struct RoleRepository {
    conn: DatabaseConnection,
}

impl RoleRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Upsert every [`Role`] row. Safe to run on every startup.
    pub async fn seed(&self) -> Result<()> {
        for role in Role::ALL {
            let active_model = roles::ActiveModel {
                id: Set(role.id()),
                name: Set(role.name().to_string()),
            };

            Roles::insert(active_model)
                .on_conflict(
                    sea_orm::sea_query::OnConflict::column(roles::Column::Id)
                        .update_column(roles::Column::Name)
                        .to_owned(),
                )
                .exec_without_returning(&self.conn)
                .await?;

            debug!(role = role.name(), "Role ensured");
        }

        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<roles::Model>> {
        Ok(Roles::find()
            .order_by_asc(roles::Column::Id)
            .all(&self.conn)
            .await?)
    }
}
