use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::domain::{IncidentId, Role, UserId};
use crate::entities::incidents;

pub mod migrator;
pub mod repositories;

pub use repositories::incident::{
    DEFAULT_STATUS, IncidentCounts, IncidentFilter, IncidentPatch, NewIncident,
};
pub use repositories::user::{RegisterError, User};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    /// Connect, apply migrations and seed the fixed role rows.
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        if let Some(path_str) = sqlite_file_path(db_url) {
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;
        let store = Self { conn };
        store.bootstrap().await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(store)
    }

    /// Idempotent schema + role setup, run once before serving traffic.
    pub async fn bootstrap(&self) -> Result<()> {
        use sea_orm_migration::MigratorTrait;

        migrator::Migrator::up(&self.conn, None).await?;
        self.role_repo().seed().await?;
        Ok(())
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn role_repo(&self) -> repositories::role::RoleRepository {
        repositories::role::RoleRepository::new(self.conn.clone())
    }

    fn incident_repo(&self) -> repositories::incident::IncidentRepository {
        repositories::incident::IncidentRepository::new(self.conn.clone())
    }

    // Users & roles

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_with_password(&self, username: &str) -> Result<Option<(User, String)>> {
        self.user_repo()
            .get_by_username_with_password(username)
            .await
    }

    pub async fn get_user_by_id(&self, id: UserId) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        self.user_repo().username_exists(username).await
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        self.user_repo().email_exists(email).await
    }

    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, RegisterError> {
        self.user_repo()
            .create(username, email, password_hash)
            .await
    }

    pub async fn assign_roles(&self, user_id: UserId, roles: &[Role]) -> Result<()> {
        self.user_repo().assign_roles(user_id, roles).await
    }

    pub async fn register_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        roles: &[Role],
    ) -> Result<User, RegisterError> {
        self.user_repo()
            .register(username, email, password_hash, roles)
            .await
    }

    pub async fn get_user_roles(&self, user_id: UserId) -> Result<Vec<Role>> {
        self.user_repo().roles_for(user_id).await
    }

    pub async fn list_roles(&self) -> Result<Vec<crate::entities::roles::Model>> {
        self.role_repo().list().await
    }

    // Incidents

    pub async fn create_incident(&self, incident: NewIncident) -> Result<incidents::Model> {
        self.incident_repo().create(incident).await
    }

    pub async fn get_incident(&self, id: IncidentId) -> Result<Option<incidents::Model>> {
        self.incident_repo().get(id).await
    }

    pub async fn list_incidents(&self, filter: &IncidentFilter) -> Result<Vec<incidents::Model>> {
        self.incident_repo().list(filter).await
    }

    pub async fn update_incident(
        &self,
        id: IncidentId,
        patch: IncidentPatch,
    ) -> Result<Option<incidents::Model>> {
        self.incident_repo().update(id, patch).await
    }

    pub async fn delete_incident(&self, id: IncidentId) -> Result<bool> {
        self.incident_repo().delete(id).await
    }

    pub async fn delete_all_incidents(&self) -> Result<u64> {
        self.incident_repo().delete_all().await
    }

    pub async fn incident_counts(&self) -> Result<IncidentCounts> {
        self.incident_repo().counts().await
    }
}

/// Filesystem path of a file-backed SQLite URL, `None` for in-memory or
/// non-SQLite databases.
fn sqlite_file_path(db_url: &str) -> Option<&str> {
    let rest = db_url.strip_prefix("sqlite:")?;
    let path = rest.trim_start_matches("//");
    let path = path.split('?').next().unwrap_or(path);

    if path.is_empty() || path.starts_with(":memory:") {
        None
    } else {
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_paths() {
        assert_eq!(sqlite_file_path("sqlite:data/app.db"), Some("data/app.db"));
        assert_eq!(
            sqlite_file_path("sqlite:///tmp/app.db?mode=rwc"),
            Some("/tmp/app.db")
        );
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("postgres://localhost/incidents"), None);
    }
}
