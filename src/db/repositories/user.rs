use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use thiserror::Error;

use crate::domain::{Role, UserId};
use crate::entities::{prelude::*, user_roles, users};

/// User data returned from repository (without sensitive password hash)
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: UserId::new(model.id),
            username: model.username,
            email: model.email,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("Username or email is already in use")]
    DuplicateUser,

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

fn map_insert_error(err: DbErr) -> RegisterError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => RegisterError::DuplicateUser,
        _ => RegisterError::Database(err),
    }
}

async fn insert_user<C: ConnectionTrait>(
    db: &C,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<users::Model, RegisterError> {
    let now = chrono::Utc::now().to_rfc3339();

    users::ActiveModel {
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash.to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(map_insert_error)
}

async fn insert_roles<C: ConnectionTrait>(db: &C, user_id: i32, roles: &[Role]) -> Result<(), DbErr> {
    if roles.is_empty() {
        return Ok(());
    }

    let rows: Vec<user_roles::ActiveModel> = roles
        .iter()
        .map(|role| user_roles::ActiveModel {
            user_id: Set(user_id),
            role_id: Set(role.id()),
        })
        .collect();

    UserRoles::insert_many(rows).exec_without_returning(db).await?;
    Ok(())
}

/// Credential store: users and their role assignments.
pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Get user by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(User::from))
    }

    /// Get user by username together with the stored password hash (for signin)
    pub async fn get_by_username_with_password(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(|u| {
            let password_hash = u.password_hash.clone();
            (User::from(u), password_hash)
        }))
    }

    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>> {
        let user = Users::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let count = Users::find()
            .filter(users::Column::Username.eq(username))
            .count(&self.conn)
            .await
            .context("Failed to check username")?;

        Ok(count > 0)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count = Users::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.conn)
            .await
            .context("Failed to check email")?;

        Ok(count > 0)
    }

    /// Insert a user row. Unique violations on username or email surface as
    /// [`RegisterError::DuplicateUser`].
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, RegisterError> {
        insert_user(&self.conn, username, email, password_hash)
            .await
            .map(User::from)
    }

    pub async fn assign_roles(&self, user_id: UserId, roles: &[Role]) -> Result<()> {
        insert_roles(&self.conn, user_id.value(), roles)
            .await
            .context("Failed to assign roles")
    }

    /// Create the user and its role rows atomically.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        roles: &[Role],
    ) -> Result<User, RegisterError> {
        let txn = self.conn.begin().await?;

        let user = insert_user(&txn, username, email, password_hash).await?;
        insert_roles(&txn, user.id, roles).await?;

        txn.commit().await?;
        Ok(User::from(user))
    }

    /// Roles assigned to a user, in id order.
    pub async fn roles_for(&self, user_id: UserId) -> Result<Vec<Role>> {
        let rows = UserRoles::find()
            .filter(user_roles::Column::UserId.eq(user_id.value()))
            .order_by_asc(user_roles::Column::RoleId)
            .all(&self.conn)
            .await
            .context("Failed to query user roles")?;

        Ok(rows
            .into_iter()
            .filter_map(|row| Role::from_id(row.role_id))
            .collect())
    }
}
