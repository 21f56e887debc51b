use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use super::{
    dto::ProfileChanges,
    model::{NewUser, User, UserRow},
};
use crate::errors::ApiError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("stored row is not a valid user: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Backend(#[from] sqlx::Error),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => ApiError::DuplicateEmail,
            other => ApiError::Internal(other.into()),
        }
    }
}

/// Persistence for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// `email` must already be normalized.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Fails with [`StoreError::DuplicateEmail`] without touching the existing row.
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// Writes only the fields present in `changes`. `None` if the user is gone.
    async fn update_profile(
        &self,
        id: Uuid,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, StoreError>;

    async fn record_login(&self, id: Uuid, at: OffsetDateTime)
        -> Result<Option<User>, StoreError>;
}

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, phone, location, \
     bio, skills, experience, is_active, last_login, created_at, updated_at";

pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn into_user(row: UserRow) -> Result<User, StoreError> {
    let id = row.id;
    User::try_from(row).map_err(|_| StoreError::Corrupt(format!("user {id} has unknown experience")))
}

fn map_insert_error(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateEmail,
        _ => StoreError::Backend(e),
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(into_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        row.map(into_user).transpose()
    }

    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let NewUser {
            email,
            password_hash,
            profile,
        } = new_user;
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, email, password_hash, first_name, last_name, phone,
                               location, bio, skills, experience)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .bind(profile.first_name)
        .bind(profile.last_name)
        .bind(profile.phone)
        .bind(profile.location)
        .bind(profile.bio)
        .bind(profile.skills)
        .bind(profile.experience.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(map_insert_error)?;
        into_user(row)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, StoreError> {
        // Single statement, only the present columns: concurrent writers are
        // last-write-wins per field.
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE users SET updated_at = now()");
        if let Some(v) = &changes.first_name {
            qb.push(", first_name = ").push_bind(v.clone());
        }
        if let Some(v) = &changes.last_name {
            qb.push(", last_name = ").push_bind(v.clone());
        }
        if let Some(v) = &changes.phone {
            qb.push(", phone = ").push_bind(v.clone());
        }
        if let Some(v) = &changes.location {
            qb.push(", location = ").push_bind(v.clone());
        }
        if let Some(v) = &changes.bio {
            qb.push(", bio = ").push_bind(v.clone());
        }
        if let Some(v) = &changes.skills {
            qb.push(", skills = ").push_bind(v.clone());
        }
        if let Some(v) = changes.experience {
            qb.push(", experience = ").push_bind(v.as_str());
        }
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(USER_COLUMNS);

        debug!(user_id = %id, sql = qb.sql(), "update profile");
        let row = qb
            .build_query_as::<UserRow>()
            .fetch_optional(&self.db)
            .await?;
        row.map(into_user).transpose()
    }

    async fn record_login(
        &self,
        id: Uuid,
        at: OffsetDateTime,
    ) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET last_login = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(at)
        .fetch_optional(&self.db)
        .await?;
        row.map(into_user).transpose()
    }
}
