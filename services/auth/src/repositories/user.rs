//! PostgreSQL user repository

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use super::UserStore;
use crate::models::{NewUser, Role, User, UserProfile};

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, phone, \
     date_of_birth, role, is_active, created_at, updated_at";

/// User repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> DatabaseResult<User> {
    let role: String = row.try_get("role").map_err(DatabaseError::Query)?;
    let role = role.parse::<Role>().map_err(DatabaseError::Configuration)?;

    Ok(User {
        id: row.try_get("id").map_err(DatabaseError::Query)?,
        email: row.try_get("email").map_err(DatabaseError::Query)?,
        password_hash: row.try_get("password_hash").map_err(DatabaseError::Query)?,
        profile: UserProfile {
            first_name: row.try_get("first_name").map_err(DatabaseError::Query)?,
            last_name: row.try_get("last_name").map_err(DatabaseError::Query)?,
            phone: row.try_get("phone").map_err(DatabaseError::Query)?,
            date_of_birth: row.try_get("date_of_birth").map_err(DatabaseError::Query)?,
        },
        role,
        is_active: row.try_get("is_active").map_err(DatabaseError::Query)?,
        created_at: row.try_get("created_at").map_err(DatabaseError::Query)?,
        updated_at: row.try_get("updated_at").map_err(DatabaseError::Query)?,
    })
}

#[async_trait]
impl UserStore for PgUserRepository {
    async fn insert(&self, new_user: &NewUser) -> DatabaseResult<i64> {
        info!("Creating new user: {}", new_user.email);

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, phone, date_of_birth, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.profile.first_name)
        .bind(&new_user.profile.last_name)
        .bind(&new_user.profile.phone)
        .bind(new_user.profile.date_of_birth)
        .bind(new_user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(id)
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let row = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        row.as_ref().map(user_from_row).transpose()
    }
}
