//! User repository for database operations.
//!
//! Password hashes live in a separate `user_password` table and are only
//! read by [`UserStore::credentials_by_email`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use cartwright_core::{Email, UserId};

use super::{RepositoryError, UserStore, map_constraint};
use crate::models::{NewUser, PostalAddress, User, UserProfile};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip_code: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            email,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            address: PostalAddress {
                address: row.address,
                city: row.city,
                state: row.state,
                zip_code: row.zip_code,
            },
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserWithHashRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

const USER_COLUMNS: &str = "u.id, u.email, u.first_name, u.last_name, u.phone, \
                            u.address, u.city, u.state, u.zip_code, u.created_at";

/// `PostgreSQL` user repository.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserRepository {
    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM storefront.user u WHERE u.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithHashRow>(&format!(
            "SELECT {USER_COLUMNS}, p.password_hash
             FROM storefront.user u
             JOIN storefront.user_password p ON p.user_id = u.id
             WHERE u.email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| Ok((User::try_from(r.user)?, r.password_hash)))
            .transpose()
    }

    async fn create_user(
        &self,
        user: &NewUser,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO storefront.user
                 (email, first_name, last_name, phone, address, city, state, zip_code)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id, email, first_name, last_name, phone,
                       address, city, state, zip_code, created_at",
        )
        .bind(user.email.as_str())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone)
        .bind(&user.address.address)
        .bind(&user.address.city)
        .bind(&user.address.state)
        .bind(&user.address.zip_code)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_constraint(e, "email already exists"))?;

        let created = User::try_from(row)?;

        sqlx::query(
            "INSERT INTO storefront.user_password (user_id, password_hash)
             VALUES ($1, $2)",
        )
        .bind(created.id)
        .bind(password_hash)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn update_profile(
        &self,
        id: UserId,
        profile: &UserProfile,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE storefront.user
             SET first_name = $2, last_name = $3, phone = $4,
                 address = $5, city = $6, state = $7, zip_code = $8
             WHERE id = $1
             RETURNING id, email, first_name, last_name, phone,
                       address, city, state, zip_code, created_at",
        )
        .bind(id)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.phone)
        .bind(&profile.address.address)
        .bind(&profile.address.city)
        .bind(&profile.address.state)
        .bind(&profile.address.zip_code)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }
}
