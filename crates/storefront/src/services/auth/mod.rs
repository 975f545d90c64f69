//! Authentication service.
//!
//! Identity is an injected port: handlers only see `Arc<dyn Authenticator>`
//! from [`crate::state::AppState`]. The shipped implementation stores
//! Argon2id password hashes through the [`UserStore`] port.

mod error;

pub use error::AuthError;

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;

use cartwright_core::Email;

use crate::db::{RepositoryError, UserStore};
use crate::models::{NewUser, PostalAddress, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Registration input as received from the client.
#[derive(Clone, Default, serde::Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(flatten)]
    pub address: PostalAddress,
}

/// Verifies and creates user identities.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Resolve a user from an email and password.
    async fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError>;

    /// Create a new user.
    async fn register(&self, registration: Registration) -> Result<User, AuthError>;
}

/// Password authenticator backed by Argon2id hashes.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl Authenticator for AuthService {
    /// Login with email and password.
    ///
    /// Unknown emails and wrong passwords are indistinguishable to the caller.
    async fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .users
            .credentials_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Register a new user with email and password.
    async fn register(&self, registration: Registration) -> Result<User, AuthError> {
        let email = Email::parse(&registration.email)?;

        validate_password(&registration.password)?;

        let password_hash = hash_password(&registration.password)?;

        let new_user = NewUser {
            email,
            first_name: non_blank(registration.first_name),
            last_name: non_blank(registration.last_name),
            phone: non_blank(registration.phone),
            address: PostalAddress {
                address: non_blank(registration.address.address),
                city: non_blank(registration.address.city),
                state: non_blank(registration.address.state),
                zip_code: non_blank(registration.address.zip_code),
            },
        };

        self.users
            .create_user(&new_user, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
