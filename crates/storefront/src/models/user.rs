//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cartwright_core::{Email, UserId};

/// Postal address kept on the user profile.
///
/// Checkout copies it into the order as a single-line snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
}

impl PostalAddress {
    /// Render the non-empty parts as one line (`"1 Main St, Springfield, IL 62701"`).
    ///
    /// Returns `None` when no part is set.
    #[must_use]
    pub fn one_line(&self) -> Option<String> {
        let region = [self.state.as_deref(), self.zip_code.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let parts: Vec<&str> = [self.address.as_deref(), self.city.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .chain((!region.is_empty()).then_some(region.as_str()))
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// A registered shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    #[serde(flatten)]
    pub address: PostalAddress,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

/// Registration input, after email validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: Email,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: PostalAddress,
}

/// Stored profile fields of a user, written as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: PostalAddress,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone: user.phone.clone(),
            address: user.address.clone(),
        }
    }
}

/// Body of `PATCH /api/users/me`.
///
/// An absent field is left unchanged; a blank one is cleared. The email is
/// the login identity and cannot be changed here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
}

impl ProfileUpdate {
    /// The profile that results from applying this update to `current`.
    #[must_use]
    pub fn apply(self, current: &UserProfile) -> UserProfile {
        fn merge(update: Option<String>, current: Option<&str>) -> Option<String> {
            match update {
                None => current.map(str::to_owned),
                Some(value) => {
                    let value = value.trim();
                    (!value.is_empty()).then(|| value.to_owned())
                }
            }
        }

        UserProfile {
            first_name: merge(self.first_name, current.first_name.as_deref()),
            last_name: merge(self.last_name, current.last_name.as_deref()),
            phone: merge(self.phone, current.phone.as_deref()),
            address: PostalAddress {
                address: merge(self.address, current.address.address.as_deref()),
                city: merge(self.city, current.address.city.as_deref()),
                state: merge(self.state, current.address.state.as_deref()),
                zip_code: merge(self.zip_code, current.address.zip_code.as_deref()),
            },
        }
    }
}
