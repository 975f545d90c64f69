//! User profile reads and edits.

use std::sync::Arc;

use tracing::{debug, instrument};

use cartwright_core::UserId;

use super::ShopError;
use crate::db::{Stores, UserStore};
use crate::models::{ProfileUpdate, User, UserProfile};

/// Profile access for the logged-in user.
#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UserStore>,
}

impl ProfileService {
    #[must_use]
    pub fn new(stores: &Stores) -> Self {
        Self {
            users: Arc::clone(&stores.users),
        }
    }

    /// The user's profile.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` if the user no longer exists.
    pub async fn get(&self, user_id: UserId) -> Result<User, ShopError> {
        self.users
            .user_by_id(user_id)
            .await?
            .ok_or(ShopError::NotFound("user"))
    }

    /// Apply `update` to the user's profile and return the result.
    ///
    /// Later checkouts snapshot the updated address; placed orders keep the
    /// address they were created with.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` if the user no longer exists.
    #[instrument(skip(self, update), fields(user_id = %user_id))]
    pub async fn update(&self, user_id: UserId, update: ProfileUpdate) -> Result<User, ShopError> {
        let current = self.get(user_id).await?;
        let profile = update.apply(&UserProfile::from(&current));

        let updated = self
            .users
            .update_profile(user_id, &profile)
            .await?
            .ok_or(ShopError::NotFound("user"))?;

        debug!("Profile updated");
        Ok(updated)
    }
}
