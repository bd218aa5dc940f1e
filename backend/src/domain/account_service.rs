//! Account use-cases: registration, login, and the signed-in profile.

use std::sync::Arc;

use mockable::Clock;
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::domain::ports::{PasswordHasher, RestaurantRepository, UserRepository};
use crate::domain::repository_errors::{map_hash_error, map_restaurant_error, map_user_error};
use crate::domain::{Error, LoginCredentials, Registration, RestaurantMembership, User, UserId};

/// Signed-in user and the restaurants they belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// The account.
    pub user: User,
    /// Memberships with roles.
    pub restaurants: Vec<RestaurantMembership>,
}

/// Account service backing the auth endpoints.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    restaurants: Arc<dyn RestaurantRepository>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    /// Create the service from its ports.
    pub fn new(
        users: Arc<dyn UserRepository>,
        restaurants: Arc<dyn RestaurantRepository>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            restaurants,
            hasher,
            clock,
        }
    }

    /// Create an account. Duplicate emails are a `409 Conflict`.
    pub async fn register(&self, registration: Registration) -> Result<User, Error> {
        let password_hash = self
            .hasher
            .hash(registration.password())
            .map_err(map_hash_error)?;
        let user = User {
            id: UserId::random(),
            display_name: registration.display_name().to_owned(),
            email: registration.email().clone(),
            phone: registration.phone().cloned(),
            created_at: self.clock.utc(),
        };
        self.users
            .create(&user, &password_hash)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id, "account registered");
        Ok(user)
    }

    /// Check credentials. Unknown emails and wrong passwords both yield the
    /// same `401 Unauthorized`.
    pub async fn login(&self, credentials: LoginCredentials) -> Result<User, Error> {
        let stored = self
            .users
            .find_credentials(credentials.email())
            .await
            .map_err(map_user_error)?
            .ok_or_else(invalid_credentials)?;
        let matches = self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .map_err(map_hash_error)?;
        if !matches {
            return Err(invalid_credentials());
        }
        Ok(stored.user)
    }

    /// Current user and memberships. A session pointing at a deleted user is
    /// treated as signed out.
    pub async fn profile(&self, user_id: &UserId) -> Result<Profile, Error> {
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("login required"))?;
        let restaurants = self
            .restaurants
            .list_for_user(user_id)
            .await
            .map_err(map_restaurant_error)?;
        Ok(Profile { user, restaurants })
    }
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid email or password")
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
