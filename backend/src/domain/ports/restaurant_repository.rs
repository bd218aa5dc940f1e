//! Port for restaurants and their memberships.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Member, Restaurant, RestaurantId, RestaurantMembership, RestaurantSettings, Role, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by restaurant repository adapters.
    pub enum RestaurantRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "restaurant repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "restaurant repository query failed: {message}",
        /// The membership does not exist.
        MemberNotFound => "membership not found",
        /// The user is already a member.
        DuplicateMember => "user is already a member of this restaurant",
        /// The change would leave the restaurant without an owner.
        LastOwner => "a restaurant must keep at least one owner",
    }
}

/// Port for restaurant settings and staff.
///
/// Role changes and removals must re-check the owner count inside the same
/// transaction as the write and fail with
/// [`RestaurantRepositoryError::LastOwner`] when no owner would remain.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RestaurantRepository: Send + Sync {
    /// Insert a restaurant and make `owner` its first owner, atomically.
    async fn create(
        &self,
        restaurant: &Restaurant,
        owner: &UserId,
    ) -> Result<(), RestaurantRepositoryError>;

    /// Fetch a restaurant.
    async fn find(
        &self,
        id: &RestaurantId,
    ) -> Result<Option<Restaurant>, RestaurantRepositoryError>;

    /// Overwrite settings, returning the updated restaurant.
    async fn update_settings(
        &self,
        id: &RestaurantId,
        settings: &RestaurantSettings,
    ) -> Result<Option<Restaurant>, RestaurantRepositoryError>;

    /// Restaurants the user belongs to, with roles.
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<RestaurantMembership>, RestaurantRepositoryError>;

    /// Restaurants with notifications enabled and a phone set.
    async fn list_notifiable(&self) -> Result<Vec<Restaurant>, RestaurantRepositoryError>;

    /// Role held by a user, if any.
    async fn find_role(
        &self,
        restaurant_id: &RestaurantId,
        user_id: &UserId,
    ) -> Result<Option<Role>, RestaurantRepositoryError>;

    /// Members with their roles.
    async fn list_members(
        &self,
        restaurant_id: &RestaurantId,
    ) -> Result<Vec<Member>, RestaurantRepositoryError>;

    /// Grant a role to a user who is not yet a member.
    async fn add_member(
        &self,
        restaurant_id: &RestaurantId,
        user_id: &UserId,
        role: Role,
        joined_at: DateTime<Utc>,
    ) -> Result<(), RestaurantRepositoryError>;

    /// Change a member's role, keeping at least one owner.
    async fn change_role(
        &self,
        restaurant_id: &RestaurantId,
        user_id: &UserId,
        role: Role,
    ) -> Result<(), RestaurantRepositoryError>;

    /// Remove a member, keeping at least one owner.
    async fn remove_member(
        &self,
        restaurant_id: &RestaurantId,
        user_id: &UserId,
    ) -> Result<(), RestaurantRepositoryError>;
}
