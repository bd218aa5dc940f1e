//! Restaurant use-cases: creation, settings, and staff management.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::ports::{RestaurantRepository, UserRepository};
use crate::domain::repository_errors::{map_restaurant_error, map_user_error};
use crate::domain::{
    Action, DEFAULT_EXPIRY_WARNING_DAYS, EmailAddress, Error, MAX_EXPIRY_WARNING_DAYS, Member,
    MemberContext, PaymentSplit, Restaurant, RestaurantId, RestaurantSettings, Role, UserId,
    normalize_name,
};

/// Load a restaurant or fail with `404`.
pub(crate) async fn load_restaurant(
    repo: &dyn RestaurantRepository,
    id: &RestaurantId,
) -> Result<Restaurant, Error> {
    repo.find(id)
        .await
        .map_err(map_restaurant_error)?
        .ok_or_else(|| Error::not_found(format!("restaurant {id} not found")))
}

/// Restaurant service.
#[derive(Clone)]
pub struct RestaurantService {
    restaurants: Arc<dyn RestaurantRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl RestaurantService {
    /// Create the service from its ports.
    pub fn new(
        restaurants: Arc<dyn RestaurantRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            restaurants,
            users,
            clock,
        }
    }

    /// Resolve the caller's membership. Non-members get `404` so that
    /// restaurant ids cannot be probed.
    pub async fn member(
        &self,
        user_id: UserId,
        restaurant_id: RestaurantId,
    ) -> Result<MemberContext, Error> {
        let role = self
            .restaurants
            .find_role(&restaurant_id, &user_id)
            .await
            .map_err(map_restaurant_error)?
            .ok_or_else(|| Error::not_found(format!("restaurant {restaurant_id} not found")))?;
        Ok(MemberContext {
            user_id,
            restaurant_id,
            role,
        })
    }

    /// Create a restaurant owned by `owner`.
    pub async fn create(&self, owner: UserId, name: &str) -> Result<Restaurant, Error> {
        let name = normalize_name(name)
            .map_err(|err| Error::invalid_field("name", "empty", err.to_string()))?;
        let restaurant = Restaurant {
            id: RestaurantId::random(),
            name,
            notification_phone: None,
            notifications_enabled: false,
            initial_balances: PaymentSplit::default(),
            expiry_warning_days: DEFAULT_EXPIRY_WARNING_DAYS,
            created_at: self.clock.utc(),
        };
        self.restaurants
            .create(&restaurant, &owner)
            .await
            .map_err(map_restaurant_error)?;
        info!(restaurant_id = %restaurant.id, owner = %owner, "restaurant created");
        Ok(restaurant)
    }

    /// Fetch the restaurant addressed by `ctx`.
    pub async fn get(&self, ctx: &MemberContext) -> Result<Restaurant, Error> {
        ctx.require(Action::View)?;
        load_restaurant(self.restaurants.as_ref(), &ctx.restaurant_id).await
    }

    /// Overwrite settings (owners only).
    pub async fn update_settings(
        &self,
        ctx: &MemberContext,
        mut settings: RestaurantSettings,
    ) -> Result<Restaurant, Error> {
        ctx.require(Action::ManageSettings)?;
        settings.name = normalize_name(&settings.name)
            .map_err(|err| Error::invalid_field("name", "empty", err.to_string()))?;
        if settings.expiry_warning_days > MAX_EXPIRY_WARNING_DAYS {
            return Err(Error::invalid_field(
                "expiryWarningDays",
                "out_of_range",
                format!("expiry warning window must be between 0 and {MAX_EXPIRY_WARNING_DAYS} days"),
            ));
        }
        if settings.notifications_enabled && settings.notification_phone.is_none() {
            return Err(Error::invalid_field(
                "notificationPhone",
                "required",
                "a notification phone is required to enable notifications",
            ));
        }
        self.restaurants
            .update_settings(&ctx.restaurant_id, &settings)
            .await
            .map_err(map_restaurant_error)?
            .ok_or_else(|| Error::not_found("restaurant not found"))
    }

    /// Members and roles.
    pub async fn list_members(&self, ctx: &MemberContext) -> Result<Vec<Member>, Error> {
        ctx.require(Action::View)?;
        self.restaurants
            .list_members(&ctx.restaurant_id)
            .await
            .map_err(map_restaurant_error)
    }

    /// Add a registered user by email (owners only).
    pub async fn add_member(
        &self,
        ctx: &MemberContext,
        email: &EmailAddress,
        role: Role,
    ) -> Result<Member, Error> {
        ctx.require(Action::ManageMembers)?;
        let user = self
            .users
            .find_by_email(email)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| {
                Error::not_found(format!("no account registered for {}", email.as_str()))
            })?;
        let joined_at = self.clock.utc();
        self.restaurants
            .add_member(&ctx.restaurant_id, &user.id, role, joined_at)
            .await
            .map_err(map_restaurant_error)?;
        info!(restaurant_id = %ctx.restaurant_id, user_id = %user.id, %role, "member added");
        Ok(Member {
            user_id: user.id,
            display_name: user.display_name,
            email: user.email,
            role,
            joined_at,
        })
    }

    /// Change a member's role (owners only). The last owner cannot be
    /// demoted.
    pub async fn change_role(
        &self,
        ctx: &MemberContext,
        user_id: &UserId,
        role: Role,
    ) -> Result<(), Error> {
        ctx.require(Action::ManageMembers)?;
        self.restaurants
            .change_role(&ctx.restaurant_id, user_id, role)
            .await
            .map_err(map_restaurant_error)?;
        info!(restaurant_id = %ctx.restaurant_id, user_id = %user_id, %role, "member role changed");
        Ok(())
    }

    /// Remove a member. Owners may remove anyone, members may leave; the
    /// last owner can do neither.
    pub async fn remove_member(&self, ctx: &MemberContext, user_id: &UserId) -> Result<(), Error> {
        if *user_id != ctx.user_id {
            ctx.require(Action::ManageMembers)?;
        }
        self.restaurants
            .remove_member(&ctx.restaurant_id, user_id)
            .await
            .map_err(map_restaurant_error)?;
        info!(restaurant_id = %ctx.restaurant_id, user_id = %user_id, "member removed");
        Ok(())
    }
}

#[cfg(test)]
#[path = "restaurant_service_tests.rs"]
mod tests;
