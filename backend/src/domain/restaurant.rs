//! Restaurants (tenants) and their memberships.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{EmailAddress, PaymentSplit, PhoneNumber, RestaurantId, Role, UserId};

/// Default window, in days, before expiry when items are flagged.
pub const DEFAULT_EXPIRY_WARNING_DAYS: u16 = 2;

/// Largest accepted expiry warning window.
pub const MAX_EXPIRY_WARNING_DAYS: u16 = 30;

/// A bakery or restaurant and its settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    /// Identifier.
    pub id: RestaurantId,
    /// Trading name.
    pub name: String,
    /// Number receiving notifications.
    pub notification_phone: Option<PhoneNumber>,
    /// Whether SMS notifications are sent.
    pub notifications_enabled: bool,
    /// Opening balances per payment method.
    pub initial_balances: PaymentSplit,
    /// Days before expiry when items are flagged.
    pub expiry_warning_days: u16,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Restaurant {
    /// Phone to notify, when notifications are on and a number is set.
    pub fn notification_target(&self) -> Option<&PhoneNumber> {
        self.notification_phone
            .as_ref()
            .filter(|_| self.notifications_enabled)
    }
}

/// Editable restaurant settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestaurantSettings {
    /// Trading name.
    pub name: String,
    /// Number receiving notifications.
    pub notification_phone: Option<PhoneNumber>,
    /// Whether SMS notifications are sent.
    pub notifications_enabled: bool,
    /// Opening balances per payment method.
    pub initial_balances: PaymentSplit,
    /// Days before expiry when items are flagged.
    pub expiry_warning_days: u16,
}

/// A restaurant as seen by one of its members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantMembership {
    /// Restaurant identifier.
    pub restaurant_id: RestaurantId,
    /// Restaurant name.
    pub name: String,
    /// Role the member holds.
    pub role: Role,
}

/// A member as listed to colleagues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Member's user id.
    pub user_id: UserId,
    /// Display name.
    pub display_name: String,
    /// Email address.
    pub email: EmailAddress,
    /// Role held.
    pub role: Role,
    /// When the membership was granted.
    pub joined_at: DateTime<Utc>,
}
