//! Staff roles and the actions they unlock within a restaurant.
//!
//! Roles form a strict ladder: each role may do everything the roles below
//! it may do. Handlers resolve a [`MemberContext`] for the signed-in user and
//! call [`MemberContext::require`] before touching tenant data.

use serde::Serialize;
use utoipa::ToSchema;

use super::macros::define_code_enum;
use super::{Error, RestaurantId, UserId};

define_code_enum! {
    /// Role held by a member of a restaurant.
    pub enum Role / ParseRoleError ("role") {
        /// Full control including settings and staff.
        Owner => "owner",
        /// Approves money flows and runs reconciliations.
        Manager => "manager",
        /// Maintains stock, production, and reference data.
        Editor => "editor",
        /// Records sales and debt payments at the till.
        Cashier => "cashier",
        /// Read-only access.
        Viewer => "viewer",
    }
}

impl Role {
    const fn rank(self) -> u8 {
        match self {
            Self::Owner => 4,
            Self::Manager => 3,
            Self::Editor => 2,
            Self::Cashier => 1,
            Self::Viewer => 0,
        }
    }

    /// True when this role is at least as senior as `other`.
    #[must_use]
    pub const fn at_least(self, other: Self) -> bool {
        self.rank() >= other.rank()
    }

    /// Whether the role may perform `action`.
    ///
    /// # Examples
    /// ```
    /// use fournil::domain::{Action, Role};
    ///
    /// assert!(Role::Cashier.permits(Action::RecordSale));
    /// assert!(!Role::Cashier.permits(Action::ApproveSale));
    /// assert!(Role::Owner.permits(Action::ApproveSale));
    /// ```
    #[must_use]
    pub const fn permits(self, action: Action) -> bool {
        self.at_least(action.minimum_role())
    }
}

/// Something a member may try to do inside a restaurant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Read any tenant data.
    View,
    /// Create or edit a pending sale.
    RecordSale,
    /// Record a payment against a debt.
    RecordDebtPayment,
    /// Create and edit customers.
    ManageCustomers,
    /// Create and edit inventory items.
    ManageInventory,
    /// Record stock movements.
    RecordStockMovement,
    /// Record production batches.
    RecordProduction,
    /// Create and edit suppliers, categories, expense groups, and products.
    ManageCatalogue,
    /// Create or edit a pending expense.
    RecordExpense,
    /// Approve, reject, or delete sales.
    ApproveSale,
    /// Approve, reject, or delete expenses.
    ApproveExpense,
    /// Create and write off debts, delete payments.
    ManageDebts,
    /// Create, confirm, reject, and delete bank transactions.
    ManageBank,
    /// Record reconciliations.
    Reconcile,
    /// Change restaurant settings.
    ManageSettings,
    /// Add, re-role, and remove members.
    ManageMembers,
}

impl Action {
    /// Least senior role allowed to perform this action.
    #[must_use]
    pub const fn minimum_role(self) -> Role {
        match self {
            Self::View => Role::Viewer,
            Self::RecordSale | Self::RecordDebtPayment | Self::ManageCustomers => Role::Cashier,
            Self::ManageInventory
            | Self::RecordStockMovement
            | Self::RecordProduction
            | Self::ManageCatalogue
            | Self::RecordExpense => Role::Editor,
            Self::ApproveSale
            | Self::ApproveExpense
            | Self::ManageDebts
            | Self::ManageBank
            | Self::Reconcile => Role::Manager,
            Self::ManageSettings | Self::ManageMembers => Role::Owner,
        }
    }
}

/// The signed-in user's membership in the restaurant being addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberContext {
    /// Signed-in user.
    pub user_id: UserId,
    /// Restaurant addressed by the request.
    pub restaurant_id: RestaurantId,
    /// Role held there.
    pub role: Role,
}

impl MemberContext {
    /// Fail with `403 Forbidden` unless the role permits `action`.
    pub fn require(&self, action: Action) -> Result<(), Error> {
        if self.role.permits(action) {
            Ok(())
        } else {
            Err(Error::forbidden(format!(
                "role {} may not perform this action",
                self.role
            ))
            .with_details(serde_json::json!({
                "role": self.role.as_str(),
                "requiredRole": action.minimum_role().as_str(),
            })))
        }
    }

    /// True when the member may act at `role` level or above.
    #[must_use]
    pub const fn is_at_least(&self, role: Role) -> bool {
        self.role.at_least(role)
    }
}
