//! Reference data: customers, suppliers, categories, expense groups, and
//! products. Records are archived rather than deleted so history keeps its
//! links.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::macros::define_code_enum;
use super::{CategoryId, ContactId, ExpenseGroupId, Gnf, PhoneNumber, ProductId, RestaurantId};

/// Raised when a required name is blank after trimming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("name must not be empty")]
pub struct EmptyNameError;

/// Trim a record name and reject blanks.
///
/// # Examples
/// ```
/// use fournil::domain::normalize_name;
///
/// assert_eq!(normalize_name("  Farine T55 ").as_deref(), Ok("Farine T55"));
/// assert!(normalize_name("   ").is_err());
/// ```
pub fn normalize_name(raw: &str) -> Result<String, EmptyNameError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(EmptyNameError)
    } else {
        Ok(trimmed.to_owned())
    }
}

/// Trim optional free text, mapping blanks to `None`.
pub fn normalize_optional_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

define_code_enum! {
    /// Whether a contact buys from or sells to the restaurant.
    pub enum ContactKind / ParseContactKindError ("contact kind") {
        /// Buys goods, may owe debts.
        Customer => "customer",
        /// Sells ingredients and supplies.
        Supplier => "supplier",
    }
}

define_code_enum! {
    /// What a category classifies.
    pub enum CategoryKind / ParseCategoryKindError ("category kind") {
        /// Inventory items.
        Inventory => "inventory",
        /// Expenses.
        Expense => "expense",
        /// Sellable products.
        Product => "product",
    }
}

/// A customer or supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Identifier.
    pub id: ContactId,
    /// Owning restaurant.
    pub restaurant_id: RestaurantId,
    /// Customer or supplier.
    pub kind: ContactKind,
    /// Name.
    pub name: String,
    /// Phone.
    pub phone: Option<PhoneNumber>,
    /// Email, free form.
    pub email: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// False once archived.
    pub active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Editable contact fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDraft {
    /// Name.
    pub name: String,
    /// Phone.
    pub phone: Option<PhoneNumber>,
    /// Email, free form.
    pub email: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Notes.
    pub notes: Option<String>,
}

/// A category of inventory items, expenses, or products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Identifier.
    pub id: CategoryId,
    /// Owning restaurant.
    pub restaurant_id: RestaurantId,
    /// What the category classifies.
    pub kind: CategoryKind,
    /// Name.
    pub name: String,
    /// False once archived.
    pub active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A named group of expenses, such as a renovation project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseGroup {
    /// Identifier.
    pub id: ExpenseGroupId,
    /// Owning restaurant.
    pub restaurant_id: RestaurantId,
    /// Name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// False once archived.
    pub active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Something the restaurant bakes or sells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Identifier.
    pub id: ProductId,
    /// Owning restaurant.
    pub restaurant_id: RestaurantId,
    /// Name.
    pub name: String,
    /// Product category.
    pub category_id: Option<CategoryId>,
    /// Selling price.
    pub unit_price: Gnf,
    /// False once archived.
    pub active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Editable product fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    /// Name.
    pub name: String,
    /// Product category.
    pub category_id: Option<CategoryId>,
    /// Selling price.
    pub unit_price: Gnf,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(None, None)]
    #[case(Some("   "), None)]
    #[case(Some(" note "), Some("note"))]
    fn optional_text_drops_blanks(#[case] raw: Option<&str>, #[case] expected: Option<&str>) {
        assert_eq!(normalize_optional_text(raw).as_deref(), expected);
    }
}
