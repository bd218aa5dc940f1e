//! Port for reference data: contacts, categories, expense groups, products.
use async_trait::async_trait;

use crate::domain::{
    Category, CategoryId, CategoryKind, Contact, ContactDraft, ContactId, ContactKind,
    ExpenseGroup, ExpenseGroupId, Product, ProductDraft, ProductId, RestaurantId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by reference data adapters.
    pub enum ReferenceRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "reference repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "reference repository query failed: {message}",
    }
}

/// A reference record addressed for archiving or restoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceTarget {
    /// Customer or supplier.
    Contact(ContactId),
    /// Category.
    Category(CategoryId),
    /// Expense group.
    ExpenseGroup(ExpenseGroupId),
    /// Product.
    Product(ProductId),
}

/// Port for reference data tables. Every call is scoped to one restaurant.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferenceRepository: Send + Sync {
    /// Customers or suppliers, by name.
    async fn list_contacts(
        &self,
        restaurant_id: &RestaurantId,
        kind: ContactKind,
        include_inactive: bool,
    ) -> Result<Vec<Contact>, ReferenceRepositoryError>;

    /// One contact.
    async fn find_contact(
        &self,
        restaurant_id: &RestaurantId,
        id: &ContactId,
    ) -> Result<Option<Contact>, ReferenceRepositoryError>;

    /// Insert a contact.
    async fn insert_contact(&self, contact: &Contact) -> Result<(), ReferenceRepositoryError>;

    /// Overwrite a contact's editable fields.
    async fn update_contact(
        &self,
        restaurant_id: &RestaurantId,
        id: &ContactId,
        draft: &ContactDraft,
    ) -> Result<Option<Contact>, ReferenceRepositoryError>;

    /// Categories, optionally of one kind, by name.
    async fn list_categories(
        &self,
        restaurant_id: &RestaurantId,
        kind: Option<CategoryKind>,
        include_inactive: bool,
    ) -> Result<Vec<Category>, ReferenceRepositoryError>;

    /// One category.
    async fn find_category(
        &self,
        restaurant_id: &RestaurantId,
        id: &CategoryId,
    ) -> Result<Option<Category>, ReferenceRepositoryError>;

    /// Insert a category.
    async fn insert_category(&self, category: &Category) -> Result<(), ReferenceRepositoryError>;

    /// Rename a category.
    async fn rename_category(
        &self,
        restaurant_id: &RestaurantId,
        id: &CategoryId,
        name: &str,
    ) -> Result<Option<Category>, ReferenceRepositoryError>;

    /// Expense groups by name.
    async fn list_expense_groups(
        &self,
        restaurant_id: &RestaurantId,
        include_inactive: bool,
    ) -> Result<Vec<ExpenseGroup>, ReferenceRepositoryError>;

    /// One expense group.
    async fn find_expense_group(
        &self,
        restaurant_id: &RestaurantId,
        id: &ExpenseGroupId,
    ) -> Result<Option<ExpenseGroup>, ReferenceRepositoryError>;

    /// Insert an expense group.
    async fn insert_expense_group(
        &self,
        group: &ExpenseGroup,
    ) -> Result<(), ReferenceRepositoryError>;

    /// Overwrite an expense group's name and description.
    async fn update_expense_group(
        &self,
        restaurant_id: &RestaurantId,
        id: &ExpenseGroupId,
        name: &str,
        description: Option<String>,
    ) -> Result<Option<ExpenseGroup>, ReferenceRepositoryError>;

    /// Products by name.
    async fn list_products(
        &self,
        restaurant_id: &RestaurantId,
        include_inactive: bool,
    ) -> Result<Vec<Product>, ReferenceRepositoryError>;

    /// One product.
    async fn find_product(
        &self,
        restaurant_id: &RestaurantId,
        id: &ProductId,
    ) -> Result<Option<Product>, ReferenceRepositoryError>;

    /// Insert a product.
    async fn insert_product(&self, product: &Product) -> Result<(), ReferenceRepositoryError>;

    /// Overwrite a product's editable fields.
    async fn update_product(
        &self,
        restaurant_id: &RestaurantId,
        id: &ProductId,
        draft: &ProductDraft,
    ) -> Result<Option<Product>, ReferenceRepositoryError>;

    /// Archive or restore a record. Returns `false` when it does not exist.
    async fn set_active(
        &self,
        restaurant_id: &RestaurantId,
        target: ReferenceTarget,
        active: bool,
    ) -> Result<bool, ReferenceRepositoryError>;
}
