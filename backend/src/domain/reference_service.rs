//! Reference data use-cases and the lookups other services use to validate
//! references.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{ReferenceRepository, ReferenceTarget};
use crate::domain::repository_errors::map_reference_error;
use crate::domain::{
    Action, Category, CategoryId, CategoryKind, Contact, ContactDraft, ContactId, ContactKind,
    Error, ExpenseGroup, ExpenseGroupId, MemberContext, Product, ProductDraft, ProductId,
    RestaurantId, normalize_name, normalize_optional_text,
};

/// Permission needed to edit contacts of a kind.
fn contact_action(kind: ContactKind) -> Action {
    match kind {
        ContactKind::Customer => Action::ManageCustomers,
        ContactKind::Supplier => Action::ManageCatalogue,
    }
}

fn name_error(field: &str) -> impl FnOnce(crate::domain::EmptyNameError) -> Error + '_ {
    move |err| Error::invalid_field(field, "empty", err.to_string())
}

/// Require an active category of `kind` in the restaurant.
pub(crate) async fn require_category(
    repo: &dyn ReferenceRepository,
    restaurant_id: &RestaurantId,
    id: &CategoryId,
    kind: CategoryKind,
    field: &str,
) -> Result<Category, Error> {
    let category = repo
        .find_category(restaurant_id, id)
        .await
        .map_err(map_reference_error)?
        .filter(|category| category.active)
        .ok_or_else(|| Error::invalid_field(field, "unknown", format!("category {id} not found")))?;
    if category.kind != kind {
        return Err(Error::invalid_field(
            field,
            "wrong_kind",
            format!("category {} is not a {kind} category", category.name),
        ));
    }
    Ok(category)
}

/// Require an active contact of `kind` in the restaurant.
pub(crate) async fn require_contact(
    repo: &dyn ReferenceRepository,
    restaurant_id: &RestaurantId,
    id: &ContactId,
    kind: ContactKind,
    field: &str,
) -> Result<Contact, Error> {
    repo.find_contact(restaurant_id, id)
        .await
        .map_err(map_reference_error)?
        .filter(|contact| contact.active && contact.kind == kind)
        .ok_or_else(|| Error::invalid_field(field, "unknown", format!("{kind} {id} not found")))
}

/// Reference data service.
#[derive(Clone)]
pub struct ReferenceService {
    repo: Arc<dyn ReferenceRepository>,
    clock: Arc<dyn Clock>,
}

impl ReferenceService {
    /// Create the service from its port.
    pub fn new(repo: Arc<dyn ReferenceRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    fn clean_contact(draft: ContactDraft) -> Result<ContactDraft, Error> {
        Ok(ContactDraft {
            name: normalize_name(&draft.name).map_err(name_error("name"))?,
            email: normalize_optional_text(draft.email.as_deref()),
            address: normalize_optional_text(draft.address.as_deref()),
            notes: normalize_optional_text(draft.notes.as_deref()),
            phone: draft.phone,
        })
    }

    /// Customers or suppliers.
    pub async fn list_contacts(
        &self,
        ctx: &MemberContext,
        kind: ContactKind,
        include_inactive: bool,
    ) -> Result<Vec<Contact>, Error> {
        ctx.require(Action::View)?;
        self.repo
            .list_contacts(&ctx.restaurant_id, kind, include_inactive)
            .await
            .map_err(map_reference_error)
    }

    /// One contact of `kind`.
    pub async fn get_contact(
        &self,
        ctx: &MemberContext,
        kind: ContactKind,
        id: &ContactId,
    ) -> Result<Contact, Error> {
        ctx.require(Action::View)?;
        self.repo
            .find_contact(&ctx.restaurant_id, id)
            .await
            .map_err(map_reference_error)?
            .filter(|contact| contact.kind == kind)
            .ok_or_else(|| Error::not_found(format!("{kind} {id} not found")))
    }

    /// Create a customer or supplier.
    pub async fn create_contact(
        &self,
        ctx: &MemberContext,
        kind: ContactKind,
        draft: ContactDraft,
    ) -> Result<Contact, Error> {
        ctx.require(contact_action(kind))?;
        let draft = Self::clean_contact(draft)?;
        let contact = Contact {
            id: ContactId::random(),
            restaurant_id: ctx.restaurant_id,
            kind,
            name: draft.name,
            phone: draft.phone,
            email: draft.email,
            address: draft.address,
            notes: draft.notes,
            active: true,
            created_at: self.clock.utc(),
        };
        self.repo
            .insert_contact(&contact)
            .await
            .map_err(map_reference_error)?;
        Ok(contact)
    }

    /// Edit a customer or supplier.
    pub async fn update_contact(
        &self,
        ctx: &MemberContext,
        kind: ContactKind,
        id: &ContactId,
        draft: ContactDraft,
    ) -> Result<Contact, Error> {
        ctx.require(contact_action(kind))?;
        self.get_contact(ctx, kind, id).await?;
        let draft = Self::clean_contact(draft)?;
        self.repo
            .update_contact(&ctx.restaurant_id, id, &draft)
            .await
            .map_err(map_reference_error)?
            .ok_or_else(|| Error::not_found(format!("{kind} {id} not found")))
    }

    /// Archive or restore a customer or supplier.
    pub async fn set_contact_active(
        &self,
        ctx: &MemberContext,
        kind: ContactKind,
        id: &ContactId,
        active: bool,
    ) -> Result<(), Error> {
        ctx.require(contact_action(kind))?;
        self.get_contact(ctx, kind, id).await?;
        self.set_active(ctx, ReferenceTarget::Contact(*id), active)
            .await
    }

    /// Categories, optionally of one kind.
    pub async fn list_categories(
        &self,
        ctx: &MemberContext,
        kind: Option<CategoryKind>,
        include_inactive: bool,
    ) -> Result<Vec<Category>, Error> {
        ctx.require(Action::View)?;
        self.repo
            .list_categories(&ctx.restaurant_id, kind, include_inactive)
            .await
            .map_err(map_reference_error)
    }

    /// Create a category.
    pub async fn create_category(
        &self,
        ctx: &MemberContext,
        kind: CategoryKind,
        name: &str,
    ) -> Result<Category, Error> {
        ctx.require(Action::ManageCatalogue)?;
        let category = Category {
            id: CategoryId::random(),
            restaurant_id: ctx.restaurant_id,
            kind,
            name: normalize_name(name).map_err(name_error("name"))?,
            active: true,
            created_at: self.clock.utc(),
        };
        self.repo
            .insert_category(&category)
            .await
            .map_err(map_reference_error)?;
        Ok(category)
    }

    /// Rename a category. Its kind is fixed at creation.
    pub async fn rename_category(
        &self,
        ctx: &MemberContext,
        id: &CategoryId,
        name: &str,
    ) -> Result<Category, Error> {
        ctx.require(Action::ManageCatalogue)?;
        let name = normalize_name(name).map_err(name_error("name"))?;
        self.repo
            .rename_category(&ctx.restaurant_id, id, &name)
            .await
            .map_err(map_reference_error)?
            .ok_or_else(|| Error::not_found(format!("category {id} not found")))
    }

    /// Archive or restore a category.
    pub async fn set_category_active(
        &self,
        ctx: &MemberContext,
        id: &CategoryId,
        active: bool,
    ) -> Result<(), Error> {
        ctx.require(Action::ManageCatalogue)?;
        self.set_active(ctx, ReferenceTarget::Category(*id), active)
            .await
    }

    /// Expense groups.
    pub async fn list_expense_groups(
        &self,
        ctx: &MemberContext,
        include_inactive: bool,
    ) -> Result<Vec<ExpenseGroup>, Error> {
        ctx.require(Action::View)?;
        self.repo
            .list_expense_groups(&ctx.restaurant_id, include_inactive)
            .await
            .map_err(map_reference_error)
    }

    /// Create an expense group.
    pub async fn create_expense_group(
        &self,
        ctx: &MemberContext,
        name: &str,
        description: Option<&str>,
    ) -> Result<ExpenseGroup, Error> {
        ctx.require(Action::ManageCatalogue)?;
        let group = ExpenseGroup {
            id: ExpenseGroupId::random(),
            restaurant_id: ctx.restaurant_id,
            name: normalize_name(name).map_err(name_error("name"))?,
            description: normalize_optional_text(description),
            active: true,
            created_at: self.clock.utc(),
        };
        self.repo
            .insert_expense_group(&group)
            .await
            .map_err(map_reference_error)?;
        Ok(group)
    }

    /// Edit an expense group.
    pub async fn update_expense_group(
        &self,
        ctx: &MemberContext,
        id: &ExpenseGroupId,
        name: &str,
        description: Option<&str>,
    ) -> Result<ExpenseGroup, Error> {
        ctx.require(Action::ManageCatalogue)?;
        let name = normalize_name(name).map_err(name_error("name"))?;
        self.repo
            .update_expense_group(
                &ctx.restaurant_id,
                id,
                &name,
                normalize_optional_text(description),
            )
            .await
            .map_err(map_reference_error)?
            .ok_or_else(|| Error::not_found(format!("expense group {id} not found")))
    }

    /// Archive or restore an expense group.
    pub async fn set_expense_group_active(
        &self,
        ctx: &MemberContext,
        id: &ExpenseGroupId,
        active: bool,
    ) -> Result<(), Error> {
        ctx.require(Action::ManageCatalogue)?;
        self.set_active(ctx, ReferenceTarget::ExpenseGroup(*id), active)
            .await
    }

    /// Products.
    pub async fn list_products(
        &self,
        ctx: &MemberContext,
        include_inactive: bool,
    ) -> Result<Vec<Product>, Error> {
        ctx.require(Action::View)?;
        self.repo
            .list_products(&ctx.restaurant_id, include_inactive)
            .await
            .map_err(map_reference_error)
    }

    async fn clean_product(
        &self,
        ctx: &MemberContext,
        draft: ProductDraft,
    ) -> Result<ProductDraft, Error> {
        if let Some(category_id) = &draft.category_id {
            require_category(
                self.repo.as_ref(),
                &ctx.restaurant_id,
                category_id,
                CategoryKind::Product,
                "categoryId",
            )
            .await?;
        }
        Ok(ProductDraft {
            name: normalize_name(&draft.name).map_err(name_error("name"))?,
            ..draft
        })
    }

    /// Create a product.
    pub async fn create_product(
        &self,
        ctx: &MemberContext,
        draft: ProductDraft,
    ) -> Result<Product, Error> {
        ctx.require(Action::ManageCatalogue)?;
        let draft = self.clean_product(ctx, draft).await?;
        let product = Product {
            id: ProductId::random(),
            restaurant_id: ctx.restaurant_id,
            name: draft.name,
            category_id: draft.category_id,
            unit_price: draft.unit_price,
            active: true,
            created_at: self.clock.utc(),
        };
        self.repo
            .insert_product(&product)
            .await
            .map_err(map_reference_error)?;
        Ok(product)
    }

    /// Edit a product.
    pub async fn update_product(
        &self,
        ctx: &MemberContext,
        id: &ProductId,
        draft: ProductDraft,
    ) -> Result<Product, Error> {
        ctx.require(Action::ManageCatalogue)?;
        let draft = self.clean_product(ctx, draft).await?;
        self.repo
            .update_product(&ctx.restaurant_id, id, &draft)
            .await
            .map_err(map_reference_error)?
            .ok_or_else(|| Error::not_found(format!("product {id} not found")))
    }

    /// Archive or restore a product.
    pub async fn set_product_active(
        &self,
        ctx: &MemberContext,
        id: &ProductId,
        active: bool,
    ) -> Result<(), Error> {
        ctx.require(Action::ManageCatalogue)?;
        self.set_active(ctx, ReferenceTarget::Product(*id), active)
            .await
    }

    async fn set_active(
        &self,
        ctx: &MemberContext,
        target: ReferenceTarget,
        active: bool,
    ) -> Result<(), Error> {
        let found = self
            .repo
            .set_active(&ctx.restaurant_id, target, active)
            .await
            .map_err(map_reference_error)?;
        if found {
            Ok(())
        } else {
            Err(Error::not_found("record not found"))
        }
    }
}
