//! PostgreSQL-backed `ReferenceRepository`: contacts, categories, expense
//! groups, and products.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ReferenceRepository, ReferenceRepositoryError, ReferenceTarget};
use crate::domain::{
    Category, CategoryId, CategoryKind, Contact, ContactDraft, ContactId, ContactKind,
    ExpenseGroup, ExpenseGroupId, Product, ProductDraft, ProductId, RestaurantId,
};

use super::diesel_helpers::{RowError, map_diesel_error, map_pool_error};
use super::models::{CategoryRow, ContactRow, ExpenseGroupRow, ProductRow};
use super::pool::DbPool;
use super::schema::{categories, contacts, expense_groups, products};

/// Diesel-backed implementation of the reference data port.
#[derive(Clone)]
pub struct DieselReferenceRepository {
    pool: DbPool,
}

impl DieselReferenceRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn corrupt(err: RowError) -> ReferenceRepositoryError {
    err.into_port()
}

fn decode_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, ReferenceRepositoryError>
where
    T: TryFrom<R, Error = RowError>,
{
    rows.into_iter()
        .map(|row| T::try_from(row).map_err(corrupt))
        .collect()
}

fn decode_one<R, T>(row: Option<R>) -> Result<Option<T>, ReferenceRepositoryError>
where
    T: TryFrom<R, Error = RowError>,
{
    row.map(|row| T::try_from(row).map_err(corrupt)).transpose()
}

#[async_trait]
impl ReferenceRepository for DieselReferenceRepository {
    async fn list_contacts(
        &self,
        restaurant_id: &RestaurantId,
        kind: ContactKind,
        include_inactive: bool,
    ) -> Result<Vec<Contact>, ReferenceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = contacts::table
            .filter(contacts::restaurant_id.eq(restaurant_id.as_uuid()))
            .filter(contacts::kind.eq(kind.as_str()))
            .into_boxed();
        if !include_inactive {
            query = query.filter(contacts::active.eq(true));
        }
        let rows = query
            .order((contacts::name.asc(), contacts::id.asc()))
            .select(ContactRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        decode_all(rows)
    }

    async fn find_contact(
        &self,
        restaurant_id: &RestaurantId,
        id: &ContactId,
    ) -> Result<Option<Contact>, ReferenceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = contacts::table
            .filter(contacts::restaurant_id.eq(restaurant_id.as_uuid()))
            .filter(contacts::id.eq(id.as_uuid()))
            .select(ContactRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        decode_one(row)
    }

    async fn insert_contact(&self, contact: &Contact) -> Result<(), ReferenceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(contacts::table)
            .values(ContactRow::from(contact))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update_contact(
        &self,
        restaurant_id: &RestaurantId,
        id: &ContactId,
        draft: &ContactDraft,
    ) -> Result<Option<Contact>, ReferenceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(
            contacts::table
                .filter(contacts::restaurant_id.eq(restaurant_id.as_uuid()))
                .filter(contacts::id.eq(id.as_uuid())),
        )
        .set((
            contacts::name.eq(&draft.name),
            contacts::phone.eq(draft.phone.as_ref().map(|phone| phone.as_str())),
            contacts::email.eq(draft.email.as_deref()),
            contacts::address.eq(draft.address.as_deref()),
            contacts::notes.eq(draft.notes.as_deref()),
        ))
        .returning(ContactRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
        decode_one(row)
    }

    async fn list_categories(
        &self,
        restaurant_id: &RestaurantId,
        kind: Option<CategoryKind>,
        include_inactive: bool,
    ) -> Result<Vec<Category>, ReferenceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = categories::table
            .filter(categories::restaurant_id.eq(restaurant_id.as_uuid()))
            .into_boxed();
        if let Some(kind) = kind {
            query = query.filter(categories::kind.eq(kind.as_str()));
        }
        if !include_inactive {
            query = query.filter(categories::active.eq(true));
        }
        let rows = query
            .order((categories::name.asc(), categories::id.asc()))
            .select(CategoryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        decode_all(rows)
    }

    async fn find_category(
        &self,
        restaurant_id: &RestaurantId,
        id: &CategoryId,
    ) -> Result<Option<Category>, ReferenceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = categories::table
            .filter(categories::restaurant_id.eq(restaurant_id.as_uuid()))
            .filter(categories::id.eq(id.as_uuid()))
            .select(CategoryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        decode_one(row)
    }

    async fn insert_category(&self, category: &Category) -> Result<(), ReferenceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(categories::table)
            .values(CategoryRow::from(category))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn rename_category(
        &self,
        restaurant_id: &RestaurantId,
        id: &CategoryId,
        name: &str,
    ) -> Result<Option<Category>, ReferenceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(
            categories::table
                .filter(categories::restaurant_id.eq(restaurant_id.as_uuid()))
                .filter(categories::id.eq(id.as_uuid())),
        )
        .set(categories::name.eq(name))
        .returning(CategoryRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
        decode_one(row)
    }

    async fn list_expense_groups(
        &self,
        restaurant_id: &RestaurantId,
        include_inactive: bool,
    ) -> Result<Vec<ExpenseGroup>, ReferenceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = expense_groups::table
            .filter(expense_groups::restaurant_id.eq(restaurant_id.as_uuid()))
            .into_boxed();
        if !include_inactive {
            query = query.filter(expense_groups::active.eq(true));
        }
        let rows: Vec<ExpenseGroupRow> = query
            .order((expense_groups::name.asc(), expense_groups::id.asc()))
            .select(ExpenseGroupRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(ExpenseGroup::from).collect())
    }

    async fn find_expense_group(
        &self,
        restaurant_id: &RestaurantId,
        id: &ExpenseGroupId,
    ) -> Result<Option<ExpenseGroup>, ReferenceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ExpenseGroupRow> = expense_groups::table
            .filter(expense_groups::restaurant_id.eq(restaurant_id.as_uuid()))
            .filter(expense_groups::id.eq(id.as_uuid()))
            .select(ExpenseGroupRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(ExpenseGroup::from))
    }

    async fn insert_expense_group(
        &self,
        group: &ExpenseGroup,
    ) -> Result<(), ReferenceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(expense_groups::table)
            .values(ExpenseGroupRow::from(group))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update_expense_group(
        &self,
        restaurant_id: &RestaurantId,
        id: &ExpenseGroupId,
        name: &str,
        description: Option<String>,
    ) -> Result<Option<ExpenseGroup>, ReferenceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ExpenseGroupRow> = diesel::update(
            expense_groups::table
                .filter(expense_groups::restaurant_id.eq(restaurant_id.as_uuid()))
                .filter(expense_groups::id.eq(id.as_uuid())),
        )
        .set((
            expense_groups::name.eq(name),
            expense_groups::description.eq(description),
        ))
        .returning(ExpenseGroupRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
        Ok(row.map(ExpenseGroup::from))
    }

    async fn list_products(
        &self,
        restaurant_id: &RestaurantId,
        include_inactive: bool,
    ) -> Result<Vec<Product>, ReferenceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = products::table
            .filter(products::restaurant_id.eq(restaurant_id.as_uuid()))
            .into_boxed();
        if !include_inactive {
            query = query.filter(products::active.eq(true));
        }
        let rows = query
            .order((products::name.asc(), products::id.asc()))
            .select(ProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        decode_all(rows)
    }

    async fn find_product(
        &self,
        restaurant_id: &RestaurantId,
        id: &ProductId,
    ) -> Result<Option<Product>, ReferenceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = products::table
            .filter(products::restaurant_id.eq(restaurant_id.as_uuid()))
            .filter(products::id.eq(id.as_uuid()))
            .select(ProductRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        decode_one(row)
    }

    async fn insert_product(&self, product: &Product) -> Result<(), ReferenceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(products::table)
            .values(ProductRow::from(product))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update_product(
        &self,
        restaurant_id: &RestaurantId,
        id: &ProductId,
        draft: &ProductDraft,
    ) -> Result<Option<Product>, ReferenceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(
            products::table
                .filter(products::restaurant_id.eq(restaurant_id.as_uuid()))
                .filter(products::id.eq(id.as_uuid())),
        )
        .set((
            products::name.eq(&draft.name),
            products::category_id.eq(draft.category_id.map(|id| *id.as_uuid())),
            products::unit_price.eq(draft.unit_price.get()),
        ))
        .returning(ProductRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
        decode_one(row)
    }

    async fn set_active(
        &self,
        restaurant_id: &RestaurantId,
        target: ReferenceTarget,
        active: bool,
    ) -> Result<bool, ReferenceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let tenant = restaurant_id.as_uuid();
        let affected = match target {
            ReferenceTarget::Contact(id) => {
                diesel::update(
                    contacts::table
                        .filter(contacts::restaurant_id.eq(tenant))
                        .filter(contacts::id.eq(id.as_uuid())),
                )
                .set(contacts::active.eq(active))
                .execute(&mut conn)
                .await
            }
            ReferenceTarget::Category(id) => {
                diesel::update(
                    categories::table
                        .filter(categories::restaurant_id.eq(tenant))
                        .filter(categories::id.eq(id.as_uuid())),
                )
                .set(categories::active.eq(active))
                .execute(&mut conn)
                .await
            }
            ReferenceTarget::ExpenseGroup(id) => {
                diesel::update(
                    expense_groups::table
                        .filter(expense_groups::restaurant_id.eq(tenant))
                        .filter(expense_groups::id.eq(id.as_uuid())),
                )
                .set(expense_groups::active.eq(active))
                .execute(&mut conn)
                .await
            }
            ReferenceTarget::Product(id) => {
                diesel::update(
                    products::table
                        .filter(products::restaurant_id.eq(tenant))
                        .filter(products::id.eq(id.as_uuid())),
                )
                .set(products::active.eq(active))
                .execute(&mut conn)
                .await
            }
        }
        .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }
}
