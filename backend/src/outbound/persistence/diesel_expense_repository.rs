//! PostgreSQL-backed `ExpenseRepository`.
//!
//! Approval writes the review, the withdrawal, and any stock purchase in one
//! transaction; the purchase goes through the same guarded stock update as
//! manual movements.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ExpenseRepository, ExpenseRepositoryError, InventoryRepositoryError};
use crate::domain::{
    BankTransaction, Expense, ExpenseDraft, ExpenseFilter, ExpenseId, ListRequest, RestaurantId,
    ReviewStatus, StockMovement, UserId,
};

use super::diesel_helpers::{RowError, TxError, map_diesel_error, map_pool_error};
use super::diesel_inventory_repository::apply;
use super::models::{BankTransactionRow, ExpenseRow};
use super::pool::DbPool;
use super::schema::{bank_transactions, expenses};

const PENDING: &str = "pending";

type Tx<T> = Result<T, TxError<ExpenseRepositoryError>>;

/// Diesel-backed implementation of the expense repository port.
#[derive(Clone)]
pub struct DieselExpenseRepository {
    pool: DbPool,
}

impl DieselExpenseRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn corrupt(err: RowError) -> ExpenseRepositoryError {
    err.into_port()
}

/// Carry a stock-purchase refusal over to the expense port.
fn purchase_error(err: InventoryRepositoryError) -> ExpenseRepositoryError {
    match err {
        InventoryRepositoryError::Connection { message } => {
            ExpenseRepositoryError::connection(message)
        }
        InventoryRepositoryError::Query { message } => ExpenseRepositoryError::query(message),
        InventoryRepositoryError::ItemNotFound { item_id } => {
            ExpenseRepositoryError::purchase_item_not_found(item_id)
        }
        InventoryRepositoryError::InsufficientStock { item_id, item_name } => {
            ExpenseRepositoryError::insufficient_stock(item_id, item_name)
        }
    }
}

async fn refusal(
    conn: &mut AsyncPgConnection,
    restaurant_id: Uuid,
    id: Uuid,
) -> Result<ExpenseRepositoryError, DieselError> {
    let exists = diesel::select(diesel::dsl::exists(
        expenses::table
            .filter(expenses::restaurant_id.eq(restaurant_id))
            .filter(expenses::id.eq(id)),
    ))
    .get_result::<bool>(conn)
    .await?;
    Ok(if exists {
        ExpenseRepositoryError::not_pending()
    } else {
        ExpenseRepositoryError::not_found()
    })
}

struct Review<'a> {
    restaurant_id: Uuid,
    id: Uuid,
    status: ReviewStatus,
    reviewer: Uuid,
    reviewed_at: DateTime<Utc>,
    reason: Option<&'a str>,
}

async fn review(conn: &mut AsyncPgConnection, review: Review<'_>) -> Tx<Expense> {
    let row: Option<ExpenseRow> = diesel::update(
        expenses::table
            .filter(expenses::restaurant_id.eq(review.restaurant_id))
            .filter(expenses::id.eq(review.id))
            .filter(expenses::status.eq(PENDING)),
    )
    .set((
        expenses::status.eq(review.status.as_str()),
        expenses::reviewed_by.eq(Some(review.reviewer)),
        expenses::reviewed_at.eq(Some(review.reviewed_at)),
        expenses::rejection_reason.eq(review.reason),
    ))
    .returning(ExpenseRow::as_returning())
    .get_result(conn)
    .await
    .optional()?;
    match row {
        Some(row) => Ok(Expense::try_from(row)?),
        None => Err(TxError::Port(
            refusal(conn, review.restaurant_id, review.id).await?,
        )),
    }
}

#[async_trait]
impl ExpenseRepository for DieselExpenseRepository {
    async fn insert(&self, expense: &Expense) -> Result<(), ExpenseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(expenses::table)
            .values(ExpenseRow::from(expense))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find(
        &self,
        restaurant_id: &RestaurantId,
        id: &ExpenseId,
    ) -> Result<Option<Expense>, ExpenseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        expenses::table
            .filter(expenses::restaurant_id.eq(restaurant_id.as_uuid()))
            .filter(expenses::id.eq(id.as_uuid()))
            .select(ExpenseRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(|row| Expense::try_from(row).map_err(corrupt))
            .transpose()
    }

    async fn update_pending(
        &self,
        restaurant_id: &RestaurantId,
        id: &ExpenseId,
        draft: &ExpenseDraft,
    ) -> Result<Expense, ExpenseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let tenant = *restaurant_id.as_uuid();
        let expense_id = *id.as_uuid();
        let row: Option<ExpenseRow> = diesel::update(
            expenses::table
                .filter(expenses::restaurant_id.eq(tenant))
                .filter(expenses::id.eq(expense_id))
                .filter(expenses::status.eq(PENDING)),
        )
        .set((
            expenses::expense_date.eq(draft.date),
            expenses::amount.eq(draft.amount.get()),
            expenses::method.eq(draft.method.as_str()),
            expenses::category_id.eq(draft.category_id.as_uuid()),
            expenses::group_id.eq(draft.group_id.map(|id| *id.as_uuid())),
            expenses::supplier_id.eq(draft.supplier_id.map(|id| *id.as_uuid())),
            expenses::description.eq(draft.description.as_deref()),
            expenses::purchase_item_id.eq(draft.stock_purchase.map(|p| *p.item_id.as_uuid())),
            expenses::purchase_quantity_milli
                .eq(draft.stock_purchase.map(|p| p.quantity.to_milli())),
        ))
        .returning(ExpenseRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
        match row {
            Some(row) => Expense::try_from(row).map_err(corrupt),
            None => Err(refusal(&mut conn, tenant, expense_id)
                .await
                .map_err(map_diesel_error)?),
        }
    }

    async fn approve(
        &self,
        restaurant_id: &RestaurantId,
        id: &ExpenseId,
        reviewer: &UserId,
        reviewed_at: DateTime<Utc>,
        withdrawal: &BankTransaction,
        purchase: Option<StockMovement>,
    ) -> Result<Expense, ExpenseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let approval = Review {
            restaurant_id: *restaurant_id.as_uuid(),
            id: *id.as_uuid(),
            status: ReviewStatus::Approved,
            reviewer: *reviewer.as_uuid(),
            reviewed_at,
            reason: None,
        };
        let withdrawal_row = BankTransactionRow::from(withdrawal);
        let outcome: Tx<Expense> = conn
            .transaction(|conn| {
                async move {
                    let expense = review(conn, approval).await?;
                    diesel::insert_into(bank_transactions::table)
                        .values(withdrawal_row)
                        .execute(conn)
                        .await?;
                    if let Some(movement) = purchase {
                        apply(conn, &movement)
                            .await
                            .map_err(|err| err.map_port(purchase_error))?;
                    }
                    Ok(expense)
                }
                .scope_boxed()
            })
            .await;
        outcome.map_err(TxError::into_port)
    }

    async fn reject(
        &self,
        restaurant_id: &RestaurantId,
        id: &ExpenseId,
        reviewer: &UserId,
        reviewed_at: DateTime<Utc>,
        reason: &str,
    ) -> Result<Expense, ExpenseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rejection = Review {
            restaurant_id: *restaurant_id.as_uuid(),
            id: *id.as_uuid(),
            status: ReviewStatus::Rejected,
            reviewer: *reviewer.as_uuid(),
            reviewed_at,
            reason: Some(reason),
        };
        review(&mut conn, rejection)
            .await
            .map_err(TxError::into_port)
    }

    async fn delete_pending(
        &self,
        restaurant_id: &RestaurantId,
        id: &ExpenseId,
    ) -> Result<(), ExpenseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let tenant = *restaurant_id.as_uuid();
        let expense_id = *id.as_uuid();
        let deleted = diesel::delete(
            expenses::table
                .filter(expenses::restaurant_id.eq(tenant))
                .filter(expenses::id.eq(expense_id))
                .filter(expenses::status.eq(PENDING)),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if deleted == 0 {
            return Err(refusal(&mut conn, tenant, expense_id)
                .await
                .map_err(map_diesel_error)?);
        }
        Ok(())
    }

    async fn list(
        &self,
        restaurant_id: &RestaurantId,
        filter: &ExpenseFilter,
        page: &ListRequest,
    ) -> Result<Vec<Expense>, ExpenseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = expenses::table
            .filter(expenses::restaurant_id.eq(restaurant_id.as_uuid()))
            .into_boxed();
        if let Some(status) = filter.status {
            query = query.filter(expenses::status.eq(status.as_str()));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(expenses::category_id.eq(*category_id.as_uuid()));
        }
        if let Some(group_id) = filter.group_id {
            query = query.filter(expenses::group_id.eq(*group_id.as_uuid()));
        }
        if let Some(from) = filter.from {
            query = query.filter(expenses::expense_date.ge(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(expenses::expense_date.le(to));
        }
        if let Some(key) = page.after_key() {
            let day = key.at.date_naive();
            query = query.filter(
                expenses::expense_date
                    .lt(day)
                    .or(expenses::expense_date.eq(day).and(expenses::id.lt(key.id))),
            );
        }
        query
            .order((expenses::expense_date.desc(), expenses::id.desc()))
            .limit(page.limit().overfetch())
            .select(ExpenseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(|row| Expense::try_from(row).map_err(corrupt))
            .collect()
    }
}
