//! PostgreSQL-backed `SaleRepository`.
//!
//! State changes are conditional on `status = 'pending'`. When such an
//! update touches no row, a follow-up lookup tells a missing sale from one
//! that has already been reviewed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{SaleRepository, SaleRepositoryError};
use crate::domain::{
    BankTransaction, Gnf, ListRequest, RestaurantId, ReviewStatus, Sale, SaleDraft, SaleFilter,
    SaleId, UserId,
};

use super::diesel_helpers::{
    RowError, TxError, is_unique_violation, map_diesel_error, map_pool_error,
};
use super::models::{BankTransactionRow, SaleRow};
use super::pool::DbPool;
use super::schema::{bank_transactions, sales};

const DATE_CONSTRAINT: &str = "sales_restaurant_date_key";
const PENDING: &str = "pending";

type Tx<T> = Result<T, TxError<SaleRepositoryError>>;

/// Diesel-backed implementation of the sale repository port.
#[derive(Clone)]
pub struct DieselSaleRepository {
    pool: DbPool,
}

impl DieselSaleRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn corrupt(err: RowError) -> SaleRepositoryError {
    err.into_port()
}

fn map_write_error(error: DieselError) -> SaleRepositoryError {
    if is_unique_violation(&error, DATE_CONSTRAINT) {
        SaleRepositoryError::duplicate_date()
    } else {
        map_diesel_error(error)
    }
}

/// `NotFound` or `NotPending` for a conditional write that matched nothing.
async fn refusal(
    conn: &mut AsyncPgConnection,
    restaurant_id: Uuid,
    id: Uuid,
) -> Result<SaleRepositoryError, DieselError> {
    let exists = diesel::select(diesel::dsl::exists(
        sales::table
            .filter(sales::restaurant_id.eq(restaurant_id))
            .filter(sales::id.eq(id)),
    ))
    .get_result::<bool>(conn)
    .await?;
    Ok(if exists {
        SaleRepositoryError::not_pending()
    } else {
        SaleRepositoryError::not_found()
    })
}

/// Mark a pending sale reviewed, inside the caller's transaction.
async fn review(
    conn: &mut AsyncPgConnection,
    restaurant_id: Uuid,
    id: Uuid,
    status: ReviewStatus,
    reviewer: Uuid,
    reviewed_at: DateTime<Utc>,
    reason: Option<&str>,
) -> Tx<Sale> {
    let row: Option<SaleRow> = diesel::update(
        sales::table
            .filter(sales::restaurant_id.eq(restaurant_id))
            .filter(sales::id.eq(id))
            .filter(sales::status.eq(PENDING)),
    )
    .set((
        sales::status.eq(status.as_str()),
        sales::reviewed_by.eq(Some(reviewer)),
        sales::reviewed_at.eq(Some(reviewed_at)),
        sales::rejection_reason.eq(reason),
    ))
    .returning(SaleRow::as_returning())
    .get_result(conn)
    .await
    .optional()?;
    match row {
        Some(row) => Ok(Sale::try_from(row)?),
        None => Err(TxError::Port(refusal(conn, restaurant_id, id).await?)),
    }
}

#[async_trait]
impl SaleRepository for DieselSaleRepository {
    async fn insert(&self, sale: &Sale) -> Result<(), SaleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(sales::table)
            .values(SaleRow::from(sale))
            .execute(&mut conn)
            .await
            .map_err(map_write_error)?;
        Ok(())
    }

    async fn find(
        &self,
        restaurant_id: &RestaurantId,
        id: &SaleId,
    ) -> Result<Option<Sale>, SaleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        sales::table
            .filter(sales::restaurant_id.eq(restaurant_id.as_uuid()))
            .filter(sales::id.eq(id.as_uuid()))
            .select(SaleRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(|row| Sale::try_from(row).map_err(corrupt))
            .transpose()
    }

    async fn update_pending(
        &self,
        restaurant_id: &RestaurantId,
        id: &SaleId,
        draft: &SaleDraft,
        total: Gnf,
    ) -> Result<Sale, SaleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let tenant = *restaurant_id.as_uuid();
        let sale_id = *id.as_uuid();
        let row: Option<SaleRow> = diesel::update(
            sales::table
                .filter(sales::restaurant_id.eq(tenant))
                .filter(sales::id.eq(sale_id))
                .filter(sales::status.eq(PENDING)),
        )
        .set((
            sales::business_date.eq(draft.business_date),
            sales::cash.eq(draft.amounts.cash.get()),
            sales::orange_money.eq(draft.amounts.orange_money.get()),
            sales::card.eq(draft.amounts.card.get()),
            sales::total.eq(total.get()),
            sales::customer_id.eq(draft.customer_id.map(|id| *id.as_uuid())),
            sales::notes.eq(draft.notes.as_deref()),
        ))
        .returning(SaleRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_write_error)?;
        match row {
            Some(row) => Sale::try_from(row).map_err(corrupt),
            None => Err(refusal(&mut conn, tenant, sale_id)
                .await
                .map_err(map_diesel_error)?),
        }
    }

    async fn approve(
        &self,
        restaurant_id: &RestaurantId,
        id: &SaleId,
        reviewer: &UserId,
        reviewed_at: DateTime<Utc>,
        deposits: &[BankTransaction],
    ) -> Result<Sale, SaleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let tenant = *restaurant_id.as_uuid();
        let sale_id = *id.as_uuid();
        let reviewer = *reviewer.as_uuid();
        let deposit_rows: Vec<BankTransactionRow> =
            deposits.iter().map(BankTransactionRow::from).collect();
        let outcome: Tx<Sale> = conn
            .transaction(|conn| {
                async move {
                    let sale = review(
                        conn,
                        tenant,
                        sale_id,
                        ReviewStatus::Approved,
                        reviewer,
                        reviewed_at,
                        None,
                    )
                    .await?;
                    if !deposit_rows.is_empty() {
                        diesel::insert_into(bank_transactions::table)
                            .values(&deposit_rows)
                            .execute(conn)
                            .await?;
                    }
                    Ok(sale)
                }
                .scope_boxed()
            })
            .await;
        outcome.map_err(TxError::into_port)
    }

    async fn reject(
        &self,
        restaurant_id: &RestaurantId,
        id: &SaleId,
        reviewer: &UserId,
        reviewed_at: DateTime<Utc>,
        reason: &str,
    ) -> Result<Sale, SaleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        review(
            &mut conn,
            *restaurant_id.as_uuid(),
            *id.as_uuid(),
            ReviewStatus::Rejected,
            *reviewer.as_uuid(),
            reviewed_at,
            Some(reason),
        )
        .await
        .map_err(TxError::into_port)
    }

    async fn delete_pending(
        &self,
        restaurant_id: &RestaurantId,
        id: &SaleId,
    ) -> Result<(), SaleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let tenant = *restaurant_id.as_uuid();
        let sale_id = *id.as_uuid();
        let deleted = diesel::delete(
            sales::table
                .filter(sales::restaurant_id.eq(tenant))
                .filter(sales::id.eq(sale_id))
                .filter(sales::status.eq(PENDING)),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if deleted == 0 {
            return Err(refusal(&mut conn, tenant, sale_id)
                .await
                .map_err(map_diesel_error)?);
        }
        Ok(())
    }

    async fn list(
        &self,
        restaurant_id: &RestaurantId,
        filter: &SaleFilter,
        page: &ListRequest,
    ) -> Result<Vec<Sale>, SaleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = sales::table
            .filter(sales::restaurant_id.eq(restaurant_id.as_uuid()))
            .into_boxed();
        if let Some(status) = filter.status {
            query = query.filter(sales::status.eq(status.as_str()));
        }
        if let Some(from) = filter.from {
            query = query.filter(sales::business_date.ge(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(sales::business_date.le(to));
        }
        if let Some(key) = page.after_key() {
            let day = key.at.date_naive();
            query = query.filter(
                sales::business_date
                    .lt(day)
                    .or(sales::business_date.eq(day).and(sales::id.lt(key.id))),
            );
        }
        query
            .order((sales::business_date.desc(), sales::id.desc()))
            .limit(page.limit().overfetch())
            .select(SaleRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(|row| Sale::try_from(row).map_err(corrupt))
            .collect()
    }
}
