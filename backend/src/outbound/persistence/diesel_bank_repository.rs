//! PostgreSQL-backed `BankRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Text, Uuid as SqlUuid};
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{BankRepository, BankRepositoryError};
use crate::domain::{
    BankTransaction, ListRequest, Reconciliation, ReconciliationId, RestaurantId,
    TransactionAggregate, TransactionFilter, TransactionId, TransactionStatus, UserId,
};

use super::diesel_helpers::{
    RowError, TxError, decode_code, map_diesel_error, map_pool_error,
};
use super::models::{BankTransactionRow, ReconciliationRow};
use super::pool::DbPool;
use super::schema::{bank_transactions, reconciliations};

const PENDING: &str = "pending";

const AGGREGATE_SQL: &str = r#"
SELECT method, direction, status, SUM(amount)::bigint AS total
FROM bank_transactions
WHERE restaurant_id = $1
GROUP BY method, direction, status
"#;

type Tx<T> = Result<T, TxError<BankRepositoryError>>;

/// Diesel-backed implementation of the bank repository port.
#[derive(Clone)]
pub struct DieselBankRepository {
    pool: DbPool,
}

impl DieselBankRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(QueryableByName)]
struct AggregateRow {
    #[diesel(sql_type = Text)]
    method: String,
    #[diesel(sql_type = Text)]
    direction: String,
    #[diesel(sql_type = Text)]
    status: String,
    #[diesel(sql_type = BigInt)]
    total: i64,
}

impl TryFrom<AggregateRow> for TransactionAggregate {
    type Error = RowError;

    fn try_from(row: AggregateRow) -> Result<Self, Self::Error> {
        Ok(Self {
            method: decode_code("bank_transactions.method", &row.method)?,
            direction: decode_code("bank_transactions.direction", &row.direction)?,
            status: decode_code("bank_transactions.status", &row.status)?,
            total: row.total,
        })
    }
}

fn corrupt(err: RowError) -> BankRepositoryError {
    err.into_port()
}

async fn refusal(
    conn: &mut AsyncPgConnection,
    restaurant_id: Uuid,
    id: Uuid,
) -> Result<BankRepositoryError, DieselError> {
    let exists = diesel::select(diesel::dsl::exists(
        bank_transactions::table
            .filter(bank_transactions::restaurant_id.eq(restaurant_id))
            .filter(bank_transactions::id.eq(id)),
    ))
    .get_result::<bool>(conn)
    .await?;
    Ok(if exists {
        BankRepositoryError::not_pending()
    } else {
        BankRepositoryError::not_found()
    })
}

#[async_trait]
impl BankRepository for DieselBankRepository {
    async fn list(
        &self,
        restaurant_id: &RestaurantId,
        filter: &TransactionFilter,
        page: &ListRequest,
    ) -> Result<Vec<BankTransaction>, BankRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = bank_transactions::table
            .filter(bank_transactions::restaurant_id.eq(restaurant_id.as_uuid()))
            .into_boxed();
        if let Some(method) = filter.method {
            query = query.filter(bank_transactions::method.eq(method.as_str()));
        }
        if let Some(direction) = filter.direction {
            query = query.filter(bank_transactions::direction.eq(direction.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(bank_transactions::status.eq(status.as_str()));
        }
        if let Some(from) = filter.from {
            query = query.filter(bank_transactions::transaction_date.ge(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(bank_transactions::transaction_date.le(to));
        }
        if let Some(key) = page.after_key() {
            query = query.filter(
                bank_transactions::created_at.lt(key.at).or(bank_transactions::created_at
                    .eq(key.at)
                    .and(bank_transactions::id.lt(key.id))),
            );
        }
        query
            .order((
                bank_transactions::created_at.desc(),
                bank_transactions::id.desc(),
            ))
            .limit(page.limit().overfetch())
            .select(BankTransactionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(|row| BankTransaction::try_from(row).map_err(corrupt))
            .collect()
    }

    async fn find(
        &self,
        restaurant_id: &RestaurantId,
        id: &TransactionId,
    ) -> Result<Option<BankTransaction>, BankRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        bank_transactions::table
            .filter(bank_transactions::restaurant_id.eq(restaurant_id.as_uuid()))
            .filter(bank_transactions::id.eq(id.as_uuid()))
            .select(BankTransactionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(|row| BankTransaction::try_from(row).map_err(corrupt))
            .transpose()
    }

    async fn insert(&self, transaction: &BankTransaction) -> Result<(), BankRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(bank_transactions::table)
            .values(BankTransactionRow::from(transaction))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn settle(
        &self,
        restaurant_id: &RestaurantId,
        id: &TransactionId,
        status: TransactionStatus,
        actor: &UserId,
        at: DateTime<Utc>,
    ) -> Result<BankTransaction, BankRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let tenant = *restaurant_id.as_uuid();
        let transaction_id = *id.as_uuid();
        let row: Option<BankTransactionRow> = diesel::update(
            bank_transactions::table
                .filter(bank_transactions::restaurant_id.eq(tenant))
                .filter(bank_transactions::id.eq(transaction_id))
                .filter(bank_transactions::status.eq(PENDING)),
        )
        .set((
            bank_transactions::status.eq(status.as_str()),
            bank_transactions::confirmed_by.eq(Some(actor.as_uuid())),
            bank_transactions::confirmed_at.eq(Some(at)),
        ))
        .returning(BankTransactionRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
        match row {
            Some(row) => BankTransaction::try_from(row).map_err(corrupt),
            None => Err(refusal(&mut conn, tenant, transaction_id)
                .await
                .map_err(map_diesel_error)?),
        }
    }

    async fn delete_manual_pending(
        &self,
        restaurant_id: &RestaurantId,
        id: &TransactionId,
    ) -> Result<(), BankRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let tenant = *restaurant_id.as_uuid();
        let transaction_id = *id.as_uuid();
        let deleted = diesel::delete(
            bank_transactions::table
                .filter(bank_transactions::restaurant_id.eq(tenant))
                .filter(bank_transactions::id.eq(transaction_id))
                .filter(bank_transactions::status.eq(PENDING))
                .filter(bank_transactions::source_kind.is_null()),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if deleted == 0 {
            return Err(refusal(&mut conn, tenant, transaction_id)
                .await
                .map_err(map_diesel_error)?);
        }
        Ok(())
    }

    async fn aggregates(
        &self,
        restaurant_id: &RestaurantId,
    ) -> Result<Vec<TransactionAggregate>, BankRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        sql_query(AGGREGATE_SQL)
            .bind::<SqlUuid, _>(restaurant_id.as_uuid())
            .load::<AggregateRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(|row| TransactionAggregate::try_from(row).map_err(corrupt))
            .collect()
    }

    async fn insert_reconciliation(
        &self,
        reconciliation: &Reconciliation,
        adjustments: &[BankTransaction],
    ) -> Result<(), BankRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let reconciliation_row = ReconciliationRow::from(reconciliation);
        let adjustment_rows: Vec<BankTransactionRow> =
            adjustments.iter().map(BankTransactionRow::from).collect();
        let outcome: Tx<()> = conn
            .transaction(|conn| {
                async move {
                    diesel::insert_into(reconciliations::table)
                        .values(reconciliation_row)
                        .execute(conn)
                        .await?;
                    if !adjustment_rows.is_empty() {
                        diesel::insert_into(bank_transactions::table)
                            .values(&adjustment_rows)
                            .execute(conn)
                            .await?;
                    }
                    Ok(())
                }
                .scope_boxed()
            })
            .await;
        outcome.map_err(TxError::into_port)
    }

    async fn list_reconciliations(
        &self,
        restaurant_id: &RestaurantId,
        page: &ListRequest,
    ) -> Result<Vec<Reconciliation>, BankRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = reconciliations::table
            .filter(reconciliations::restaurant_id.eq(restaurant_id.as_uuid()))
            .into_boxed();
        if let Some(key) = page.after_key() {
            query = query.filter(
                reconciliations::created_at.lt(key.at).or(reconciliations::created_at
                    .eq(key.at)
                    .and(reconciliations::id.lt(key.id))),
            );
        }
        query
            .order((reconciliations::created_at.desc(), reconciliations::id.desc()))
            .limit(page.limit().overfetch())
            .select(ReconciliationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(|row| Reconciliation::try_from(row).map_err(corrupt))
            .collect()
    }

    async fn find_reconciliation(
        &self,
        restaurant_id: &RestaurantId,
        id: &ReconciliationId,
    ) -> Result<Option<Reconciliation>, BankRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        reconciliations::table
            .filter(reconciliations::restaurant_id.eq(restaurant_id.as_uuid()))
            .filter(reconciliations::id.eq(id.as_uuid()))
            .select(ReconciliationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(|row| Reconciliation::try_from(row).map_err(corrupt))
            .transpose()
    }
}
