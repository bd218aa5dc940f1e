//! PostgreSQL-backed `DebtRepository`.
//!
//! Payment writes lock the debt row, re-check the write-off and overpayment
//! guards against the locked state, and rewrite `paid_amount` and `status`
//! before committing.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Date, Text, Uuid as SqlUuid};
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{DebtRepository, DebtRepositoryError};
use crate::domain::{
    BankTransaction, CustomerDebtSummary, Debt, DebtFilter, DebtId, DebtPayment, DebtStatus, Gnf,
    ListRequest, PaymentId, RestaurantId, SourceKind, derive_debt_status,
};

use super::diesel_helpers::{RowError, TxError, map_diesel_error, map_pool_error};
use super::models::{BankTransactionRow, DebtPaymentRow, DebtRow};
use super::pool::DbPool;
use super::schema::{bank_transactions, debt_payments, debts};

const OPEN: [&str; 2] = [
    DebtStatus::Outstanding.as_str(),
    DebtStatus::PartiallyPaid.as_str(),
];

const CUSTOMER_SUMMARY_SQL: &str = r#"
SELECT d.customer_id,
       c.name AS customer_name,
       COUNT(*)::bigint AS open_debts,
       SUM(d.amount - d.paid_amount)::bigint AS outstanding,
       (COUNT(*) FILTER (WHERE d.due_date < $2))::bigint AS overdue_debts
FROM debts d
JOIN contacts c ON c.id = d.customer_id
WHERE d.restaurant_id = $1
  AND d.status IN ($3, $4)
GROUP BY d.customer_id, c.name
ORDER BY outstanding DESC, c.name
"#;

type Tx<T> = Result<T, TxError<DebtRepositoryError>>;

/// Diesel-backed implementation of the debt repository port.
#[derive(Clone)]
pub struct DieselDebtRepository {
    pool: DbPool,
}

impl DieselDebtRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(QueryableByName)]
struct SummaryRow {
    #[diesel(sql_type = SqlUuid)]
    customer_id: Uuid,
    #[diesel(sql_type = Text)]
    customer_name: String,
    #[diesel(sql_type = BigInt)]
    open_debts: i64,
    #[diesel(sql_type = BigInt)]
    outstanding: i64,
    #[diesel(sql_type = BigInt)]
    overdue_debts: i64,
}

impl TryFrom<SummaryRow> for CustomerDebtSummary {
    type Error = RowError;

    fn try_from(row: SummaryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            customer_id: row.customer_id.into(),
            customer_name: row.customer_name,
            open_debts: u32::try_from(row.open_debts)
                .map_err(|err| RowError::new("open_debts", err))?,
            outstanding: row.outstanding,
            overdue_debts: u32::try_from(row.overdue_debts)
                .map_err(|err| RowError::new("overdue_debts", err))?,
        })
    }
}

fn corrupt(err: RowError) -> DebtRepositoryError {
    err.into_port()
}

fn state_changed(message: &str) -> TxError<DebtRepositoryError> {
    TxError::Port(DebtRepositoryError::state_changed(message))
}

/// Load and lock a debt that still accepts payment changes.
async fn lock_open_debt(conn: &mut AsyncPgConnection, restaurant_id: Uuid, id: Uuid) -> Tx<Debt> {
    let row: Option<DebtRow> = debts::table
        .filter(debts::restaurant_id.eq(restaurant_id))
        .filter(debts::id.eq(id))
        .select(DebtRow::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()?;
    let debt = Debt::try_from(row.ok_or_else(|| TxError::Port(DebtRepositoryError::not_found()))?)?;
    if debt.status == DebtStatus::WrittenOff {
        return Err(state_changed("debt has been written off"));
    }
    Ok(debt)
}

/// Store a new paid amount and the status it implies.
async fn store_paid(conn: &mut AsyncPgConnection, debt: &Debt, paid: Gnf) -> Tx<Debt> {
    let status = derive_debt_status(debt.amount, paid);
    let row = diesel::update(debts::table.filter(debts::id.eq(debt.id.as_uuid())))
        .set((
            debts::paid_amount.eq(paid.get()),
            debts::status.eq(status.as_str()),
        ))
        .returning(DebtRow::as_returning())
        .get_result(conn)
        .await?;
    Ok(Debt::try_from(row)?)
}

#[async_trait]
impl DebtRepository for DieselDebtRepository {
    async fn insert(&self, debt: &Debt) -> Result<(), DebtRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(debts::table)
            .values(DebtRow::from(debt))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find(
        &self,
        restaurant_id: &RestaurantId,
        id: &DebtId,
    ) -> Result<Option<Debt>, DebtRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        debts::table
            .filter(debts::restaurant_id.eq(restaurant_id.as_uuid()))
            .filter(debts::id.eq(id.as_uuid()))
            .select(DebtRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(|row| Debt::try_from(row).map_err(corrupt))
            .transpose()
    }

    async fn list(
        &self,
        restaurant_id: &RestaurantId,
        filter: &DebtFilter,
        page: &ListRequest,
    ) -> Result<Vec<Debt>, DebtRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = debts::table
            .filter(debts::restaurant_id.eq(restaurant_id.as_uuid()))
            .into_boxed();
        if let Some(status) = filter.status {
            query = query.filter(debts::status.eq(status.as_str()));
        }
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(debts::customer_id.eq(*customer_id.as_uuid()));
        }
        if let Some(today) = filter.overdue_on {
            query = query
                .filter(debts::status.eq_any(OPEN))
                .filter(debts::due_date.lt(today));
        }
        if let Some(key) = page.after_key() {
            query = query.filter(
                debts::created_at
                    .lt(key.at)
                    .or(debts::created_at.eq(key.at).and(debts::id.lt(key.id))),
            );
        }
        query
            .order((debts::created_at.desc(), debts::id.desc()))
            .limit(page.limit().overfetch())
            .select(DebtRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(|row| Debt::try_from(row).map_err(corrupt))
            .collect()
    }

    async fn payments(
        &self,
        restaurant_id: &RestaurantId,
        debt_id: &DebtId,
    ) -> Result<Vec<DebtPayment>, DebtRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        debt_payments::table
            .filter(debt_payments::restaurant_id.eq(restaurant_id.as_uuid()))
            .filter(debt_payments::debt_id.eq(debt_id.as_uuid()))
            .order((debt_payments::paid_on.asc(), debt_payments::created_at.asc()))
            .select(DebtPaymentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(|row| DebtPayment::try_from(row).map_err(corrupt))
            .collect()
    }

    async fn record_payment(
        &self,
        payment: &DebtPayment,
        deposit: &BankTransaction,
    ) -> Result<Debt, DebtRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let tenant = *payment.restaurant_id.as_uuid();
        let debt_id = *payment.debt_id.as_uuid();
        let amount = payment.amount;
        let payment_row = DebtPaymentRow::from(payment);
        let deposit_row = BankTransactionRow::from(deposit);
        let outcome: Tx<Debt> = conn
            .transaction(|conn| {
                async move {
                    let debt = lock_open_debt(conn, tenant, debt_id).await?;
                    let paid = debt
                        .paid_amount
                        .checked_add(amount)
                        .filter(|paid| *paid <= debt.amount)
                        .ok_or_else(|| state_changed("payment exceeds the remaining balance"))?;
                    diesel::insert_into(debt_payments::table)
                        .values(payment_row)
                        .execute(conn)
                        .await?;
                    diesel::insert_into(bank_transactions::table)
                        .values(deposit_row)
                        .execute(conn)
                        .await?;
                    store_paid(conn, &debt, paid).await
                }
                .scope_boxed()
            })
            .await;
        outcome.map_err(TxError::into_port)
    }

    async fn delete_payment(
        &self,
        restaurant_id: &RestaurantId,
        debt_id: &DebtId,
        payment_id: &PaymentId,
    ) -> Result<Debt, DebtRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let tenant = *restaurant_id.as_uuid();
        let debt_id = *debt_id.as_uuid();
        let payment_id = *payment_id.as_uuid();
        let outcome: Tx<Debt> = conn
            .transaction(|conn| {
                async move {
                    let debt = lock_open_debt(conn, tenant, debt_id).await?;
                    let removed: Option<i64> = diesel::delete(
                        debt_payments::table
                            .filter(debt_payments::restaurant_id.eq(tenant))
                            .filter(debt_payments::debt_id.eq(debt_id))
                            .filter(debt_payments::id.eq(payment_id)),
                    )
                    .returning(debt_payments::amount)
                    .get_result(conn)
                    .await
                    .optional()?;
                    let removed = removed
                        .ok_or_else(|| TxError::Port(DebtRepositoryError::not_found()))?;
                    diesel::delete(
                        bank_transactions::table
                            .filter(bank_transactions::restaurant_id.eq(tenant))
                            .filter(
                                bank_transactions::source_kind
                                    .eq(SourceKind::DebtPayment.as_str()),
                            )
                            .filter(bank_transactions::source_id.eq(payment_id)),
                    )
                    .execute(conn)
                    .await?;
                    let paid = Gnf::new(debt.paid_amount.get().saturating_sub(removed))
                        .map_err(|_| state_changed("paid amount would become negative"))?;
                    store_paid(conn, &debt, paid).await
                }
                .scope_boxed()
            })
            .await;
        outcome.map_err(TxError::into_port)
    }

    async fn write_off(
        &self,
        restaurant_id: &RestaurantId,
        id: &DebtId,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Result<Debt, DebtRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let tenant = *restaurant_id.as_uuid();
        let debt_id = *id.as_uuid();
        let row: Option<DebtRow> = diesel::update(
            debts::table
                .filter(debts::restaurant_id.eq(tenant))
                .filter(debts::id.eq(debt_id))
                .filter(debts::status.eq_any(OPEN)),
        )
        .set((
            debts::status.eq(DebtStatus::WrittenOff.as_str()),
            debts::written_off_reason.eq(Some(reason)),
            debts::written_off_at.eq(Some(at)),
        ))
        .returning(DebtRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
        if let Some(row) = row {
            return Debt::try_from(row).map_err(corrupt);
        }
        let exists = diesel::select(diesel::dsl::exists(
            debts::table
                .filter(debts::restaurant_id.eq(tenant))
                .filter(debts::id.eq(debt_id)),
        ))
        .get_result::<bool>(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Err(if exists {
            DebtRepositoryError::state_changed("debt is no longer open")
        } else {
            DebtRepositoryError::not_found()
        })
    }

    async fn customer_summaries(
        &self,
        restaurant_id: &RestaurantId,
        today: NaiveDate,
    ) -> Result<Vec<CustomerDebtSummary>, DebtRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let [outstanding, partially_paid] = OPEN;
        sql_query(CUSTOMER_SUMMARY_SQL)
            .bind::<SqlUuid, _>(restaurant_id.as_uuid())
            .bind::<Date, _>(today)
            .bind::<Text, _>(outstanding)
            .bind::<Text, _>(partially_paid)
            .load::<SummaryRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(|row| CustomerDebtSummary::try_from(row).map_err(corrupt))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for summary decoding.
    use rstest::rstest;

    use super::*;

    fn summary(open_debts: i64) -> SummaryRow {
        SummaryRow {
            customer_id: Uuid::new_v4(),
            customer_name: "Mamadou Diallo".to_owned(),
            open_debts,
            outstanding: 45_000,
            overdue_debts: 1,
        }
    }

    #[rstest]
    fn summaries_decode_counts() {
        let decoded = CustomerDebtSummary::try_from(summary(3)).expect("valid row");
        assert_eq!(decoded.open_debts, 3);
        assert_eq!(decoded.overdue_debts, 1);
        assert_eq!(decoded.outstanding, 45_000);
    }

    #[rstest]
    fn negative_counts_are_corrupt() {
        let err = CustomerDebtSummary::try_from(summary(-1)).expect_err("negative count");
        assert!(err.to_string().contains("open_debts"));
    }

    #[rstest]
    fn open_statuses_cover_unpaid_debts() {
        assert_eq!(OPEN, ["outstanding", "partially_paid"]);
    }
}
