//! PostgreSQL-backed `ReportRepository`.
//!
//! Every figure is an aggregate computed in SQL. Pending counts and debt
//! balances describe the restaurant as it is now, not the requested period.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::QueryableByName;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Date, Text, Uuid as SqlUuid};
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{OverdueDebts, ReportRepository, ReportRepositoryError};
use crate::domain::{CategoryTotal, MethodTotals, PeriodFigures, ReportPeriod, RestaurantId};

use super::diesel_helpers::{RowError, map_diesel_error, map_pool_error};
use super::pool::DbPool;

const SALES_SQL: &str = r#"
SELECT COALESCE(SUM(cash), 0)::bigint AS cash,
       COALESCE(SUM(orange_money), 0)::bigint AS orange_money,
       COALESCE(SUM(card), 0)::bigint AS card
FROM sales
WHERE restaurant_id = $1
  AND status = 'approved'
  AND business_date BETWEEN $2 AND $3
"#;

const EXPENSES_SQL: &str = r#"
SELECT c.id AS category_id, c.name, SUM(e.amount)::bigint AS total
FROM expenses e
JOIN categories c ON c.id = e.category_id
WHERE e.restaurant_id = $1
  AND e.status = 'approved'
  AND e.expense_date BETWEEN $2 AND $3
GROUP BY c.id, c.name
"#;

const BACKLOG_SQL: &str = r#"
SELECT
    (SELECT COUNT(*) FROM sales
     WHERE restaurant_id = $1 AND status = 'pending')::bigint AS pending_sales,
    (SELECT COUNT(*) FROM expenses
     WHERE restaurant_id = $1 AND status = 'pending')::bigint AS pending_expenses,
    (SELECT COALESCE(SUM(amount - paid_amount), 0) FROM debts
     WHERE restaurant_id = $1
       AND status IN ('outstanding', 'partially_paid'))::bigint AS outstanding_debt
"#;

const OVERDUE_SQL: &str = r#"
SELECT COUNT(*)::bigint AS count,
       COALESCE(SUM(amount - paid_amount), 0)::bigint AS amount
FROM debts
WHERE restaurant_id = $1
  AND status IN ('outstanding', 'partially_paid')
  AND due_date < $2
"#;

/// Diesel-backed implementation of the report repository port.
#[derive(Clone)]
pub struct DieselReportRepository {
    pool: DbPool,
}

impl DieselReportRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(QueryableByName)]
struct SalesRow {
    #[diesel(sql_type = BigInt)]
    cash: i64,
    #[diesel(sql_type = BigInt)]
    orange_money: i64,
    #[diesel(sql_type = BigInt)]
    card: i64,
}

#[derive(QueryableByName)]
struct CategoryRow {
    #[diesel(sql_type = SqlUuid)]
    category_id: Uuid,
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = BigInt)]
    total: i64,
}

#[derive(QueryableByName)]
struct BacklogRow {
    #[diesel(sql_type = BigInt)]
    pending_sales: i64,
    #[diesel(sql_type = BigInt)]
    pending_expenses: i64,
    #[diesel(sql_type = BigInt)]
    outstanding_debt: i64,
}

#[derive(QueryableByName)]
struct OverdueRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
    #[diesel(sql_type = BigInt)]
    amount: i64,
}

fn count(column: &'static str, raw: i64) -> Result<u32, ReportRepositoryError> {
    u32::try_from(raw).map_err(|err| RowError::new(column, err).into_port())
}

#[async_trait]
impl ReportRepository for DieselReportRepository {
    async fn period_figures(
        &self,
        restaurant_id: &RestaurantId,
        period: &ReportPeriod,
    ) -> Result<PeriodFigures, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let tenant = restaurant_id.as_uuid();

        let sales: SalesRow = sql_query(SALES_SQL)
            .bind::<SqlUuid, _>(tenant)
            .bind::<Date, _>(period.from)
            .bind::<Date, _>(period.to)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let categories: Vec<CategoryRow> = sql_query(EXPENSES_SQL)
            .bind::<SqlUuid, _>(tenant)
            .bind::<Date, _>(period.from)
            .bind::<Date, _>(period.to)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let backlog: BacklogRow = sql_query(BACKLOG_SQL)
            .bind::<SqlUuid, _>(tenant)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(PeriodFigures {
            approved_sales: MethodTotals {
                cash: sales.cash,
                orange_money: sales.orange_money,
                card: sales.card,
            },
            expenses_by_category: categories
                .into_iter()
                .map(|row| CategoryTotal {
                    category_id: row.category_id.into(),
                    name: row.name,
                    total: row.total,
                })
                .collect(),
            pending_sales: count("pending_sales", backlog.pending_sales)?,
            pending_expenses: count("pending_expenses", backlog.pending_expenses)?,
            outstanding_debt: backlog.outstanding_debt,
        })
    }

    async fn overdue_debts(
        &self,
        restaurant_id: &RestaurantId,
        today: NaiveDate,
    ) -> Result<OverdueDebts, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: OverdueRow = sql_query(OVERDUE_SQL)
            .bind::<SqlUuid, _>(restaurant_id.as_uuid())
            .bind::<Date, _>(today)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(OverdueDebts {
            count: count("overdue_count", row.count)?,
            amount: row.amount,
        })
    }
}
