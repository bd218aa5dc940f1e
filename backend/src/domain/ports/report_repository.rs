//! Port for aggregate figures used by reports and the daily digest.
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{PeriodFigures, ReportPeriod, RestaurantId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by report repository adapters.
    pub enum ReportRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "report repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "report repository query failed: {message}",
    }
}

/// Overdue debt totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverdueDebts {
    /// Open debts past due.
    pub count: u32,
    /// Amount still owed on them.
    pub amount: i64,
}

/// Port for read-only aggregates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Approved sales and expenses in the period plus current pending counts
    /// and outstanding debt.
    async fn period_figures(
        &self,
        restaurant_id: &RestaurantId,
        period: &ReportPeriod,
    ) -> Result<PeriodFigures, ReportRepositoryError>;

    /// Open debts due before `today`.
    async fn overdue_debts(
        &self,
        restaurant_id: &RestaurantId,
        today: NaiveDate,
    ) -> Result<OverdueDebts, ReportRepositoryError>;
}
