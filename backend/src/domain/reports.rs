//! Period reports combining sales, expenses, debts, and stock value.

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use super::{CategoryId, MethodTotals};

/// Longest period a report may cover, in days.
pub const MAX_REPORT_DAYS: i64 = 366;

/// Raised when a report period is unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReportPeriodError {
    /// `from` falls after `to`.
    #[error("period start must not be after its end")]
    Inverted,
    /// Period longer than [`MAX_REPORT_DAYS`].
    #[error("period must not exceed {MAX_REPORT_DAYS} days")]
    TooLong,
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportPeriod {
    /// First day.
    pub from: NaiveDate,
    /// Last day.
    pub to: NaiveDate,
}

impl ReportPeriod {
    /// Validate a range.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, ReportPeriodError> {
        if from > to {
            return Err(ReportPeriodError::Inverted);
        }
        if (to - from).num_days() >= MAX_REPORT_DAYS {
            return Err(ReportPeriodError::TooLong);
        }
        Ok(Self { from, to })
    }
}

/// Approved expenses in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    /// Category.
    pub category_id: CategoryId,
    /// Category name.
    pub name: String,
    /// Sum of approved expenses.
    pub total: i64,
}

/// Raw figures read from storage for a period.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeriodFigures {
    /// Approved sales per method.
    pub approved_sales: MethodTotals,
    /// Approved expenses per category.
    pub expenses_by_category: Vec<CategoryTotal>,
    /// Sales still awaiting review.
    pub pending_sales: u32,
    /// Expenses still awaiting review.
    pub pending_expenses: u32,
    /// Unpaid balance of open debts, regardless of period.
    pub outstanding_debt: i64,
}

/// Summary of a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodReport {
    /// Period covered.
    pub period: ReportPeriod,
    /// Approved sales per method.
    pub sales_by_method: MethodTotals,
    /// Approved sales total.
    pub sales_total: i64,
    /// Approved expenses total.
    pub expenses_total: i64,
    /// Approved expenses per category, largest first.
    pub expenses_by_category: Vec<CategoryTotal>,
    /// Sales minus expenses.
    pub net_result: i64,
    /// Sales awaiting review.
    pub pending_sales: u32,
    /// Expenses awaiting review.
    pub pending_expenses: u32,
    /// Unpaid debt across all customers.
    pub outstanding_debt: i64,
    /// Current inventory value.
    pub inventory_value: i64,
}

impl PeriodReport {
    /// Combine stored figures with the current inventory value.
    #[must_use]
    pub fn assemble(period: ReportPeriod, figures: PeriodFigures, inventory_value: i64) -> Self {
        let sales_total = figures.approved_sales.total();
        let mut expenses_by_category = figures.expenses_by_category;
        expenses_by_category.sort_by(|a, b| b.total.cmp(&a.total).then(a.name.cmp(&b.name)));
        let expenses_total = expenses_by_category
            .iter()
            .fold(0_i64, |sum, category| sum.saturating_add(category.total));
        Self {
            period,
            sales_by_method: figures.approved_sales,
            sales_total,
            expenses_total,
            expenses_by_category,
            net_result: sales_total.saturating_sub(expenses_total),
            pending_sales: figures.pending_sales,
            pending_expenses: figures.pending_expenses,
            outstanding_debt: figures.outstanding_debt,
            inventory_value,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).expect("date")
    }

    #[rstest]
    fn period_must_be_ordered() {
        assert_eq!(ReportPeriod::new(day(5), day(4)), Err(ReportPeriodError::Inverted));
        assert!(ReportPeriod::new(day(4), day(4)).is_ok());
    }

    #[rstest]
    fn net_result_subtracts_expenses_from_sales() {
        let period = ReportPeriod::new(day(1), day(31)).expect("period");
        let figures = PeriodFigures {
            approved_sales: MethodTotals {
                cash: 300_000,
                orange_money: 150_000,
                card: 50_000,
            },
            expenses_by_category: vec![
                CategoryTotal {
                    category_id: CategoryId::random(),
                    name: "Gaz".to_owned(),
                    total: 40_000,
                },
                CategoryTotal {
                    category_id: CategoryId::random(),
                    name: "Farine".to_owned(),
                    total: 200_000,
                },
            ],
            pending_sales: 1,
            pending_expenses: 2,
            outstanding_debt: 75_000,
        };

        let report = PeriodReport::assemble(period, figures, 1_000_000);

        assert_eq!(report.sales_total, 500_000);
        assert_eq!(report.expenses_total, 240_000);
        assert_eq!(report.net_result, 260_000);
        assert_eq!(report.expenses_by_category[0].name, "Farine");
        assert_eq!(report.inventory_value, 1_000_000);
    }
}
