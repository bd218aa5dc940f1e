//! Period reports.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::ports::{InventoryRepository, ReportRepository};
use crate::domain::repository_errors::{map_inventory_error, map_report_error};
use crate::domain::{Action, Error, MemberContext, PeriodReport, ReportPeriod};

/// Report service.
#[derive(Clone)]
pub struct ReportService {
    reports: Arc<dyn ReportRepository>,
    inventory: Arc<dyn InventoryRepository>,
}

impl ReportService {
    /// Create the service from its ports.
    pub fn new(reports: Arc<dyn ReportRepository>, inventory: Arc<dyn InventoryRepository>) -> Self {
        Self { reports, inventory }
    }

    /// Sales, expenses, debt, and stock value for `from..=to`.
    pub async fn period_summary(
        &self,
        ctx: &MemberContext,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<PeriodReport, Error> {
        ctx.require(Action::View)?;
        let period = ReportPeriod::new(from, to)
            .map_err(|err| Error::invalid_field("from", "invalid_period", err.to_string()))?;
        let figures = self
            .reports
            .period_figures(&ctx.restaurant_id, &period)
            .await
            .map_err(map_report_error)?;
        let inventory_value = self
            .inventory
            .list_items(&ctx.restaurant_id, false)
            .await
            .map_err(map_inventory_error)?
            .iter()
            .fold(0_i64, |sum, item| sum.saturating_add(item.stock_value()));
        Ok(PeriodReport::assemble(period, figures, inventory_value))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::sync::Arc;

    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{MockInventoryRepository, MockReportRepository};
    use crate::domain::service_test_support::{fixture_now, fixture_today, member};
    use crate::domain::{
        CategoryId, CategoryTotal, ErrorCode, InventoryItem, InventoryUnit, ItemId, MethodTotals,
        PeriodFigures, Quantity, Role,
    };

    #[rstest]
    #[tokio::test]
    async fn summary_combines_figures_and_stock_value() {
        let ctx = member(Role::Viewer);
        let mut reports = MockReportRepository::new();
        reports.expect_period_figures().return_once(|_, _| {
            Ok(PeriodFigures {
                approved_sales: MethodTotals {
                    cash: 900_000,
                    orange_money: 250_000,
                    card: 50_000,
                },
                expenses_by_category: vec![CategoryTotal {
                    category_id: CategoryId::random(),
                    name: "Matieres premieres".to_owned(),
                    total: 700_000,
                }],
                pending_sales: 1,
                pending_expenses: 2,
                outstanding_debt: 35_000,
            })
        });
        let restaurant_id = ctx.restaurant_id;
        let mut inventory = MockInventoryRepository::new();
        inventory.expect_list_items().return_once(move |_, _| {
            Ok(vec![InventoryItem {
                id: ItemId::random(),
                restaurant_id,
                name: "Sucre".to_owned(),
                category_id: None,
                supplier_id: None,
                unit: InventoryUnit::Kg,
                quantity: Quantity::from_milli(12_500),
                min_stock: Quantity::from_units(5),
                unit_cost: 9_000,
                shelf_life_days: None,
                last_purchased_at: None,
                active: true,
                created_at: fixture_now(),
                updated_at: fixture_now(),
            }])
        });
        let service = ReportService::new(Arc::new(reports), Arc::new(inventory));

        let report = service
            .period_summary(&ctx, fixture_today(), fixture_today())
            .await
            .expect("report");

        assert_eq!(report.sales_total, 1_200_000);
        assert_eq!(report.net_result, 500_000);
        assert_eq!(report.inventory_value, 112_500);
        assert_eq!(report.pending_expenses, 2);
    }

    #[rstest]
    #[tokio::test]
    async fn inverted_periods_are_rejected() {
        let service = ReportService::new(
            Arc::new(MockReportRepository::new()),
            Arc::new(MockInventoryRepository::new()),
        );
        let today = fixture_today();
        let err = service
            .period_summary(&member(Role::Viewer), today, today.pred_opt().expect("date"))
            .await
            .expect_err("inverted");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }
}
