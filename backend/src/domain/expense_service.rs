//! Expense recording and approval use-cases.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::listing::paginate;
use crate::domain::ports::{ExpenseRepository, InventoryRepository, ReferenceRepository};
use crate::domain::reference_service::{require_category, require_contact};
use crate::domain::repository_errors::{
    map_expense_error, map_inventory_error, map_reference_error,
};
use crate::domain::sales_service::not_pending;
use crate::domain::{
    Action, CategoryKind, ContactKind, Error, Expense, ExpenseDraft, ExpenseFilter, ExpenseId,
    ExpenseValidationError, ListPage, ListRequest, MemberContext, MovementId, MovementKind,
    ReviewStatus, StockMovement, TransactionStatus, day_key, normalize_optional_text,
    require_reason,
};

/// Expense service.
#[derive(Clone)]
pub struct ExpenseService {
    expenses: Arc<dyn ExpenseRepository>,
    reference: Arc<dyn ReferenceRepository>,
    inventory: Arc<dyn InventoryRepository>,
    clock: Arc<dyn Clock>,
}

impl ExpenseService {
    /// Create the service from its ports.
    pub fn new(
        expenses: Arc<dyn ExpenseRepository>,
        reference: Arc<dyn ReferenceRepository>,
        inventory: Arc<dyn InventoryRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            expenses,
            reference,
            inventory,
            clock,
        }
    }

    async fn clean_draft(
        &self,
        ctx: &MemberContext,
        draft: ExpenseDraft,
    ) -> Result<ExpenseDraft, Error> {
        draft.validate().map_err(|err| {
            let field = match err {
                ExpenseValidationError::ZeroAmount => "amount",
                ExpenseValidationError::PurchaseNotPositive => "stockPurchase.quantity",
            };
            Error::invalid_field(field, "must_be_positive", err.to_string())
        })?;
        let restaurant_id = &ctx.restaurant_id;
        require_category(
            self.reference.as_ref(),
            restaurant_id,
            &draft.category_id,
            CategoryKind::Expense,
            "categoryId",
        )
        .await?;
        if let Some(group_id) = &draft.group_id {
            self.reference
                .find_expense_group(restaurant_id, group_id)
                .await
                .map_err(map_reference_error)?
                .filter(|group| group.active)
                .ok_or_else(|| {
                    Error::invalid_field(
                        "groupId",
                        "unknown",
                        format!("expense group {group_id} not found"),
                    )
                })?;
        }
        if let Some(supplier_id) = &draft.supplier_id {
            require_contact(
                self.reference.as_ref(),
                restaurant_id,
                supplier_id,
                ContactKind::Supplier,
                "supplierId",
            )
            .await?;
        }
        if let Some(purchase) = &draft.stock_purchase {
            self.inventory
                .find_item(restaurant_id, &purchase.item_id)
                .await
                .map_err(map_inventory_error)?
                .filter(|item| item.active)
                .ok_or_else(|| {
                    Error::invalid_field(
                        "stockPurchase.itemId",
                        "unknown",
                        format!("inventory item {} not found", purchase.item_id),
                    )
                })?;
        }
        Ok(ExpenseDraft {
            description: normalize_optional_text(draft.description.as_deref()),
            ..draft
        })
    }

    /// One expense.
    pub async fn get(&self, ctx: &MemberContext, id: &ExpenseId) -> Result<Expense, Error> {
        ctx.require(Action::View)?;
        self.expenses
            .find(&ctx.restaurant_id, id)
            .await
            .map_err(map_expense_error)?
            .ok_or_else(|| Error::not_found(format!("expense {id} not found")))
    }

    /// Expenses newest date first.
    pub async fn list(
        &self,
        ctx: &MemberContext,
        filter: &ExpenseFilter,
        page: &ListRequest,
    ) -> Result<ListPage<Expense>, Error> {
        ctx.require(Action::View)?;
        let rows = self
            .expenses
            .list(&ctx.restaurant_id, filter, page)
            .await
            .map_err(map_expense_error)?;
        paginate(rows, page, |expense| {
            day_key(expense.date, *expense.id.as_uuid())
        })
    }

    /// Record a pending expense.
    pub async fn create(&self, ctx: &MemberContext, draft: ExpenseDraft) -> Result<Expense, Error> {
        ctx.require(Action::RecordExpense)?;
        let draft = self.clean_draft(ctx, draft).await?;
        let expense = Expense {
            id: ExpenseId::random(),
            restaurant_id: ctx.restaurant_id,
            date: draft.date,
            amount: draft.amount,
            method: draft.method,
            category_id: draft.category_id,
            group_id: draft.group_id,
            supplier_id: draft.supplier_id,
            description: draft.description,
            stock_purchase: draft.stock_purchase,
            status: ReviewStatus::Pending,
            rejection_reason: None,
            created_by: ctx.user_id,
            reviewed_by: None,
            reviewed_at: None,
            created_at: self.clock.utc(),
        };
        self.expenses
            .insert(&expense)
            .await
            .map_err(map_expense_error)?;
        info!(
            restaurant_id = %ctx.restaurant_id,
            expense_id = %expense.id,
            amount = expense.amount.get(),
            "expense recorded"
        );
        Ok(expense)
    }

    async fn pending_for_edit(&self, ctx: &MemberContext, id: &ExpenseId) -> Result<Expense, Error> {
        ctx.require(Action::RecordExpense)?;
        let expense = self.get(ctx, id).await?;
        expense.status.ensure_pending().map_err(not_pending)?;
        if expense.created_by != ctx.user_id {
            ctx.require(Action::ApproveExpense)?;
        }
        Ok(expense)
    }

    /// Edit a pending expense. Its author may edit it; anyone else needs to
    /// be a manager.
    pub async fn update(
        &self,
        ctx: &MemberContext,
        id: &ExpenseId,
        draft: ExpenseDraft,
    ) -> Result<Expense, Error> {
        self.pending_for_edit(ctx, id).await?;
        let draft = self.clean_draft(ctx, draft).await?;
        self.expenses
            .update_pending(&ctx.restaurant_id, id, &draft)
            .await
            .map_err(map_expense_error)
    }

    /// Delete a pending expense.
    pub async fn delete(&self, ctx: &MemberContext, id: &ExpenseId) -> Result<(), Error> {
        self.pending_for_edit(ctx, id).await?;
        self.expenses
            .delete_pending(&ctx.restaurant_id, id)
            .await
            .map_err(map_expense_error)?;
        info!(restaurant_id = %ctx.restaurant_id, expense_id = %id, "expense deleted");
        Ok(())
    }

    /// Approve a pending expense: withdraw the amount and book any stock it
    /// bought at the implied unit cost.
    pub async fn approve(&self, ctx: &MemberContext, id: &ExpenseId) -> Result<Expense, Error> {
        ctx.require(Action::ApproveExpense)?;
        let expense = self.get(ctx, id).await?;
        expense.status.ensure_pending().map_err(not_pending)?;
        let now = self.clock.utc();
        let withdrawal = expense.approval_withdrawal().stamp(
            ctx.restaurant_id,
            TransactionStatus::Confirmed,
            ctx.user_id,
            now,
        );
        let purchase = expense.stock_purchase.map(|purchase| StockMovement {
            id: MovementId::random(),
            restaurant_id: ctx.restaurant_id,
            item_id: purchase.item_id,
            kind: MovementKind::Purchase,
            quantity_delta: purchase.quantity,
            unit_cost: expense.purchase_unit_cost(),
            supplier_id: expense.supplier_id,
            reason: expense.description.clone(),
            batch_id: None,
            expense_id: Some(expense.id),
            created_by: ctx.user_id,
            occurred_at: now,
        });
        let approved = self
            .expenses
            .approve(&ctx.restaurant_id, id, &ctx.user_id, now, &withdrawal, purchase)
            .await
            .map_err(map_expense_error)?;
        info!(restaurant_id = %ctx.restaurant_id, expense_id = %id, "expense approved");
        Ok(approved)
    }

    /// Reject a pending expense with a reason.
    pub async fn reject(
        &self,
        ctx: &MemberContext,
        id: &ExpenseId,
        reason: &str,
    ) -> Result<Expense, Error> {
        ctx.require(Action::ApproveExpense)?;
        let reason = require_reason(reason)
            .map_err(|err| Error::invalid_field("reason", "required", err.to_string()))?;
        let expense = self.get(ctx, id).await?;
        expense.status.ensure_pending().map_err(not_pending)?;
        let rejected = self
            .expenses
            .reject(&ctx.restaurant_id, id, &ctx.user_id, self.clock.utc(), &reason)
            .await
            .map_err(map_expense_error)?;
        info!(restaurant_id = %ctx.restaurant_id, expense_id = %id, "expense rejected");
        Ok(rejected)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::sync::Arc;

    use chrono::NaiveDate;
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{
        MockExpenseRepository, MockInventoryRepository, MockReferenceRepository,
    };
    use crate::domain::service_test_support::{fixture_clock, fixture_now, gnf, member};
    use crate::domain::{
        Category, CategoryId, ErrorCode, ItemId, PaymentMethod, Quantity, Role, StockPurchase,
        TransactionDirection, TransactionReason,
    };

    fn expense(ctx: &MemberContext) -> Expense {
        Expense {
            id: ExpenseId::random(),
            restaurant_id: ctx.restaurant_id,
            date: NaiveDate::from_ymd_opt(2026, 3, 8).expect("date"),
            amount: gnf(450_000),
            method: PaymentMethod::OrangeMoney,
            category_id: CategoryId::random(),
            group_id: None,
            supplier_id: None,
            description: Some("Farine 25 kg x 2".to_owned()),
            stock_purchase: Some(StockPurchase {
                item_id: ItemId::random(),
                quantity: Quantity::from_units(50),
            }),
            status: ReviewStatus::Pending,
            rejection_reason: None,
            created_by: ctx.user_id,
            reviewed_by: None,
            reviewed_at: None,
            created_at: fixture_now(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn approval_withdraws_and_books_the_purchase() {
        let ctx = member(Role::Manager);
        let pending = expense(&ctx);
        let id = pending.id;
        let approved = Expense {
            status: ReviewStatus::Approved,
            ..pending.clone()
        };
        let mut expenses = MockExpenseRepository::new();
        expenses
            .expect_find()
            .return_once(move |_, _| Ok(Some(pending)));
        expenses
            .expect_approve()
            .withf(|_, _, _, _, withdrawal, purchase| {
                withdrawal.direction == TransactionDirection::Withdrawal
                    && withdrawal.reason == TransactionReason::ExpensePayment
                    && withdrawal.status == TransactionStatus::Confirmed
                    && purchase
                        .as_ref()
                        .is_some_and(|movement| movement.unit_cost == Some(9_000))
            })
            .return_once(move |_, _, _, _, _, _| Ok(approved));
        let service = ExpenseService::new(
            Arc::new(expenses),
            Arc::new(MockReferenceRepository::new()),
            Arc::new(MockInventoryRepository::new()),
            fixture_clock(),
        );

        let result = service.approve(&ctx, &id).await.expect("approved");

        assert_eq!(result.status, ReviewStatus::Approved);
    }

    #[rstest]
    #[tokio::test]
    async fn expenses_need_an_expense_category() {
        let ctx = member(Role::Editor);
        let mut reference = MockReferenceRepository::new();
        reference.expect_find_category().return_once(move |_, id| {
            Ok(Some(Category {
                id: *id,
                restaurant_id: ctx.restaurant_id,
                kind: CategoryKind::Inventory,
                name: "Farines".to_owned(),
                active: true,
                created_at: fixture_now(),
            }))
        });
        let mut expenses = MockExpenseRepository::new();
        expenses.expect_insert().times(0);
        let service = ExpenseService::new(
            Arc::new(expenses),
            Arc::new(reference),
            Arc::new(MockInventoryRepository::new()),
            fixture_clock(),
        );
        let source = expense(&ctx);

        let err = service
            .create(
                &ctx,
                ExpenseDraft {
                    date: source.date,
                    amount: source.amount,
                    method: source.method,
                    category_id: source.category_id,
                    group_id: None,
                    supplier_id: None,
                    description: None,
                    stock_purchase: None,
                },
            )
            .await
            .expect_err("wrong kind");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.details().expect("details")["field"], "categoryId");
    }

    #[rstest]
    #[tokio::test]
    async fn cashiers_cannot_record_expenses() {
        let service = ExpenseService::new(
            Arc::new(MockExpenseRepository::new()),
            Arc::new(MockReferenceRepository::new()),
            Arc::new(MockInventoryRepository::new()),
            fixture_clock(),
        );
        let ctx = member(Role::Cashier);
        let source = expense(&ctx);
        let err = service
            .create(
                &ctx,
                ExpenseDraft {
                    date: source.date,
                    amount: source.amount,
                    method: source.method,
                    category_id: source.category_id,
                    group_id: None,
                    supplier_id: None,
                    description: None,
                    stock_purchase: None,
                },
            )
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }
}
