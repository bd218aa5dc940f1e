//! Bank transactions, balances, and reconciliations.

use std::sync::Arc;

use chrono::NaiveDate;
use mockable::Clock;
use tracing::info;

use crate::domain::listing::paginate;
use crate::domain::ports::{BankRepository, RestaurantRepository};
use crate::domain::repository_errors::map_bank_error;
use crate::domain::restaurant_service::load_restaurant;
use crate::domain::{
    Action, Balances, BankTransaction, Error, ListKey, ListPage, ListRequest,
    ManualTransactionRequest, MemberContext, PaymentSplit, Reconciliation, ReconciliationId,
    TransactionDraft, TransactionFilter, TransactionId, TransactionStatus, compute_balances,
    discrepancy, normalize_optional_text,
};

/// A till and account count as entered by a manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordReconciliation {
    /// Day of the count; defaults to today.
    pub date: Option<NaiveDate>,
    /// Balances actually counted.
    pub counted: PaymentSplit,
    /// Notes.
    pub notes: Option<String>,
    /// Post adjustments that align the books with the count.
    pub post_adjustments: bool,
}

/// Banking service.
#[derive(Clone)]
pub struct BankingService {
    bank: Arc<dyn BankRepository>,
    restaurants: Arc<dyn RestaurantRepository>,
    clock: Arc<dyn Clock>,
}

impl BankingService {
    /// Create the service from its ports.
    pub fn new(
        bank: Arc<dyn BankRepository>,
        restaurants: Arc<dyn RestaurantRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            bank,
            restaurants,
            clock,
        }
    }

    /// Transactions newest first.
    pub async fn list(
        &self,
        ctx: &MemberContext,
        filter: &TransactionFilter,
        page: &ListRequest,
    ) -> Result<ListPage<BankTransaction>, Error> {
        ctx.require(Action::View)?;
        let rows = self
            .bank
            .list(&ctx.restaurant_id, filter, page)
            .await
            .map_err(map_bank_error)?;
        paginate(rows, page, |tx| ListKey::new(tx.created_at, *tx.id.as_uuid()))
    }

    /// One transaction.
    pub async fn get(
        &self,
        ctx: &MemberContext,
        id: &TransactionId,
    ) -> Result<BankTransaction, Error> {
        ctx.require(Action::View)?;
        self.bank
            .find(&ctx.restaurant_id, id)
            .await
            .map_err(map_bank_error)?
            .ok_or_else(|| Error::not_found(format!("transaction {id} not found")))
    }

    /// Record an owner contribution, adjustment, or other movement that no
    /// sale, expense, or debt explains.
    pub async fn create_manual(
        &self,
        ctx: &MemberContext,
        request: ManualTransactionRequest,
    ) -> Result<BankTransaction, Error> {
        ctx.require(Action::ManageBank)?;
        if !request.reason.is_manual() {
            return Err(Error::invalid_field(
                "reason",
                "not_manual",
                format!("{} transactions are created by their workflow", request.reason),
            ));
        }
        if request.amount.is_zero() {
            return Err(Error::invalid_field(
                "amount",
                "must_be_positive",
                "amount must be greater than zero",
            ));
        }
        let status = if request.confirmed {
            TransactionStatus::Confirmed
        } else {
            TransactionStatus::Pending
        };
        let transaction = TransactionDraft {
            date: request.date,
            amount: request.amount,
            direction: request.direction,
            method: request.method,
            reason: request.reason,
            source: None,
            description: normalize_optional_text(request.description.as_deref()),
        }
        .stamp(ctx.restaurant_id, status, ctx.user_id, self.clock.utc());
        self.bank
            .insert(&transaction)
            .await
            .map_err(map_bank_error)?;
        info!(
            restaurant_id = %ctx.restaurant_id,
            transaction_id = %transaction.id,
            reason = %transaction.reason,
            status = %transaction.status,
            "manual transaction recorded"
        );
        Ok(transaction)
    }

    async fn settle(
        &self,
        ctx: &MemberContext,
        id: &TransactionId,
        status: TransactionStatus,
    ) -> Result<BankTransaction, Error> {
        ctx.require(Action::ManageBank)?;
        let settled = self
            .bank
            .settle(&ctx.restaurant_id, id, status, &ctx.user_id, self.clock.utc())
            .await
            .map_err(map_bank_error)?;
        info!(restaurant_id = %ctx.restaurant_id, transaction_id = %id, %status, "transaction settled");
        Ok(settled)
    }

    /// Confirm a pending transaction, e.g. once cash has been banked.
    pub async fn confirm(
        &self,
        ctx: &MemberContext,
        id: &TransactionId,
    ) -> Result<BankTransaction, Error> {
        self.settle(ctx, id, TransactionStatus::Confirmed).await
    }

    /// Reject a pending transaction.
    pub async fn reject(
        &self,
        ctx: &MemberContext,
        id: &TransactionId,
    ) -> Result<BankTransaction, Error> {
        self.settle(ctx, id, TransactionStatus::Rejected).await
    }

    /// Delete a manual transaction that is still pending.
    pub async fn delete(&self, ctx: &MemberContext, id: &TransactionId) -> Result<(), Error> {
        ctx.require(Action::ManageBank)?;
        self.bank
            .delete_manual_pending(&ctx.restaurant_id, id)
            .await
            .map_err(map_bank_error)?;
        info!(restaurant_id = %ctx.restaurant_id, transaction_id = %id, "manual transaction deleted");
        Ok(())
    }

    /// Current balance per payment method.
    pub async fn balances(&self, ctx: &MemberContext) -> Result<Balances, Error> {
        ctx.require(Action::View)?;
        self.current_balances(ctx).await
    }

    async fn current_balances(&self, ctx: &MemberContext) -> Result<Balances, Error> {
        let restaurant = load_restaurant(self.restaurants.as_ref(), &ctx.restaurant_id).await?;
        let aggregates = self
            .bank
            .aggregates(&ctx.restaurant_id)
            .await
            .map_err(map_bank_error)?;
        Ok(compute_balances(restaurant.initial_balances, &aggregates))
    }

    /// Compare a count with the books, optionally posting adjustments.
    pub async fn reconcile(
        &self,
        ctx: &MemberContext,
        input: RecordReconciliation,
    ) -> Result<Reconciliation, Error> {
        ctx.require(Action::Reconcile)?;
        let expected = self.current_balances(ctx).await?.as_totals();
        let now = self.clock.utc();
        let reconciliation = Reconciliation {
            id: ReconciliationId::random(),
            restaurant_id: ctx.restaurant_id,
            date: input.date.unwrap_or_else(|| now.date_naive()),
            expected,
            counted: input.counted,
            discrepancy: discrepancy(expected, input.counted),
            adjustments_posted: input.post_adjustments,
            notes: normalize_optional_text(input.notes.as_deref()),
            created_by: ctx.user_id,
            created_at: now,
        };
        let adjustments: Vec<_> = if input.post_adjustments {
            reconciliation
                .adjustment_drafts()
                .into_iter()
                .map(|draft| {
                    draft.stamp(
                        ctx.restaurant_id,
                        TransactionStatus::Confirmed,
                        ctx.user_id,
                        now,
                    )
                })
                .collect()
        } else {
            Vec::new()
        };
        self.bank
            .insert_reconciliation(&reconciliation, &adjustments)
            .await
            .map_err(map_bank_error)?;
        info!(
            restaurant_id = %ctx.restaurant_id,
            reconciliation_id = %reconciliation.id,
            adjustments = adjustments.len(),
            "reconciliation recorded"
        );
        Ok(reconciliation)
    }

    /// Reconciliations newest first.
    pub async fn list_reconciliations(
        &self,
        ctx: &MemberContext,
        page: &ListRequest,
    ) -> Result<ListPage<Reconciliation>, Error> {
        ctx.require(Action::View)?;
        let rows = self
            .bank
            .list_reconciliations(&ctx.restaurant_id, page)
            .await
            .map_err(map_bank_error)?;
        paginate(rows, page, |rec| {
            ListKey::new(rec.created_at, *rec.id.as_uuid())
        })
    }

    /// One reconciliation.
    pub async fn get_reconciliation(
        &self,
        ctx: &MemberContext,
        id: &ReconciliationId,
    ) -> Result<Reconciliation, Error> {
        ctx.require(Action::View)?;
        self.bank
            .find_reconciliation(&ctx.restaurant_id, id)
            .await
            .map_err(map_bank_error)?
            .ok_or_else(|| Error::not_found(format!("reconciliation {id} not found")))
    }
}

#[cfg(test)]
#[path = "banking_service_tests.rs"]
mod tests;
