//! Customer debt use-cases.
//!
//! The service checks the debt rules against the state it read; the
//! repository re-checks them inside its transaction and reports a lost race
//! as `StateChanged`.

use std::sync::Arc;

use chrono::NaiveDate;
use mockable::Clock;
use tracing::info;

use crate::domain::listing::paginate;
use crate::domain::ports::{DebtRepository, ReferenceRepository, SaleRepository};
use crate::domain::reference_service::require_contact;
use crate::domain::repository_errors::{map_debt_error, map_sale_error};
use crate::domain::{
    Action, ContactKind, CustomerDebtSummary, Debt, DebtDetail, DebtDraft, DebtFilter, DebtId,
    DebtPayment, DebtRuleError, DebtStatus, Error, Gnf, ListKey, ListPage, ListRequest,
    MemberContext, PaymentId, PaymentMethod, normalize_optional_text, require_reason,
};

fn rule_error(err: DebtRuleError) -> Error {
    let code = match err {
        DebtRuleError::WrittenOff => "written_off",
        DebtRuleError::AlreadyPaid => "already_paid",
        DebtRuleError::Overpayment { .. } => "overpayment",
        DebtRuleError::ZeroPayment => "must_be_positive",
    };
    let field = match err {
        DebtRuleError::Overpayment { .. } | DebtRuleError::ZeroPayment => "amount",
        DebtRuleError::WrittenOff | DebtRuleError::AlreadyPaid => "status",
    };
    Error::invalid_field(field, code, err.to_string())
}

/// A payment as entered by staff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPayment {
    /// Amount received.
    pub amount: Gnf,
    /// How it was paid.
    pub method: PaymentMethod,
    /// Day received; defaults to today.
    pub paid_on: Option<NaiveDate>,
    /// Notes.
    pub notes: Option<String>,
}

/// Debt service.
#[derive(Clone)]
pub struct DebtService {
    debts: Arc<dyn DebtRepository>,
    reference: Arc<dyn ReferenceRepository>,
    sales: Arc<dyn SaleRepository>,
    clock: Arc<dyn Clock>,
}

impl DebtService {
    /// Create the service from its ports.
    pub fn new(
        debts: Arc<dyn DebtRepository>,
        reference: Arc<dyn ReferenceRepository>,
        sales: Arc<dyn SaleRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            debts,
            reference,
            sales,
            clock,
        }
    }

    async fn find(&self, ctx: &MemberContext, id: &DebtId) -> Result<Debt, Error> {
        self.debts
            .find(&ctx.restaurant_id, id)
            .await
            .map_err(map_debt_error)?
            .ok_or_else(|| Error::not_found(format!("debt {id} not found")))
    }

    /// Open a debt for a customer.
    pub async fn create(&self, ctx: &MemberContext, draft: DebtDraft) -> Result<Debt, Error> {
        ctx.require(Action::ManageDebts)?;
        if draft.amount.is_zero() {
            return Err(Error::invalid_field(
                "amount",
                "must_be_positive",
                "debt amount must be greater than zero",
            ));
        }
        require_contact(
            self.reference.as_ref(),
            &ctx.restaurant_id,
            &draft.customer_id,
            ContactKind::Customer,
            "customerId",
        )
        .await?;
        if let Some(sale_id) = &draft.sale_id {
            self.sales
                .find(&ctx.restaurant_id, sale_id)
                .await
                .map_err(map_sale_error)?
                .ok_or_else(|| {
                    Error::invalid_field("saleId", "unknown", format!("sale {sale_id} not found"))
                })?;
        }
        let debt = Debt {
            id: DebtId::random(),
            restaurant_id: ctx.restaurant_id,
            customer_id: draft.customer_id,
            sale_id: draft.sale_id,
            amount: draft.amount,
            paid_amount: Gnf::ZERO,
            status: DebtStatus::Outstanding,
            due_date: draft.due_date,
            description: normalize_optional_text(draft.description.as_deref()),
            written_off_reason: None,
            written_off_at: None,
            created_by: ctx.user_id,
            created_at: self.clock.utc(),
        };
        self.debts.insert(&debt).await.map_err(map_debt_error)?;
        info!(
            restaurant_id = %ctx.restaurant_id,
            debt_id = %debt.id,
            amount = debt.amount.get(),
            "debt opened"
        );
        Ok(debt)
    }

    /// Debts newest first. `overdue_only` keeps open debts past their due
    /// date as of today.
    pub async fn list(
        &self,
        ctx: &MemberContext,
        mut filter: DebtFilter,
        overdue_only: bool,
        page: &ListRequest,
    ) -> Result<ListPage<Debt>, Error> {
        ctx.require(Action::View)?;
        if overdue_only {
            filter.overdue_on = Some(self.clock.utc().date_naive());
        }
        let rows = self
            .debts
            .list(&ctx.restaurant_id, &filter, page)
            .await
            .map_err(map_debt_error)?;
        paginate(rows, page, |debt| {
            ListKey::new(debt.created_at, *debt.id.as_uuid())
        })
    }

    /// A debt with its payments.
    pub async fn get(&self, ctx: &MemberContext, id: &DebtId) -> Result<DebtDetail, Error> {
        ctx.require(Action::View)?;
        let debt = self.find(ctx, id).await?;
        let payments = self
            .debts
            .payments(&ctx.restaurant_id, id)
            .await
            .map_err(map_debt_error)?;
        Ok(DebtDetail { debt, payments })
    }

    /// Record money received against a debt. The deposit it creates is
    /// confirmed at once except for cash.
    pub async fn record_payment(
        &self,
        ctx: &MemberContext,
        id: &DebtId,
        input: RecordPayment,
    ) -> Result<Debt, Error> {
        ctx.require(Action::RecordDebtPayment)?;
        let debt = self.find(ctx, id).await?;
        debt.check_payment(input.amount).map_err(rule_error)?;
        let now = self.clock.utc();
        let payment = DebtPayment {
            id: PaymentId::random(),
            debt_id: *id,
            restaurant_id: ctx.restaurant_id,
            amount: input.amount,
            method: input.method,
            paid_on: input.paid_on.unwrap_or_else(|| now.date_naive()),
            notes: normalize_optional_text(input.notes.as_deref()),
            created_by: ctx.user_id,
            created_at: now,
        };
        let deposit = payment.deposit();
        let status = deposit.settlement_status();
        let deposit = deposit.stamp(ctx.restaurant_id, status, ctx.user_id, now);
        let updated = self
            .debts
            .record_payment(&payment, &deposit)
            .await
            .map_err(map_debt_error)?;
        info!(
            restaurant_id = %ctx.restaurant_id,
            debt_id = %id,
            payment_id = %payment.id,
            amount = payment.amount.get(),
            status = %updated.status,
            "debt payment recorded"
        );
        Ok(updated)
    }

    /// Remove a payment and its deposit.
    pub async fn delete_payment(
        &self,
        ctx: &MemberContext,
        debt_id: &DebtId,
        payment_id: &PaymentId,
    ) -> Result<Debt, Error> {
        ctx.require(Action::ManageDebts)?;
        let debt = self.find(ctx, debt_id).await?;
        debt.check_payment_removal().map_err(rule_error)?;
        let updated = self
            .debts
            .delete_payment(&ctx.restaurant_id, debt_id, payment_id)
            .await
            .map_err(map_debt_error)?;
        info!(
            restaurant_id = %ctx.restaurant_id,
            debt_id = %debt_id,
            payment_id = %payment_id,
            "debt payment deleted"
        );
        Ok(updated)
    }

    /// Abandon what is left of a debt. Final.
    pub async fn write_off(
        &self,
        ctx: &MemberContext,
        id: &DebtId,
        reason: &str,
    ) -> Result<Debt, Error> {
        ctx.require(Action::ManageDebts)?;
        let reason = require_reason(reason)
            .map_err(|err| Error::invalid_field("reason", "required", err.to_string()))?;
        let debt = self.find(ctx, id).await?;
        debt.check_write_off().map_err(rule_error)?;
        let updated = self
            .debts
            .write_off(&ctx.restaurant_id, id, &reason, self.clock.utc())
            .await
            .map_err(map_debt_error)?;
        info!(restaurant_id = %ctx.restaurant_id, debt_id = %id, "debt written off");
        Ok(updated)
    }

    /// Outstanding balance per customer.
    pub async fn customer_summaries(
        &self,
        ctx: &MemberContext,
    ) -> Result<Vec<CustomerDebtSummary>, Error> {
        ctx.require(Action::View)?;
        self.debts
            .customer_summaries(&ctx.restaurant_id, self.clock.utc().date_naive())
            .await
            .map_err(map_debt_error)
    }
}
