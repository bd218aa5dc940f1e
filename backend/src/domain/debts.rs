//! Customer debts and the payments made against them.
//!
//! Status is derived from the paid amount, except that a write-off is
//! final: a written-off debt takes no more payments and cannot be revived.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::macros::define_code_enum;
use super::{
    ContactId, DebtId, Gnf, PaymentId, PaymentMethod, RestaurantId, SaleId, TransactionDraft,
    TransactionReason, TransactionSource, UserId,
};

define_code_enum! {
    /// Repayment state of a debt.
    pub enum DebtStatus / ParseDebtStatusError ("debt status") {
        /// Nothing paid yet.
        Outstanding => "outstanding",
        /// Some, not all, paid.
        PartiallyPaid => "partially_paid",
        /// Settled.
        FullyPaid => "fully_paid",
        /// Abandoned; terminal.
        WrittenOff => "written_off",
    }
}

/// Derive the status from the paid amount.
///
/// # Examples
/// ```
/// use fournil::domain::{DebtStatus, Gnf, derive_debt_status};
///
/// let amount = Gnf::new(10_000).unwrap();
/// assert_eq!(derive_debt_status(amount, Gnf::ZERO), DebtStatus::Outstanding);
/// assert_eq!(derive_debt_status(amount, Gnf::new(1).unwrap()), DebtStatus::PartiallyPaid);
/// assert_eq!(derive_debt_status(amount, amount), DebtStatus::FullyPaid);
/// ```
#[must_use]
pub fn derive_debt_status(amount: Gnf, paid: Gnf) -> DebtStatus {
    if paid.is_zero() {
        DebtStatus::Outstanding
    } else if paid < amount {
        DebtStatus::PartiallyPaid
    } else {
        DebtStatus::FullyPaid
    }
}

/// Rule violations on debt operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DebtRuleError {
    /// Written-off debts are frozen.
    #[error("debt has been written off")]
    WrittenOff,
    /// Nothing left to collect or write off.
    #[error("debt is already fully paid")]
    AlreadyPaid,
    /// Payment larger than what is owed.
    #[error("payment of {amount} exceeds the remaining balance of {remaining}")]
    Overpayment {
        /// Attempted payment.
        amount: Gnf,
        /// Amount still owed.
        remaining: Gnf,
    },
    /// Zero payment.
    #[error("payment amount must be greater than zero")]
    ZeroPayment,
}

/// Money a customer owes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    /// Identifier.
    pub id: DebtId,
    /// Owning restaurant.
    pub restaurant_id: RestaurantId,
    /// Debtor.
    pub customer_id: ContactId,
    /// Sale the debt arose from.
    pub sale_id: Option<SaleId>,
    /// Amount owed originally.
    pub amount: Gnf,
    /// Amount repaid so far.
    pub paid_amount: Gnf,
    /// Repayment state.
    pub status: DebtStatus,
    /// Agreed repayment date.
    pub due_date: Option<NaiveDate>,
    /// What the debt is for.
    pub description: Option<String>,
    /// Why it was written off.
    pub written_off_reason: Option<String>,
    /// When it was written off.
    pub written_off_at: Option<DateTime<Utc>>,
    /// Author.
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Debt {
    /// Amount still owed.
    #[must_use]
    pub fn remaining(&self) -> Gnf {
        self.amount.saturating_sub(self.paid_amount)
    }

    /// Past due with money still owed.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        matches!(
            self.status,
            DebtStatus::Outstanding | DebtStatus::PartiallyPaid
        ) && self.due_date.is_some_and(|due| due < today)
    }

    /// Check that `amount` may be paid now.
    pub fn check_payment(&self, amount: Gnf) -> Result<(), DebtRuleError> {
        match self.status {
            DebtStatus::WrittenOff => return Err(DebtRuleError::WrittenOff),
            DebtStatus::FullyPaid => return Err(DebtRuleError::AlreadyPaid),
            DebtStatus::Outstanding | DebtStatus::PartiallyPaid => {}
        }
        if amount.is_zero() {
            return Err(DebtRuleError::ZeroPayment);
        }
        let remaining = self.remaining();
        if amount > remaining {
            return Err(DebtRuleError::Overpayment { amount, remaining });
        }
        Ok(())
    }

    /// Check that the debt may be written off.
    pub fn check_write_off(&self) -> Result<(), DebtRuleError> {
        match self.status {
            DebtStatus::WrittenOff => Err(DebtRuleError::WrittenOff),
            DebtStatus::FullyPaid => Err(DebtRuleError::AlreadyPaid),
            DebtStatus::Outstanding | DebtStatus::PartiallyPaid => Ok(()),
        }
    }

    /// Check that a payment may be removed.
    pub fn check_payment_removal(&self) -> Result<(), DebtRuleError> {
        if self.status == DebtStatus::WrittenOff {
            Err(DebtRuleError::WrittenOff)
        } else {
            Ok(())
        }
    }
}

/// Editable debt fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebtDraft {
    /// Debtor.
    pub customer_id: ContactId,
    /// Originating sale.
    pub sale_id: Option<SaleId>,
    /// Amount owed; must be positive.
    pub amount: Gnf,
    /// Agreed repayment date.
    pub due_date: Option<NaiveDate>,
    /// What the debt is for.
    pub description: Option<String>,
}

/// Money received against a debt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DebtPayment {
    /// Identifier.
    pub id: PaymentId,
    /// Debt repaid.
    pub debt_id: DebtId,
    /// Owning restaurant.
    pub restaurant_id: RestaurantId,
    /// Amount received.
    pub amount: Gnf,
    /// How it was paid.
    pub method: PaymentMethod,
    /// Day received.
    pub paid_on: NaiveDate,
    /// Notes.
    pub notes: Option<String>,
    /// Author.
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl DebtPayment {
    /// Deposit generated by this payment.
    #[must_use]
    pub fn deposit(&self) -> TransactionDraft {
        let mut draft = TransactionDraft::deposit(
            self.paid_on,
            self.method,
            self.amount,
            TransactionReason::DebtCollection,
            TransactionSource::debt_payment(self.id),
        );
        draft.description = self.notes.clone();
        draft
    }
}

/// A debt together with its payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DebtDetail {
    /// The debt.
    #[serde(flatten)]
    pub debt: Debt,
    /// Payments, oldest first.
    pub payments: Vec<DebtPayment>,
}

/// Filters for the debt list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebtFilter {
    /// Restrict to one status.
    pub status: Option<DebtStatus>,
    /// Restrict to one customer.
    pub customer_id: Option<ContactId>,
    /// Only unpaid debts due before this day.
    pub overdue_on: Option<NaiveDate>,
}

/// Outstanding balance of one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDebtSummary {
    /// Customer.
    pub customer_id: ContactId,
    /// Customer name.
    pub customer_name: String,
    /// Open debts.
    pub open_debts: u32,
    /// Total still owed.
    pub outstanding: i64,
    /// Open debts past their due date.
    pub overdue_debts: u32,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::{fixture, rstest};

    use super::*;

    fn gnf(value: i64) -> Gnf {
        Gnf::new(value).expect("non-negative")
    }

    #[fixture]
    fn debt() -> Debt {
        Debt {
            id: DebtId::random(),
            restaurant_id: RestaurantId::random(),
            customer_id: ContactId::random(),
            sale_id: None,
            amount: gnf(100_000),
            paid_amount: gnf(30_000),
            status: DebtStatus::PartiallyPaid,
            due_date: NaiveDate::from_ymd_opt(2026, 3, 1),
            description: None,
            written_off_reason: None,
            written_off_at: None,
            created_by: UserId::random(),
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn payment_cannot_exceed_remaining(debt: Debt) {
        assert_eq!(debt.check_payment(gnf(70_000)), Ok(()));
        assert_eq!(
            debt.check_payment(gnf(70_001)),
            Err(DebtRuleError::Overpayment {
                amount: gnf(70_001),
                remaining: gnf(70_000)
            })
        );
    }

    #[rstest]
    fn written_off_debts_are_frozen(mut debt: Debt) {
        debt.status = DebtStatus::WrittenOff;
        assert_eq!(debt.check_payment(gnf(1)), Err(DebtRuleError::WrittenOff));
        assert_eq!(debt.check_write_off(), Err(DebtRuleError::WrittenOff));
        assert_eq!(debt.check_payment_removal(), Err(DebtRuleError::WrittenOff));
    }

    #[rstest]
    fn fully_paid_debts_cannot_be_written_off(mut debt: Debt) {
        debt.paid_amount = debt.amount;
        debt.status = DebtStatus::FullyPaid;
        assert_eq!(debt.check_write_off(), Err(DebtRuleError::AlreadyPaid));
    }

    #[rstest]
    #[case(NaiveDate::from_ymd_opt(2026, 3, 1), false)]
    #[case(NaiveDate::from_ymd_opt(2026, 3, 2), true)]
    fn overdue_after_due_date(mut debt: Debt, #[case] today: Option<NaiveDate>, #[case] expected: bool) {
        let today = today.expect("date");
        assert_eq!(debt.is_overdue(today), expected);
        debt.status = DebtStatus::FullyPaid;
        assert!(!debt.is_overdue(today));
    }

    #[rstest]
    fn cash_collections_wait_for_banking() {
        let payment = DebtPayment {
            id: PaymentId::random(),
            debt_id: DebtId::random(),
            restaurant_id: RestaurantId::random(),
            amount: gnf(5_000),
            method: PaymentMethod::Cash,
            paid_on: NaiveDate::from_ymd_opt(2026, 3, 5).expect("date"),
            notes: None,
            created_by: UserId::random(),
            created_at: Utc::now(),
        };
        let deposit = payment.deposit();
        assert_eq!(deposit.reason, TransactionReason::DebtCollection);
        assert_eq!(
            deposit.settlement_status(),
            crate::domain::TransactionStatus::Pending
        );
    }
}
