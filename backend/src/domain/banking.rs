//! Bank transactions, per-method balances, and reconciliations.
//!
//! A balance is the opening balance plus confirmed deposits minus confirmed
//! withdrawals. Pending movements are reported beside it but never counted,
//! and balances are signed because they describe what was actually counted.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::macros::define_code_enum;
use super::{
    ExpenseId, Gnf, MethodTotals, PaymentId, PaymentMethod, PaymentSplit, ReconciliationId,
    RestaurantId, SaleId, TransactionId, UserId,
};

define_code_enum! {
    /// Money in or out.
    pub enum TransactionDirection / ParseTransactionDirectionError ("transaction direction") {
        /// Money in.
        Deposit => "deposit",
        /// Money out.
        Withdrawal => "withdrawal",
    }
}

define_code_enum! {
    /// Why a transaction exists.
    pub enum TransactionReason / ParseTransactionReasonError ("transaction reason") {
        /// Takings from an approved sale.
        SaleDeposit => "sale_deposit",
        /// Money collected against a debt.
        DebtCollection => "debt_collection",
        /// Payment of an approved expense.
        ExpensePayment => "expense_payment",
        /// Owner putting money into the business.
        OwnerContribution => "owner_contribution",
        /// Correction, usually from a reconciliation.
        Adjustment => "adjustment",
        /// Anything else.
        Other => "other",
    }
}

impl TransactionReason {
    /// Reasons staff may pick when entering a transaction by hand.
    #[must_use]
    pub const fn is_manual(self) -> bool {
        matches!(
            self,
            Self::OwnerContribution | Self::Adjustment | Self::Other
        )
    }
}

define_code_enum! {
    /// Whether a transaction counts towards the balance.
    pub enum TransactionStatus / ParseTransactionStatusError ("transaction status") {
        /// Recorded but not yet seen on the account.
        Pending => "pending",
        /// Counted in the balance.
        Confirmed => "confirmed",
        /// Never happened.
        Rejected => "rejected",
    }
}

define_code_enum! {
    /// Kind of record a transaction was generated from.
    pub enum SourceKind / ParseSourceKindError ("transaction source") {
        /// An approved sale.
        Sale => "sale",
        /// An approved expense.
        Expense => "expense",
        /// A debt payment.
        DebtPayment => "debt_payment",
        /// A reconciliation adjustment.
        Reconciliation => "reconciliation",
    }
}

/// Record that generated a transaction automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSource {
    /// Kind of record.
    pub kind: SourceKind,
    /// Record identifier.
    #[schema(value_type = String, format = Uuid)]
    pub id: uuid::Uuid,
}

impl TransactionSource {
    /// Link to a sale.
    #[must_use]
    pub const fn sale(id: SaleId) -> Self {
        Self {
            kind: SourceKind::Sale,
            id: *id.as_uuid(),
        }
    }

    /// Link to an expense.
    #[must_use]
    pub const fn expense(id: ExpenseId) -> Self {
        Self {
            kind: SourceKind::Expense,
            id: *id.as_uuid(),
        }
    }

    /// Link to a debt payment.
    #[must_use]
    pub const fn debt_payment(id: PaymentId) -> Self {
        Self {
            kind: SourceKind::DebtPayment,
            id: *id.as_uuid(),
        }
    }

    /// Link to a reconciliation.
    #[must_use]
    pub const fn reconciliation(id: ReconciliationId) -> Self {
        Self {
            kind: SourceKind::Reconciliation,
            id: *id.as_uuid(),
        }
    }
}

/// A deposit or withdrawal against one payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BankTransaction {
    /// Identifier.
    pub id: TransactionId,
    /// Owning restaurant.
    pub restaurant_id: RestaurantId,
    /// Value date.
    pub date: NaiveDate,
    /// Amount, always positive; direction gives the sign.
    pub amount: Gnf,
    /// In or out.
    pub direction: TransactionDirection,
    /// Account affected.
    pub method: PaymentMethod,
    /// Why it exists.
    pub reason: TransactionReason,
    /// Whether it counts.
    pub status: TransactionStatus,
    /// Generating record, absent for manual entries.
    pub source: Option<TransactionSource>,
    /// Free text.
    pub description: Option<String>,
    /// Author.
    pub created_by: UserId,
    /// Who confirmed or rejected it.
    pub confirmed_by: Option<UserId>,
    /// When it was confirmed or rejected.
    pub confirmed_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl BankTransaction {
    /// Amount with the direction applied.
    #[must_use]
    pub fn signed_amount(&self) -> i64 {
        match self.direction {
            TransactionDirection::Deposit => self.amount.get(),
            TransactionDirection::Withdrawal => -self.amount.get(),
        }
    }

    /// True for hand-entered transactions.
    #[must_use]
    pub const fn is_manual(&self) -> bool {
        self.source.is_none()
    }
}

/// Fields of a transaction before it is stamped with ids and times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    /// Value date.
    pub date: NaiveDate,
    /// Amount.
    pub amount: Gnf,
    /// In or out.
    pub direction: TransactionDirection,
    /// Account affected.
    pub method: PaymentMethod,
    /// Why it exists.
    pub reason: TransactionReason,
    /// Generating record.
    pub source: Option<TransactionSource>,
    /// Free text.
    pub description: Option<String>,
}

impl TransactionDraft {
    /// Deposit that settles the way its method does: cash waits for banking,
    /// everything else is confirmed at once.
    #[must_use]
    pub fn deposit(
        date: NaiveDate,
        method: PaymentMethod,
        amount: Gnf,
        reason: TransactionReason,
        source: TransactionSource,
    ) -> Self {
        Self {
            date,
            amount,
            direction: TransactionDirection::Deposit,
            method,
            reason,
            source: Some(source),
            description: None,
        }
    }

    /// Status a generated deposit starts in.
    #[must_use]
    pub const fn settlement_status(&self) -> TransactionStatus {
        if matches!(self.direction, TransactionDirection::Deposit)
            && !self.method.settles_immediately()
        {
            TransactionStatus::Pending
        } else {
            TransactionStatus::Confirmed
        }
    }

    /// Stamp the draft into a stored transaction.
    #[must_use]
    pub fn stamp(
        self,
        restaurant_id: RestaurantId,
        status: TransactionStatus,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> BankTransaction {
        let confirmed = status == TransactionStatus::Confirmed;
        BankTransaction {
            id: TransactionId::random(),
            restaurant_id,
            date: self.date,
            amount: self.amount,
            direction: self.direction,
            method: self.method,
            reason: self.reason,
            status,
            source: self.source,
            description: self.description,
            created_by: actor,
            confirmed_by: confirmed.then_some(actor),
            confirmed_at: confirmed.then_some(now),
            created_at: now,
        }
    }
}

/// Filters for the transaction list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Restrict to one method.
    pub method: Option<PaymentMethod>,
    /// Restrict to one direction.
    pub direction: Option<TransactionDirection>,
    /// Restrict to one status.
    pub status: Option<TransactionStatus>,
    /// Earliest value date, inclusive.
    pub from: Option<NaiveDate>,
    /// Latest value date, inclusive.
    pub to: Option<NaiveDate>,
}

/// Sum of transactions sharing a method, direction, and status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionAggregate {
    /// Account.
    pub method: PaymentMethod,
    /// In or out.
    pub direction: TransactionDirection,
    /// Status bucket.
    pub status: TransactionStatus,
    /// Sum of amounts.
    pub total: i64,
}

/// Balance of one payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MethodBalance {
    /// Account.
    pub method: PaymentMethod,
    /// Opening balance.
    pub initial: i64,
    /// Confirmed money in.
    pub confirmed_deposits: i64,
    /// Confirmed money out.
    pub confirmed_withdrawals: i64,
    /// Opening plus confirmed deposits minus confirmed withdrawals.
    pub balance: i64,
    /// Money in awaiting confirmation.
    pub pending_deposits: i64,
    /// Money out awaiting confirmation.
    pub pending_withdrawals: i64,
}

/// Balances across all payment methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Balances {
    /// One entry per method.
    pub methods: Vec<MethodBalance>,
    /// Sum of the method balances.
    pub total: i64,
}

impl Balances {
    /// Balance per method as signed totals.
    #[must_use]
    pub fn as_totals(&self) -> MethodTotals {
        let mut totals = MethodTotals::default();
        for entry in &self.methods {
            *totals.get_mut(entry.method) = entry.balance;
        }
        totals
    }
}

/// Fold transaction aggregates into per-method balances.
///
/// # Examples
/// ```
/// use fournil::domain::{
///     Gnf, PaymentMethod, PaymentSplit, TransactionAggregate, TransactionDirection,
///     TransactionStatus, compute_balances,
/// };
///
/// let initial = PaymentSplit { cash: Gnf::new(1_000).unwrap(), ..PaymentSplit::default() };
/// let balances = compute_balances(
///     initial,
///     &[TransactionAggregate {
///         method: PaymentMethod::Cash,
///         direction: TransactionDirection::Withdrawal,
///         status: TransactionStatus::Confirmed,
///         total: 400,
///     }],
/// );
/// assert_eq!(balances.total, 600);
/// ```
#[must_use]
pub fn compute_balances(initial: PaymentSplit, aggregates: &[TransactionAggregate]) -> Balances {
    let methods: Vec<MethodBalance> = PaymentMethod::ALL
        .iter()
        .map(|method| {
            let mut entry = MethodBalance {
                method: *method,
                initial: initial.amount(*method).get(),
                confirmed_deposits: 0,
                confirmed_withdrawals: 0,
                balance: 0,
                pending_deposits: 0,
                pending_withdrawals: 0,
            };
            for aggregate in aggregates.iter().filter(|a| a.method == *method) {
                let slot = match (aggregate.status, aggregate.direction) {
                    (TransactionStatus::Confirmed, TransactionDirection::Deposit) => {
                        &mut entry.confirmed_deposits
                    }
                    (TransactionStatus::Confirmed, TransactionDirection::Withdrawal) => {
                        &mut entry.confirmed_withdrawals
                    }
                    (TransactionStatus::Pending, TransactionDirection::Deposit) => {
                        &mut entry.pending_deposits
                    }
                    (TransactionStatus::Pending, TransactionDirection::Withdrawal) => {
                        &mut entry.pending_withdrawals
                    }
                    (TransactionStatus::Rejected, _) => continue,
                };
                *slot = slot.saturating_add(aggregate.total);
            }
            entry.balance = entry
                .initial
                .saturating_add(entry.confirmed_deposits)
                .saturating_sub(entry.confirmed_withdrawals);
            entry
        })
        .collect();
    let total = methods
        .iter()
        .fold(0_i64, |sum, entry| sum.saturating_add(entry.balance));
    Balances { methods, total }
}

/// A till and account count compared with the books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    /// Identifier.
    pub id: ReconciliationId,
    /// Owning restaurant.
    pub restaurant_id: RestaurantId,
    /// Day of the count.
    pub date: NaiveDate,
    /// Balances according to confirmed transactions.
    pub expected: MethodTotals,
    /// Balances actually counted.
    pub counted: PaymentSplit,
    /// Counted minus expected.
    pub discrepancy: MethodTotals,
    /// Whether adjustment transactions were posted.
    pub adjustments_posted: bool,
    /// Notes.
    pub notes: Option<String>,
    /// Author.
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Counted minus expected, per method.
#[must_use]
pub fn discrepancy(expected: MethodTotals, counted: PaymentSplit) -> MethodTotals {
    let counted = MethodTotals::from(counted);
    MethodTotals {
        cash: counted.cash.saturating_sub(expected.cash),
        orange_money: counted.orange_money.saturating_sub(expected.orange_money),
        card: counted.card.saturating_sub(expected.card),
    }
}

impl Reconciliation {
    /// Confirmed adjustment transactions that bring the books in line with
    /// the count, one per method with a non-zero discrepancy.
    #[must_use]
    pub fn adjustment_drafts(&self) -> Vec<TransactionDraft> {
        PaymentMethod::ALL
            .iter()
            .filter_map(|method| {
                let difference = self.discrepancy.get(*method);
                let direction = match difference.signum() {
                    1 => TransactionDirection::Deposit,
                    -1 => TransactionDirection::Withdrawal,
                    _ => return None,
                };
                let amount = Gnf::new(difference.checked_abs()?).ok()?;
                Some(TransactionDraft {
                    date: self.date,
                    amount,
                    direction,
                    method: *method,
                    reason: TransactionReason::Adjustment,
                    source: Some(TransactionSource::reconciliation(self.id)),
                    description: Some(format!("Reconciliation adjustment ({method})")),
                })
            })
            .collect()
    }
}

/// Manual transaction entered by a manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualTransactionRequest {
    /// Value date.
    pub date: NaiveDate,
    /// Amount.
    pub amount: Gnf,
    /// In or out.
    pub direction: TransactionDirection,
    /// Account affected.
    pub method: PaymentMethod,
    /// One of the manual reasons.
    pub reason: TransactionReason,
    /// Free text.
    pub description: Option<String>,
    /// Record as already confirmed.
    pub confirmed: bool,
}
