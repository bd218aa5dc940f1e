//! Domain primitives, aggregates, and services.
//!
//! Purpose: define strongly typed entities for the back office and the pure
//! calculations over them (stock and expiry status, balances, debt status,
//! valuation), plus the services that implement each use-case against the
//! ports in [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure envelope.
//! - Identifier newtypes and value types (Gnf, Quantity, Role, ...).
//! - Aggregates per module (inventory, sales, expenses, debts, banking).
//! - Services (`*Service`) consumed by the inbound HTTP adapter.

mod macros;

pub mod access;
pub mod auth;
pub mod banking;
pub mod debts;
pub mod error;
pub mod expenses;
pub mod ids;
pub mod inventory;
pub mod listing;
pub mod money;
pub mod notifications;
pub mod ports;
pub mod production;
pub mod quantity;
pub mod reference;
pub mod reports;
pub mod restaurant;
pub mod review;
pub mod sales;
pub mod trace_id;
pub mod user;

mod account_service;
mod banking_service;
mod debt_service;
mod expense_service;
mod inventory_service;
mod notification_service;
mod reference_service;
mod repository_errors;
mod report_service;
mod restaurant_service;
mod sales_service;
#[cfg(test)]
pub(crate) mod service_test_support;

pub use self::access::{Action, MemberContext, ParseRoleError, Role};
pub use self::auth::{
    CredentialValidationError, LoginCredentials, MIN_PASSWORD_CHARS, Registration,
};
pub use self::banking::{
    BankTransaction, Balances, ManualTransactionRequest, MethodBalance,
    ParseSourceKindError, ParseTransactionDirectionError, ParseTransactionReasonError,
    ParseTransactionStatusError, Reconciliation, SourceKind, TransactionAggregate,
    TransactionDirection, TransactionDraft, TransactionFilter, TransactionReason,
    TransactionSource, TransactionStatus, compute_balances, discrepancy,
};
pub use self::debts::{
    CustomerDebtSummary, Debt, DebtDetail, DebtDraft, DebtFilter, DebtPayment, DebtRuleError,
    DebtStatus, ParseDebtStatusError, derive_debt_status,
};
pub use self::error::{Error, ErrorCode};
pub use self::expenses::{
    Expense, ExpenseDraft, ExpenseFilter, ExpenseValidationError, StockPurchase,
};
pub use self::ids::{
    BatchId, CategoryId, ContactId, DebtId, ExpenseGroupId, ExpenseId, ItemId, MovementId,
    PaymentId, ProductId, ReconciliationId, RestaurantId, SaleId, TransactionId, UserId,
};
pub use self::inventory::{
    CategoryValuation, ExpiryInfo, ExpiryStatus, InventoryItem, InventoryItemView,
    InventorySummary, InventoryUnit, ItemDraft, MovementFilter, MovementKind, MovementOutcome,
    MovementValidationError, ParseInventoryUnitError, ParseMovementKindError, StockMovement,
    StockStatus, StockStatusCounts, classify_stock, project_expiry, summarize_inventory,
};
pub use self::listing::{ListKey, ListPage, ListRequest, day_key};
pub use self::money::{
    Gnf, MethodTotals, NegativeAmountError, ParsePaymentMethodError, PaymentMethod,
    PaymentSplit, SplitOverflowError,
};
pub use self::notifications::{
    DailyDigest, DigestRunReport, low_stock_message, sale_pending_message,
};
pub use self::production::{BatchValidationError, Ingredient, ProductionBatch, validate_batch};
pub use self::quantity::{QUANTITY_SCALE, Quantity, QuantityError};
pub use self::reference::{
    Category, CategoryKind, Contact, ContactDraft, ContactKind, EmptyNameError, ExpenseGroup,
    ParseCategoryKindError, ParseContactKindError, Product, ProductDraft, normalize_name,
    normalize_optional_text,
};
pub use self::reports::{CategoryTotal, PeriodFigures, PeriodReport, ReportPeriod, ReportPeriodError};
pub use self::restaurant::{
    DEFAULT_EXPIRY_WARNING_DAYS, MAX_EXPIRY_WARNING_DAYS, Member, Restaurant,
    RestaurantMembership, RestaurantSettings,
};
pub use self::review::{
    MissingReasonError, NotPendingError, ParseReviewStatusError, ReviewStatus, require_reason,
};
pub use self::sales::{Sale, SaleDraft, SaleFilter, SaleValidationError};
pub use self::trace_id::TraceId;
pub use self::user::{
    ContactFieldError, EmailAddress, PhoneNumber, User, normalize_display_name,
};

pub use self::account_service::{AccountService, Profile};
pub use self::banking_service::{BankingService, RecordReconciliation};
pub use self::debt_service::{DebtService, RecordPayment};
pub use self::expense_service::ExpenseService;
pub use self::inventory_service::{InventoryService, RecordBatch, RecordMovement};
pub use self::notification_service::{NotificationService, Notifier};
pub use self::reference_service::ReferenceService;
pub use self::report_service::ReportService;
pub use self::restaurant_service::RestaurantService;
pub use self::sales_service::SalesService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use fournil::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
