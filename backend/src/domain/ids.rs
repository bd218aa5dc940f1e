//! Identifier newtypes for every persisted record.

use super::macros::define_id;

define_id! {
    /// Identifier of a user account.
    UserId
}

define_id! {
    /// Identifier of a restaurant (the tenant boundary).
    RestaurantId
}

define_id! {
    /// Identifier of a customer or supplier record.
    ContactId
}

define_id! {
    /// Identifier of a category.
    CategoryId
}

define_id! {
    /// Identifier of an expense group.
    ExpenseGroupId
}

define_id! {
    /// Identifier of a sellable product.
    ProductId
}

define_id! {
    /// Identifier of an inventory item.
    ItemId
}

define_id! {
    /// Identifier of a stock movement.
    MovementId
}

define_id! {
    /// Identifier of a production batch.
    BatchId
}

define_id! {
    /// Identifier of a daily sale.
    SaleId
}

define_id! {
    /// Identifier of an expense.
    ExpenseId
}

define_id! {
    /// Identifier of a customer debt.
    DebtId
}

define_id! {
    /// Identifier of a debt payment.
    PaymentId
}

define_id! {
    /// Identifier of a bank transaction.
    TransactionId
}

define_id! {
    /// Identifier of a reconciliation.
    ReconciliationId
}
