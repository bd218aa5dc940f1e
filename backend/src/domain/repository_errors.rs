//! Mapping from port errors to domain errors.
//!
//! Connection failures become `503 Service Unavailable`, query failures
//! `500 Internal Server Error`; guard failures map to the 4xx code the
//! operation documents.

use crate::domain::Error;
use crate::domain::ports::{
    BankRepositoryError, DebtRepositoryError, ExpenseRepositoryError, InventoryRepositoryError,
    PasswordHashError, ReferenceRepositoryError, ReportRepositoryError,
    RestaurantRepositoryError, SaleRepositoryError, UserRepositoryError,
};

fn unavailable(port: &str, message: &str) -> Error {
    Error::service_unavailable(format!("{port} repository unavailable: {message}"))
}

fn failed(port: &str, message: &str) -> Error {
    Error::internal(format!("{port} repository error: {message}"))
}

pub(crate) fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => unavailable("user", &message),
        UserRepositoryError::Query { message } => failed("user", &message),
        UserRepositoryError::DuplicateEmail => Error::conflict(
            "email address is already registered",
        )
        .with_details(serde_json::json!({ "field": "email", "code": "duplicate_email" })),
    }
}

pub(crate) fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

pub(crate) fn map_restaurant_error(error: RestaurantRepositoryError) -> Error {
    match error {
        RestaurantRepositoryError::Connection { message } => unavailable("restaurant", &message),
        RestaurantRepositoryError::Query { message } => failed("restaurant", &message),
        RestaurantRepositoryError::MemberNotFound => Error::not_found("membership not found"),
        RestaurantRepositoryError::DuplicateMember => {
            Error::conflict("user is already a member of this restaurant")
        }
        RestaurantRepositoryError::LastOwner => {
            Error::conflict("a restaurant must keep at least one owner")
        }
    }
}

pub(crate) fn map_reference_error(error: ReferenceRepositoryError) -> Error {
    match error {
        ReferenceRepositoryError::Connection { message } => unavailable("reference", &message),
        ReferenceRepositoryError::Query { message } => failed("reference", &message),
    }
}

pub(crate) fn map_inventory_error(error: InventoryRepositoryError) -> Error {
    match error {
        InventoryRepositoryError::Connection { message } => unavailable("inventory", &message),
        InventoryRepositoryError::Query { message } => failed("inventory", &message),
        InventoryRepositoryError::ItemNotFound { item_id } => {
            Error::not_found(format!("inventory item {item_id} not found"))
        }
        InventoryRepositoryError::InsufficientStock { item_id, item_name } => {
            Error::invalid_request(format!("insufficient stock of {item_name}")).with_details(
                serde_json::json!({
                    "field": "quantity",
                    "code": "insufficient_stock",
                    "itemId": item_id,
                }),
            )
        }
    }
}

pub(crate) fn map_sale_error(error: SaleRepositoryError) -> Error {
    match error {
        SaleRepositoryError::Connection { message } => unavailable("sale", &message),
        SaleRepositoryError::Query { message } => failed("sale", &message),
        SaleRepositoryError::NotFound => Error::not_found("sale not found"),
        SaleRepositoryError::DuplicateDate => Error::conflict("a sale already exists for this date")
            .with_details(serde_json::json!({ "field": "businessDate", "code": "duplicate_date" })),
        SaleRepositoryError::NotPending => Error::conflict("sale is no longer pending"),
    }
}

pub(crate) fn map_expense_error(error: ExpenseRepositoryError) -> Error {
    match error {
        ExpenseRepositoryError::Connection { message } => unavailable("expense", &message),
        ExpenseRepositoryError::Query { message } => failed("expense", &message),
        ExpenseRepositoryError::NotFound => Error::not_found("expense not found"),
        ExpenseRepositoryError::NotPending => Error::conflict("expense is no longer pending"),
        ExpenseRepositoryError::PurchaseItemNotFound { item_id } => {
            Error::not_found(format!("inventory item {item_id} not found"))
        }
        ExpenseRepositoryError::InsufficientStock { item_id, item_name } => {
            map_inventory_error(InventoryRepositoryError::InsufficientStock { item_id, item_name })
        }
    }
}

pub(crate) fn map_debt_error(error: DebtRepositoryError) -> Error {
    match error {
        DebtRepositoryError::Connection { message } => unavailable("debt", &message),
        DebtRepositoryError::Query { message } => failed("debt", &message),
        DebtRepositoryError::NotFound => Error::not_found("debt or payment not found"),
        DebtRepositoryError::StateChanged { message } => Error::conflict(message),
    }
}

pub(crate) fn map_bank_error(error: BankRepositoryError) -> Error {
    match error {
        BankRepositoryError::Connection { message } => unavailable("bank", &message),
        BankRepositoryError::Query { message } => failed("bank", &message),
        BankRepositoryError::NotFound => Error::not_found("bank record not found"),
        BankRepositoryError::NotPending => {
            Error::conflict("only pending transactions can be changed")
        }
    }
}

pub(crate) fn map_report_error(error: ReportRepositoryError) -> Error {
    match error {
        ReportRepositoryError::Connection { message } => unavailable("report", &message),
        ReportRepositoryError::Query { message } => failed("report", &message),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    #[rstest]
    #[case(SaleRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(SaleRepositoryError::query("syntax"), ErrorCode::InternalError)]
    #[case(SaleRepositoryError::not_found(), ErrorCode::NotFound)]
    #[case(SaleRepositoryError::duplicate_date(), ErrorCode::Conflict)]
    #[case(SaleRepositoryError::not_pending(), ErrorCode::Conflict)]
    fn sale_errors_map_to_codes(#[case] error: SaleRepositoryError, #[case] code: ErrorCode) {
        assert_eq!(map_sale_error(error).code(), code);
    }

    #[rstest]
    #[case(ExpenseRepositoryError::purchase_item_not_found("abc"), ErrorCode::NotFound)]
    #[case(ExpenseRepositoryError::insufficient_stock("abc", "Farine"), ErrorCode::InvalidRequest)]
    #[case(ExpenseRepositoryError::not_pending(), ErrorCode::Conflict)]
    fn expense_purchase_refusals_are_client_errors(
        #[case] error: ExpenseRepositoryError,
        #[case] code: ErrorCode,
    ) {
        assert_eq!(map_expense_error(error).code(), code);
    }

    #[rstest]
    fn insufficient_stock_is_a_bad_request_naming_the_item() {
        let err = map_inventory_error(InventoryRepositoryError::insufficient_stock("abc", "Farine"));
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), "insufficient stock of Farine");
        assert_eq!(err.details().expect("details")["itemId"], "abc");
    }
}
