//! Expense handlers.
//!
//! Expenses follow the same review flow as sales: recorded as pending,
//! then approved (withdrawing the money and booking any stock bought) or
//! rejected with a reason.

use actix_web::{HttpResponse, delete, get, post, put, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Error, Expense, ExpenseDraft, ExpenseFilter, ExpenseId, ListPage, PaymentMethod,
    ReviewStatus, StockPurchase,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::membership::Membership;
use crate::inbound::http::sales::RejectRequest;
use crate::inbound::http::schemas::{ErrorSchema, PageSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_amount, parse_code, parse_date, parse_id, parse_optional_code,
    parse_optional_date, parse_optional_id, parse_page, parse_quantity,
};

/// Stock received through an expense.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockPurchaseRequest {
    pub item_id: String,
    #[schema(value_type = f64)]
    pub quantity: Decimal,
}

/// Body for creating or editing an expense.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRequest {
    #[schema(example = "2026-03-10")]
    pub date: String,
    /// GNF; must be positive.
    pub amount: i64,
    /// `cash`, `orange_money`, or `card`.
    pub method: String,
    pub category_id: String,
    pub group_id: Option<String>,
    pub supplier_id: Option<String>,
    pub description: Option<String>,
    pub stock_purchase: Option<StockPurchaseRequest>,
}

impl TryFrom<ExpenseRequest> for ExpenseDraft {
    type Error = Error;

    fn try_from(value: ExpenseRequest) -> Result<Self, Self::Error> {
        let method: PaymentMethod = parse_code(&value.method, FieldName::new("method"))?;
        let stock_purchase = value
            .stock_purchase
            .map(|purchase| {
                Ok::<_, Error>(StockPurchase {
                    item_id: parse_id(&purchase.item_id, FieldName::new("stockPurchase.itemId"))?,
                    quantity: parse_quantity(
                        purchase.quantity,
                        FieldName::new("stockPurchase.quantity"),
                    )?,
                })
            })
            .transpose()?;
        Ok(Self {
            date: parse_date(&value.date, FieldName::new("date"))?,
            amount: parse_amount(value.amount, FieldName::new("amount"))?,
            method,
            category_id: parse_id(&value.category_id, FieldName::new("categoryId"))?,
            group_id: parse_optional_id(value.group_id.as_deref(), FieldName::new("groupId"))?,
            supplier_id: parse_optional_id(
                value.supplier_id.as_deref(),
                FieldName::new("supplierId"),
            )?,
            description: value.description,
            stock_purchase,
        })
    }
}

/// Query for the expense listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ExpenseQuery {
    /// `pending`, `approved`, or `rejected`.
    status: Option<String>,
    category_id: Option<String>,
    group_id: Option<String>,
    /// Earliest date, `YYYY-MM-DD`.
    from: Option<String>,
    /// Latest date, `YYYY-MM-DD`.
    to: Option<String>,
    limit: Option<u32>,
    cursor: Option<String>,
}

impl ExpenseQuery {
    fn filter(&self) -> Result<ExpenseFilter, Error> {
        let status: Option<ReviewStatus> =
            parse_optional_code(self.status.as_deref(), FieldName::new("status"))?;
        Ok(ExpenseFilter {
            status,
            category_id: parse_optional_id(
                self.category_id.as_deref(),
                FieldName::new("categoryId"),
            )?,
            group_id: parse_optional_id(self.group_id.as_deref(), FieldName::new("groupId"))?,
            from: parse_optional_date(self.from.as_deref(), FieldName::new("from"))?,
            to: parse_optional_date(self.to.as_deref(), FieldName::new("to"))?,
        })
    }
}

fn expense_id(path: web::Path<(String, String)>) -> Result<ExpenseId, Error> {
    let (_, raw) = path.into_inner();
    parse_id(&raw, FieldName::new("expenseId"))
}

/// Expenses newest first.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant_id}/expenses",
    params(("restaurant_id" = String, Path, description = "Restaurant id"), ExpenseQuery),
    responses(
        (status = 200, description = "Expenses", body = PageSchema<Expense>),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 404, description = "Not a member", body = ErrorSchema)
    ),
    tags = ["expenses"],
    operation_id = "listExpenses"
)]
#[get("/restaurants/{restaurant_id}/expenses")]
pub async fn list_expenses(
    state: web::Data<HttpState>,
    member: Membership,
    query: web::Query<ExpenseQuery>,
) -> ApiResult<web::Json<ListPage<Expense>>> {
    let filter = query.filter()?;
    let page = parse_page(query.limit, query.cursor.as_deref())?;
    let expenses = state.expenses.list(&member, &filter, &page).await?;
    Ok(web::Json(expenses))
}

/// Record a pending expense.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant_id}/expenses",
    params(("restaurant_id" = String, Path, description = "Restaurant id")),
    request_body = ExpenseRequest,
    responses(
        (status = 201, description = "Expense recorded as pending", body = Expense),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Editors and above", body = ErrorSchema)
    ),
    tags = ["expenses"],
    operation_id = "createExpense"
)]
#[post("/restaurants/{restaurant_id}/expenses")]
pub async fn create_expense(
    state: web::Data<HttpState>,
    member: Membership,
    payload: web::Json<ExpenseRequest>,
) -> ApiResult<HttpResponse> {
    let draft = ExpenseDraft::try_from(payload.into_inner())?;
    let expense = state.expenses.create(&member, draft).await?;
    Ok(HttpResponse::Created().json(expense))
}

/// One expense.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant_id}/expenses/{expense_id}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("expense_id" = String, Path, description = "Expense id")
    ),
    responses(
        (status = 200, description = "Expense", body = Expense),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["expenses"],
    operation_id = "getExpense"
)]
#[get("/restaurants/{restaurant_id}/expenses/{expense_id}")]
pub async fn get_expense(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Expense>> {
    let id = expense_id(path)?;
    Ok(web::Json(state.expenses.get(&member, &id).await?))
}

/// Edit a pending expense.
#[utoipa::path(
    put,
    path = "/api/v1/restaurants/{restaurant_id}/expenses/{expense_id}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("expense_id" = String, Path, description = "Expense id")
    ),
    request_body = ExpenseRequest,
    responses(
        (status = 200, description = "Updated expense", body = Expense),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not the author nor a manager", body = ErrorSchema),
        (status = 409, description = "No longer pending", body = ErrorSchema)
    ),
    tags = ["expenses"],
    operation_id = "updateExpense"
)]
#[put("/restaurants/{restaurant_id}/expenses/{expense_id}")]
pub async fn update_expense(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
    payload: web::Json<ExpenseRequest>,
) -> ApiResult<web::Json<Expense>> {
    let id = expense_id(path)?;
    let draft = ExpenseDraft::try_from(payload.into_inner())?;
    Ok(web::Json(state.expenses.update(&member, &id, draft).await?))
}

/// Approve a pending expense.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant_id}/expenses/{expense_id}/approve",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("expense_id" = String, Path, description = "Expense id")
    ),
    responses(
        (status = 200, description = "Approved expense", body = Expense),
        (status = 403, description = "Managers and above", body = ErrorSchema),
        (status = 409, description = "No longer pending", body = ErrorSchema)
    ),
    tags = ["expenses"],
    operation_id = "approveExpense"
)]
#[post("/restaurants/{restaurant_id}/expenses/{expense_id}/approve")]
pub async fn approve_expense(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Expense>> {
    let id = expense_id(path)?;
    Ok(web::Json(state.expenses.approve(&member, &id).await?))
}

/// Reject a pending expense.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant_id}/expenses/{expense_id}/reject",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("expense_id" = String, Path, description = "Expense id")
    ),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Rejected expense", body = Expense),
        (status = 400, description = "Reason missing", body = ErrorSchema),
        (status = 403, description = "Managers and above", body = ErrorSchema),
        (status = 409, description = "No longer pending", body = ErrorSchema)
    ),
    tags = ["expenses"],
    operation_id = "rejectExpense"
)]
#[post("/restaurants/{restaurant_id}/expenses/{expense_id}/reject")]
pub async fn reject_expense(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
    payload: web::Json<RejectRequest>,
) -> ApiResult<web::Json<Expense>> {
    let id = expense_id(path)?;
    Ok(web::Json(
        state.expenses.reject(&member, &id, &payload.reason).await?,
    ))
}

/// Delete a pending expense.
#[utoipa::path(
    delete,
    path = "/api/v1/restaurants/{restaurant_id}/expenses/{expense_id}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("expense_id" = String, Path, description = "Expense id")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the author nor a manager", body = ErrorSchema),
        (status = 409, description = "No longer pending", body = ErrorSchema)
    ),
    tags = ["expenses"],
    operation_id = "deleteExpense"
)]
#[delete("/restaurants/{restaurant_id}/expenses/{expense_id}")]
pub async fn delete_expense(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let id = expense_id(path)?;
    state.expenses.delete(&member, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the expense routes.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_expenses)
        .service(create_expense)
        .service(get_expense)
        .service(update_expense)
        .service(approve_expense)
        .service(reject_expense)
        .service(delete_expense);
}
