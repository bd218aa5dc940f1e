//! Customer debt handlers.
//!
//! ```text
//! GET    /api/v1/restaurants/{restaurant_id}/debts?status=outstanding&overdue=true
//! POST   /api/v1/restaurants/{restaurant_id}/debts
//! GET    /api/v1/restaurants/{restaurant_id}/debt-summaries
//! GET    /api/v1/restaurants/{restaurant_id}/debts/{debt_id}
//! POST   /api/v1/restaurants/{restaurant_id}/debts/{debt_id}/payments
//! DELETE /api/v1/restaurants/{restaurant_id}/debts/{debt_id}/payments/{payment_id}
//! POST   /api/v1/restaurants/{restaurant_id}/debts/{debt_id}/write-off
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    CustomerDebtSummary, Debt, DebtDetail, DebtDraft, DebtFilter, DebtId, DebtStatus, Error,
    ListPage, PaymentId, PaymentMethod, RecordPayment,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::membership::Membership;
use crate::inbound::http::sales::RejectRequest;
use crate::inbound::http::schemas::{ErrorSchema, PageSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_amount, parse_code, parse_id, parse_optional_code, parse_optional_date,
    parse_optional_id, parse_page,
};

/// Body for opening a debt.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DebtRequest {
    pub customer_id: String,
    pub sale_id: Option<String>,
    /// GNF; must be positive.
    pub amount: i64,
    /// `YYYY-MM-DD`.
    pub due_date: Option<String>,
    pub description: Option<String>,
}

impl TryFrom<DebtRequest> for DebtDraft {
    type Error = Error;

    fn try_from(value: DebtRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            customer_id: parse_id(&value.customer_id, FieldName::new("customerId"))?,
            sale_id: parse_optional_id(value.sale_id.as_deref(), FieldName::new("saleId"))?,
            amount: parse_amount(value.amount, FieldName::new("amount"))?,
            due_date: parse_optional_date(value.due_date.as_deref(), FieldName::new("dueDate"))?,
            description: value.description,
        })
    }
}

/// Body for recording a payment.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub amount: i64,
    /// `cash`, `orange_money`, or `card`.
    pub method: String,
    /// `YYYY-MM-DD`; defaults to today.
    pub paid_on: Option<String>,
    pub notes: Option<String>,
}

impl TryFrom<PaymentRequest> for RecordPayment {
    type Error = Error;

    fn try_from(value: PaymentRequest) -> Result<Self, Self::Error> {
        let method: PaymentMethod = parse_code(&value.method, FieldName::new("method"))?;
        Ok(Self {
            amount: parse_amount(value.amount, FieldName::new("amount"))?,
            method,
            paid_on: parse_optional_date(value.paid_on.as_deref(), FieldName::new("paidOn"))?,
            notes: value.notes,
        })
    }
}

/// Query for the debt listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DebtQuery {
    /// `outstanding`, `partially_paid`, `fully_paid`, or `written_off`.
    status: Option<String>,
    customer_id: Option<String>,
    /// Only open debts past their due date.
    #[serde(default)]
    overdue: bool,
    limit: Option<u32>,
    cursor: Option<String>,
}

impl DebtQuery {
    fn filter(&self) -> Result<DebtFilter, Error> {
        let status: Option<DebtStatus> =
            parse_optional_code(self.status.as_deref(), FieldName::new("status"))?;
        Ok(DebtFilter {
            status,
            customer_id: parse_optional_id(
                self.customer_id.as_deref(),
                FieldName::new("customerId"),
            )?,
            overdue_on: None,
        })
    }
}

fn debt_id(raw: &str) -> Result<DebtId, Error> {
    parse_id(raw, FieldName::new("debtId"))
}

/// Debts newest first.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant_id}/debts",
    params(("restaurant_id" = String, Path, description = "Restaurant id"), DebtQuery),
    responses(
        (status = 200, description = "Debts", body = PageSchema<Debt>),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 404, description = "Not a member", body = ErrorSchema)
    ),
    tags = ["debts"],
    operation_id = "listDebts"
)]
#[get("/restaurants/{restaurant_id}/debts")]
pub async fn list_debts(
    state: web::Data<HttpState>,
    member: Membership,
    query: web::Query<DebtQuery>,
) -> ApiResult<web::Json<ListPage<Debt>>> {
    let filter = query.filter()?;
    let page = parse_page(query.limit, query.cursor.as_deref())?;
    let debts = state
        .debts
        .list(&member, filter, query.overdue, &page)
        .await?;
    Ok(web::Json(debts))
}

/// Open a debt for a customer.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant_id}/debts",
    params(("restaurant_id" = String, Path, description = "Restaurant id")),
    request_body = DebtRequest,
    responses(
        (status = 201, description = "Debt opened", body = Debt),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Managers and above", body = ErrorSchema)
    ),
    tags = ["debts"],
    operation_id = "createDebt"
)]
#[post("/restaurants/{restaurant_id}/debts")]
pub async fn create_debt(
    state: web::Data<HttpState>,
    member: Membership,
    payload: web::Json<DebtRequest>,
) -> ApiResult<HttpResponse> {
    let draft = DebtDraft::try_from(payload.into_inner())?;
    let debt = state.debts.create(&member, draft).await?;
    Ok(HttpResponse::Created().json(debt))
}

/// Outstanding balance per customer.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant_id}/debt-summaries",
    params(("restaurant_id" = String, Path, description = "Restaurant id")),
    responses(
        (status = 200, description = "Per-customer totals", body = [CustomerDebtSummary]),
        (status = 404, description = "Not a member", body = ErrorSchema)
    ),
    tags = ["debts"],
    operation_id = "customerDebtSummaries"
)]
#[get("/restaurants/{restaurant_id}/debt-summaries")]
pub async fn customer_summaries(
    state: web::Data<HttpState>,
    member: Membership,
) -> ApiResult<HttpResponse> {
    let summaries = state.debts.customer_summaries(&member).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(summaries))
}

/// A debt with its payments.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant_id}/debts/{debt_id}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("debt_id" = String, Path, description = "Debt id")
    ),
    responses(
        (status = 200, description = "Debt", body = DebtDetail),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["debts"],
    operation_id = "getDebt"
)]
#[get("/restaurants/{restaurant_id}/debts/{debt_id}")]
pub async fn get_debt(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<DebtDetail>> {
    let id = debt_id(&path.1)?;
    Ok(web::Json(state.debts.get(&member, &id).await?))
}

/// Record money received against a debt.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant_id}/debts/{debt_id}/payments",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("debt_id" = String, Path, description = "Debt id")
    ),
    request_body = PaymentRequest,
    responses(
        (status = 201, description = "Updated debt", body = Debt),
        (status = 400, description = "Overpayment or closed debt", body = ErrorSchema),
        (status = 403, description = "Cashiers and above", body = ErrorSchema),
        (status = 409, description = "Debt changed concurrently", body = ErrorSchema)
    ),
    tags = ["debts"],
    operation_id = "recordDebtPayment"
)]
#[post("/restaurants/{restaurant_id}/debts/{debt_id}/payments")]
pub async fn record_payment(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
    payload: web::Json<PaymentRequest>,
) -> ApiResult<HttpResponse> {
    let id = debt_id(&path.1)?;
    let input = RecordPayment::try_from(payload.into_inner())?;
    let debt = state.debts.record_payment(&member, &id, input).await?;
    Ok(HttpResponse::Created().json(debt))
}

/// Remove a payment and its deposit.
#[utoipa::path(
    delete,
    path = "/api/v1/restaurants/{restaurant_id}/debts/{debt_id}/payments/{payment_id}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("debt_id" = String, Path, description = "Debt id"),
        ("payment_id" = String, Path, description = "Payment id")
    ),
    responses(
        (status = 200, description = "Updated debt", body = Debt),
        (status = 400, description = "Debt was written off", body = ErrorSchema),
        (status = 403, description = "Managers and above", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["debts"],
    operation_id = "deleteDebtPayment"
)]
#[delete("/restaurants/{restaurant_id}/debts/{debt_id}/payments/{payment_id}")]
pub async fn delete_payment(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String, String)>,
) -> ApiResult<web::Json<Debt>> {
    let (_, debt, payment) = path.into_inner();
    let debt_id = debt_id(&debt)?;
    let payment_id: PaymentId = parse_id(&payment, FieldName::new("paymentId"))?;
    Ok(web::Json(
        state
            .debts
            .delete_payment(&member, &debt_id, &payment_id)
            .await?,
    ))
}

/// Abandon what is left of a debt.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant_id}/debts/{debt_id}/write-off",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("debt_id" = String, Path, description = "Debt id")
    ),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Written-off debt", body = Debt),
        (status = 400, description = "Reason missing or debt closed", body = ErrorSchema),
        (status = 403, description = "Managers and above", body = ErrorSchema)
    ),
    tags = ["debts"],
    operation_id = "writeOffDebt"
)]
#[post("/restaurants/{restaurant_id}/debts/{debt_id}/write-off")]
pub async fn write_off(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
    payload: web::Json<RejectRequest>,
) -> ApiResult<web::Json<Debt>> {
    let id = debt_id(&path.1)?;
    Ok(web::Json(
        state.debts.write_off(&member, &id, &payload.reason).await?,
    ))
}

/// Register the debt routes.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_debts)
        .service(create_debt)
        .service(customer_summaries)
        .service(get_debt)
        .service(record_payment)
        .service(delete_payment)
        .service(write_off);
}
