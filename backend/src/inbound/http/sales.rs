//! Daily sales handlers.
//!
//! ```text
//! GET    /api/v1/restaurants/{restaurant_id}/sales?status=pending&from=2026-03-01
//! POST   /api/v1/restaurants/{restaurant_id}/sales
//! GET    /api/v1/restaurants/{restaurant_id}/sales/{sale_id}
//! PUT    /api/v1/restaurants/{restaurant_id}/sales/{sale_id}
//! POST   /api/v1/restaurants/{restaurant_id}/sales/{sale_id}/approve
//! POST   /api/v1/restaurants/{restaurant_id}/sales/{sale_id}/reject {"reason":"..."}
//! DELETE /api/v1/restaurants/{restaurant_id}/sales/{sale_id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Error, ListPage, PaymentSplit, ReviewStatus, Sale, SaleDraft, SaleFilter, SaleId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::membership::Membership;
use crate::inbound::http::schemas::{ErrorSchema, PageSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_amount, parse_date, parse_id, parse_optional_code, parse_optional_date,
    parse_optional_id, parse_page,
};

/// Amounts per payment method, in GNF. Missing methods count as zero.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AmountsRequest {
    #[serde(default)]
    pub cash: i64,
    #[serde(default)]
    pub orange_money: i64,
    #[serde(default)]
    pub card: i64,
}

impl AmountsRequest {
    /// Validate each part, naming the offending field under `prefix`.
    pub(crate) fn parse(&self, prefix: Fields) -> Result<PaymentSplit, Error> {
        Ok(PaymentSplit {
            cash: parse_amount(self.cash, prefix.cash)?,
            orange_money: parse_amount(self.orange_money, prefix.orange_money)?,
            card: parse_amount(self.card, prefix.card)?,
        })
    }
}

/// Field names reported for an [`AmountsRequest`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct Fields {
    pub cash: FieldName,
    pub orange_money: FieldName,
    pub card: FieldName,
}

const SALE_AMOUNTS: Fields = Fields {
    cash: FieldName::new("amounts.cash"),
    orange_money: FieldName::new("amounts.orangeMoney"),
    card: FieldName::new("amounts.card"),
};

/// Body for creating or editing a sale.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    /// `YYYY-MM-DD`; one sale per date.
    #[schema(example = "2026-03-10")]
    pub business_date: String,
    pub amounts: AmountsRequest,
    pub customer_id: Option<String>,
    pub notes: Option<String>,
}

impl TryFrom<SaleRequest> for SaleDraft {
    type Error = Error;

    fn try_from(value: SaleRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            business_date: parse_date(&value.business_date, FieldName::new("businessDate"))?,
            amounts: value.amounts.parse(SALE_AMOUNTS)?,
            customer_id: parse_optional_id(
                value.customer_id.as_deref(),
                FieldName::new("customerId"),
            )?,
            notes: value.notes,
        })
    }
}

/// Body for rejecting a sale or expense.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectRequest {
    pub reason: String,
}

/// Query for review-queue listings.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SaleQuery {
    /// `pending`, `approved`, or `rejected`.
    status: Option<String>,
    /// Earliest business date, `YYYY-MM-DD`.
    from: Option<String>,
    /// Latest business date, `YYYY-MM-DD`.
    to: Option<String>,
    limit: Option<u32>,
    cursor: Option<String>,
}

impl SaleQuery {
    fn filter(&self) -> Result<SaleFilter, Error> {
        let status: Option<ReviewStatus> =
            parse_optional_code(self.status.as_deref(), FieldName::new("status"))?;
        Ok(SaleFilter {
            status,
            from: parse_optional_date(self.from.as_deref(), FieldName::new("from"))?,
            to: parse_optional_date(self.to.as_deref(), FieldName::new("to"))?,
        })
    }
}

fn sale_id(path: web::Path<(String, String)>) -> Result<SaleId, Error> {
    let (_, raw) = path.into_inner();
    parse_id(&raw, FieldName::new("saleId"))
}

/// Sales newest first.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant_id}/sales",
    params(("restaurant_id" = String, Path, description = "Restaurant id"), SaleQuery),
    responses(
        (status = 200, description = "Sales", body = PageSchema<Sale>),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 404, description = "Not a member", body = ErrorSchema)
    ),
    tags = ["sales"],
    operation_id = "listSales"
)]
#[get("/restaurants/{restaurant_id}/sales")]
pub async fn list_sales(
    state: web::Data<HttpState>,
    member: Membership,
    query: web::Query<SaleQuery>,
) -> ApiResult<web::Json<ListPage<Sale>>> {
    let filter = query.filter()?;
    let page = parse_page(query.limit, query.cursor.as_deref())?;
    let sales = state.sales.list(&member, &filter, &page).await?;
    Ok(web::Json(sales))
}

/// Declare a day's takings for approval.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant_id}/sales",
    params(("restaurant_id" = String, Path, description = "Restaurant id")),
    request_body = SaleRequest,
    responses(
        (status = 201, description = "Sale recorded as pending", body = Sale),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Cashiers and above", body = ErrorSchema),
        (status = 409, description = "A sale exists for that date", body = ErrorSchema)
    ),
    tags = ["sales"],
    operation_id = "createSale"
)]
#[post("/restaurants/{restaurant_id}/sales")]
pub async fn create_sale(
    state: web::Data<HttpState>,
    member: Membership,
    payload: web::Json<SaleRequest>,
) -> ApiResult<HttpResponse> {
    let draft = SaleDraft::try_from(payload.into_inner())?;
    let sale = state.sales.create(&member, draft).await?;
    Ok(HttpResponse::Created().json(sale))
}

/// One sale.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant_id}/sales/{sale_id}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("sale_id" = String, Path, description = "Sale id")
    ),
    responses(
        (status = 200, description = "Sale", body = Sale),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["sales"],
    operation_id = "getSale"
)]
#[get("/restaurants/{restaurant_id}/sales/{sale_id}")]
pub async fn get_sale(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Sale>> {
    let id = sale_id(path)?;
    let sale = state.sales.get(&member, &id).await?;
    Ok(web::Json(sale))
}

/// Edit a pending sale.
#[utoipa::path(
    put,
    path = "/api/v1/restaurants/{restaurant_id}/sales/{sale_id}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("sale_id" = String, Path, description = "Sale id")
    ),
    request_body = SaleRequest,
    responses(
        (status = 200, description = "Updated sale", body = Sale),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not the author nor a manager", body = ErrorSchema),
        (status = 409, description = "No longer pending", body = ErrorSchema)
    ),
    tags = ["sales"],
    operation_id = "updateSale"
)]
#[put("/restaurants/{restaurant_id}/sales/{sale_id}")]
pub async fn update_sale(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
    payload: web::Json<SaleRequest>,
) -> ApiResult<web::Json<Sale>> {
    let id = sale_id(path)?;
    let draft = SaleDraft::try_from(payload.into_inner())?;
    let sale = state.sales.update(&member, &id, draft).await?;
    Ok(web::Json(sale))
}

/// Approve a pending sale and book its deposits.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant_id}/sales/{sale_id}/approve",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("sale_id" = String, Path, description = "Sale id")
    ),
    responses(
        (status = 200, description = "Approved sale", body = Sale),
        (status = 403, description = "Managers and above", body = ErrorSchema),
        (status = 409, description = "No longer pending", body = ErrorSchema)
    ),
    tags = ["sales"],
    operation_id = "approveSale"
)]
#[post("/restaurants/{restaurant_id}/sales/{sale_id}/approve")]
pub async fn approve_sale(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Sale>> {
    let id = sale_id(path)?;
    let sale = state.sales.approve(&member, &id).await?;
    Ok(web::Json(sale))
}

/// Reject a pending sale with a reason.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant_id}/sales/{sale_id}/reject",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("sale_id" = String, Path, description = "Sale id")
    ),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Rejected sale", body = Sale),
        (status = 400, description = "Reason missing", body = ErrorSchema),
        (status = 403, description = "Managers and above", body = ErrorSchema),
        (status = 409, description = "No longer pending", body = ErrorSchema)
    ),
    tags = ["sales"],
    operation_id = "rejectSale"
)]
#[post("/restaurants/{restaurant_id}/sales/{sale_id}/reject")]
pub async fn reject_sale(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
    payload: web::Json<RejectRequest>,
) -> ApiResult<web::Json<Sale>> {
    let id = sale_id(path)?;
    let sale = state.sales.reject(&member, &id, &payload.reason).await?;
    Ok(web::Json(sale))
}

/// Delete a pending sale.
#[utoipa::path(
    delete,
    path = "/api/v1/restaurants/{restaurant_id}/sales/{sale_id}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("sale_id" = String, Path, description = "Sale id")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Managers and above", body = ErrorSchema),
        (status = 409, description = "No longer pending", body = ErrorSchema)
    ),
    tags = ["sales"],
    operation_id = "deleteSale"
)]
#[delete("/restaurants/{restaurant_id}/sales/{sale_id}")]
pub async fn delete_sale(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let id = sale_id(path)?;
    state.sales.delete(&member, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the sales routes.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_sales)
        .service(create_sale)
        .service(get_sale)
        .service(update_sale)
        .service(approve_sale)
        .service(reject_sale)
        .service(delete_sale);
}
