//! Bank transaction, balance, and reconciliation handlers.
//!
//! ```text
//! GET    /api/v1/restaurants/{restaurant_id}/bank/transactions?method=cash&status=pending
//! POST   /api/v1/restaurants/{restaurant_id}/bank/transactions
//! GET    /api/v1/restaurants/{restaurant_id}/bank/transactions/{transaction_id}
//! POST   /api/v1/restaurants/{restaurant_id}/bank/transactions/{transaction_id}/confirm
//! POST   /api/v1/restaurants/{restaurant_id}/bank/transactions/{transaction_id}/reject
//! DELETE /api/v1/restaurants/{restaurant_id}/bank/transactions/{transaction_id}
//! GET    /api/v1/restaurants/{restaurant_id}/bank/balances
//! GET    /api/v1/restaurants/{restaurant_id}/bank/reconciliations
//! POST   /api/v1/restaurants/{restaurant_id}/bank/reconciliations
//! GET    /api/v1/restaurants/{restaurant_id}/bank/reconciliations/{reconciliation_id}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Balances, BankTransaction, Error, ListPage, ManualTransactionRequest, PaymentMethod,
    Reconciliation, ReconciliationId, RecordReconciliation, TransactionDirection,
    TransactionFilter, TransactionId, TransactionReason, TransactionStatus,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::membership::Membership;
use crate::inbound::http::sales::{AmountsRequest, Fields};
use crate::inbound::http::schemas::{ErrorSchema, PageSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_amount, parse_code, parse_date, parse_id, parse_optional_code,
    parse_optional_date, parse_page,
};

/// Body for a manual transaction.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    #[schema(example = "2026-03-10")]
    pub date: String,
    pub amount: i64,
    /// `deposit` or `withdrawal`.
    pub direction: String,
    /// `cash`, `orange_money`, or `card`.
    pub method: String,
    /// `owner_contribution`, `adjustment`, or `other`.
    pub reason: String,
    pub description: Option<String>,
    /// Record as already confirmed.
    #[serde(default)]
    pub confirmed: bool,
}

impl TryFrom<TransactionRequest> for ManualTransactionRequest {
    type Error = Error;

    fn try_from(value: TransactionRequest) -> Result<Self, Self::Error> {
        let direction: TransactionDirection =
            parse_code(&value.direction, FieldName::new("direction"))?;
        let method: PaymentMethod = parse_code(&value.method, FieldName::new("method"))?;
        let reason: TransactionReason = parse_code(&value.reason, FieldName::new("reason"))?;
        Ok(Self {
            date: parse_date(&value.date, FieldName::new("date"))?,
            amount: parse_amount(value.amount, FieldName::new("amount"))?,
            direction,
            method,
            reason,
            description: value.description,
            confirmed: value.confirmed,
        })
    }
}

const COUNTED: Fields = Fields {
    cash: FieldName::new("counted.cash"),
    orange_money: FieldName::new("counted.orangeMoney"),
    card: FieldName::new("counted.card"),
};

/// Body for a reconciliation.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationRequest {
    /// `YYYY-MM-DD`; defaults to today.
    pub date: Option<String>,
    /// What was actually counted per method.
    pub counted: AmountsRequest,
    pub notes: Option<String>,
    /// Post adjustments so the books match the count.
    #[serde(default)]
    pub post_adjustments: bool,
}

impl TryFrom<ReconciliationRequest> for RecordReconciliation {
    type Error = Error;

    fn try_from(value: ReconciliationRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            date: parse_optional_date(value.date.as_deref(), FieldName::new("date"))?,
            counted: value.counted.parse(COUNTED)?,
            notes: value.notes,
            post_adjustments: value.post_adjustments,
        })
    }
}

/// Query for the transaction listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TransactionQuery {
    method: Option<String>,
    direction: Option<String>,
    /// `pending`, `confirmed`, or `rejected`.
    status: Option<String>,
    from: Option<String>,
    to: Option<String>,
    limit: Option<u32>,
    cursor: Option<String>,
}

impl TransactionQuery {
    fn filter(&self) -> Result<TransactionFilter, Error> {
        let method: Option<PaymentMethod> =
            parse_optional_code(self.method.as_deref(), FieldName::new("method"))?;
        let direction: Option<TransactionDirection> =
            parse_optional_code(self.direction.as_deref(), FieldName::new("direction"))?;
        let status: Option<TransactionStatus> =
            parse_optional_code(self.status.as_deref(), FieldName::new("status"))?;
        Ok(TransactionFilter {
            method,
            direction,
            status,
            from: parse_optional_date(self.from.as_deref(), FieldName::new("from"))?,
            to: parse_optional_date(self.to.as_deref(), FieldName::new("to"))?,
        })
    }
}

/// Paging for reconciliations.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReconciliationQuery {
    limit: Option<u32>,
    cursor: Option<String>,
}

fn transaction_id(path: web::Path<(String, String)>) -> Result<TransactionId, Error> {
    let (_, raw) = path.into_inner();
    parse_id(&raw, FieldName::new("transactionId"))
}

/// Transactions newest first.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant_id}/bank/transactions",
    params(("restaurant_id" = String, Path, description = "Restaurant id"), TransactionQuery),
    responses(
        (status = 200, description = "Transactions", body = PageSchema<BankTransaction>),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 404, description = "Not a member", body = ErrorSchema)
    ),
    tags = ["banking"],
    operation_id = "listTransactions"
)]
#[get("/restaurants/{restaurant_id}/bank/transactions")]
pub async fn list_transactions(
    state: web::Data<HttpState>,
    member: Membership,
    query: web::Query<TransactionQuery>,
) -> ApiResult<web::Json<ListPage<BankTransaction>>> {
    let filter = query.filter()?;
    let page = parse_page(query.limit, query.cursor.as_deref())?;
    Ok(web::Json(state.banking.list(&member, &filter, &page).await?))
}

/// Record a manual transaction.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant_id}/bank/transactions",
    params(("restaurant_id" = String, Path, description = "Restaurant id")),
    request_body = TransactionRequest,
    responses(
        (status = 201, description = "Transaction recorded", body = BankTransaction),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Managers and above", body = ErrorSchema)
    ),
    tags = ["banking"],
    operation_id = "createTransaction"
)]
#[post("/restaurants/{restaurant_id}/bank/transactions")]
pub async fn create_transaction(
    state: web::Data<HttpState>,
    member: Membership,
    payload: web::Json<TransactionRequest>,
) -> ApiResult<HttpResponse> {
    let request = ManualTransactionRequest::try_from(payload.into_inner())?;
    let transaction = state.banking.create_manual(&member, request).await?;
    Ok(HttpResponse::Created().json(transaction))
}

/// One transaction.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant_id}/bank/transactions/{transaction_id}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("transaction_id" = String, Path, description = "Transaction id")
    ),
    responses(
        (status = 200, description = "Transaction", body = BankTransaction),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["banking"],
    operation_id = "getTransaction"
)]
#[get("/restaurants/{restaurant_id}/bank/transactions/{transaction_id}")]
pub async fn get_transaction(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<BankTransaction>> {
    let id = transaction_id(path)?;
    Ok(web::Json(state.banking.get(&member, &id).await?))
}

/// Confirm a pending transaction.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant_id}/bank/transactions/{transaction_id}/confirm",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("transaction_id" = String, Path, description = "Transaction id")
    ),
    responses(
        (status = 200, description = "Confirmed transaction", body = BankTransaction),
        (status = 403, description = "Managers and above", body = ErrorSchema),
        (status = 409, description = "Not pending", body = ErrorSchema)
    ),
    tags = ["banking"],
    operation_id = "confirmTransaction"
)]
#[post("/restaurants/{restaurant_id}/bank/transactions/{transaction_id}/confirm")]
pub async fn confirm_transaction(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<BankTransaction>> {
    let id = transaction_id(path)?;
    Ok(web::Json(state.banking.confirm(&member, &id).await?))
}

/// Reject a pending transaction.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant_id}/bank/transactions/{transaction_id}/reject",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("transaction_id" = String, Path, description = "Transaction id")
    ),
    responses(
        (status = 200, description = "Rejected transaction", body = BankTransaction),
        (status = 403, description = "Managers and above", body = ErrorSchema),
        (status = 409, description = "Not pending", body = ErrorSchema)
    ),
    tags = ["banking"],
    operation_id = "rejectTransaction"
)]
#[post("/restaurants/{restaurant_id}/bank/transactions/{transaction_id}/reject")]
pub async fn reject_transaction(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<BankTransaction>> {
    let id = transaction_id(path)?;
    Ok(web::Json(state.banking.reject(&member, &id).await?))
}

/// Delete a pending manual transaction.
#[utoipa::path(
    delete,
    path = "/api/v1/restaurants/{restaurant_id}/bank/transactions/{transaction_id}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("transaction_id" = String, Path, description = "Transaction id")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Managers and above", body = ErrorSchema),
        (status = 409, description = "Not a pending manual transaction", body = ErrorSchema)
    ),
    tags = ["banking"],
    operation_id = "deleteTransaction"
)]
#[delete("/restaurants/{restaurant_id}/bank/transactions/{transaction_id}")]
pub async fn delete_transaction(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let id = transaction_id(path)?;
    state.banking.delete(&member, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Current balance per payment method.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant_id}/bank/balances",
    params(("restaurant_id" = String, Path, description = "Restaurant id")),
    responses(
        (status = 200, description = "Balances", body = Balances),
        (status = 404, description = "Not a member", body = ErrorSchema)
    ),
    tags = ["banking"],
    operation_id = "getBalances"
)]
#[get("/restaurants/{restaurant_id}/bank/balances")]
pub async fn balances(
    state: web::Data<HttpState>,
    member: Membership,
) -> ApiResult<HttpResponse> {
    let balances = state.banking.balances(&member).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(balances))
}

/// Reconciliations newest first.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant_id}/bank/reconciliations",
    params(("restaurant_id" = String, Path, description = "Restaurant id"), ReconciliationQuery),
    responses(
        (status = 200, description = "Reconciliations", body = PageSchema<Reconciliation>),
        (status = 404, description = "Not a member", body = ErrorSchema)
    ),
    tags = ["banking"],
    operation_id = "listReconciliations"
)]
#[get("/restaurants/{restaurant_id}/bank/reconciliations")]
pub async fn list_reconciliations(
    state: web::Data<HttpState>,
    member: Membership,
    query: web::Query<ReconciliationQuery>,
) -> ApiResult<web::Json<ListPage<Reconciliation>>> {
    let page = parse_page(query.limit, query.cursor.as_deref())?;
    Ok(web::Json(
        state.banking.list_reconciliations(&member, &page).await?,
    ))
}

/// Compare a count with the books.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant_id}/bank/reconciliations",
    params(("restaurant_id" = String, Path, description = "Restaurant id")),
    request_body = ReconciliationRequest,
    responses(
        (status = 201, description = "Reconciliation recorded", body = Reconciliation),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Managers and above", body = ErrorSchema)
    ),
    tags = ["banking"],
    operation_id = "createReconciliation"
)]
#[post("/restaurants/{restaurant_id}/bank/reconciliations")]
pub async fn create_reconciliation(
    state: web::Data<HttpState>,
    member: Membership,
    payload: web::Json<ReconciliationRequest>,
) -> ApiResult<HttpResponse> {
    let input = RecordReconciliation::try_from(payload.into_inner())?;
    let reconciliation = state.banking.reconcile(&member, input).await?;
    Ok(HttpResponse::Created().json(reconciliation))
}

/// One reconciliation.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant_id}/bank/reconciliations/{reconciliation_id}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("reconciliation_id" = String, Path, description = "Reconciliation id")
    ),
    responses(
        (status = 200, description = "Reconciliation", body = Reconciliation),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["banking"],
    operation_id = "getReconciliation"
)]
#[get("/restaurants/{restaurant_id}/bank/reconciliations/{reconciliation_id}")]
pub async fn get_reconciliation(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Reconciliation>> {
    let (_, raw) = path.into_inner();
    let id: ReconciliationId = parse_id(&raw, FieldName::new("reconciliationId"))?;
    Ok(web::Json(
        state.banking.get_reconciliation(&member, &id).await?,
    ))
}

/// Register the banking routes.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_transactions)
        .service(create_transaction)
        .service(get_transaction)
        .service(confirm_transaction)
        .service(reject_transaction)
        .service(delete_transaction)
        .service(balances)
        .service(list_reconciliations)
        .service(create_reconciliation)
        .service(get_reconciliation);
}

#[cfg(test)]
mod tests {
    //! Handler coverage for banking.
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::ports::BankRepositoryError;
    use crate::domain::service_test_support::{fixture_now, fixture_today, restaurant_for};
    use crate::domain::{
        MemberContext, PaymentSplit, RestaurantId, Role, TransactionAggregate, UserId,
    };
    use crate::inbound::http::test_utils::{TestPorts, restaurant_uri, session_cookie, test_app};

    fn with_opening_cash(ports: &mut TestPorts, cash: i64) {
        ports.restaurants.expect_find().returning(move |id| {
            let mut restaurant = restaurant_for(&MemberContext {
                user_id: UserId::random(),
                restaurant_id: *id,
                role: Role::Owner,
            });
            restaurant.initial_balances = PaymentSplit {
                cash: crate::domain::Gnf::new(cash).expect("non-negative"),
                ..PaymentSplit::default()
            };
            Ok(Some(restaurant))
        });
    }

    fn cash_aggregates() -> Vec<TransactionAggregate> {
        vec![
            TransactionAggregate {
                method: PaymentMethod::Cash,
                direction: TransactionDirection::Deposit,
                status: TransactionStatus::Confirmed,
                total: 300_000,
            },
            TransactionAggregate {
                method: PaymentMethod::Cash,
                direction: TransactionDirection::Withdrawal,
                status: TransactionStatus::Confirmed,
                total: 50_000,
            },
            TransactionAggregate {
                method: PaymentMethod::Cash,
                direction: TransactionDirection::Deposit,
                status: TransactionStatus::Pending,
                total: 80_000,
            },
        ]
    }

    #[actix_web::test]
    async fn balances_ignore_pending_movements() {
        let mut ports = TestPorts::default();
        ports.member_of(Role::Viewer);
        with_opening_cash(&mut ports, 100_000);
        ports
            .bank
            .expect_aggregates()
            .returning(|_| Ok(cash_aggregates()));
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let request = actix_test::TestRequest::get()
            .uri(&restaurant_uri(&RestaurantId::random(), "/bank/balances"))
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        let cash = body["methods"]
            .as_array()
            .and_then(|methods| methods.iter().find(|entry| entry["method"] == "cash"))
            .cloned()
            .expect("cash balance");
        assert_eq!(cash["balance"], 350_000);
        assert_eq!(cash["pendingDeposits"], 80_000);
        assert_eq!(body["total"], 350_000);
    }

    #[actix_web::test]
    async fn reconciliation_posts_adjustments_for_the_gap() {
        let mut ports = TestPorts::default();
        ports.member_of(Role::Manager);
        with_opening_cash(&mut ports, 100_000);
        ports
            .bank
            .expect_aggregates()
            .returning(|_| Ok(cash_aggregates()));
        ports
            .bank
            .expect_insert_reconciliation()
            .withf(|reconciliation, adjustments| {
                reconciliation.discrepancy.cash == -20_000
                    && adjustments.len() == 1
                    && adjustments[0].direction == TransactionDirection::Withdrawal
                    && adjustments[0].status == TransactionStatus::Confirmed
            })
            .times(1)
            .returning(|_, _| Ok(()));
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let request = actix_test::TestRequest::post()
            .uri(&restaurant_uri(&RestaurantId::random(), "/bank/reconciliations"))
            .cookie(cookie)
            .set_json(json!({
                "counted": {"cash": 330000},
                "notes": "comptage du soir",
                "postAdjustments": true
            }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["date"], fixture_today().to_string());
        assert_eq!(body["expected"]["cash"], 350_000);
        assert_eq!(body["adjustmentsPosted"], true);
    }

    #[rstest]
    #[case::workflow_reason("sale_deposit", "reason", "not_manual")]
    #[case::unknown_method("cheque", "method", "invalid_code")]
    #[actix_web::test]
    async fn manual_transactions_are_validated(
        #[case] value: &str,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let mut ports = TestPorts::default();
        ports.member_of(Role::Manager);
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, &UserId::random()).await;
        let mut body = json!({
            "date": "2026-03-10",
            "amount": 500000,
            "direction": "deposit",
            "method": "cash",
            "reason": "owner_contribution"
        });
        body[field] = json!(value);

        let request = actix_test::TestRequest::post()
            .uri(&restaurant_uri(&RestaurantId::random(), "/bank/transactions"))
            .cookie(cookie)
            .set_json(&body)
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: Value = actix_test::read_body_json(response).await;
        assert_eq!(error["details"]["field"], field);
        assert_eq!(error["details"]["code"], code);
    }

    #[actix_web::test]
    async fn owner_contributions_can_be_recorded_as_confirmed() {
        let mut ports = TestPorts::default();
        ports.member_of(Role::Owner);
        ports
            .bank
            .expect_insert()
            .withf(|tx| {
                tx.status == TransactionStatus::Confirmed
                    && tx.source.is_none()
                    && tx.confirmed_at == Some(fixture_now())
            })
            .times(1)
            .returning(|_| Ok(()));
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let request = actix_test::TestRequest::post()
            .uri(&restaurant_uri(&RestaurantId::random(), "/bank/transactions"))
            .cookie(cookie)
            .set_json(json!({
                "date": "2026-03-10",
                "amount": 500000,
                "direction": "deposit",
                "method": "orange_money",
                "reason": "owner_contribution",
                "confirmed": true
            }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["status"], "confirmed");
    }

    #[actix_web::test]
    async fn confirming_a_settled_transaction_conflicts() {
        let mut ports = TestPorts::default();
        ports.member_of(Role::Manager);
        ports
            .bank
            .expect_settle()
            .returning(|_, _, _, _, _| Err(BankRepositoryError::not_pending()));
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let request = actix_test::TestRequest::post()
            .uri(&restaurant_uri(
                &RestaurantId::random(),
                &format!("/bank/transactions/{}/confirm", TransactionId::random()),
            ))
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn editors_cannot_touch_the_bank() {
        let mut ports = TestPorts::default();
        ports.member_of(Role::Editor);
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let request = actix_test::TestRequest::delete()
            .uri(&restaurant_uri(
                &RestaurantId::random(),
                &format!("/bank/transactions/{}", TransactionId::random()),
            ))
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
