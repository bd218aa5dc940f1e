//! Inventory handlers: items, the stock ledger, and the valuation summary.
//!
//! ```text
//! GET    /api/v1/restaurants/{restaurant_id}/inventory/items
//! POST   /api/v1/restaurants/{restaurant_id}/inventory/items
//! GET    /api/v1/restaurants/{restaurant_id}/inventory/items/{item_id}
//! PUT    /api/v1/restaurants/{restaurant_id}/inventory/items/{item_id}
//! DELETE /api/v1/restaurants/{restaurant_id}/inventory/items/{item_id}
//! POST   /api/v1/restaurants/{restaurant_id}/inventory/items/{item_id}/restore
//! POST   /api/v1/restaurants/{restaurant_id}/inventory/items/{item_id}/movements
//! GET    /api/v1/restaurants/{restaurant_id}/inventory/movements?itemId=...&kind=usage
//! GET    /api/v1/restaurants/{restaurant_id}/inventory/summary
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Error, InventoryItemView, InventorySummary, InventoryUnit, ItemDraft, ItemId, ListPage,
    MovementFilter, MovementKind, MovementOutcome, Quantity, RecordMovement, StockMovement,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::catalogue::IncludeInactiveQuery;
use crate::inbound::http::membership::Membership;
use crate::inbound::http::schemas::{ErrorSchema, PageSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_code, parse_id, parse_optional_code, parse_optional_date, parse_optional_id,
    parse_optional_timestamp, parse_page, parse_quantity,
};

/// Editable item fields.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequest {
    pub name: String,
    pub category_id: Option<String>,
    pub supplier_id: Option<String>,
    /// `kg`, `g`, `l`, `ml`, `unit`, or `pack`.
    #[schema(example = "kg")]
    pub unit: String,
    /// Threshold below which stock is low.
    #[schema(value_type = f64)]
    pub min_stock: Decimal,
    /// Cost per unit in GNF.
    #[serde(default)]
    pub unit_cost: i64,
    /// Days a purchase keeps; omit for non-perishables.
    pub shelf_life_days: Option<u16>,
}

impl TryFrom<ItemRequest> for ItemDraft {
    type Error = Error;

    fn try_from(value: ItemRequest) -> Result<Self, Self::Error> {
        let unit: InventoryUnit = parse_code(&value.unit, FieldName::new("unit"))?;
        Ok(Self {
            name: value.name,
            category_id: parse_optional_id(
                value.category_id.as_deref(),
                FieldName::new("categoryId"),
            )?,
            supplier_id: parse_optional_id(
                value.supplier_id.as_deref(),
                FieldName::new("supplierId"),
            )?,
            unit,
            min_stock: parse_quantity(value.min_stock, FieldName::new("minStock"))?,
            unit_cost: value.unit_cost,
            shelf_life_days: value.shelf_life_days,
        })
    }
}

/// Body for `POST .../inventory/items`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    #[serde(flatten)]
    pub item: ItemRequest,
    /// Opening stock, booked as an adjustment.
    #[schema(value_type = Option<f64>)]
    pub initial_quantity: Option<Decimal>,
}

/// Body for `POST .../inventory/items/{item_id}/movements`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovementRequest {
    /// `purchase`, `usage`, `waste`, or `adjustment`.
    #[schema(example = "usage")]
    pub kind: String,
    /// Positive except for adjustments, which are signed.
    #[schema(value_type = f64)]
    pub quantity: Decimal,
    /// Purchases only.
    pub unit_cost: Option<i64>,
    /// Purchases only.
    pub supplier_id: Option<String>,
    pub reason: Option<String>,
    /// RFC 3339; defaults to now.
    pub occurred_at: Option<String>,
}

impl TryFrom<MovementRequest> for RecordMovement {
    type Error = Error;

    fn try_from(value: MovementRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: parse_code(&value.kind, FieldName::new("kind"))?,
            quantity: parse_quantity(value.quantity, FieldName::new("quantity"))?,
            unit_cost: value.unit_cost,
            supplier_id: parse_optional_id(
                value.supplier_id.as_deref(),
                FieldName::new("supplierId"),
            )?,
            reason: value.reason,
            occurred_at: parse_optional_timestamp(
                value.occurred_at.as_deref(),
                FieldName::new("occurredAt"),
            )?,
        })
    }
}

/// Query for the movement ledger.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MovementQuery {
    item_id: Option<String>,
    /// `purchase`, `usage`, `waste`, or `adjustment`.
    kind: Option<String>,
    /// Earliest date, `YYYY-MM-DD`.
    from: Option<String>,
    /// Latest date, `YYYY-MM-DD`.
    to: Option<String>,
    /// Page size, 1 to 200.
    limit: Option<u32>,
    /// Opaque cursor from the previous page.
    cursor: Option<String>,
}

impl MovementQuery {
    fn filter(&self) -> Result<MovementFilter, Error> {
        let kind: Option<MovementKind> =
            parse_optional_code(self.kind.as_deref(), FieldName::new("kind"))?;
        Ok(MovementFilter {
            item_id: parse_optional_id(self.item_id.as_deref(), FieldName::new("itemId"))?,
            kind,
            from: parse_optional_date(self.from.as_deref(), FieldName::new("from"))?,
            to: parse_optional_date(self.to.as_deref(), FieldName::new("to"))?,
        })
    }
}

fn item_id(path: web::Path<(String, String)>) -> Result<ItemId, Error> {
    let (_, raw) = path.into_inner();
    parse_id(&raw, FieldName::new("itemId"))
}

/// Items with stock and expiry status.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant_id}/inventory/items",
    params(("restaurant_id" = String, Path, description = "Restaurant id"), IncludeInactiveQuery),
    responses(
        (status = 200, description = "Items", body = [InventoryItemView]),
        (status = 404, description = "Not a member", body = ErrorSchema)
    ),
    tags = ["inventory"],
    operation_id = "listInventoryItems"
)]
#[get("/restaurants/{restaurant_id}/inventory/items")]
pub async fn list_items(
    state: web::Data<HttpState>,
    member: Membership,
    query: web::Query<IncludeInactiveQuery>,
) -> ApiResult<web::Json<Vec<InventoryItemView>>> {
    let items = state
        .inventory
        .list_items(&member, query.include_inactive())
        .await?;
    Ok(web::Json(items))
}

/// Create an item, optionally with opening stock.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant_id}/inventory/items",
    params(("restaurant_id" = String, Path, description = "Restaurant id")),
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Item created", body = InventoryItemView),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Editors and above", body = ErrorSchema)
    ),
    tags = ["inventory"],
    operation_id = "createInventoryItem"
)]
#[post("/restaurants/{restaurant_id}/inventory/items")]
pub async fn create_item(
    state: web::Data<HttpState>,
    member: Membership,
    payload: web::Json<CreateItemRequest>,
) -> ApiResult<HttpResponse> {
    let CreateItemRequest {
        item,
        initial_quantity,
    } = payload.into_inner();
    let draft = ItemDraft::try_from(item)?;
    let initial = initial_quantity
        .map(|raw| parse_quantity(raw, FieldName::new("initialQuantity")))
        .transpose()?
        .unwrap_or(Quantity::ZERO);
    let view = state.inventory.create_item(&member, draft, initial).await?;
    Ok(HttpResponse::Created().json(view))
}

/// One item.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant_id}/inventory/items/{item_id}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("item_id" = String, Path, description = "Item id")
    ),
    responses(
        (status = 200, description = "Item", body = InventoryItemView),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["inventory"],
    operation_id = "getInventoryItem"
)]
#[get("/restaurants/{restaurant_id}/inventory/items/{item_id}")]
pub async fn get_item(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<InventoryItemView>> {
    let id = item_id(path)?;
    let view = state.inventory.get_item(&member, &id).await?;
    Ok(web::Json(view))
}

/// Edit item metadata. Quantity only moves through movements.
#[utoipa::path(
    put,
    path = "/api/v1/restaurants/{restaurant_id}/inventory/items/{item_id}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("item_id" = String, Path, description = "Item id")
    ),
    request_body = ItemRequest,
    responses(
        (status = 200, description = "Updated item", body = InventoryItemView),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["inventory"],
    operation_id = "updateInventoryItem"
)]
#[put("/restaurants/{restaurant_id}/inventory/items/{item_id}")]
pub async fn update_item(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
    payload: web::Json<ItemRequest>,
) -> ApiResult<web::Json<InventoryItemView>> {
    let id = item_id(path)?;
    let draft = ItemDraft::try_from(payload.into_inner())?;
    let view = state.inventory.update_item(&member, &id, draft).await?;
    Ok(web::Json(view))
}

/// Archive an item.
#[utoipa::path(
    delete,
    path = "/api/v1/restaurants/{restaurant_id}/inventory/items/{item_id}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("item_id" = String, Path, description = "Item id")
    ),
    responses(
        (status = 204, description = "Archived"),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["inventory"],
    operation_id = "archiveInventoryItem"
)]
#[delete("/restaurants/{restaurant_id}/inventory/items/{item_id}")]
pub async fn archive_item(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let id = item_id(path)?;
    state.inventory.set_item_active(&member, &id, false).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Restore an archived item.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant_id}/inventory/items/{item_id}/restore",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("item_id" = String, Path, description = "Item id")
    ),
    responses(
        (status = 204, description = "Restored"),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["inventory"],
    operation_id = "restoreInventoryItem"
)]
#[post("/restaurants/{restaurant_id}/inventory/items/{item_id}/restore")]
pub async fn restore_item(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let id = item_id(path)?;
    state.inventory.set_item_active(&member, &id, true).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Record a purchase, usage, waste, or adjustment.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant_id}/inventory/items/{item_id}/movements",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("item_id" = String, Path, description = "Item id")
    ),
    request_body = MovementRequest,
    responses(
        (status = 201, description = "Movement applied", body = MovementOutcome),
        (status = 400, description = "Invalid request or insufficient stock", body = ErrorSchema),
        (status = 403, description = "Editors and above", body = ErrorSchema),
        (status = 404, description = "Item not found", body = ErrorSchema)
    ),
    tags = ["inventory"],
    operation_id = "recordStockMovement"
)]
#[post("/restaurants/{restaurant_id}/inventory/items/{item_id}/movements")]
pub async fn record_movement(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
    payload: web::Json<MovementRequest>,
) -> ApiResult<HttpResponse> {
    let id = item_id(path)?;
    let input = RecordMovement::try_from(payload.into_inner())?;
    let outcome = state.inventory.record_movement(&member, &id, input).await?;
    Ok(HttpResponse::Created().json(outcome))
}

/// Ledger entries, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant_id}/inventory/movements",
    params(("restaurant_id" = String, Path, description = "Restaurant id"), MovementQuery),
    responses(
        (status = 200, description = "Movements", body = PageSchema<StockMovement>),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 404, description = "Not a member", body = ErrorSchema)
    ),
    tags = ["inventory"],
    operation_id = "listStockMovements"
)]
#[get("/restaurants/{restaurant_id}/inventory/movements")]
pub async fn list_movements(
    state: web::Data<HttpState>,
    member: Membership,
    query: web::Query<MovementQuery>,
) -> ApiResult<web::Json<ListPage<StockMovement>>> {
    let filter = query.filter()?;
    let page = parse_page(query.limit, query.cursor.as_deref())?;
    let movements = state
        .inventory
        .list_movements(&member, &filter, &page)
        .await?;
    Ok(web::Json(movements))
}

/// Stock value and status counts.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant_id}/inventory/summary",
    params(("restaurant_id" = String, Path, description = "Restaurant id")),
    responses(
        (status = 200, description = "Summary", body = InventorySummary),
        (status = 404, description = "Not a member", body = ErrorSchema)
    ),
    tags = ["inventory"],
    operation_id = "inventorySummary"
)]
#[get("/restaurants/{restaurant_id}/inventory/summary")]
pub async fn summary(state: web::Data<HttpState>, member: Membership) -> ApiResult<HttpResponse> {
    let summary = state.inventory.summary(&member).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(summary))
}

/// Register the inventory routes.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_items)
        .service(create_item)
        .service(get_item)
        .service(update_item)
        .service(archive_item)
        .service(restore_item)
        .service(record_movement)
        .service(list_movements)
        .service(summary);
}

#[cfg(test)]
mod tests {
    //! Handler coverage for items and the stock ledger.
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::ports::InventoryRepositoryError;
    use crate::domain::service_test_support::{fixture_now, restaurant_for};
    use crate::domain::{InventoryItem, MemberContext, MovementId, RestaurantId, Role, UserId};
    use crate::inbound::http::test_utils::{TestPorts, restaurant_uri, session_cookie, test_app};

    fn flour(restaurant_id: RestaurantId, id: ItemId, milli: i64) -> InventoryItem {
        InventoryItem {
            id,
            restaurant_id,
            name: "Farine T55".to_owned(),
            category_id: None,
            supplier_id: None,
            unit: InventoryUnit::Kg,
            quantity: Quantity::from_milli(milli),
            min_stock: Quantity::from_units(10),
            unit_cost: 9_000,
            shelf_life_days: None,
            last_purchased_at: None,
            active: true,
            created_at: fixture_now(),
            updated_at: fixture_now(),
        }
    }

    fn with_restaurant(ports: &mut TestPorts) {
        ports.restaurants.expect_find().returning(|id| {
            Ok(Some(restaurant_for(&MemberContext {
                user_id: UserId::random(),
                restaurant_id: *id,
                role: Role::Owner,
            })))
        });
    }

    #[actix_web::test]
    async fn usage_beyond_stock_is_rejected() {
        let item_id = ItemId::random();
        let mut ports = TestPorts::default();
        ports.member_of(Role::Editor);
        ports
            .inventory
            .expect_find_item()
            .returning(|restaurant_id, id| Ok(Some(flour(*restaurant_id, *id, 2_000))));
        ports.inventory.expect_apply_movement().returning(|movement| {
            Err(InventoryRepositoryError::insufficient_stock(
                movement.item_id.to_string(),
                "Farine T55",
            ))
        });
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let request = actix_test::TestRequest::post()
            .uri(&restaurant_uri(
                &RestaurantId::random(),
                &format!("/inventory/items/{item_id}/movements"),
            ))
            .cookie(cookie)
            .set_json(json!({"kind": "usage", "quantity": 5}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"]["code"], "insufficient_stock");
    }

    #[rstest]
    #[case::zero_usage(json!({"kind": "usage", "quantity": 0}), "quantity")]
    #[case::unknown_kind(json!({"kind": "theft", "quantity": 1}), "kind")]
    #[case::too_precise(json!({"kind": "waste", "quantity": 0.0005}), "quantity")]
    #[case::beyond_range(json!({"kind": "adjustment", "quantity": 1e28}), "quantity")]
    #[case::cost_on_usage(json!({"kind": "usage", "quantity": 1, "unitCost": 500}), "unitCost")]
    #[actix_web::test]
    async fn malformed_movements_name_the_field(#[case] body: Value, #[case] field: &str) {
        let mut ports = TestPorts::default();
        ports.member_of(Role::Editor);
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let request = actix_test::TestRequest::post()
            .uri(&restaurant_uri(
                &RestaurantId::random(),
                &format!("/inventory/items/{}/movements", ItemId::random()),
            ))
            .cookie(cookie)
            .set_json(&body)
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let value: Value = actix_test::read_body_json(response).await;
        assert_eq!(value["details"]["field"], field);
    }

    #[actix_web::test]
    async fn cashiers_cannot_move_stock() {
        let mut ports = TestPorts::default();
        ports.member_of(Role::Cashier);
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let request = actix_test::TestRequest::post()
            .uri(&restaurant_uri(
                &RestaurantId::random(),
                &format!("/inventory/items/{}/movements", ItemId::random()),
            ))
            .cookie(cookie)
            .set_json(json!({"kind": "purchase", "quantity": 25, "unitCost": 9000}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn purchases_return_the_updated_item() {
        let item_id = ItemId::random();
        let mut ports = TestPorts::default();
        ports.member_of(Role::Editor);
        ports
            .inventory
            .expect_find_item()
            .returning(|restaurant_id, id| Ok(Some(flour(*restaurant_id, *id, 2_000))));
        ports.inventory.expect_apply_movement().returning(|movement| {
            Ok(MovementOutcome {
                movement: movement.clone(),
                previous_quantity: Quantity::from_units(2),
                item: flour(movement.restaurant_id, movement.item_id, 27_500),
            })
        });
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let request = actix_test::TestRequest::post()
            .uri(&restaurant_uri(
                &RestaurantId::random(),
                &format!("/inventory/items/{item_id}/movements"),
            ))
            .cookie(cookie)
            .set_json(json!({"kind": "purchase", "quantity": 25.5, "unitCost": 9000}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["movement"]["kind"], "purchase");
        assert_eq!(body["item"]["id"], item_id.to_string());
    }

    #[actix_web::test]
    async fn movement_pages_carry_a_cursor() {
        let mut ports = TestPorts::default();
        ports.member_of(Role::Viewer);
        ports
            .inventory
            .expect_list_movements()
            .withf(|_, filter, page| {
                filter.kind == Some(MovementKind::Waste) && page.limit().get() == 1
            })
            .returning(|restaurant_id, _, _| {
                let movement = |minutes: i64| StockMovement {
                    id: MovementId::random(),
                    restaurant_id: *restaurant_id,
                    item_id: ItemId::random(),
                    kind: MovementKind::Waste,
                    quantity_delta: Quantity::from_units(-1),
                    unit_cost: None,
                    supplier_id: None,
                    reason: Some("brûlé".to_owned()),
                    batch_id: None,
                    expense_id: None,
                    created_by: UserId::random(),
                    occurred_at: fixture_now() - chrono::Duration::minutes(minutes),
                };
                Ok(vec![movement(0), movement(5)])
            });
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let request = actix_test::TestRequest::get()
            .uri(&restaurant_uri(
                &RestaurantId::random(),
                "/inventory/movements?kind=waste&limit=1",
            ))
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["items"].as_array().map(Vec::len), Some(1));
        assert!(body["nextCursor"].is_string());
    }

    #[actix_web::test]
    async fn summary_is_private() {
        let mut ports = TestPorts::default();
        ports.member_of(Role::Viewer);
        with_restaurant(&mut ports);
        ports.inventory.expect_list_items().returning(|restaurant_id, _| {
            Ok(vec![flour(*restaurant_id, ItemId::random(), 5_000)])
        });
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let request = actix_test::TestRequest::get()
            .uri(&restaurant_uri(&RestaurantId::random(), "/inventory/summary"))
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get("Cache-Control")
                .and_then(|value| value.to_str().ok()),
            Some("private, no-cache, must-revalidate")
        );
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["itemCount"], 1);
        assert_eq!(body["totalValue"], 45_000);
    }

    #[actix_web::test]
    async fn creating_an_item_books_opening_stock() {
        let mut ports = TestPorts::default();
        ports.member_of(Role::Editor);
        with_restaurant(&mut ports);
        ports
            .inventory
            .expect_create_item()
            .withf(|item, opening| {
                item.quantity == Quantity::ZERO
                    && opening.as_ref().map(|movement| movement.quantity_delta)
                        == Some(Quantity::from_units(12))
            })
            .returning(|item, opening| {
                let mut created = item.clone();
                if let Some(movement) = opening {
                    created.quantity = movement.quantity_delta;
                }
                Ok(created)
            });
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let request = actix_test::TestRequest::post()
            .uri(&restaurant_uri(&RestaurantId::random(), "/inventory/items"))
            .cookie(cookie)
            .set_json(json!({
                "name": "Beurre",
                "unit": "kg",
                "minStock": 2,
                "unitCost": 60000,
                "shelfLifeDays": 21,
                "initialQuantity": 12
            }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["name"], "Beurre");
        assert_eq!(body["stockStatus"], "ok");
    }
}
