//! Production batch handlers.
//!
//! ```text
//! POST /api/v1/restaurants/{restaurant_id}/production/batches
//! GET  /api/v1/restaurants/{restaurant_id}/production/batches?from=2026-03-01&to=2026-03-31
//! ```

use actix_web::{HttpResponse, get, post, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, Ingredient, ListPage, ProductionBatch, RecordBatch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::membership::Membership;
use crate::inbound::http::schemas::{ErrorSchema, PageSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_id, parse_optional_date, parse_optional_timestamp, parse_page,
    parse_quantity,
};

/// One ingredient line.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngredientRequest {
    pub item_id: String,
    #[schema(value_type = f64)]
    pub quantity: Decimal,
}

/// Body for `POST .../production/batches`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub product_id: String,
    #[schema(value_type = f64)]
    pub quantity_produced: Decimal,
    pub ingredients: Vec<IngredientRequest>,
    pub notes: Option<String>,
    /// RFC 3339; defaults to now.
    pub produced_at: Option<String>,
}

impl TryFrom<BatchRequest> for RecordBatch {
    type Error = Error;

    fn try_from(value: BatchRequest) -> Result<Self, Self::Error> {
        let ingredients = value
            .ingredients
            .into_iter()
            .map(|line| {
                Ok(Ingredient {
                    item_id: parse_id(&line.item_id, FieldName::new("ingredients.itemId"))?,
                    quantity: parse_quantity(line.quantity, FieldName::new("ingredients.quantity"))?,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(Self {
            product_id: parse_id(&value.product_id, FieldName::new("productId"))?,
            quantity_produced: parse_quantity(
                value.quantity_produced,
                FieldName::new("quantityProduced"),
            )?,
            ingredients,
            notes: value.notes,
            produced_at: parse_optional_timestamp(
                value.produced_at.as_deref(),
                FieldName::new("producedAt"),
            )?,
        })
    }
}

/// Query for the batch listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BatchQuery {
    /// Earliest production date, `YYYY-MM-DD`.
    from: Option<String>,
    /// Latest production date, `YYYY-MM-DD`.
    to: Option<String>,
    limit: Option<u32>,
    cursor: Option<String>,
}

/// Record a batch and draw its ingredients from stock.
///
/// All ingredients are consumed in one transaction; a shortfall on any of
/// them rejects the whole batch.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant_id}/production/batches",
    params(("restaurant_id" = String, Path, description = "Restaurant id")),
    request_body = BatchRequest,
    responses(
        (status = 201, description = "Batch recorded", body = ProductionBatch),
        (status = 400, description = "Invalid batch or insufficient stock", body = ErrorSchema),
        (status = 403, description = "Editors and above", body = ErrorSchema)
    ),
    tags = ["production"],
    operation_id = "recordBatch"
)]
#[post("/restaurants/{restaurant_id}/production/batches")]
pub async fn record_batch(
    state: web::Data<HttpState>,
    member: Membership,
    payload: web::Json<BatchRequest>,
) -> ApiResult<HttpResponse> {
    let input = RecordBatch::try_from(payload.into_inner())?;
    let batch = state.inventory.record_batch(&member, input).await?;
    Ok(HttpResponse::Created().json(batch))
}

/// Batches newest first.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant_id}/production/batches",
    params(("restaurant_id" = String, Path, description = "Restaurant id"), BatchQuery),
    responses(
        (status = 200, description = "Batches", body = PageSchema<ProductionBatch>),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 404, description = "Not a member", body = ErrorSchema)
    ),
    tags = ["production"],
    operation_id = "listBatches"
)]
#[get("/restaurants/{restaurant_id}/production/batches")]
pub async fn list_batches(
    state: web::Data<HttpState>,
    member: Membership,
    query: web::Query<BatchQuery>,
) -> ApiResult<web::Json<ListPage<ProductionBatch>>> {
    let from = parse_optional_date(query.from.as_deref(), FieldName::new("from"))?;
    let to = parse_optional_date(query.to.as_deref(), FieldName::new("to"))?;
    let page = parse_page(query.limit, query.cursor.as_deref())?;
    let batches = state
        .inventory
        .list_batches(&member, from, to, &page)
        .await?;
    Ok(web::Json(batches))
}

/// Register the production routes.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(record_batch).service(list_batches);
}

#[cfg(test)]
mod tests {
    //! Handler coverage for production batches.
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::ports::InventoryRepositoryError;
    use crate::domain::service_test_support::{fixture_now, gnf};
    use crate::domain::{ItemId, Product, ProductId, RestaurantId, Role, UserId};
    use crate::inbound::http::test_utils::{TestPorts, restaurant_uri, session_cookie, test_app};

    fn croissant(restaurant_id: RestaurantId, id: ProductId) -> Product {
        Product {
            id,
            restaurant_id,
            name: "Croissant".to_owned(),
            category_id: None,
            unit_price: gnf(5_000),
            active: true,
            created_at: fixture_now(),
        }
    }

    fn batch_body(flour: ItemId, butter: ItemId) -> Value {
        json!({
            "productId": ProductId::random().to_string(),
            "quantityProduced": 120,
            "ingredients": [
                {"itemId": flour.to_string(), "quantity": 5},
                {"itemId": butter.to_string(), "quantity": 1.25}
            ],
            "notes": "fournée du matin"
        })
    }

    #[actix_web::test]
    async fn a_shortfall_rejects_the_whole_batch() {
        let mut ports = TestPorts::default();
        ports.member_of(Role::Editor);
        ports
            .reference
            .expect_find_product()
            .returning(|restaurant_id, id| Ok(Some(croissant(*restaurant_id, *id))));
        ports.inventory.expect_record_batch().returning(|_, usages| {
            Err(InventoryRepositoryError::insufficient_stock(
                usages[1].item_id.to_string(),
                "Beurre",
            ))
        });
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let request = actix_test::TestRequest::post()
            .uri(&restaurant_uri(&RestaurantId::random(), "/production/batches"))
            .cookie(cookie)
            .set_json(batch_body(ItemId::random(), ItemId::random()))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["message"], "insufficient stock of Beurre");
    }

    #[actix_web::test]
    async fn batches_draw_each_ingredient_once() {
        let flour = ItemId::random();
        let mut ports = TestPorts::default();
        ports.member_of(Role::Editor);
        ports
            .reference
            .expect_find_product()
            .returning(|restaurant_id, id| Ok(Some(croissant(*restaurant_id, *id))));
        ports
            .inventory
            .expect_record_batch()
            .withf(|batch, usages| {
                usages.len() == 2
                    && usages.iter().all(|usage| {
                        usage.batch_id == Some(batch.id) && usage.quantity_delta.is_negative()
                    })
            })
            .times(1)
            .returning(|_, _| Ok(Vec::new()));
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let request = actix_test::TestRequest::post()
            .uri(&restaurant_uri(&RestaurantId::random(), "/production/batches"))
            .cookie(cookie)
            .set_json(batch_body(flour, ItemId::random()))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["ingredients"][0]["itemId"], flour.to_string());
        assert_eq!(body["notes"], "fournée du matin");
    }

    #[actix_web::test]
    async fn duplicate_ingredients_are_rejected() {
        let flour = ItemId::random();
        let mut ports = TestPorts::default();
        ports.member_of(Role::Editor);
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let request = actix_test::TestRequest::post()
            .uri(&restaurant_uri(&RestaurantId::random(), "/production/batches"))
            .cookie(cookie)
            .set_json(batch_body(flour, flour))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"]["code"], "invalid_batch");
    }

    #[actix_web::test]
    async fn listing_rejects_malformed_dates() {
        let mut ports = TestPorts::default();
        ports.member_of(Role::Viewer);
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let request = actix_test::TestRequest::get()
            .uri(&restaurant_uri(
                &RestaurantId::random(),
                "/production/batches?from=10/03/2026",
            ))
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"]["field"], "from");
        assert_eq!(body["details"]["code"], "invalid_date");
    }
}
