//! Catalogue handlers: categories, expense groups, and products.
//!
//! Records are archived with `DELETE` and brought back with `POST .../restore`;
//! nothing here is ever removed from the database.
//!
//! ```text
//! GET  /api/v1/restaurants/{restaurant_id}/categories?kind=expense
//! POST /api/v1/restaurants/{restaurant_id}/categories {"kind":"inventory","name":"Farines"}
//! PUT  /api/v1/restaurants/{restaurant_id}/categories/{category_id} {"name":"Farines et sons"}
//! GET  /api/v1/restaurants/{restaurant_id}/expense-groups
//! GET  /api/v1/restaurants/{restaurant_id}/products?includeInactive=true
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Category, CategoryId, CategoryKind, Error, ExpenseGroup, ExpenseGroupId, Product,
    ProductDraft, ProductId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::membership::Membership;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_amount, parse_code, parse_id, parse_optional_code, parse_optional_id,
};

/// `includeInactive` flag shared by the reference data listings.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct IncludeInactiveQuery {
    /// Include archived records.
    include_inactive: Option<bool>,
}

impl IncludeInactiveQuery {
    pub fn include_inactive(&self) -> bool {
        self.include_inactive.unwrap_or(false)
    }
}

/// Query for `GET .../categories`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CategoryQuery {
    /// `inventory`, `expense`, or `product`.
    kind: Option<String>,
    /// Include archived categories.
    include_inactive: Option<bool>,
}

/// Body for `POST .../categories`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    #[schema(example = "inventory")]
    pub kind: String,
    pub name: String,
}

/// Body for renaming a category.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    pub name: String,
}

/// Body for creating or editing an expense group.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseGroupRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Body for creating or editing a product.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: String,
    pub category_id: Option<String>,
    /// Selling price in GNF.
    pub unit_price: i64,
}

impl TryFrom<ProductRequest> for ProductDraft {
    type Error = Error;

    fn try_from(value: ProductRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: value.name,
            category_id: parse_optional_id(
                value.category_id.as_deref(),
                FieldName::new("categoryId"),
            )?,
            unit_price: parse_amount(value.unit_price, FieldName::new("unitPrice"))?,
        })
    }
}

fn second_segment<T: From<uuid::Uuid>>(
    path: web::Path<(String, String)>,
    field: &'static str,
) -> Result<T, Error> {
    let (_, raw) = path.into_inner();
    parse_id(&raw, FieldName::new(field))
}

/// Categories, optionally of one kind.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant_id}/categories",
    params(("restaurant_id" = String, Path, description = "Restaurant id"), CategoryQuery),
    responses(
        (status = 200, description = "Categories", body = [Category]),
        (status = 400, description = "Unknown kind", body = ErrorSchema),
        (status = 404, description = "Not a member", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "listCategories"
)]
#[get("/restaurants/{restaurant_id}/categories")]
pub async fn list_categories(
    state: web::Data<HttpState>,
    member: Membership,
    query: web::Query<CategoryQuery>,
) -> ApiResult<web::Json<Vec<Category>>> {
    let kind: Option<CategoryKind> =
        parse_optional_code(query.kind.as_deref(), FieldName::new("kind"))?;
    let categories = state
        .reference
        .list_categories(&member, kind, query.include_inactive.unwrap_or(false))
        .await?;
    Ok(web::Json(categories))
}

/// Create a category.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant_id}/categories",
    params(("restaurant_id" = String, Path, description = "Restaurant id")),
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Editors and above", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "createCategory"
)]
#[post("/restaurants/{restaurant_id}/categories")]
pub async fn create_category(
    state: web::Data<HttpState>,
    member: Membership,
    payload: web::Json<CreateCategoryRequest>,
) -> ApiResult<HttpResponse> {
    let kind: CategoryKind = parse_code(&payload.kind, FieldName::new("kind"))?;
    let category = state
        .reference
        .create_category(&member, kind, &payload.name)
        .await?;
    Ok(HttpResponse::Created().json(category))
}

/// Rename a category.
#[utoipa::path(
    put,
    path = "/api/v1/restaurants/{restaurant_id}/categories/{category_id}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("category_id" = String, Path, description = "Category id")
    ),
    request_body = RenameRequest,
    responses(
        (status = 200, description = "Renamed category", body = Category),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "renameCategory"
)]
#[put("/restaurants/{restaurant_id}/categories/{category_id}")]
pub async fn rename_category(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
    payload: web::Json<RenameRequest>,
) -> ApiResult<web::Json<Category>> {
    let id: CategoryId = second_segment(path, "categoryId")?;
    let category = state
        .reference
        .rename_category(&member, &id, &payload.name)
        .await?;
    Ok(web::Json(category))
}

/// Archive a category.
#[utoipa::path(
    delete,
    path = "/api/v1/restaurants/{restaurant_id}/categories/{category_id}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("category_id" = String, Path, description = "Category id")
    ),
    responses(
        (status = 204, description = "Archived"),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "archiveCategory"
)]
#[delete("/restaurants/{restaurant_id}/categories/{category_id}")]
pub async fn archive_category(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let id: CategoryId = second_segment(path, "categoryId")?;
    state.reference.set_category_active(&member, &id, false).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Restore an archived category.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant_id}/categories/{category_id}/restore",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("category_id" = String, Path, description = "Category id")
    ),
    responses(
        (status = 204, description = "Restored"),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "restoreCategory"
)]
#[post("/restaurants/{restaurant_id}/categories/{category_id}/restore")]
pub async fn restore_category(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let id: CategoryId = second_segment(path, "categoryId")?;
    state.reference.set_category_active(&member, &id, true).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Expense groups.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant_id}/expense-groups",
    params(("restaurant_id" = String, Path, description = "Restaurant id"), IncludeInactiveQuery),
    responses(
        (status = 200, description = "Expense groups", body = [ExpenseGroup]),
        (status = 404, description = "Not a member", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "listExpenseGroups"
)]
#[get("/restaurants/{restaurant_id}/expense-groups")]
pub async fn list_expense_groups(
    state: web::Data<HttpState>,
    member: Membership,
    query: web::Query<IncludeInactiveQuery>,
) -> ApiResult<web::Json<Vec<ExpenseGroup>>> {
    let groups = state
        .reference
        .list_expense_groups(&member, query.include_inactive())
        .await?;
    Ok(web::Json(groups))
}

/// Create an expense group.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant_id}/expense-groups",
    params(("restaurant_id" = String, Path, description = "Restaurant id")),
    request_body = ExpenseGroupRequest,
    responses(
        (status = 201, description = "Expense group created", body = ExpenseGroup),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Editors and above", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "createExpenseGroup"
)]
#[post("/restaurants/{restaurant_id}/expense-groups")]
pub async fn create_expense_group(
    state: web::Data<HttpState>,
    member: Membership,
    payload: web::Json<ExpenseGroupRequest>,
) -> ApiResult<HttpResponse> {
    let group = state
        .reference
        .create_expense_group(&member, &payload.name, payload.description.as_deref())
        .await?;
    Ok(HttpResponse::Created().json(group))
}

/// Edit an expense group.
#[utoipa::path(
    put,
    path = "/api/v1/restaurants/{restaurant_id}/expense-groups/{group_id}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("group_id" = String, Path, description = "Expense group id")
    ),
    request_body = ExpenseGroupRequest,
    responses(
        (status = 200, description = "Updated group", body = ExpenseGroup),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "updateExpenseGroup"
)]
#[put("/restaurants/{restaurant_id}/expense-groups/{group_id}")]
pub async fn update_expense_group(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
    payload: web::Json<ExpenseGroupRequest>,
) -> ApiResult<web::Json<ExpenseGroup>> {
    let id: ExpenseGroupId = second_segment(path, "groupId")?;
    let group = state
        .reference
        .update_expense_group(&member, &id, &payload.name, payload.description.as_deref())
        .await?;
    Ok(web::Json(group))
}

/// Archive an expense group.
#[utoipa::path(
    delete,
    path = "/api/v1/restaurants/{restaurant_id}/expense-groups/{group_id}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("group_id" = String, Path, description = "Expense group id")
    ),
    responses(
        (status = 204, description = "Archived"),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "archiveExpenseGroup"
)]
#[delete("/restaurants/{restaurant_id}/expense-groups/{group_id}")]
pub async fn archive_expense_group(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let id: ExpenseGroupId = second_segment(path, "groupId")?;
    state
        .reference
        .set_expense_group_active(&member, &id, false)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Restore an archived expense group.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant_id}/expense-groups/{group_id}/restore",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("group_id" = String, Path, description = "Expense group id")
    ),
    responses(
        (status = 204, description = "Restored"),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "restoreExpenseGroup"
)]
#[post("/restaurants/{restaurant_id}/expense-groups/{group_id}/restore")]
pub async fn restore_expense_group(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let id: ExpenseGroupId = second_segment(path, "groupId")?;
    state
        .reference
        .set_expense_group_active(&member, &id, true)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Products.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant_id}/products",
    params(("restaurant_id" = String, Path, description = "Restaurant id"), IncludeInactiveQuery),
    responses(
        (status = 200, description = "Products", body = [Product]),
        (status = 404, description = "Not a member", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "listProducts"
)]
#[get("/restaurants/{restaurant_id}/products")]
pub async fn list_products(
    state: web::Data<HttpState>,
    member: Membership,
    query: web::Query<IncludeInactiveQuery>,
) -> ApiResult<web::Json<Vec<Product>>> {
    let products = state
        .reference
        .list_products(&member, query.include_inactive())
        .await?;
    Ok(web::Json(products))
}

/// Create a product.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant_id}/products",
    params(("restaurant_id" = String, Path, description = "Restaurant id")),
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Editors and above", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "createProduct"
)]
#[post("/restaurants/{restaurant_id}/products")]
pub async fn create_product(
    state: web::Data<HttpState>,
    member: Membership,
    payload: web::Json<ProductRequest>,
) -> ApiResult<HttpResponse> {
    let draft = ProductDraft::try_from(payload.into_inner())?;
    let product = state.reference.create_product(&member, draft).await?;
    Ok(HttpResponse::Created().json(product))
}

/// Edit a product.
#[utoipa::path(
    put,
    path = "/api/v1/restaurants/{restaurant_id}/products/{product_id}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("product_id" = String, Path, description = "Product id")
    ),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Updated product", body = Product),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "updateProduct"
)]
#[put("/restaurants/{restaurant_id}/products/{product_id}")]
pub async fn update_product(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
    payload: web::Json<ProductRequest>,
) -> ApiResult<web::Json<Product>> {
    let id: ProductId = second_segment(path, "productId")?;
    let draft = ProductDraft::try_from(payload.into_inner())?;
    let product = state.reference.update_product(&member, &id, draft).await?;
    Ok(web::Json(product))
}

/// Archive a product.
#[utoipa::path(
    delete,
    path = "/api/v1/restaurants/{restaurant_id}/products/{product_id}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("product_id" = String, Path, description = "Product id")
    ),
    responses(
        (status = 204, description = "Archived"),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "archiveProduct"
)]
#[delete("/restaurants/{restaurant_id}/products/{product_id}")]
pub async fn archive_product(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let id: ProductId = second_segment(path, "productId")?;
    state.reference.set_product_active(&member, &id, false).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Restore an archived product.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant_id}/products/{product_id}/restore",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("product_id" = String, Path, description = "Product id")
    ),
    responses(
        (status = 204, description = "Restored"),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "restoreProduct"
)]
#[post("/restaurants/{restaurant_id}/products/{product_id}/restore")]
pub async fn restore_product(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let id: ProductId = second_segment(path, "productId")?;
    state.reference.set_product_active(&member, &id, true).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the catalogue routes.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_categories)
        .service(create_category)
        .service(rename_category)
        .service(archive_category)
        .service(restore_category)
        .service(list_expense_groups)
        .service(create_expense_group)
        .service(update_expense_group)
        .service(archive_expense_group)
        .service(restore_expense_group)
        .service(list_products)
        .service(create_product)
        .service(update_product)
        .service(archive_product)
        .service(restore_product);
}
