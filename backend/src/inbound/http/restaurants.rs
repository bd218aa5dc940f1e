//! Restaurant settings and staff handlers.
//!
//! ```text
//! POST   /api/v1/restaurants {"name":"Fournil Kaloum"}
//! GET    /api/v1/restaurants/{restaurant_id}
//! PUT    /api/v1/restaurants/{restaurant_id}/settings
//! GET    /api/v1/restaurants/{restaurant_id}/members
//! POST   /api/v1/restaurants/{restaurant_id}/members {"email":"...","role":"cashier"}
//! PUT    /api/v1/restaurants/{restaurant_id}/members/{user_id} {"role":"manager"}
//! DELETE /api/v1/restaurants/{restaurant_id}/members/{user_id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    DEFAULT_EXPIRY_WARNING_DAYS, EmailAddress, Error, Member, PaymentSplit, Restaurant,
    RestaurantSettings, Role, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::membership::Membership;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_code, parse_id, parse_optional_phone};

/// Body for `POST /api/v1/restaurants`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRestaurantRequest {
    pub name: String,
}

/// Body for `PUT /api/v1/restaurants/{restaurant_id}/settings`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRequest {
    pub name: String,
    pub notification_phone: Option<String>,
    #[serde(default)]
    pub notifications_enabled: bool,
    #[serde(default)]
    pub initial_balances: PaymentSplit,
    /// Defaults to two days.
    pub expiry_warning_days: Option<u16>,
}

impl TryFrom<SettingsRequest> for RestaurantSettings {
    type Error = Error;

    fn try_from(value: SettingsRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: value.name,
            notification_phone: parse_optional_phone(
                value.notification_phone.as_deref(),
                FieldName::new("notificationPhone"),
            )?,
            notifications_enabled: value.notifications_enabled,
            initial_balances: value.initial_balances,
            expiry_warning_days: value
                .expiry_warning_days
                .unwrap_or(DEFAULT_EXPIRY_WARNING_DAYS),
        })
    }
}

/// Body for `POST /api/v1/restaurants/{restaurant_id}/members`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    /// Email of an existing account.
    pub email: String,
    #[schema(example = "cashier")]
    pub role: String,
}

/// Body for `PUT /api/v1/restaurants/{restaurant_id}/members/{user_id}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRoleRequest {
    #[schema(example = "manager")]
    pub role: String,
}

fn parse_role(raw: &str) -> Result<Role, Error> {
    parse_code(raw, FieldName::new("role"))
}

fn member_path(path: web::Path<(String, String)>) -> Result<UserId, Error> {
    let (_, user_id) = path.into_inner();
    parse_id(&user_id, FieldName::new("userId"))
}

/// Create a restaurant owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants",
    request_body = CreateRestaurantRequest,
    responses(
        (status = 201, description = "Restaurant created", body = Restaurant),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["restaurants"],
    operation_id = "createRestaurant"
)]
#[post("/restaurants")]
pub async fn create_restaurant(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateRestaurantRequest>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user()?;
    let restaurant = state.restaurants.create(owner, &payload.name).await?;
    Ok(HttpResponse::Created().json(restaurant))
}

/// Restaurant and settings.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant_id}",
    params(("restaurant_id" = String, Path, description = "Restaurant id")),
    responses(
        (status = 200, description = "Restaurant", body = Restaurant),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not a member", body = ErrorSchema)
    ),
    tags = ["restaurants"],
    operation_id = "getRestaurant"
)]
#[get("/restaurants/{restaurant_id}")]
pub async fn get_restaurant(
    state: web::Data<HttpState>,
    member: Membership,
) -> ApiResult<web::Json<Restaurant>> {
    let restaurant = state.restaurants.get(&member).await?;
    Ok(web::Json(restaurant))
}

/// Overwrite settings. Owners only.
#[utoipa::path(
    put,
    path = "/api/v1/restaurants/{restaurant_id}/settings",
    params(("restaurant_id" = String, Path, description = "Restaurant id")),
    request_body = SettingsRequest,
    responses(
        (status = 200, description = "Updated restaurant", body = Restaurant),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Owners only", body = ErrorSchema),
        (status = 404, description = "Not a member", body = ErrorSchema)
    ),
    tags = ["restaurants"],
    operation_id = "updateRestaurantSettings"
)]
#[put("/restaurants/{restaurant_id}/settings")]
pub async fn update_settings(
    state: web::Data<HttpState>,
    member: Membership,
    payload: web::Json<SettingsRequest>,
) -> ApiResult<web::Json<Restaurant>> {
    let settings = RestaurantSettings::try_from(payload.into_inner())?;
    let restaurant = state.restaurants.update_settings(&member, settings).await?;
    Ok(web::Json(restaurant))
}

/// Staff and their roles.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant_id}/members",
    params(("restaurant_id" = String, Path, description = "Restaurant id")),
    responses(
        (status = 200, description = "Members", body = [Member]),
        (status = 404, description = "Not a member", body = ErrorSchema)
    ),
    tags = ["restaurants"],
    operation_id = "listMembers"
)]
#[get("/restaurants/{restaurant_id}/members")]
pub async fn list_members(
    state: web::Data<HttpState>,
    member: Membership,
) -> ApiResult<web::Json<Vec<Member>>> {
    let members = state.restaurants.list_members(&member).await?;
    Ok(web::Json(members))
}

/// Grant a role to a registered user. Owners only.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant_id}/members",
    params(("restaurant_id" = String, Path, description = "Restaurant id")),
    request_body = AddMemberRequest,
    responses(
        (status = 201, description = "Member added", body = Member),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Owners only", body = ErrorSchema),
        (status = 404, description = "No account for that email", body = ErrorSchema),
        (status = 409, description = "Already a member", body = ErrorSchema)
    ),
    tags = ["restaurants"],
    operation_id = "addMember"
)]
#[post("/restaurants/{restaurant_id}/members")]
pub async fn add_member(
    state: web::Data<HttpState>,
    member: Membership,
    payload: web::Json<AddMemberRequest>,
) -> ApiResult<HttpResponse> {
    let email = EmailAddress::parse(&payload.email)
        .map_err(|err| Error::invalid_field("email", "invalid_format", err.to_string()))?;
    let role = parse_role(&payload.role)?;
    let added = state.restaurants.add_member(&member, &email, role).await?;
    Ok(HttpResponse::Created().json(added))
}

/// Change a member's role. The last owner cannot be demoted.
#[utoipa::path(
    put,
    path = "/api/v1/restaurants/{restaurant_id}/members/{user_id}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("user_id" = String, Path, description = "Member's user id")
    ),
    request_body = ChangeRoleRequest,
    responses(
        (status = 204, description = "Role changed"),
        (status = 403, description = "Owners only", body = ErrorSchema),
        (status = 404, description = "No such member", body = ErrorSchema),
        (status = 409, description = "Would leave no owner", body = ErrorSchema)
    ),
    tags = ["restaurants"],
    operation_id = "changeMemberRole"
)]
#[put("/restaurants/{restaurant_id}/members/{user_id}")]
pub async fn change_role(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
    payload: web::Json<ChangeRoleRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = member_path(path)?;
    let role = parse_role(&payload.role)?;
    state.restaurants.change_role(&member, &user_id, role).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Remove a member, or leave when the id is the caller's own.
#[utoipa::path(
    delete,
    path = "/api/v1/restaurants/{restaurant_id}/members/{user_id}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id"),
        ("user_id" = String, Path, description = "Member's user id")
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 403, description = "Owners only", body = ErrorSchema),
        (status = 404, description = "No such member", body = ErrorSchema),
        (status = 409, description = "Would leave no owner", body = ErrorSchema)
    ),
    tags = ["restaurants"],
    operation_id = "removeMember"
)]
#[delete("/restaurants/{restaurant_id}/members/{user_id}")]
pub async fn remove_member(
    state: web::Data<HttpState>,
    member: Membership,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let user_id = member_path(path)?;
    state.restaurants.remove_member(&member, &user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the restaurant routes.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_restaurant)
        .service(get_restaurant)
        .service(update_settings)
        .service(list_members)
        .service(add_member)
        .service(change_role)
        .service(remove_member);
}

#[cfg(test)]
mod tests {
    //! Handler coverage for restaurant settings and staff.
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::RestaurantId;
    use crate::domain::ports::RestaurantRepositoryError;
    use crate::domain::service_test_support::{fixture_now, restaurant_for};
    use crate::inbound::http::test_utils::{TestPorts, restaurant_uri, session_cookie, test_app};

    #[actix_web::test]
    async fn creating_a_restaurant_makes_the_caller_owner() {
        let user_id = UserId::random();
        let mut ports = TestPorts::default();
        ports
            .restaurants
            .expect_create()
            .withf(move |restaurant, owner| {
                restaurant.name == "Fournil Kaloum" && *owner == user_id
            })
            .times(1)
            .returning(|_, _| Ok(()));
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, &user_id).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/restaurants")
            .cookie(cookie)
            .set_json(json!({"name": "  Fournil Kaloum "}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["notificationsEnabled"], false);
        assert_eq!(body["expiryWarningDays"], 2);
    }

    #[rstest]
    #[case::manager(Role::Manager, StatusCode::FORBIDDEN)]
    #[case::viewer(Role::Viewer, StatusCode::FORBIDDEN)]
    #[actix_web::test]
    async fn only_owners_change_settings(#[case] role: Role, #[case] expected: StatusCode) {
        let mut ports = TestPorts::default();
        ports.member_of(role);
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let request = actix_test::TestRequest::put()
            .uri(&restaurant_uri(&RestaurantId::random(), "/settings"))
            .cookie(cookie)
            .set_json(json!({"name": "Fournil Kaloum"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), expected);
    }

    #[actix_web::test]
    async fn enabling_notifications_requires_a_phone() {
        let mut ports = TestPorts::default();
        ports.member_of(Role::Owner);
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let request = actix_test::TestRequest::put()
            .uri(&restaurant_uri(&RestaurantId::random(), "/settings"))
            .cookie(cookie)
            .set_json(json!({"name": "Fournil Kaloum", "notificationsEnabled": true}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"]["field"], "notificationPhone");
    }

    #[actix_web::test]
    async fn owners_update_settings() {
        let mut ports = TestPorts::default();
        ports.member_of(Role::Owner);
        ports
            .restaurants
            .expect_update_settings()
            .withf(|_, settings| {
                settings.notifications_enabled
                    && settings.notification_phone.as_ref().map(|p| p.as_str())
                        == Some("+224620000000")
                    && settings.initial_balances.cash.get() == 150_000
            })
            .returning(|id, settings| {
                Ok(Some(Restaurant {
                    id: *id,
                    name: settings.name.clone(),
                    notification_phone: settings.notification_phone.clone(),
                    notifications_enabled: settings.notifications_enabled,
                    initial_balances: settings.initial_balances,
                    expiry_warning_days: settings.expiry_warning_days,
                    created_at: fixture_now(),
                }))
            });
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let request = actix_test::TestRequest::put()
            .uri(&restaurant_uri(&RestaurantId::random(), "/settings"))
            .cookie(cookie)
            .set_json(json!({
                "name": "Fournil Kaloum",
                "notificationPhone": "+224 620 00 00 00",
                "notificationsEnabled": true,
                "initialBalances": {"cash": 150000, "orangeMoney": 0, "card": 0}
            }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["notificationPhone"], "+224620000000");
    }

    #[actix_web::test]
    async fn viewers_can_read_the_restaurant() {
        let mut ports = TestPorts::default();
        ports.member_of(Role::Viewer);
        ports.restaurants.expect_find().returning(|id| {
            let mut restaurant = restaurant_for(&crate::domain::MemberContext {
                user_id: UserId::random(),
                restaurant_id: *id,
                role: Role::Viewer,
            });
            restaurant.name = "Fournil Madina".to_owned();
            Ok(Some(restaurant))
        });
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let request = actix_test::TestRequest::get()
            .uri(&restaurant_uri(&RestaurantId::random(), ""))
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["name"], "Fournil Madina");
    }

    #[actix_web::test]
    async fn demoting_the_last_owner_conflicts() {
        let mut ports = TestPorts::default();
        ports.member_of(Role::Owner);
        ports
            .restaurants
            .expect_change_role()
            .returning(|_, _, _| Err(RestaurantRepositoryError::last_owner()));
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let user_id = UserId::random();
        let cookie = session_cookie(&app, &user_id).await;

        let request = actix_test::TestRequest::put()
            .uri(&restaurant_uri(
                &RestaurantId::random(),
                &format!("/members/{user_id}"),
            ))
            .cookie(cookie)
            .set_json(json!({"role": "manager"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["message"], "a restaurant must keep at least one owner");
    }

    #[actix_web::test]
    async fn unknown_roles_are_rejected() {
        let mut ports = TestPorts::default();
        ports.member_of(Role::Owner);
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let request = actix_test::TestRequest::post()
            .uri(&restaurant_uri(&RestaurantId::random(), "/members"))
            .cookie(cookie)
            .set_json(json!({"email": "awa@fournil.gn", "role": "baker"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"]["field"], "role");
        assert_eq!(body["details"]["code"], "invalid_code");
    }

    #[actix_web::test]
    async fn adding_an_unregistered_email_is_not_found() {
        let mut ports = TestPorts::default();
        ports.member_of(Role::Owner);
        ports.users.expect_find_by_email().returning(|_| Ok(None));
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let request = actix_test::TestRequest::post()
            .uri(&restaurant_uri(&RestaurantId::random(), "/members"))
            .cookie(cookie)
            .set_json(json!({"email": "awa@fournil.gn", "role": "cashier"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn members_may_leave_without_owner_rights() {
        let mut ports = TestPorts::default();
        ports.member_of(Role::Cashier);
        ports
            .restaurants
            .expect_remove_member()
            .times(1)
            .returning(|_, _| Ok(()));
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let user_id = UserId::random();
        let cookie = session_cookie(&app, &user_id).await;

        let request = actix_test::TestRequest::delete()
            .uri(&restaurant_uri(
                &RestaurantId::random(),
                &format!("/members/{user_id}"),
            ))
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
