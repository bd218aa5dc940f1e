//! Tests for account handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{PasswordHashError, StoredCredentials, UserRepositoryError};
use crate::domain::service_test_support::fixture_now;
use crate::domain::{EmailAddress, RestaurantId, RestaurantMembership, Role, UserId};
use crate::inbound::http::test_utils::{TestPorts, session_cookie, test_app};

fn stored_user(id: UserId) -> User {
    User {
        id,
        display_name: "Aminata".to_owned(),
        email: EmailAddress::parse("aminata@fournil.gn").expect("email"),
        phone: None,
        created_at: fixture_now(),
    }
}

fn has_session_cookie<B>(response: &actix_web::dev::ServiceResponse<B>) -> bool {
    response
        .response()
        .cookies()
        .any(|cookie| cookie.name() == "session")
}

#[rstest]
#[case::short_password(
    json!({"displayName": "Aminata", "email": "aminata@fournil.gn", "password": "court"}),
    "password",
    "password_too_short"
)]
#[case::bad_email(
    json!({"displayName": "Aminata", "email": "aminata", "password": "pain-chaud-2026"}),
    "email",
    "invalid_format"
)]
#[case::blank_name(
    json!({"displayName": "  ", "email": "aminata@fournil.gn", "password": "pain-chaud-2026"}),
    "displayName",
    "invalid_format"
)]
#[actix_web::test]
async fn register_rejects_invalid_payloads(
    #[case] body: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let app = actix_test::init_service(test_app(TestPorts::default().into_state(), routes)).await;
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(&body)
        .to_request();

    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["code"], "invalid_request");
    assert_eq!(value["details"]["field"], field);
    assert_eq!(value["details"]["code"], code);
}

#[actix_web::test]
async fn register_creates_account_and_signs_in() {
    let mut ports = TestPorts::default();
    ports
        .passwords
        .expect_hash()
        .withf(|password| password == "pain-chaud-2026")
        .times(1)
        .returning(|_| Ok("$argon2id$stub".to_owned()));
    ports
        .users
        .expect_create()
        .withf(|user, hash| user.email.as_str() == "aminata@fournil.gn" && hash == "$argon2id$stub")
        .times(1)
        .returning(|_, _| Ok(()));
    let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "displayName": " Aminata ",
            "email": "Aminata@Fournil.gn",
            "password": "pain-chaud-2026",
            "phone": "+224 620 00 00 00"
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(has_session_cookie(&response));
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["displayName"], "Aminata");
    assert_eq!(body["phone"], "+224620000000");
    assert!(body.get("passwordHash").is_none());
}

#[actix_web::test]
async fn register_reports_duplicate_email_as_conflict() {
    let mut ports = TestPorts::default();
    ports
        .passwords
        .expect_hash()
        .returning(|_| Ok("$argon2id$stub".to_owned()));
    ports
        .users
        .expect_create()
        .returning(|_, _| Err(UserRepositoryError::duplicate_email()));
    let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "displayName": "Aminata",
            "email": "aminata@fournil.gn",
            "password": "pain-chaud-2026"
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn login_sets_session_cookie() {
    let user_id = UserId::random();
    let mut ports = TestPorts::default();
    ports.users.expect_find_credentials().returning(move |_| {
        Ok(Some(StoredCredentials {
            user: stored_user(user_id),
            password_hash: "$argon2id$stub".to_owned(),
        }))
    });
    ports
        .passwords
        .expect_verify()
        .withf(|password, hash| password == "pain-chaud-2026" && hash == "$argon2id$stub")
        .returning(|_, _| Ok(true));
    let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"email": "aminata@fournil.gn", "password": "pain-chaud-2026"}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(has_session_cookie(&response));
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["id"], user_id.to_string());
}

#[rstest]
#[case::wrong_password(true)]
#[case::unknown_email(false)]
#[actix_web::test]
async fn login_failures_are_indistinguishable(#[case] known_email: bool) {
    let mut ports = TestPorts::default();
    ports.users.expect_find_credentials().returning(move |_| {
        Ok(known_email.then(|| StoredCredentials {
            user: stored_user(UserId::random()),
            password_hash: "$argon2id$stub".to_owned(),
        }))
    });
    ports.passwords.expect_verify().returning(|_, _| Ok(false));
    let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"email": "aminata@fournil.gn", "password": "mauvais-mot"}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(!has_session_cookie(&response));
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["message"], "invalid email or password");
}

#[actix_web::test]
async fn corrupt_stored_hash_is_redacted() {
    let mut ports = TestPorts::default();
    ports.users.expect_find_credentials().returning(|_| {
        Ok(Some(StoredCredentials {
            user: stored_user(UserId::random()),
            password_hash: "garbage".to_owned(),
        }))
    });
    ports
        .passwords
        .expect_verify()
        .returning(|_, _| Err(PasswordHashError::hash("bad PHC string")));
    let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"email": "aminata@fournil.gn", "password": "pain-chaud-2026"}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["message"], "Internal server error");
}

#[actix_web::test]
async fn profile_requires_a_session() {
    let app = actix_test::init_service(test_app(TestPorts::default().into_state(), routes)).await;
    let request = actix_test::TestRequest::get().uri("/api/v1/me").to_request();

    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn profile_lists_memberships() {
    let user_id = UserId::random();
    let restaurant_id = RestaurantId::random();
    let mut ports = TestPorts::default();
    ports
        .users
        .expect_find_by_id()
        .returning(move |id| Ok(Some(stored_user(*id))));
    ports.restaurants.expect_list_for_user().returning(move |_| {
        Ok(vec![RestaurantMembership {
            restaurant_id,
            name: "Fournil Kaloum".to_owned(),
            role: Role::Manager,
        }])
    });
    let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
    let cookie = session_cookie(&app, &user_id).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/me")
        .cookie(cookie)
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["user"]["id"], user_id.to_string());
    assert_eq!(body["restaurants"][0]["restaurantId"], restaurant_id.to_string());
    assert_eq!(body["restaurants"][0]["role"], "manager");
}

#[actix_web::test]
async fn logout_expires_the_cookie() {
    let app = actix_test::init_service(test_app(TestPorts::default().into_state(), routes)).await;
    let cookie = session_cookie(&app, &UserId::random()).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .cookie(cookie)
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cleared = response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("removal cookie");
    assert_eq!(cleared.value(), "");
}
