//! Tests for the account service.

use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::ports::{
    MockPasswordHasher, MockRestaurantRepository, MockUserRepository, StoredCredentials,
    UserRepositoryError,
};
use crate::domain::service_test_support::{fixture_clock, fixture_now};
use crate::domain::{EmailAddress, ErrorCode};

fn service(
    users: MockUserRepository,
    hasher: MockPasswordHasher,
    restaurants: MockRestaurantRepository,
) -> AccountService {
    AccountService::new(
        Arc::new(users),
        Arc::new(restaurants),
        Arc::new(hasher),
        fixture_clock(),
    )
}

fn stored_user() -> StoredCredentials {
    StoredCredentials {
        user: User {
            id: UserId::random(),
            display_name: "Awa".to_owned(),
            email: EmailAddress::parse("awa@example.gn").expect("email"),
            phone: None,
            created_at: fixture_now(),
        },
        password_hash: "$argon2id$stub".to_owned(),
    }
}

#[rstest]
#[tokio::test]
async fn register_hashes_before_storing() {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .withf(|password| password == "croissant")
        .return_once(|_| Ok("hashed".to_owned()));
    let mut users = MockUserRepository::new();
    users
        .expect_create()
        .withf(|user, hash| hash == "hashed" && user.email.as_str() == "awa@example.gn")
        .times(1)
        .return_once(|_, _| Ok(()));

    let registration =
        Registration::try_from_parts("Awa", "Awa@Example.gn", "croissant", None).expect("valid");
    let user = service(users, hasher, MockRestaurantRepository::new())
        .register(registration)
        .await
        .expect("registered");

    assert_eq!(user.display_name, "Awa");
    assert_eq!(user.created_at, fixture_now());
}

#[rstest]
#[tokio::test]
async fn register_reports_duplicate_email_as_conflict() {
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_hash().return_once(|_| Ok("hashed".to_owned()));
    let mut users = MockUserRepository::new();
    users
        .expect_create()
        .return_once(|_, _| Err(UserRepositoryError::duplicate_email()));

    let registration =
        Registration::try_from_parts("Awa", "awa@example.gn", "croissant", None).expect("valid");
    let err = service(users, hasher, MockRestaurantRepository::new())
        .register(registration)
        .await
        .expect_err("duplicate");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[case(None, false)]
#[case(Some(false), false)]
#[case(Some(true), true)]
#[tokio::test]
async fn login_accepts_only_matching_passwords(
    #[case] password_matches: Option<bool>,
    #[case] expected_ok: bool,
) {
    let mut users = MockUserRepository::new();
    let found = password_matches.map(|_| stored_user());
    users
        .expect_find_credentials()
        .return_once(move |_| Ok(found));
    let mut hasher = MockPasswordHasher::new();
    if let Some(matches) = password_matches {
        hasher.expect_verify().return_once(move |_, _| Ok(matches));
    }

    let credentials = LoginCredentials::try_from_parts("awa@example.gn", "secret").expect("valid");
    let result = service(users, hasher, MockRestaurantRepository::new())
        .login(credentials)
        .await;

    match result {
        Ok(user) => {
            assert!(expected_ok);
            assert_eq!(user.display_name, "Awa");
        }
        Err(err) => {
            assert!(!expected_ok);
            assert_eq!(err.code(), ErrorCode::Unauthorized);
            assert_eq!(err.message(), "invalid email or password");
        }
    }
}

#[rstest]
#[tokio::test]
async fn profile_of_missing_user_is_unauthorized() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().return_once(|_| Ok(None));

    let err = service(users, MockPasswordHasher::new(), MockRestaurantRepository::new())
        .profile(&UserId::random())
        .await
        .expect_err("missing user");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
}
