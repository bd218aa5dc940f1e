//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, test as actix_test, web};

use crate::domain::ports::{
    MockBankRepository, MockDebtRepository, MockExpenseRepository, MockInventoryRepository,
    MockPasswordHasher, MockReferenceRepository, MockReportRepository, MockRestaurantRepository,
    MockSaleRepository, MockSmsGateway, MockUserRepository,
};
use crate::domain::service_test_support::fixture_clock;
use crate::domain::{Error, RestaurantId, Role, UserId};
use crate::inbound::http::cron::CronSecret;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Bearer secret configured on test states.
pub const TEST_CRON_SECRET: &str = "test-cron-secret";

const SIGN_IN_PATH: &str = "/__test/sign-in/{user_id}";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// One `mockall` double per port. Set expectations, then call
/// [`TestPorts::into_state`].
#[derive(Default)]
pub struct TestPorts {
    pub users: MockUserRepository,
    pub restaurants: MockRestaurantRepository,
    pub reference: MockReferenceRepository,
    pub inventory: MockInventoryRepository,
    pub sales: MockSaleRepository,
    pub expenses: MockExpenseRepository,
    pub debts: MockDebtRepository,
    pub bank: MockBankRepository,
    pub reports: MockReportRepository,
    pub passwords: MockPasswordHasher,
    pub sms: MockSmsGateway,
}

impl TestPorts {
    /// Every membership lookup succeeds with `role`.
    pub fn member_of(&mut self, role: Role) -> &mut Self {
        self.restaurants
            .expect_find_role()
            .returning(move |_, _| Ok(Some(role)));
        self
    }

    /// Wire the doubles into an [`HttpState`] with a fixed clock.
    pub fn into_state(self) -> HttpState {
        HttpState::new(
            HttpStatePorts {
                users: Arc::new(self.users),
                restaurants: Arc::new(self.restaurants),
                reference: Arc::new(self.reference),
                inventory: Arc::new(self.inventory),
                sales: Arc::new(self.sales),
                expenses: Arc::new(self.expenses),
                debts: Arc::new(self.debts),
                bank: Arc::new(self.bank),
                reports: Arc::new(self.reports),
                passwords: Arc::new(self.passwords),
                sms: Arc::new(self.sms),
                clock: fixture_clock(),
            },
            CronSecret::new(Some(TEST_CRON_SECRET)),
        )
    }
}

async fn sign_in(session: SessionContext, path: web::Path<String>) -> Result<HttpResponse, Error> {
    let user_id: UserId = path
        .parse()
        .map_err(|_| Error::invalid_request("test user id must be a UUID"))?;
    session.sign_in(&user_id)?;
    Ok(HttpResponse::NoContent().finish())
}

/// App with session middleware, the given state, and `routes` mounted
/// under `/api/v1`.
pub fn test_app<F>(
    state: HttpState,
    routes: F,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    F: FnOnce(&mut web::ServiceConfig),
{
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .route(SIGN_IN_PATH, web::post().to(sign_in))
        .service(web::scope("/api/v1").configure(routes))
}

/// Sign `user_id` in and return the session cookie.
pub async fn session_cookie<S, B>(app: &S, user_id: &UserId) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let request = actix_test::TestRequest::post()
        .uri(&format!("/__test/sign-in/{user_id}"))
        .to_request();
    let response = actix_test::call_service(app, request).await;
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("test sign-in sets the session cookie")
}

/// Path under a restaurant, e.g. `/api/v1/restaurants/{id}/sales`.
pub fn restaurant_uri(restaurant_id: &RestaurantId, suffix: &str) -> String {
    format!("/api/v1/restaurants/{restaurant_id}{suffix}")
}
