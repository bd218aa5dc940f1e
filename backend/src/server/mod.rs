//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite, time::Duration as CookieDuration};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use fournil::Trace;
#[cfg(debug_assertions)]
use fournil::doc::ApiDoc;
use fournil::inbound::http::configure_api;
use fournil::inbound::http::error::extractor_config;
use fournil::inbound::http::health::{HealthState, live, ready};
use fournil::inbound::http::session_config::SESSION_TTL_HOURS;
use fournil::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn session_middleware(
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(CookieDuration::hours(SESSION_TTL_HOURS)),
        )
        .build()
}

/// Probes and, in debug builds, Swagger UI. None of these need a session.
fn configure_public(cfg: &mut web::ServiceConfig) {
    cfg.service(ready).service(live);
    #[cfg(debug_assertions)]
    cfg.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let api = web::scope("/api/v1")
        .wrap(session_middleware(key, cookie_secure, same_site))
        .configure(configure_api);

    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .configure(extractor_config)
        .wrap(Trace)
        .service(api)
        .configure(configure_public)
}

/// Construct an Actix HTTP server from the health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    mut config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&mut config);
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        ..
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    //! Routing that does not need a database.
    use actix_web::http::StatusCode;
    use actix_web::{HttpResponse, get, test as actix_test};
    use actix_session::Session;
    use rstest::rstest;

    use super::*;

    #[get("/api/v1/touch")]
    async fn touch(session: Session) -> actix_web::Result<HttpResponse> {
        session.insert("seen", true)?;
        Ok(HttpResponse::NoContent().finish())
    }

    #[rstest]
    #[actix_web::test]
    async fn probes_answer_without_a_session() {
        let health = web::Data::new(HealthState::new());
        health.mark_ready();
        let app = actix_test::init_service(
            App::new().app_data(health).configure(configure_public),
        )
        .await;

        for uri in ["/health/live", "/health/ready"] {
            let response =
                actix_test::call_service(&app, actix_test::TestRequest::get().uri(uri).to_request())
                    .await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn session_cookie_is_private_and_http_only() {
        let app = actix_test::init_service(
            App::new()
                .wrap(session_middleware(Key::generate(), true, SameSite::Strict))
                .service(touch),
        )
        .await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/v1/touch").to_request(),
        )
        .await;

        let cookie = response
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert!(!cookie.value().contains("seen"));
    }
}
