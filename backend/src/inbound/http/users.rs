//! Account and session handlers.
//!
//! ```text
//! POST /api/v1/auth/register {"displayName":"Aminata","email":"a@fournil.gn","password":"..."}
//! POST /api/v1/auth/login    {"email":"a@fournil.gn","password":"..."}
//! POST /api/v1/auth/logout
//! GET  /api/v1/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::{
    CredentialValidationError, Error, LoginCredentials, Profile, Registration, User,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Registration body for `POST /api/v1/auth/register`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub display_name: String,
    pub email: String,
    #[schema(value_type = String, format = Password)]
    pub password: Zeroizing<String>,
    pub phone: Option<String>,
}

/// Login body for `POST /api/v1/auth/login`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    #[schema(value_type = String, format = Password)]
    pub password: Zeroizing<String>,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = CredentialValidationError;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            &value.display_name,
            &value.email,
            &value.password,
            value.phone.as_deref(),
        )
    }
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = CredentialValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

fn map_credential_error(err: CredentialValidationError) -> Error {
    let code = match err {
        CredentialValidationError::Contact(_) => "invalid_format",
        CredentialValidationError::EmptyPassword => "empty_password",
        CredentialValidationError::PasswordTooShort => "password_too_short",
    };
    Error::invalid_field(err.field(), code, err.to_string())
}

/// Create an account and sign it in.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration =
        Registration::try_from(payload.into_inner()).map_err(map_credential_error)?;
    let user = state.accounts.register(registration).await?;
    session.sign_in(&user.id)?;
    Ok(HttpResponse::Created().json(user))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<User>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_credential_error)?;
    let user = state.accounts.login(credentials).await?;
    session.sign_in(&user.id)?;
    info!(user_id = %user.id, "signed in");
    Ok(web::Json(user))
}

/// End the session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.sign_out();
    HttpResponse::NoContent().finish()
}

/// Current user and the restaurants they belong to.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Profile", body = Profile),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Profile>> {
    let user_id = session.require_user()?;
    let profile = state.accounts.profile(&user_id).await?;
    Ok(web::Json(profile))
}

/// Register the account routes.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(logout)
        .service(current_user);
}

#[cfg(test)]
mod tests;
