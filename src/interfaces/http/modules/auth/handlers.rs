//! Authentication API handlers
//!
//! Login and registration are public; `me` runs behind the auth
//! middleware. Logout is a client-side token discard and exists so the
//! API surface is explicit about it.

use axum::{extract::State, http::StatusCode, Extension, Json};

use super::dto::{LoginRequest, LoginResponse, RegisterRequest};
use crate::application::identity::RegisterInput;
use crate::auth::middleware::AuthenticatedUser;
use crate::domain::DomainError;
use crate::infrastructure::database::entities::user::Role;
use crate::interfaces::http::common::views::UserView;
use crate::interfaces::http::common::{ApiResponse, ValidatedJson};
use crate::interfaces::http::modules::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, DomainError> {
    let result = state.identity.login(&request.email, &request.password).await?;

    let landing = match result.user.role {
        Role::Admin => "/admin/dashboard",
        Role::Doctor => "/doctor/dashboard",
        Role::Patient => "/patient/dashboard",
    };

    Ok(Json(ApiResponse::success(LoginResponse {
        token: result.token,
        token_type: result.token_type,
        expires_in: result.expires_in,
        landing: landing.to_string(),
        user: result.user.into(),
    })))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<UserView>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserView>>), DomainError> {
    let user = state
        .identity
        .register(RegisterInput {
            name: request.name,
            email: request.email,
            password: request.password,
            confirm_password: request.confirm_password,
            role: None,
            age: request.age,
            gender: request.gender,
            contact: request.contact,
            address: request.address,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(user.into())),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserView>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<UserView>>, DomainError> {
    let user = state.identity.get_user(user.user_id).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Logged out", body = ApiResponse<String>)
    )
)]
pub async fn logout() -> Json<ApiResponse<String>> {
    // Tokens are stateless; the client discards its copy.
    Json(ApiResponse::success("You have been logged out.".to_string()))
}
