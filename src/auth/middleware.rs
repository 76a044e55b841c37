//! Authentication middleware for Axum
//!
//! `auth_middleware` verifies the bearer token and injects an
//! [`AuthenticatedUser`] into the request extensions; the per-role guards
//! run after it and reject role mismatches. Rejections always carry a
//! user-visible message, never a bare status.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::jwt::{verify_token, Claims, JwtConfig};
use crate::infrastructure::database::entities::user::Role;

/// Authentication state for the middleware layer
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

/// Request-scoped authenticated identity, extracted from the token.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: i32,
    pub name: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            name: claims.name,
            role: claims.role,
        }
    }
}

/// Extract token from Authorization header
fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// JWT authentication middleware - requires a valid token
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(String::from);
    let Some(auth_header) = auth_header else {
        return guard_error(StatusCode::UNAUTHORIZED, "Please log in to continue.");
    };

    let Some(token) = extract_token(&auth_header) else {
        return guard_error(StatusCode::UNAUTHORIZED, "Invalid authentication token.");
    };

    match verify_token(token, &auth_state.jwt_config) {
        Ok(claims) => {
            if claims.is_expired() {
                return guard_error(StatusCode::UNAUTHORIZED, "Session has expired. Please log in again.");
            }

            let user = AuthenticatedUser::from_claims(claims);
            request.extensions_mut().insert(user);

            next.run(request).await
        }
        Err(_) => guard_error(StatusCode::UNAUTHORIZED, "Invalid authentication token."),
    }
}

/// Admin-only guard - must be layered after `auth_middleware`
pub async fn require_admin(request: Request<Body>, next: Next) -> Response {
    role_guard(request, next, Role::Admin, "Admin access required.").await
}

/// Doctor-only guard - must be layered after `auth_middleware`
pub async fn require_doctor(request: Request<Body>, next: Next) -> Response {
    role_guard(request, next, Role::Doctor, "Doctor access required.").await
}

/// Patient-only guard - must be layered after `auth_middleware`
pub async fn require_patient(request: Request<Body>, next: Next) -> Response {
    role_guard(request, next, Role::Patient, "Patient access required.").await
}

async fn role_guard(
    request: Request<Body>,
    next: Next,
    required: Role,
    message: &'static str,
) -> Response {
    let user = request.extensions().get::<AuthenticatedUser>();

    match user {
        Some(user) => match (user.role, required) {
            (Role::Admin, Role::Admin)
            | (Role::Doctor, Role::Doctor)
            | (Role::Patient, Role::Patient) => next.run(request).await,
            _ => guard_error(StatusCode::FORBIDDEN, message),
        },
        None => guard_error(StatusCode::UNAUTHORIZED, "Please log in to continue."),
    }
}

fn guard_error(status: StatusCode, message: &str) -> Response {
    let body = Json(json!({
        "success": false,
        "error": message
    }));

    (status, body).into_response()
}

#[cfg(test)]
mod tests {
    use axum::routing::get;
    use axum::{middleware, Extension, Router};
    use tower::ServiceExt;

    use super::*;
    use crate::auth::jwt::create_token;

    async fn whoami(Extension(user): Extension<AuthenticatedUser>) -> String {
        format!("{}:{}", user.user_id, user.role)
    }

    fn app(jwt_config: JwtConfig) -> Router {
        let state = AuthState { jwt_config };
        Router::new()
            .route("/doctor/me", get(whoami))
            .route_layer(middleware::from_fn(require_doctor))
            .route_layer(middleware::from_fn_with_state(state, auth_middleware))
    }

    fn get_with_token(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let resp = app(JwtConfig::default())
            .oneshot(get_with_token("/doctor/me", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        let resp = app(JwtConfig::default())
            .oneshot(get_with_token("/doctor/me", Some("not-a-jwt")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_role_is_forbidden() {
        let config = JwtConfig::default();
        let token = create_token(7, "Alice", Role::Patient, &config).unwrap();
        let resp = app(config)
            .oneshot(get_with_token("/doctor/me", Some(&token)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn matching_role_passes_through() {
        let config = JwtConfig::default();
        let token = create_token(9, "Dr. Bob", Role::Doctor, &config).unwrap();
        let resp = app(config)
            .oneshot(get_with_token("/doctor/me", Some(&token)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
