//! API Router with Swagger UI

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::jwt::JwtConfig;
use crate::auth::middleware::{
    auth_middleware, require_admin, require_doctor, require_patient, AuthState,
};
use crate::interfaces::http::common;
use crate::interfaces::http::common::views;
use crate::interfaces::http::modules::{admin, auth, doctor, health, patient, AppState};

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::handlers::health_check,
        // Auth
        auth::handlers::login,
        auth::handlers::register,
        auth::handlers::me,
        auth::handlers::logout,
        // Admin
        admin::handlers::dashboard,
        admin::handlers::list_doctors,
        admin::handlers::create_doctor,
        admin::handlers::list_patients,
        admin::handlers::create_patient,
        admin::handlers::delete_patient,
        admin::handlers::toggle_user_active,
        admin::handlers::list_appointments,
        admin::handlers::patient_history,
        // Doctor
        doctor::handlers::dashboard,
        doctor::handlers::appointment_detail,
        doctor::handlers::complete_appointment,
        doctor::handlers::patient_history,
        doctor::handlers::list_availability,
        doctor::handlers::declare_availability,
        // Patient
        patient::handlers::dashboard,
        patient::handlers::list_doctors,
        patient::handlers::book_appointment,
        patient::handlers::cancel_appointment,
        patient::handlers::appointment_history,
    ),
    components(
        schemas(
            // Common
            common::ApiResponse<String>,
            common::EmptyData,
            views::UserView,
            views::DoctorView,
            views::PatientView,
            views::AppointmentView,
            views::AvailabilityView,
            // Health
            health::handlers::HealthResponse,
            health::handlers::ComponentHealth,
            // Auth
            auth::dto::LoginRequest,
            auth::dto::LoginResponse,
            auth::dto::RegisterRequest,
            // Admin
            admin::dto::CreateDoctorRequest,
            admin::dto::CreatePatientRequest,
            admin::dto::DashboardResponse,
            // Doctor
            doctor::dto::CompleteAppointmentRequest,
            doctor::dto::DeclareAvailabilityRequest,
            doctor::dto::DoctorDashboardResponse,
            // Patient
            patient::dto::BookAppointmentRequest,
            patient::dto::PatientDashboardResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Server health check endpoints"),
        (name = "Authentication", description = "Login (JWT), registration, current user"),
        (name = "Admin", description = "Dashboards, doctor/patient management, full appointment list"),
        (name = "Doctor", description = "Daily schedule, appointment completion, availability windows"),
        (name = "Patient", description = "Booking, cancellation, appointment history"),
    ),
    info(
        title = "MedEase Hospital API",
        version = "1.0.0",
        description = "REST API for role-based hospital appointment management",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(db: DatabaseConnection, jwt_config: JwtConfig) -> Router {
    let state = AppState::new(db, jwt_config.clone());
    let auth_state = AuthState { jwt_config };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Auth routes (public)
    let auth_public_routes = Router::new()
        .route("/login", post(auth::handlers::login))
        .route("/register", post(auth::handlers::register))
        .with_state(state.clone());

    // Auth routes (protected, any role)
    let auth_protected_routes = Router::new()
        .route("/me", get(auth::handlers::me))
        .route("/logout", post(auth::handlers::logout))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(state.clone());

    // Admin routes: auth runs first, then the role guard.
    let admin_routes = Router::new()
        .route("/dashboard", get(admin::handlers::dashboard))
        .route(
            "/doctors",
            get(admin::handlers::list_doctors).post(admin::handlers::create_doctor),
        )
        .route(
            "/patients",
            get(admin::handlers::list_patients).post(admin::handlers::create_patient),
        )
        .route("/patients/{id}", delete(admin::handlers::delete_patient))
        .route(
            "/patients/{id}/history",
            get(admin::handlers::patient_history),
        )
        .route(
            "/users/{id}/toggle-active",
            post(admin::handlers::toggle_user_active),
        )
        .route("/appointments", get(admin::handlers::list_appointments))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(state.clone());

    let doctor_routes = Router::new()
        .route("/dashboard", get(doctor::handlers::dashboard))
        .route(
            "/appointments/{id}",
            get(doctor::handlers::appointment_detail),
        )
        .route(
            "/appointments/{id}/complete",
            post(doctor::handlers::complete_appointment),
        )
        .route(
            "/patients/{id}/history",
            get(doctor::handlers::patient_history),
        )
        .route(
            "/availability",
            get(doctor::handlers::list_availability).post(doctor::handlers::declare_availability),
        )
        .layer(middleware::from_fn(require_doctor))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(state.clone());

    let patient_routes = Router::new()
        .route("/dashboard", get(patient::handlers::dashboard))
        .route("/doctors", get(patient::handlers::list_doctors))
        .route(
            "/appointments",
            get(patient::handlers::appointment_history).post(patient::handlers::book_appointment),
        )
        .route(
            "/appointments/{id}/cancel",
            post(patient::handlers::cancel_appointment),
        )
        .layer(middleware::from_fn(require_patient))
        .layer(middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state.clone());

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(swagger_routes)
        .route("/health", get(health::handlers::health_check))
        .nest("/api/v1/auth", auth_public_routes)
        .nest("/api/v1/auth", auth_protected_routes)
        .nest("/api/v1/admin", admin_routes)
        .nest("/api/v1/doctor", doctor_routes)
        .nest("/api/v1/patient", patient_routes)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
