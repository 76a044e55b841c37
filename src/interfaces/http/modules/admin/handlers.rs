//! Admin API handlers
//!
//! All routes here sit behind `auth_middleware` + `require_admin`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{CreateDoctorRequest, CreatePatientRequest, DashboardResponse};
use crate::application::identity::{CreateDoctorInput, CreatePatientInput};
use crate::auth::middleware::AuthenticatedUser;
use crate::domain::DomainError;
use crate::interfaces::http::common::views::{
    AppointmentView, DoctorView, PatientView, UserView,
};
use crate::interfaces::http::common::{ApiResponse, EmptyData, ValidatedJson};
use crate::interfaces::http::modules::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/admin/dashboard",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Counters and recent bookings", body = ApiResponse<DashboardResponse>),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn dashboard(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardResponse>>, DomainError> {
    let (doctors, patients, appointments) = state.identity.counts().await?;
    let recent = state.scheduling.recent(10).await?;

    Ok(Json(ApiResponse::success(DashboardResponse {
        doctors,
        patients,
        appointments,
        recent_appointments: recent.into_iter().map(AppointmentView::from).collect(),
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/doctors",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All doctors", body = ApiResponse<Vec<DoctorView>>)
    )
)]
pub async fn list_doctors(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<DoctorView>>>, DomainError> {
    let doctors = state.identity.list_doctors().await?;
    Ok(Json(ApiResponse::success(
        doctors.into_iter().map(DoctorView::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/doctors",
    tag = "Admin",
    security(("bearer_auth" = [])),
    request_body = CreateDoctorRequest,
    responses(
        (status = 201, description = "Doctor created", body = ApiResponse<DoctorView>),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn create_doctor(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateDoctorRequest>,
) -> Result<(StatusCode, Json<ApiResponse<DoctorView>>), DomainError> {
    let (user, doctor) = state
        .identity
        .create_doctor(CreateDoctorInput {
            name: request.name,
            email: request.email,
            password: request.password,
            specialization: request.specialization,
            contact: request.contact,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success((doctor, Some(user)).into())),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/patients",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All patients", body = ApiResponse<Vec<PatientView>>)
    )
)]
pub async fn list_patients(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<PatientView>>>, DomainError> {
    let patients = state.identity.list_patients().await?;
    Ok(Json(ApiResponse::success(
        patients.into_iter().map(PatientView::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/patients",
    tag = "Admin",
    security(("bearer_auth" = [])),
    request_body = CreatePatientRequest,
    responses(
        (status = 201, description = "Patient created", body = ApiResponse<PatientView>),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn create_patient(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreatePatientRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PatientView>>), DomainError> {
    let (user, patient) = state
        .identity
        .create_patient(CreatePatientInput {
            name: request.name,
            email: request.email,
            password: request.password,
            age: request.age,
            gender: request.gender,
            contact: request.contact,
            address: request.address,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success((patient, Some(user)).into())),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/patients/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient and their appointments removed", body = ApiResponse<EmptyData>),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<EmptyData>>, DomainError> {
    state.identity.delete_patient(id).await?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/users/{id}/toggle-active",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "Updated user", body = ApiResponse<UserView>),
        (status = 403, description = "Self-deactivation refused"),
        (status = 404, description = "User not found")
    )
)]
pub async fn toggle_user_active(
    State(state): State<AppState>,
    Extension(acting): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserView>>, DomainError> {
    let user = state.identity.toggle_user_active(acting.user_id, id).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/appointments",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Every appointment, ordered by date and time", body = ApiResponse<Vec<AppointmentView>>)
    )
)]
pub async fn list_appointments(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<AppointmentView>>>, DomainError> {
    let rows = state.scheduling.list_all().await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(AppointmentView::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/patients/{id}/history",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Appointment history for one patient", body = ApiResponse<Vec<AppointmentView>>),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn patient_history(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<AppointmentView>>>, DomainError> {
    let patient = state.scheduling.patient_by_id(id).await?;
    let rows = state.scheduling.history_for_patient(patient.id).await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(AppointmentView::from).collect(),
    )))
}
