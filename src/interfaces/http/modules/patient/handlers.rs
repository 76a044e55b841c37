//! Patient API handlers
//!
//! All routes sit behind `auth_middleware` + `require_patient` and act on
//! the patient profile of the authenticated user.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{BookAppointmentRequest, PatientDashboardResponse};
use crate::application::scheduling::BookAppointmentInput;
use crate::auth::middleware::AuthenticatedUser;
use crate::domain::DomainError;
use crate::interfaces::http::common::views::{AppointmentView, DoctorView};
use crate::interfaces::http::common::{ApiResponse, ValidatedJson};
use crate::interfaces::http::modules::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/patient/dashboard",
    tag = "Patient",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile and upcoming appointments", body = ApiResponse<PatientDashboardResponse>),
        (status = 404, description = "No patient profile for this account")
    )
)]
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<PatientDashboardResponse>>, DomainError> {
    let patient = state.scheduling.patient_for_user(user.user_id).await?;
    let account = state.identity.get_user(user.user_id).await?;
    let rows = state.scheduling.upcoming_for_patient(&patient).await?;
    Ok(Json(ApiResponse::success(PatientDashboardResponse {
        profile: (patient, Some(account)).into(),
        upcoming_appointments: rows.into_iter().map(AppointmentView::from).collect(),
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/patient/doctors",
    tag = "Patient",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Doctors available for booking", body = ApiResponse<Vec<DoctorView>>)
    )
)]
pub async fn list_doctors(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<DoctorView>>>, DomainError> {
    let doctors = state.scheduling.bookable_doctors().await?;
    Ok(Json(ApiResponse::success(
        doctors.into_iter().map(DoctorView::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/patient/appointments",
    tag = "Patient",
    security(("bearer_auth" = [])),
    request_body = BookAppointmentRequest,
    responses(
        (status = 201, description = "Appointment booked as pending", body = ApiResponse<AppointmentView>),
        (status = 400, description = "Bad date or time format"),
        (status = 404, description = "Doctor not found"),
        (status = 409, description = "Slot already taken")
    )
)]
pub async fn book_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AppointmentView>>), DomainError> {
    let patient = state.scheduling.patient_for_user(user.user_id).await?;
    let created = state
        .scheduling
        .book(
            &patient,
            BookAppointmentInput {
                doctor_id: request.doctor_id,
                date: request.date,
                time: request.time,
                reason: request.reason,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(created.into())),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/patient/appointments/{id}/cancel",
    tag = "Patient",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment cancelled", body = ApiResponse<AppointmentView>),
        (status = 403, description = "Appointment belongs to another patient"),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Appointment is not pending")
    )
)]
pub async fn cancel_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<AppointmentView>>, DomainError> {
    let patient = state.scheduling.patient_for_user(user.user_id).await?;
    let cancelled = state.scheduling.cancel(&patient, id).await?;
    Ok(Json(ApiResponse::success(cancelled.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/patient/appointments",
    tag = "Patient",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Full appointment history", body = ApiResponse<Vec<AppointmentView>>)
    )
)]
pub async fn appointment_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<AppointmentView>>>, DomainError> {
    let patient = state.scheduling.patient_for_user(user.user_id).await?;
    let rows = state.scheduling.history_for_patient(patient.id).await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(AppointmentView::from).collect(),
    )))
}
