//! Doctor API handlers
//!
//! All routes sit behind `auth_middleware` + `require_doctor`. Every
//! handler first resolves the doctor profile for the authenticated user,
//! so a doctor account without a profile row gets a 404 rather than
//! someone else's data.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{CompleteAppointmentRequest, DeclareAvailabilityRequest, DoctorDashboardResponse};
use crate::application::scheduling::{CompleteAppointmentInput, DeclareAvailabilityInput};
use crate::auth::middleware::AuthenticatedUser;
use crate::domain::DomainError;
use crate::interfaces::http::common::views::{AppointmentView, AvailabilityView};
use crate::interfaces::http::common::{ApiResponse, ValidatedJson};
use crate::interfaces::http::modules::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/doctor/dashboard",
    tag = "Doctor",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile and today's appointments", body = ApiResponse<DoctorDashboardResponse>),
        (status = 404, description = "No doctor profile for this account")
    )
)]
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<DoctorDashboardResponse>>, DomainError> {
    let doctor = state.scheduling.doctor_for_user(user.user_id).await?;
    let account = state.identity.get_user(user.user_id).await?;
    let rows = state.scheduling.today_for_doctor(&doctor).await?;
    Ok(Json(ApiResponse::success(DoctorDashboardResponse {
        profile: (doctor, Some(account)).into(),
        today_appointments: rows.into_iter().map(AppointmentView::from).collect(),
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/doctor/appointments/{id}",
    tag = "Doctor",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment detail", body = ApiResponse<AppointmentView>),
        (status = 403, description = "Appointment belongs to another doctor"),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn appointment_detail(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<AppointmentView>>, DomainError> {
    let doctor = state.scheduling.doctor_for_user(user.user_id).await?;
    let appt = state.scheduling.appointment_for_doctor(&doctor, id).await?;
    Ok(Json(ApiResponse::success(appt.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/doctor/appointments/{id}/complete",
    tag = "Doctor",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Appointment id")),
    request_body = CompleteAppointmentRequest,
    responses(
        (status = 200, description = "Updated appointment", body = ApiResponse<AppointmentView>),
        (status = 403, description = "Appointment belongs to another doctor"),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn complete_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<CompleteAppointmentRequest>,
) -> Result<Json<ApiResponse<AppointmentView>>, DomainError> {
    let doctor = state.scheduling.doctor_for_user(user.user_id).await?;
    let updated = state
        .scheduling
        .complete(
            &doctor,
            id,
            CompleteAppointmentInput {
                status: request.status,
                notes: request.notes,
            },
        )
        .await?;
    Ok(Json(ApiResponse::success(updated.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/doctor/patients/{id}/history",
    tag = "Doctor",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Appointment history for one patient", body = ApiResponse<Vec<AppointmentView>>),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn patient_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<AppointmentView>>>, DomainError> {
    state.scheduling.doctor_for_user(user.user_id).await?;
    let patient = state.scheduling.patient_by_id(id).await?;
    let rows = state.scheduling.history_for_patient(patient.id).await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(AppointmentView::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/doctor/availability",
    tag = "Doctor",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Declared windows, latest date first", body = ApiResponse<Vec<AvailabilityView>>)
    )
)]
pub async fn list_availability(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<AvailabilityView>>>, DomainError> {
    let doctor = state.scheduling.doctor_for_user(user.user_id).await?;
    let windows = state.scheduling.availability_for_doctor(&doctor).await?;
    Ok(Json(ApiResponse::success(
        windows.into_iter().map(AvailabilityView::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/doctor/availability",
    tag = "Doctor",
    security(("bearer_auth" = [])),
    request_body = DeclareAvailabilityRequest,
    responses(
        (status = 201, description = "Window declared", body = ApiResponse<AvailabilityView>),
        (status = 400, description = "End does not fall after start")
    )
)]
pub async fn declare_availability(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<DeclareAvailabilityRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AvailabilityView>>), DomainError> {
    let doctor = state.scheduling.doctor_for_user(user.user_id).await?;
    let created = state
        .scheduling
        .declare_availability(
            &doctor,
            DeclareAvailabilityInput {
                date: request.date,
                start_time: request.start_time,
                end_time: request.end_time,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(created.into())),
    ))
}
