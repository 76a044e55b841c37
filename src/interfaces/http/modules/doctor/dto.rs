//! Doctor DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::infrastructure::database::entities::appointment::AppointmentStatus;
use crate::interfaces::http::common::views::{AppointmentView, DoctorView};

#[derive(Debug, Serialize, ToSchema)]
pub struct DoctorDashboardResponse {
    pub profile: DoctorView,
    /// Today's appointments, ordered by time.
    pub today_appointments: Vec<AppointmentView>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CompleteAppointmentRequest {
    /// Resulting status; defaults to `completed` when omitted.
    pub status: Option<AppointmentStatus>,
    #[validate(length(max = 2000, message = "notes are too long"))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DeclareAvailabilityRequest {
    #[validate(length(min = 1, message = "date is required"))]
    pub date: String,
    #[validate(length(min = 1, message = "start_time is required"))]
    pub start_time: String,
    #[validate(length(min = 1, message = "end_time is required"))]
    pub end_time: String,
}
