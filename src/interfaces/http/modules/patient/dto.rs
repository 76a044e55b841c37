//! Patient DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::interfaces::http::common::views::{AppointmentView, PatientView};

#[derive(Debug, Serialize, ToSchema)]
pub struct PatientDashboardResponse {
    pub profile: PatientView,
    /// Appointments from today onward, soonest first.
    pub upcoming_appointments: Vec<AppointmentView>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BookAppointmentRequest {
    #[validate(range(min = 1, message = "doctor_id must be positive"))]
    pub doctor_id: i32,
    /// `YYYY-MM-DD`
    #[validate(length(min = 1, message = "date is required"))]
    pub date: String,
    /// `HH:MM`, 24-hour
    #[validate(length(min = 1, message = "time is required"))]
    pub time: String,
    #[validate(length(max = 2000, message = "reason is too long"))]
    pub reason: Option<String>,
}
