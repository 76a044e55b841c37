//! Admin DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::interfaces::http::common::views::AppointmentView;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDoctorRequest {
    #[validate(length(min = 1, max = 120, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    /// Falls back to the default doctor password when omitted.
    pub password: Option<String>,
    pub specialization: Option<String>,
    pub contact: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePatientRequest {
    #[validate(length(min = 1, max = 120, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    /// Falls back to the default patient password when omitted.
    pub password: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub contact: Option<String>,
    pub address: Option<String>,
}

/// Counters and the latest bookings for the admin landing view.
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub doctors: u64,
    pub patients: u64,
    pub appointments: u64,
    pub recent_appointments: Vec<AppointmentView>,
}
