//! Read-model DTOs returned by the API.
//!
//! Entities stay internal; these views join in display names and never
//! expose password hashes.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::scheduling::AppointmentRecord;
use crate::infrastructure::database::entities::appointment::AppointmentStatus;
use crate::infrastructure::database::entities::user::Role;
use crate::infrastructure::database::entities::{availability, doctor, patient, user};

#[derive(Debug, Serialize, ToSchema)]
pub struct UserView {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserView {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            role: m.role,
            is_active: m.is_active,
            created_at: m.created_at,
        }
    }
}

/// Doctor profile joined with its account row.
#[derive(Debug, Serialize, ToSchema)]
pub struct DoctorView {
    pub id: i32,
    pub user_id: i32,
    pub name: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
    pub specialization: Option<String>,
    pub contact: Option<String>,
}

impl From<(doctor::Model, Option<user::Model>)> for DoctorView {
    fn from((d, u): (doctor::Model, Option<user::Model>)) -> Self {
        Self {
            id: d.id,
            user_id: d.user_id,
            name: u.as_ref().map(|u| u.name.clone()),
            email: u.as_ref().map(|u| u.email.clone()),
            is_active: u.as_ref().map(|u| u.is_active),
            specialization: d.specialization,
            contact: d.contact,
        }
    }
}

/// Patient profile joined with its account row.
#[derive(Debug, Serialize, ToSchema)]
pub struct PatientView {
    pub id: i32,
    pub user_id: i32,
    pub name: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

impl From<(patient::Model, Option<user::Model>)> for PatientView {
    fn from((p, u): (patient::Model, Option<user::Model>)) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            name: u.as_ref().map(|u| u.name.clone()),
            email: u.as_ref().map(|u| u.email.clone()),
            is_active: u.as_ref().map(|u| u.is_active),
            age: p.age,
            gender: p.gender,
            contact: p.contact,
            address: p.address,
            notes: p.notes,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AppointmentView {
    pub id: i32,
    pub patient_id: i32,
    pub doctor_id: Option<i32>,
    pub patient_name: Option<String>,
    pub doctor_name: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<AppointmentRecord> for AppointmentView {
    fn from(r: AppointmentRecord) -> Self {
        let a = r.appointment;
        Self {
            id: a.id,
            patient_id: a.patient_id,
            doctor_id: a.doctor_id,
            patient_name: r.patient_name,
            doctor_name: r.doctor_name,
            date: a.date,
            time: a.time,
            reason: a.reason,
            notes: a.notes,
            status: a.status,
            created_at: a.created_at,
            completed_at: a.completed_at,
        }
    }
}

impl From<crate::infrastructure::database::entities::appointment::Model> for AppointmentView {
    fn from(a: crate::infrastructure::database::entities::appointment::Model) -> Self {
        Self {
            id: a.id,
            patient_id: a.patient_id,
            doctor_id: a.doctor_id,
            patient_name: None,
            doctor_name: None,
            date: a.date,
            time: a.time,
            reason: a.reason,
            notes: a.notes,
            status: a.status,
            created_at: a.created_at,
            completed_at: a.completed_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailabilityView {
    pub id: i32,
    pub doctor_id: i32,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl From<availability::Model> for AvailabilityView {
    fn from(m: availability::Model) -> Self {
        Self {
            id: m.id,
            doctor_id: m.doctor_id,
            date: m.date,
            start_time: m.start_time,
            end_time: m.end_time,
        }
    }
}
