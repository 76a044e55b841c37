//! Appointment lifecycle service
//!
//! Booking, cancellation, completion and availability declaration, plus the
//! dashboard/history queries. The booking conflict check is an exact
//! (doctor, date, time) equality guard with no DB unique constraint behind
//! it, and declared availability windows are not consulted at booking time;
//! callers should not assume either is hardened.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::Serialize;
use tracing::info;

use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::appointment::AppointmentStatus;
use crate::infrastructure::database::entities::{appointment, availability, doctor, patient, user};

/// Booking request, date/time kept as text so format errors surface as
/// user-correctable validation messages.
#[derive(Debug, Clone)]
pub struct BookAppointmentInput {
    pub doctor_id: i32,
    pub date: String,
    pub time: String,
    pub reason: Option<String>,
}

/// Doctor's completion request for one appointment.
#[derive(Debug, Clone, Default)]
pub struct CompleteAppointmentInput {
    /// Resulting status; defaults to completed.
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DeclareAvailabilityInput {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

/// An appointment row together with resolved display names.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentRecord {
    #[serde(flatten)]
    pub appointment: appointment::Model,
    pub patient_name: Option<String>,
    pub doctor_name: Option<String>,
}

pub struct AppointmentService {
    db: DatabaseConnection,
}

fn parse_date(value: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| DomainError::Validation("Invalid date format. Use YYYY-MM-DD.".into()))
}

fn parse_time(value: &str) -> DomainResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| DomainError::Validation("Invalid time format. Use HH:MM (24-hour).".into()))
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let v = v.trim().to_string();
        if v.is_empty() {
            None
        } else {
            Some(v)
        }
    })
}

impl AppointmentService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ── Profile lookups ─────────────────────────────────────────

    /// Doctor profile for an authenticated user id.
    pub async fn doctor_for_user(&self, user_id: i32) -> DomainResult<doctor::Model> {
        doctor::Entity::find()
            .filter(doctor::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound("Doctor profile"))
    }

    /// Patient profile for an authenticated user id.
    pub async fn patient_for_user(&self, user_id: i32) -> DomainResult<patient::Model> {
        patient::Entity::find()
            .filter(patient::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound("Patient profile"))
    }

    pub async fn patient_by_id(&self, patient_id: i32) -> DomainResult<patient::Model> {
        patient::Entity::find_by_id(patient_id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound("Patient"))
    }

    // ── Lifecycle ───────────────────────────────────────────────

    /// Book a new appointment for a patient.
    ///
    /// Rejects when any appointment already occupies the exact
    /// (doctor, date, time) slot, regardless of that appointment's status.
    pub async fn book(
        &self,
        patient: &patient::Model,
        input: BookAppointmentInput,
    ) -> DomainResult<appointment::Model> {
        let doctor = doctor::Entity::find_by_id(input.doctor_id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound("Selected doctor"))?;

        let date = parse_date(&input.date)?;
        let time = parse_time(&input.time)?;

        let conflict = appointment::Entity::find()
            .filter(appointment::Column::DoctorId.eq(doctor.id))
            .filter(appointment::Column::Date.eq(date))
            .filter(appointment::Column::Time.eq(time))
            .one(&self.db)
            .await?;
        if conflict.is_some() {
            return Err(DomainError::StateConflict(
                "Selected doctor already has an appointment at that date and time.".into(),
            ));
        }

        let new_appointment = appointment::ActiveModel {
            patient_id: Set(patient.id),
            doctor_id: Set(Some(doctor.id)),
            date: Set(date),
            time: Set(time),
            reason: Set(blank_to_none(input.reason)),
            notes: Set(None),
            status: Set(AppointmentStatus::Pending),
            created_at: Set(Utc::now()),
            completed_at: Set(None),
            ..Default::default()
        };
        let created = new_appointment.insert(&self.db).await?;

        info!(
            appointment_id = created.id,
            patient_id = patient.id,
            doctor_id = doctor.id,
            "appointment booked"
        );
        Ok(created)
    }

    /// Cancel a pending appointment owned by the requesting patient.
    pub async fn cancel(
        &self,
        patient: &patient::Model,
        appointment_id: i32,
    ) -> DomainResult<appointment::Model> {
        let appt = appointment::Entity::find_by_id(appointment_id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound("Appointment"))?;

        if appt.patient_id != patient.id {
            return Err(DomainError::Forbidden(
                "You cannot cancel another patient's appointment.".into(),
            ));
        }
        if appt.status != AppointmentStatus::Pending {
            return Err(DomainError::StateConflict(format!(
                "Only pending appointments can be cancelled. Current status: {}",
                appt.status
            )));
        }

        let mut active: appointment::ActiveModel = appt.into();
        active.status = Set(AppointmentStatus::Cancelled);
        let updated = active.update(&self.db).await?;

        info!(appointment_id = updated.id, "appointment cancelled");
        Ok(updated)
    }

    /// Set the outcome of an appointment owned by the requesting doctor.
    ///
    /// The completion timestamp is stamped only when the resulting status
    /// is completed and cleared otherwise. Terminal states are not
    /// re-checked: completing again overwrites notes and timestamp.
    pub async fn complete(
        &self,
        doctor: &doctor::Model,
        appointment_id: i32,
        input: CompleteAppointmentInput,
    ) -> DomainResult<appointment::Model> {
        let appt = appointment::Entity::find_by_id(appointment_id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound("Appointment"))?;

        if appt.doctor_id != Some(doctor.id) {
            return Err(DomainError::Forbidden(
                "You are not authorized to update this appointment.".into(),
            ));
        }

        let status = input.status.unwrap_or(AppointmentStatus::Completed);

        let mut active: appointment::ActiveModel = appt.into();
        active.status = Set(status);
        active.notes = Set(blank_to_none(input.notes));
        active.completed_at = Set(if status == AppointmentStatus::Completed {
            Some(Utc::now())
        } else {
            None
        });
        let updated = active.update(&self.db).await?;

        info!(
            appointment_id = updated.id,
            status = %updated.status,
            "appointment updated"
        );
        Ok(updated)
    }

    /// Fetch one appointment, checking doctor ownership.
    pub async fn appointment_for_doctor(
        &self,
        doctor: &doctor::Model,
        appointment_id: i32,
    ) -> DomainResult<appointment::Model> {
        let appt = appointment::Entity::find_by_id(appointment_id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound("Appointment"))?;

        if appt.doctor_id != Some(doctor.id) {
            return Err(DomainError::Forbidden(
                "You are not authorized to view this appointment.".into(),
            ));
        }
        Ok(appt)
    }

    // ── Availability ────────────────────────────────────────────

    /// Declare an open window. The end must fall strictly after the start,
    /// compared as a full date+time to keep the check unambiguous.
    pub async fn declare_availability(
        &self,
        doctor: &doctor::Model,
        input: DeclareAvailabilityInput,
    ) -> DomainResult<availability::Model> {
        let date = parse_date(&input.date)?;
        let start = parse_time(&input.start_time)?;
        let end = parse_time(&input.end_time)?;

        let start_dt = NaiveDateTime::new(date, start);
        let end_dt = NaiveDateTime::new(date, end);
        if end_dt <= start_dt {
            return Err(DomainError::Validation(
                "End time must be after start time.".into(),
            ));
        }

        let window = availability::ActiveModel {
            doctor_id: Set(doctor.id),
            date: Set(date),
            start_time: Set(start),
            end_time: Set(end),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let created = window.insert(&self.db).await?;

        info!(doctor_id = doctor.id, availability_id = created.id, "availability declared");
        Ok(created)
    }

    /// A doctor's declared windows, most recent date first.
    pub async fn availability_for_doctor(
        &self,
        doctor: &doctor::Model,
    ) -> DomainResult<Vec<availability::Model>> {
        Ok(availability::Entity::find()
            .filter(availability::Column::DoctorId.eq(doctor.id))
            .order_by_desc(availability::Column::Date)
            .order_by_asc(availability::Column::StartTime)
            .all(&self.db)
            .await?)
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Today's appointments for a doctor, ordered by time.
    pub async fn today_for_doctor(
        &self,
        doctor: &doctor::Model,
    ) -> DomainResult<Vec<AppointmentRecord>> {
        let today = Utc::now().date_naive();
        let rows = appointment::Entity::find()
            .filter(appointment::Column::DoctorId.eq(doctor.id))
            .filter(appointment::Column::Date.eq(today))
            .order_by_asc(appointment::Column::Time)
            .all(&self.db)
            .await?;
        self.with_names(rows).await
    }

    /// A patient's upcoming appointments (today onward), ordered date/time.
    pub async fn upcoming_for_patient(
        &self,
        patient: &patient::Model,
    ) -> DomainResult<Vec<AppointmentRecord>> {
        let today = Utc::now().date_naive();
        let rows = appointment::Entity::find()
            .filter(appointment::Column::PatientId.eq(patient.id))
            .filter(appointment::Column::Date.gte(today))
            .order_by_asc(appointment::Column::Date)
            .order_by_asc(appointment::Column::Time)
            .all(&self.db)
            .await?;
        self.with_names(rows).await
    }

    /// Full appointment history for one patient, ordered date/time.
    pub async fn history_for_patient(
        &self,
        patient_id: i32,
    ) -> DomainResult<Vec<AppointmentRecord>> {
        let rows = appointment::Entity::find()
            .filter(appointment::Column::PatientId.eq(patient_id))
            .order_by_asc(appointment::Column::Date)
            .order_by_asc(appointment::Column::Time)
            .all(&self.db)
            .await?;
        self.with_names(rows).await
    }

    /// Every appointment in the system, ordered date/time.
    pub async fn list_all(&self) -> DomainResult<Vec<AppointmentRecord>> {
        let rows = appointment::Entity::find()
            .order_by_asc(appointment::Column::Date)
            .order_by_asc(appointment::Column::Time)
            .all(&self.db)
            .await?;
        self.with_names(rows).await
    }

    /// Most recent appointments for the admin dashboard.
    pub async fn recent(&self, limit: u64) -> DomainResult<Vec<AppointmentRecord>> {
        let rows = appointment::Entity::find()
            .order_by_desc(appointment::Column::Date)
            .order_by_desc(appointment::Column::Time)
            .limit(limit)
            .all(&self.db)
            .await?;
        self.with_names(rows).await
    }

    /// Doctors a patient can book with.
    pub async fn bookable_doctors(
        &self,
    ) -> DomainResult<Vec<(doctor::Model, Option<user::Model>)>> {
        Ok(doctor::Entity::find()
            .find_also_related(user::Entity)
            .all(&self.db)
            .await?)
    }

    /// Resolve patient/doctor display names for a batch of appointments.
    async fn with_names(
        &self,
        rows: Vec<appointment::Model>,
    ) -> DomainResult<Vec<AppointmentRecord>> {
        let patient_ids: Vec<i32> = rows.iter().map(|a| a.patient_id).collect();
        let doctor_ids: Vec<i32> = rows.iter().filter_map(|a| a.doctor_id).collect();

        let patients = patient::Entity::find()
            .filter(patient::Column::Id.is_in(patient_ids))
            .find_also_related(user::Entity)
            .all(&self.db)
            .await?;
        let doctors = doctor::Entity::find()
            .filter(doctor::Column::Id.is_in(doctor_ids))
            .find_also_related(user::Entity)
            .all(&self.db)
            .await?;

        let patient_names: std::collections::HashMap<i32, String> = patients
            .into_iter()
            .filter_map(|(p, u)| u.map(|u| (p.id, u.name)))
            .collect();
        let doctor_names: std::collections::HashMap<i32, String> = doctors
            .into_iter()
            .filter_map(|(d, u)| u.map(|u| (d.id, u.name)))
            .collect();

        Ok(rows
            .into_iter()
            .map(|appointment| AppointmentRecord {
                patient_name: patient_names.get(&appointment.patient_id).cloned(),
                doctor_name: appointment
                    .doctor_id
                    .and_then(|id| doctor_names.get(&id).cloned()),
                appointment,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    use super::*;
    use crate::application::identity::{CreateDoctorInput, IdentityService, RegisterInput};
    use crate::auth::jwt::JwtConfig;
    use crate::infrastructure::database::migrator::Migrator;

    struct Fixture {
        identity: IdentityService,
        scheduling: AppointmentService,
    }

    async fn fixture() -> Fixture {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        Fixture {
            identity: IdentityService::new(db.clone(), JwtConfig::default()),
            scheduling: AppointmentService::new(db),
        }
    }

    impl Fixture {
        async fn patient(&self, name: &str, email: &str) -> patient::Model {
            let user = self
                .identity
                .register(RegisterInput {
                    name: name.into(),
                    email: email.into(),
                    password: "secret123".into(),
                    confirm_password: "secret123".into(),
                    ..Default::default()
                })
                .await
                .unwrap();
            self.scheduling.patient_for_user(user.id).await.unwrap()
        }

        async fn doctor(&self, name: &str, email: &str) -> doctor::Model {
            let (user, _) = self
                .identity
                .create_doctor(CreateDoctorInput {
                    name: name.into(),
                    email: email.into(),
                    ..Default::default()
                })
                .await
                .unwrap();
            self.scheduling.doctor_for_user(user.id).await.unwrap()
        }
    }

    fn booking(doctor_id: i32, date: &str, time: &str) -> BookAppointmentInput {
        BookAppointmentInput {
            doctor_id,
            date: date.into(),
            time: time.into(),
            reason: Some("checkup".into()),
        }
    }

    #[tokio::test]
    async fn booking_rejects_unknown_doctor_and_bad_formats() {
        let fx = fixture().await;
        let alice = fx.patient("Alice", "alice@example.com").await;

        let err = fx
            .scheduling
            .book(&alice, booking(999, "2025-01-10", "09:00"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Selected doctor not found.");

        let bob = fx.doctor("Dr. Bob", "bob@example.com").await;
        let err = fx
            .scheduling
            .book(&alice, booking(bob.id, "10-01-2025", "09:00"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid date format. Use YYYY-MM-DD.");

        let err = fx
            .scheduling
            .book(&alice, booking(bob.id, "2025-01-10", "9 am"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid time format. Use HH:MM (24-hour).");
    }

    #[tokio::test]
    async fn double_booking_is_rejected_regardless_of_status() {
        let fx = fixture().await;
        let alice = fx.patient("Alice", "alice@example.com").await;
        let carol = fx.patient("Carol", "carol@example.com").await;
        let bob = fx.doctor("Dr. Bob", "bob@example.com").await;

        let first = fx
            .scheduling
            .book(&alice, booking(bob.id, "2025-01-10", "09:00"))
            .await
            .unwrap();
        assert_eq!(first.status, AppointmentStatus::Pending);

        let err = fx
            .scheduling
            .book(&carol, booking(bob.id, "2025-01-10", "09:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::StateConflict(_)));

        // Cancelled appointments still occupy the slot.
        fx.scheduling.cancel(&alice, first.id).await.unwrap();
        let err = fx
            .scheduling
            .book(&carol, booking(bob.id, "2025-01-10", "09:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::StateConflict(_)));

        // A different time is fine.
        fx.scheduling
            .book(&carol, booking(bob.id, "2025-01-10", "09:30"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn cancel_is_owner_only_and_pending_only() {
        let fx = fixture().await;
        let alice = fx.patient("Alice", "alice@example.com").await;
        let carol = fx.patient("Carol", "carol@example.com").await;
        let bob = fx.doctor("Dr. Bob", "bob@example.com").await;

        let appt = fx
            .scheduling
            .book(&alice, booking(bob.id, "2025-01-10", "09:00"))
            .await
            .unwrap();

        let err = fx.scheduling.cancel(&carol, appt.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let cancelled = fx.scheduling.cancel(&alice, appt.id).await.unwrap();
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

        // Terminal state: a second cancel names the current status.
        let err = fx.scheduling.cancel(&alice, appt.id).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Only pending appointments can be cancelled. Current status: cancelled"
        );
    }

    #[tokio::test]
    async fn completion_stamps_timestamp_only_when_completed() {
        let fx = fixture().await;
        let alice = fx.patient("Alice", "alice@example.com").await;
        let bob = fx.doctor("Dr. Bob", "bob@example.com").await;
        let eve = fx.doctor("Dr. Eve", "eve@example.com").await;

        let appt = fx
            .scheduling
            .book(&alice, booking(bob.id, "2025-01-10", "09:00"))
            .await
            .unwrap();

        let err = fx
            .scheduling
            .complete(&eve, appt.id, CompleteAppointmentInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        // Explicit non-completed status leaves the timestamp null.
        let updated = fx
            .scheduling
            .complete(
                &bob,
                appt.id,
                CompleteAppointmentInput {
                    status: Some(AppointmentStatus::Pending),
                    notes: Some("  ".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, AppointmentStatus::Pending);
        assert!(updated.completed_at.is_none());
        assert!(updated.notes.is_none());

        // Default status is completed and stamps the timestamp.
        let updated = fx
            .scheduling
            .complete(
                &bob,
                appt.id,
                CompleteAppointmentInput {
                    status: None,
                    notes: Some("ok".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, AppointmentStatus::Completed);
        assert!(updated.completed_at.is_some());
        assert_eq!(updated.notes.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn availability_requires_positive_duration() {
        let fx = fixture().await;
        let bob = fx.doctor("Dr. Bob", "bob@example.com").await;

        let window = |start: &str, end: &str| DeclareAvailabilityInput {
            date: "2025-01-10".into(),
            start_time: start.into(),
            end_time: end.into(),
        };

        let err = fx
            .scheduling
            .declare_availability(&bob, window("10:00", "10:00"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "End time must be after start time.");

        let err = fx
            .scheduling
            .declare_availability(&bob, window("10:00", "09:00"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "End time must be after start time.");

        // One minute of positive duration is enough.
        let created = fx
            .scheduling
            .declare_availability(&bob, window("10:00", "10:01"))
            .await
            .unwrap();
        assert!(created.end_time > created.start_time);

        let windows = fx.scheduling.availability_for_doctor(&bob).await.unwrap();
        assert_eq!(windows.len(), 1);
    }

    #[tokio::test]
    async fn booking_ignores_declared_availability() {
        // Windows are advisory; booking never consults them.
        let fx = fixture().await;
        let alice = fx.patient("Alice", "alice@example.com").await;
        let bob = fx.doctor("Dr. Bob", "bob@example.com").await;

        let appt = fx
            .scheduling
            .book(&alice, booking(bob.id, "2025-01-10", "23:00"))
            .await
            .unwrap();
        assert_eq!(appt.status, AppointmentStatus::Pending);
    }

    #[tokio::test]
    async fn history_resolves_display_names() {
        let fx = fixture().await;
        let alice = fx.patient("Alice", "alice@example.com").await;
        let bob = fx.doctor("Dr. Bob", "bob@example.com").await;

        fx.scheduling
            .book(&alice, booking(bob.id, "2025-01-10", "09:00"))
            .await
            .unwrap();
        fx.scheduling
            .book(&alice, booking(bob.id, "2025-01-09", "10:00"))
            .await
            .unwrap();

        let history = fx.scheduling.history_for_patient(alice.id).await.unwrap();
        assert_eq!(history.len(), 2);
        // Ordered by date, then time.
        assert!(history[0].appointment.date < history[1].appointment.date);
        assert_eq!(history[0].patient_name.as_deref(), Some("Alice"));
        assert_eq!(history[0].doctor_name.as_deref(), Some("Dr. Bob"));
    }

    #[tokio::test]
    async fn full_booking_scenario() {
        let fx = fixture().await;
        let alice = fx.patient("Alice", "alice@example.com").await;
        let carol = fx.patient("Carol", "carol@example.com").await;
        let bob = fx.doctor("Dr. Bob", "bob@example.com").await;

        let appt = fx
            .scheduling
            .book(&alice, booking(bob.id, "2025-01-10", "09:00"))
            .await
            .unwrap();
        assert_eq!(appt.status, AppointmentStatus::Pending);

        assert!(fx
            .scheduling
            .book(&carol, booking(bob.id, "2025-01-10", "09:00"))
            .await
            .is_err());

        let done = fx
            .scheduling
            .complete(
                &bob,
                appt.id,
                CompleteAppointmentInput {
                    status: None,
                    notes: Some("ok".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(done.status, AppointmentStatus::Completed);
        assert!(done.completed_at.is_some());

        let err = fx.scheduling.cancel(&alice, appt.id).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Only pending appointments can be cancelled. Current status: completed"
        );
    }
}
