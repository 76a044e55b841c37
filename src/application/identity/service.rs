//! Identity service - application-layer orchestration
//!
//! All account-related business logic lives here: login, self-registration,
//! and the admin-side management of doctor/patient accounts. Writes that
//! touch more than one table run inside a single transaction, so a partial
//! insert is always rolled back.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, TransactionTrait,
};
use tracing::info;

use crate::auth::jwt::{create_token, JwtConfig};
use crate::auth::password::{hash_password, verify_password};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{appointment, doctor, patient, user};
use crate::infrastructure::database::entities::user::Role;

/// Default password for doctor accounts created without one.
const DEFAULT_DOCTOR_PASSWORD: &str = "changeme123";
/// Default password for patient accounts created without one.
const DEFAULT_PATIENT_PASSWORD: &str = "patient123";

/// Authentication result returned after a successful login
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: user::Model,
}

/// Self-registration input. Patient profile fields apply when role is patient.
#[derive(Debug, Clone, Default)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Option<Role>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub contact: Option<String>,
    pub address: Option<String>,
}

/// Admin input for creating a doctor account plus profile.
#[derive(Debug, Clone, Default)]
pub struct CreateDoctorInput {
    pub name: String,
    pub email: String,
    /// Falls back to the default doctor password when empty.
    pub password: Option<String>,
    pub specialization: Option<String>,
    pub contact: Option<String>,
}

/// Admin input for creating a patient account plus profile.
#[derive(Debug, Clone, Default)]
pub struct CreatePatientInput {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub contact: Option<String>,
    pub address: Option<String>,
}

pub struct IdentityService {
    db: DatabaseConnection,
    jwt_config: JwtConfig,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
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

impl IdentityService {
    pub fn new(db: DatabaseConnection, jwt_config: JwtConfig) -> Self {
        Self { db, jwt_config }
    }

    // ── Authentication ──────────────────────────────────────────

    /// Authenticate by email + password and return a JWT.
    ///
    /// Failure modes are reported distinctly (unknown email, deactivated
    /// account, wrong password). This leaks account existence; the distinct
    /// messages are a deliberate part of the UX.
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthResult> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(DomainError::Validation(
                "Please enter both email and password.".into(),
            ));
        }

        let user = user::Entity::find()
            .filter(user::Column::Email.eq(&email))
            .one(&self.db)
            .await?;

        let Some(user) = user else {
            return Err(DomainError::Unauthorized(
                "No account found with that email.".into(),
            ));
        };

        if !user.is_active {
            return Err(DomainError::Unauthorized(
                "This account has been deactivated. Contact admin.".into(),
            ));
        }

        let valid = verify_password(password, &user.password_hash).unwrap_or(false);
        if !valid {
            return Err(DomainError::Unauthorized("Incorrect password.".into()));
        }

        let token = create_token(user.id, &user.name, user.role, &self.jwt_config)
            .map_err(|e| DomainError::Validation(format!("Failed to create token: {}", e)))?;

        info!(user_id = user.id, role = %user.role, "user logged in");

        Ok(AuthResult {
            token,
            token_type: "Bearer".into(),
            expires_in: self.jwt_config.expiration_hours * 3600,
            user,
        })
    }

    // ── Registration ────────────────────────────────────────────

    /// Self-registration. When the role is patient, the patient profile is
    /// created in the same transaction as the user row.
    pub async fn register(&self, input: RegisterInput) -> DomainResult<user::Model> {
        let name = input.name.trim().to_string();
        let email = normalize_email(&input.email);

        if name.is_empty() || email.is_empty() || input.password.is_empty() {
            return Err(DomainError::Validation(
                "Please fill in all required fields (name, email, password).".into(),
            ));
        }
        if input.password != input.confirm_password {
            return Err(DomainError::Validation("Passwords do not match.".into()));
        }

        self.ensure_email_free(&email).await?;

        let role = input.role.unwrap_or(Role::Patient);
        let password_hash = hash_password(&input.password)
            .map_err(|e| DomainError::Validation(format!("Failed to hash password: {}", e)))?;

        let created = self
            .db
            .transaction::<_, user::Model, DomainError>(|txn| {
                Box::pin(async move {
                    let new_user = user::ActiveModel {
                        name: Set(name),
                        email: Set(email),
                        password_hash: Set(password_hash),
                        role: Set(role),
                        is_active: Set(true),
                        created_at: Set(Utc::now()),
                        ..Default::default()
                    };
                    let created = new_user.insert(txn).await?;

                    if role == Role::Patient {
                        let profile = patient::ActiveModel {
                            user_id: Set(created.id),
                            age: Set(input.age),
                            gender: Set(blank_to_none(input.gender)),
                            contact: Set(blank_to_none(input.contact)),
                            address: Set(blank_to_none(input.address)),
                            notes: Set(None),
                            ..Default::default()
                        };
                        profile.insert(txn).await?;
                    }

                    Ok(created)
                })
            })
            .await?;

        info!(user_id = created.id, role = %created.role, "account registered");
        Ok(created)
    }

    // ── Admin management ────────────────────────────────────────

    /// Create a doctor account and profile atomically.
    pub async fn create_doctor(
        &self,
        input: CreateDoctorInput,
    ) -> DomainResult<(user::Model, doctor::Model)> {
        let name = input.name.trim().to_string();
        let email = normalize_email(&input.email);
        if name.is_empty() || email.is_empty() {
            return Err(DomainError::Validation(
                "Name and email are required to add a doctor.".into(),
            ));
        }

        self.ensure_email_free(&email).await?;

        let password = blank_to_none(input.password)
            .unwrap_or_else(|| DEFAULT_DOCTOR_PASSWORD.to_string());
        let password_hash = hash_password(&password)
            .map_err(|e| DomainError::Validation(format!("Failed to hash password: {}", e)))?;

        let created = self
            .db
            .transaction::<_, (user::Model, doctor::Model), DomainError>(|txn| {
                Box::pin(async move {
                    let new_user = user::ActiveModel {
                        name: Set(name),
                        email: Set(email),
                        password_hash: Set(password_hash),
                        role: Set(Role::Doctor),
                        is_active: Set(true),
                        created_at: Set(Utc::now()),
                        ..Default::default()
                    };
                    let created_user = new_user.insert(txn).await?;

                    let profile = doctor::ActiveModel {
                        user_id: Set(created_user.id),
                        specialization: Set(blank_to_none(input.specialization)),
                        contact: Set(blank_to_none(input.contact)),
                        availability: Set(None),
                        ..Default::default()
                    };
                    let created_doctor = profile.insert(txn).await?;

                    Ok((created_user, created_doctor))
                })
            })
            .await?;

        info!(user_id = created.0.id, doctor_id = created.1.id, "doctor added");
        Ok(created)
    }

    /// Create a patient account and profile atomically.
    pub async fn create_patient(
        &self,
        input: CreatePatientInput,
    ) -> DomainResult<(user::Model, patient::Model)> {
        let name = input.name.trim().to_string();
        let email = normalize_email(&input.email);
        if name.is_empty() || email.is_empty() {
            return Err(DomainError::Validation(
                "Name and email are required to add a patient.".into(),
            ));
        }

        self.ensure_email_free(&email).await?;

        let password = blank_to_none(input.password)
            .unwrap_or_else(|| DEFAULT_PATIENT_PASSWORD.to_string());
        let password_hash = hash_password(&password)
            .map_err(|e| DomainError::Validation(format!("Failed to hash password: {}", e)))?;

        let created = self
            .db
            .transaction::<_, (user::Model, patient::Model), DomainError>(|txn| {
                Box::pin(async move {
                    let new_user = user::ActiveModel {
                        name: Set(name),
                        email: Set(email),
                        password_hash: Set(password_hash),
                        role: Set(Role::Patient),
                        is_active: Set(true),
                        created_at: Set(Utc::now()),
                        ..Default::default()
                    };
                    let created_user = new_user.insert(txn).await?;

                    let profile = patient::ActiveModel {
                        user_id: Set(created_user.id),
                        age: Set(input.age),
                        gender: Set(blank_to_none(input.gender)),
                        contact: Set(blank_to_none(input.contact)),
                        address: Set(blank_to_none(input.address)),
                        notes: Set(None),
                        ..Default::default()
                    };
                    let created_patient = profile.insert(txn).await?;

                    Ok((created_user, created_patient))
                })
            })
            .await?;

        info!(user_id = created.0.id, patient_id = created.1.id, "patient added");
        Ok(created)
    }

    /// List doctor profiles with their owning users.
    pub async fn list_doctors(&self) -> DomainResult<Vec<(doctor::Model, Option<user::Model>)>> {
        Ok(doctor::Entity::find()
            .find_also_related(user::Entity)
            .all(&self.db)
            .await?)
    }

    /// List patient profiles with their owning users.
    pub async fn list_patients(&self) -> DomainResult<Vec<(patient::Model, Option<user::Model>)>> {
        Ok(patient::Entity::find()
            .find_also_related(user::Entity)
            .all(&self.db)
            .await?)
    }

    /// Delete a patient profile together with its appointments.
    ///
    /// The delete is an explicit multi-step transaction. The owning user row
    /// is retained, so the email stays claimed.
    pub async fn delete_patient(&self, patient_id: i32) -> DomainResult<()> {
        let existing = patient::Entity::find_by_id(patient_id).one(&self.db).await?;
        if existing.is_none() {
            return Err(DomainError::NotFound("Patient"));
        }

        self.db
            .transaction::<_, (), DomainError>(move |txn| {
                Box::pin(async move {
                    appointment::Entity::delete_many()
                        .filter(appointment::Column::PatientId.eq(patient_id))
                        .exec(txn)
                        .await?;
                    patient::Entity::delete_by_id(patient_id).exec(txn).await?;
                    Ok(())
                })
            })
            .await?;

        info!(patient_id, "patient deleted");
        Ok(())
    }

    /// Flip a user's active flag. Self-toggle is forbidden.
    pub async fn toggle_user_active(
        &self,
        acting_user_id: i32,
        target_user_id: i32,
    ) -> DomainResult<user::Model> {
        let user = user::Entity::find_by_id(target_user_id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound("User"))?;

        if user.id == acting_user_id {
            return Err(DomainError::Forbidden(
                "You cannot deactivate your own account.".into(),
            ));
        }

        let next_state = !user.is_active;
        let mut active: user::ActiveModel = user.into();
        active.is_active = Set(next_state);
        let updated = active.update(&self.db).await?;

        info!(user_id = updated.id, is_active = updated.is_active, "user active flag toggled");
        Ok(updated)
    }

    /// Fetch a user by id.
    pub async fn get_user(&self, id: i32) -> DomainResult<user::Model> {
        user::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound("User"))
    }

    /// Entity counts for the admin dashboard.
    pub async fn counts(&self) -> DomainResult<(u64, u64, u64)> {
        let doctors = doctor::Entity::find().count(&self.db).await?;
        let patients = patient::Entity::find().count(&self.db).await?;
        let appointments = appointment::Entity::find().count(&self.db).await?;
        Ok((doctors, patients, appointments))
    }

    async fn ensure_email_free(&self, email: &str) -> DomainResult<()> {
        let existing = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(DomainError::Conflict(
                "An account with that email already exists.".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    use super::*;
    use crate::infrastructure::database::migrator::Migrator;

    async fn test_service() -> (DatabaseConnection, IdentityService) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        (db.clone(), IdentityService::new(db, JwtConfig::default()))
    }

    fn alice() -> RegisterInput {
        RegisterInput {
            name: "Alice".into(),
            email: "alice@example.com".into(),
            password: "secret123".into(),
            confirm_password: "secret123".into(),
            age: Some(30),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn register_creates_patient_profile() {
        let (_db, svc) = test_service().await;
        let user = svc.register(alice()).await.unwrap();
        assert_eq!(user.role, Role::Patient);

        let patients = svc.list_patients().await.unwrap();
        assert_eq!(patients.len(), 1);
        let (profile, owner) = &patients[0];
        assert_eq!(profile.user_id, user.id);
        assert_eq!(profile.age, Some(30));
        assert_eq!(owner.as_ref().unwrap().name, "Alice");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_case_insensitively() {
        let (_db, svc) = test_service().await;
        svc.register(alice()).await.unwrap();

        let mut second = alice();
        second.email = "  ALICE@Example.COM ".into();
        let err = svc.register(second).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn password_mismatch_is_rejected() {
        let (_db, svc) = test_service().await;
        let mut input = alice();
        input.confirm_password = "different".into();
        let err = svc.register(input).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn login_failures_are_distinct() {
        let (_db, svc) = test_service().await;
        svc.register(alice()).await.unwrap();

        let unknown = svc.login("nobody@example.com", "secret123").await.unwrap_err();
        assert_eq!(unknown.to_string(), "No account found with that email.");

        let wrong = svc.login("alice@example.com", "nope").await.unwrap_err();
        assert_eq!(wrong.to_string(), "Incorrect password.");
    }

    #[tokio::test]
    async fn login_normalizes_email() {
        let (_db, svc) = test_service().await;
        svc.register(alice()).await.unwrap();

        let result = svc.login(" Alice@EXAMPLE.com ", "secret123").await.unwrap();
        assert_eq!(result.user.email, "alice@example.com");
        assert!(!result.token.is_empty());
    }

    #[tokio::test]
    async fn deactivated_user_cannot_log_in_until_reactivated() {
        let (_db, svc) = test_service().await;
        let user = svc.register(alice()).await.unwrap();

        // Admin id 0 stands in for a different acting user.
        svc.toggle_user_active(0, user.id).await.unwrap();
        let err = svc.login("alice@example.com", "secret123").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "This account has been deactivated. Contact admin."
        );

        svc.toggle_user_active(0, user.id).await.unwrap();
        assert!(svc.login("alice@example.com", "secret123").await.is_ok());
    }

    #[tokio::test]
    async fn self_toggle_is_forbidden() {
        let (_db, svc) = test_service().await;
        let user = svc.register(alice()).await.unwrap();
        let err = svc.toggle_user_active(user.id, user.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn create_doctor_uses_default_password() {
        let (_db, svc) = test_service().await;
        svc.create_doctor(CreateDoctorInput {
            name: "Dr. Bob".into(),
            email: "bob@example.com".into(),
            specialization: Some("Cardiology".into()),
            ..Default::default()
        })
        .await
        .unwrap();

        let result = svc.login("bob@example.com", "changeme123").await.unwrap();
        assert_eq!(result.user.role, Role::Doctor);

        let doctors = svc.list_doctors().await.unwrap();
        assert_eq!(doctors.len(), 1);
        assert_eq!(doctors[0].0.specialization.as_deref(), Some("Cardiology"));
    }

    #[tokio::test]
    async fn delete_patient_removes_profile_and_appointments() {
        let (db, svc) = test_service().await;
        svc.register(alice()).await.unwrap();
        let (_, profile) = svc
            .create_patient(CreatePatientInput {
                name: "Carol".into(),
                email: "carol@example.com".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let appt = appointment::ActiveModel {
            patient_id: Set(profile.id),
            doctor_id: Set(None),
            date: Set("2025-01-10".parse().unwrap()),
            time: Set("09:00:00".parse().unwrap()),
            status: Set(appointment::AppointmentStatus::Pending),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        appt.insert(&db).await.unwrap();

        svc.delete_patient(profile.id).await.unwrap();
        assert_eq!(svc.list_patients().await.unwrap().len(), 1);
        let (_, _, appointments) = svc.counts().await.unwrap();
        assert_eq!(appointments, 0);

        let err = svc.delete_patient(profile.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
