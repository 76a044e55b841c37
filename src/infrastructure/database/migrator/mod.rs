//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users;
mod m20250301_000002_create_doctors;
mod m20250301_000003_create_patients;
mod m20250301_000004_create_appointments;
mod m20250301_000005_create_availabilities;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users::Migration),
            Box::new(m20250301_000002_create_doctors::Migration),
            Box::new(m20250301_000003_create_patients::Migration),
            Box::new(m20250301_000004_create_appointments::Migration),
            Box::new(m20250301_000005_create_availabilities::Migration),
        ]
    }
}
