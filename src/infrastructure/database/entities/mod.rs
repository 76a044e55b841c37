//! Database entities module

pub mod appointment;
pub mod availability;
pub mod doctor;
pub mod patient;
pub mod user;

pub use appointment::Entity as Appointment;
pub use availability::Entity as Availability;
pub use doctor::Entity as Doctor;
pub use patient::Entity as Patient;
pub use user::Entity as User;
