//! Business logic and use cases.
//!
//! HTTP handlers stay thin and delegate here; every method returns
//! `DomainResult` so the HTTP layer can map failures uniformly.

pub mod identity;
pub mod scheduling;

pub use identity::IdentityService;
pub use scheduling::AppointmentService;
