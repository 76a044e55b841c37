//! Identity use-cases: login, registration, admin account management.

pub mod service;

pub use service::{
    AuthResult, CreateDoctorInput, CreatePatientInput, IdentityService, RegisterInput,
};
