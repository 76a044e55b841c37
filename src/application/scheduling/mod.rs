//! Scheduling use-cases: the appointment lifecycle and availability windows.

pub mod service;

pub use service::{
    AppointmentRecord, AppointmentService, BookAppointmentInput, CompleteAppointmentInput,
    DeclareAvailabilityInput,
};
