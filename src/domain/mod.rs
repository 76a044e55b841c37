//! Core domain types shared across the application layer.

pub mod error;

pub use error::{DomainError, DomainResult};
