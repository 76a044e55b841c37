//! # MedEase Hospital Service
//!
//! Role-based hospital appointment management: admins run the registry,
//! doctors work their daily schedule, patients book and cancel visits.
//!
//! ## Architecture
//!
//! - **domain**: Error taxonomy shared by all layers
//! - **application**: Business logic (identity, scheduling)
//! - **infrastructure**: Database entities and migrations
//! - **interfaces**: REST API with Swagger documentation
//! - **auth**: JWT authentication, password hashing, role guards

pub mod application;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig};

// Re-export API router
pub use interfaces::http::create_api_router;
