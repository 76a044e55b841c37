//! HTTP REST API
//!
//! - `common`: response envelope, validated JSON extractor, view DTOs
//! - `modules`: per-role route modules (auth, admin, doctor, patient)
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod modules;
pub mod router;

pub use router::create_api_router;
