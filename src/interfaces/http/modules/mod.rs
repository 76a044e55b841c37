//! Route modules, one per audience.

pub mod admin;
pub mod auth;
pub mod doctor;
pub mod health;
pub mod patient;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::application::{AppointmentService, IdentityService};
use crate::auth::jwt::JwtConfig;

/// Shared state for every route module; handlers pick what they need.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_config: JwtConfig,
    pub identity: Arc<IdentityService>,
    pub scheduling: Arc<AppointmentService>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, jwt_config: JwtConfig) -> Self {
        Self {
            identity: Arc::new(IdentityService::new(db.clone(), jwt_config.clone())),
            scheduling: Arc::new(AppointmentService::new(db.clone())),
            db,
            jwt_config,
        }
    }
}
